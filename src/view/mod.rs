//! Client-facing view objects
//!
//! Storage entities enriched with viewer-relative flags, plus the pure
//! functions that pack them.

mod converters;
mod dto;

pub use converters::*;
pub use dto::*;
