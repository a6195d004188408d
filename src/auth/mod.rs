//! Identity boundary
//!
//! Token issuance and verification live in front of this service. By the
//! time a request arrives here the caller's identity has been reduced to a
//! user id header, or to nothing for anonymous callers.

mod viewer;

pub use viewer::{VIEWER_HEADER, Viewer};
