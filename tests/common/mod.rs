//! Common test utilities for E2E tests

#![allow(dead_code)]

use reelgraph::data::{NewVideo, UserId, Video};
use reelgraph::{AppState, config};
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_page_size(30).await
    }

    /// Create a test server whose feed returns `page_size` videos per page
    pub async fn with_page_size(page_size: usize) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: config::DatabaseConfig::at(db_path),
            feed: config::FeedConfig { page_size },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = reelgraph::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user through the service layer
    pub async fn create_user(&self, username: &str) -> UserId {
        self.state
            .users
            .register(username, "password123")
            .await
            .unwrap()
            .id
    }

    /// Insert a video with an explicit publish time
    pub async fn create_video(&self, author_id: UserId, title: &str, published_at: i64) -> Video {
        self.state
            .db
            .insert_video(
                &NewVideo {
                    author_id,
                    play_url: format!("https://cdn.example.com/{}.mp4", title),
                    cover_url: format!("https://cdn.example.com/{}.jpg", title),
                    title: title.to_string(),
                },
                published_at,
            )
            .await
            .unwrap()
    }

    /// GET as `viewer` (None for anonymous) and parse the envelope
    pub async fn get(&self, path: &str, viewer: Option<UserId>) -> (StatusCode, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(viewer_id) = viewer {
            request = request.header("x-user-id", viewer_id.to_string());
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    /// POST as `viewer` (None for anonymous) and parse the envelope
    pub async fn post(&self, path: &str, viewer: Option<UserId>) -> (StatusCode, Value) {
        let mut request = self.client.post(self.url(path));
        if let Some(viewer_id) = viewer {
            request = request.header("x-user-id", viewer_id.to_string());
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}
