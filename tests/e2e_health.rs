//! E2E tests for liveness and the Prometheus exposition

mod common;

use std::sync::Once;

use common::TestServer;

static METRICS: Once = Once::new();

fn register_metrics() {
    METRICS.call_once(reelgraph::metrics::init_metrics);
}

#[tokio::test]
async fn test_health_is_plain_text() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_metrics_count_edge_transitions() {
    register_metrics();
    let server = TestServer::new().await;
    let alice = server.create_user("alice").await;
    let bob = server.create_user("bob").await;

    let path = format!("/douyin/relation/action?to_user_id={}&action_type=1", alice);
    for _ in 0..2 {
        let (status, _) = server.post(&path, Some(bob)).await;
        assert_eq!(status, 200);
    }

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    let sample = |name: &str, labels: &[&str]| {
        body.lines().any(|line| {
            line.starts_with(name) && labels.iter().all(|label| line.contains(label))
        })
    };
    assert!(sample(
        "reelgraph_edge_transitions_total{",
        &[r#"edge="follow""#, r#"action="add""#, r#"outcome="applied""#],
    ));
    assert!(sample(
        "reelgraph_edge_transitions_total{",
        &[r#"edge="follow""#, r#"outcome="unchanged""#],
    ));
    assert!(sample(
        "reelgraph_http_requests_total{",
        &[r#"endpoint="/douyin/relation/action""#, r#"status="200""#],
    ));
}
