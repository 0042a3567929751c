//! Integration tests for `BlogWriterClient` and `ContentApiClient` using
//! wiremock HTTP mocks.

use blogflow_writer::{
    ApprovalRequest, BlogGenerationParams, BlogWriterClient, ContentApiClient, PublishingRequest,
    WriterError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn writer(base_url: &str) -> BlogWriterClient {
    BlogWriterClient::new(base_url, Some("secret-key"), 5, "blogflow-test")
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

fn content(base_url: &str) -> ContentApiClient {
    ContentApiClient::new(base_url, 5, "blogflow-test").expect("client construction should not fail")
}

#[tokio::test]
async fn generate_blog_sends_bearer_and_parses_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/blog/generate"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({"topic": "Pet Grooming", "keywords": ["dog grooming"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "The Pet Grooming Guide",
            "content": "# Grooming",
            "word_count": 1480,
            "seo_score": 87.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = BlogGenerationParams {
        topic: "Pet Grooming".into(),
        keywords: vec!["dog grooming".into()],
        ..BlogGenerationParams::default()
    };
    let blog = writer(&server.uri())
        .generate_blog(&params)
        .await
        .expect("generation should succeed");

    assert_eq!(blog.title, "The Pet Grooming Guide");
    assert_eq!(blog.word_count, Some(1480));
}

#[tokio::test]
async fn generate_blog_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/blog/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "model overloaded"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = writer(&server.uri())
        .generate_blog(&BlogGenerationParams {
            topic: "x".into(),
            ..BlogGenerationParams::default()
        })
        .await
        .expect_err("503 should fail");

    match err {
        WriterError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 503);
            assert_eq!(message, "model overloaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn quality_levels_retry_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quality-levels"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quality-levels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quality_levels": [
                {"id": "draft", "name": "Draft"},
                {"id": "premium", "name": "Premium", "description": "Two review passes"}
            ]
        })))
        .mount(&server)
        .await;

    let levels = writer(&server.uri())
        .get_quality_levels()
        .await
        .expect("should succeed after one retry");

    assert_eq!(levels.len(), 2);
    assert_eq!(levels[1].id, "premium");
}

#[tokio::test]
async fn presets_accept_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/presets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "listicle", "name": "Listicle", "tone": "casual", "length": 1200}
        ])))
        .mount(&server)
        .await;

    let presets = writer(&server.uri()).get_presets().await.expect("presets");
    assert_eq!(presets[0].settings["length"], 1200);
}

#[tokio::test]
async fn upload_image_returns_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/images/upload"))
        .and(header_exists("content-type"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://cdn.example.com/hero.png"})),
        )
        .mount(&server)
        .await;

    let url = content(&server.uri())
        .upload_image("hero.png", vec![0x89, b'P', b'N', b'G'], "image/png")
        .await
        .expect("upload should succeed");
    assert_eq!(url, "https://cdn.example.com/hero.png");

    let received = server.received_requests().await.expect("recording enabled");
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn approval_and_publishing_are_keyed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blog-approvals"))
        .and(body_partial_json(json!({"queue_id": "q-1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 10, "status": "pending"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/blog-publishing"))
        .and(body_partial_json(json!({"post_id": "p-9"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "pub-1"})))
        .mount(&server)
        .await;

    let client = content(&server.uri());
    let approval = client
        .create_approval(&ApprovalRequest {
            queue_id: "q-1".into(),
            status: None,
            notes: None,
        })
        .await
        .expect("approval");
    assert_eq!(approval.id, Some(json!(10)));
    assert_eq!(approval.extra["status"], "pending");

    let publishing = client
        .create_publishing(&PublishingRequest {
            post_id: "p-9".into(),
            platform: Some("wordpress".into()),
            scheduled_at: None,
        })
        .await
        .expect("publishing");
    assert_eq!(publishing.id, Some(json!("pub-1")));
}
