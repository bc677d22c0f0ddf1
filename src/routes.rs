use crate::{
    handlers, // Import handlers module
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/posts/generate", post(handlers::generate_post))
        .route("/posts", get(handlers::list_posts))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/posts/{id}/caption.txt", get(handlers::download_caption))
        .route("/posts/{id}/export.zip", get(handlers::export_post))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state) // Pass the application state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostRepository;
    use crate::image_search::ImageFinder;
    use crate::models::{Platform, Post, Tone};
    use crate::pipeline::tests::{CannedGenerator, FixedSearch};
    use crate::repositories::InMemoryPostRepository;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn state_with(repo: Arc<InMemoryPostRepository>, hits: &[&str], image_url: &str) -> Arc<AppState> {
        Arc::new(AppState {
            post_repo: repo,
            caption_generator: Arc::new(CannedGenerator::new("Brew better coffee at home", "coffee cup")),
            image_finder: ImageFinder::new(FixedSearch::new(hits, image_url)),
            http_client: reqwest::Client::new(),
        })
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn generate_then_fetch_roundtrip() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let app = create_router(state_with(repo.clone(), &["coffee cup"], "https://img/coffee.jpg"));

        let resp = app
            .clone()
            .oneshot(json_post(
                "/posts/generate",
                serde_json::json!({"topic": "home coffee", "platform": "twitter", "tone": "Playful"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["platform"], "twitter");
        assert_eq!(json["tone"], "Playful");
        assert_eq!(json["image"]["url"], "https://img/coffee.jpg");
        assert_eq!(json["credit"], "Photo by Jane Doe on Unsplash");
        assert!(json["caption"].as_str().unwrap().contains("#coffee"));

        let id = json["post_id"].as_str().unwrap().to_string();
        let resp = app.oneshot(get_req(&format!("/posts/{}", id))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = body_json(resp).await;
        assert_eq!(stored["topic"], "home coffee");
        assert_eq!(stored["image_url"], "https://img/coffee.jpg");
    }

    #[tokio::test]
    async fn generate_rejects_blank_topic_and_unknown_platform() {
        let app = create_router(state_with(Arc::new(InMemoryPostRepository::new()), &[], ""));

        let resp = app
            .clone()
            .oneshot(json_post("/posts/generate", serde_json::json!({"topic": "  ", "platform": "twitter"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Please enter a topic.");

        let resp = app
            .oneshot(json_post("/posts/generate", serde_json::json!({"topic": "tea", "platform": "myspace"})))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn generate_without_image_reports_notice() {
        let app = create_router(state_with(Arc::new(InMemoryPostRepository::new()), &[], ""));
        let resp = app
            .oneshot(json_post(
                "/posts/generate",
                serde_json::json!({"topic": "coffee", "platform": "linkedin", "include_hashtags": false}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert!(json["image"].is_null());
        assert_eq!(json["caption"], "Brew better coffee at home");
        assert!(json["notice"].as_str().unwrap().contains("No suitable image"));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_bounded() {
        let repo = Arc::new(InMemoryPostRepository::new());
        for i in 0..3 {
            let mut post = Post::new(&format!("topic {}", i), Platform::Twitter, Tone::Bold, "c", "");
            post.created_at = post.created_at + chrono::Duration::minutes(i);
            repo.create(&post).await.unwrap();
        }
        let app = create_router(state_with(repo, &[], ""));

        let resp = app.oneshot(get_req("/posts?limit=2")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let topics: Vec<_> = json.as_array().unwrap().iter().map(|p| p["topic"].clone()).collect();
        assert_eq!(topics, vec!["topic 2", "topic 1"]);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let app = create_router(state_with(Arc::new(InMemoryPostRepository::new()), &[], ""));

        let resp = app.clone().oneshot(get_req("/posts/not-a-uuid")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(get_req(&format!("/posts/{}", uuid::Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn caption_download_is_an_attachment() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let post = Post::new("tea", Platform::Twitter, Tone::Bold, "Steep it right 🍵", "");
        repo.create(&post).await.unwrap();
        let app = create_router(state_with(repo, &[], ""));

        let resp = app
            .oneshot(get_req(&format!("/posts/{}/caption.txt", post.post_id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"caption_"));
        assert!(disposition.ends_with(".txt\""));
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], "Steep it right 🍵".as_bytes());
    }

    #[tokio::test]
    async fn export_requires_an_image() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let post = Post::new("tea", Platform::Twitter, Tone::Bold, "caption", "");
        repo.create(&post).await.unwrap();
        let app = create_router(state_with(repo, &[], ""));

        let resp = app
            .oneshot(get_req(&format!("/posts/{}/export.zip", post.post_id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    async fn image_host() -> String {
        let router = Router::new()
            .route("/photo.jpg", get(|| async { vec![0xFFu8, 0xD8, 0xFF, 0xE0] }))
            .route("/gone.jpg", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn export_bundles_caption_and_downloaded_image() {
        let host = image_host().await;
        let repo = Arc::new(InMemoryPostRepository::new());
        let post = Post::new("tea", Platform::Twitter, Tone::Bold, "Tea time", &format!("{}/photo.jpg", host));
        repo.create(&post).await.unwrap();
        let app = create_router(state_with(repo, &[], ""));

        let resp = app
            .oneshot(get_req(&format!("/posts/{}/export.zip", post.post_id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        let mut image = Vec::new();
        std::io::Read::read_to_end(&mut archive.by_name("image.jpg").unwrap(), &mut image).unwrap();
        assert_eq!(image, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn export_fails_when_image_is_gone() {
        let host = image_host().await;
        let repo = Arc::new(InMemoryPostRepository::new());
        let post = Post::new("tea", Platform::Twitter, Tone::Bold, "Tea time", &format!("{}/gone.jpg", host));
        repo.create(&post).await.unwrap();
        let app = create_router(state_with(repo, &[], ""));

        let resp = app
            .oneshot(get_req(&format!("/posts/{}/export.zip", post.post_id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
