use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod config;
mod domain;
mod errors;
mod export;
mod generator;
mod handlers;
mod image_search;
mod models;
mod pipeline;
mod repositories;
mod routes;
mod startup;
mod text;

use crate::config::{Config, PostsBackend};
use crate::domain::{CaptionGenerator, PostRepository};
use crate::errors::AppError;
use crate::generator::OpenAiCaptionGenerator;
use crate::image_search::{ImageFinder, UnsplashClient};
use crate::repositories::{DynamoDbPostRepository, InMemoryPostRepository};

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub post_repo: Arc<dyn PostRepository>,
    pub caption_generator: Arc<dyn CaptionGenerator>,
    pub image_finder: ImageFinder,
    /// Used for export downloads.
    pub http_client: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "social_post_studio=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::load()?;
    tracing::info!(bind_address = %config.bind_address, backend = ?config.posts_backend, "Configuration loaded");

    // --- External services ---
    // A missing image key stops startup here rather than failing every request later.
    let mut unsplash = UnsplashClient::new(config.unsplash_access_key.clone())?;
    if let Some(endpoint) = &config.unsplash_endpoint {
        tracing::info!(%endpoint, "Using image search endpoint override");
        unsplash = unsplash.with_endpoint(endpoint.clone());
    }
    let caption_generator = OpenAiCaptionGenerator::new(config.llm.clone())?;
    let http_client = reqwest::Client::builder()
        .timeout(export::DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build HTTP client: {}", e)))?;

    // --- Post history ---
    let post_repo: Arc<dyn PostRepository> = match config.posts_backend {
        PostsBackend::DynamoDb => {
            tracing::info!("Initializing AWS DynamoDB client...");
            let sdk_config = aws_clients::create_sdk_config(&config).await;
            let db_client = aws_clients::create_dynamodb_client(&sdk_config);
            startup::init_resources(&db_client, &config.posts_table_name).await?;
            Arc::new(DynamoDbPostRepository::new(db_client, config.posts_table_name.clone()))
        }
        PostsBackend::Memory => {
            tracing::warn!("Using in-memory post history; posts are lost on restart");
            Arc::new(InMemoryPostRepository::new())
        }
    };

    // --- Application State ---
    let state = Arc::new(AppState {
        post_repo,
        caption_generator: Arc::new(caption_generator),
        image_finder: ImageFinder::new(Arc::new(unsplash)),
        http_client,
    });

    let app = routes::create_router(state);

    // --- Server Startup ---
    tracing::info!("Server listening on http://{}", config.bind_address);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?; // Use ? with From<std::io::Error>
    axum::serve(listener, app).await?;

    Ok(())
}
