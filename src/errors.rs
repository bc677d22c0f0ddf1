use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error; // Use thiserror for cleaner error definitions
use uuid::Uuid;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Stored post data is corrupt: {0}")]
    DataCorruption(String),

    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// Raised at client construction, never per query.
    #[error("UNSPLASH_ACCESS_KEY not set. Add it to your .env file or pass it directly.")]
    MissingCredential,

    #[error("Image search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image search rejected the credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Image search returned HTTP {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM request failed: {0}")]
    Http(String),
    #[error("LLM response error: {0}")]
    Response(String),
    #[error("LLM returned an empty caption")]
    EmptyCaption,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Post {0} has no image to export")]
    NoImage(Uuid),
    #[error("Image download returned HTTP {0}")]
    DownloadStatus(u16),
    #[error("Image download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Failed to build zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid post ID format: {0}")]
    InvalidUuid(#[from] uuid::Error),

    // Domain/Service level errors
    #[error("Post not found with ID: {0}")]
    PostNotFound(Uuid),
    #[error("Could not access post history")]
    RepositoryError(#[source] RepoError),
    #[error("Caption generation failed")]
    GenerationError(#[from] GenerationError),
    #[error("Could not export post")]
    ExportError(#[source] ExportError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    // Generic Internal Server Error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoImage(id) => {
                AppError::InvalidInput(format!("Post {} has no image to export", id))
            }
            e => AppError::ExportError(e),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for AppError {
    fn from(err: aws_smithy_types::error::operation::BuildError) -> Self {
        AppError::InitError(format!("Failed to build AWS request: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InitError(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidUuid(e) => (StatusCode::BAD_REQUEST, format!("Invalid ID format: {}", e)),
            AppError::PostNotFound(id) => (StatusCode::NOT_FOUND, format!("Post not found with ID: {}", id)),

            // 5xx Server Errors
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database operation failed".to_string())
            }
            AppError::GenerationError(e) => {
                tracing::error!(error.source = ?e, "Caption generation failed");
                (StatusCode::BAD_GATEWAY, "Something went wrong while generating the caption".to_string())
            }
            AppError::ExportError(e) => {
                tracing::error!(error.source = ?e, "Export failed");
                (StatusCode::BAD_GATEWAY, "Could not build the post export".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        tracing::error!(error.message = %error_message, error.detail = %self, "Responding with error");

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}
