use crate::errors::{GenerationError, RepoError, SearchError};
use crate::models::{ImageResult, Platform, Post, Tone};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining operations for storing and retrieving generated posts.
#[async_trait]
pub trait PostRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Stores a post.
    async fn create(&self, post: &Post) -> Result<(), RepoError>;

    /// Retrieves a post by its unique ID.
    /// Returns Ok(None) if the post is not found.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Lists at most `limit` posts, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Post>, RepoError>;
}

/// Produces caption text and image keywords for a topic.
#[async_trait]
pub trait CaptionGenerator: Send + Sync + 'static {
    async fn generate(
        &self,
        topic: &str,
        platform: Platform,
        tone: Tone,
        include_hashtags: bool,
    ) -> Result<String, GenerationError>;

    /// Raw comma-separated keyword list describing the caption's visual theme.
    async fn image_keywords(&self, caption: &str, platform: Platform) -> Result<String, GenerationError>;
}

/// One page of results from an image search backend.
#[async_trait]
pub trait ImageSearch: Send + Sync + 'static {
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<ImageResult>, SearchError>;
}
