use crate::{
    domain::PostRepository,
    errors::RepoError,
    models::Post,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::AttributeValue,
    Client as DynamoDbClient,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{self, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DynamoDbPostRepository {
    client: DynamoDbClient,
    table_name: String, // Store the table name
}

impl DynamoDbPostRepository {
    /// Creates a new repository instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbPostRepository");
        Self { client, table_name }
    }
}

#[async_trait]
impl PostRepository for DynamoDbPostRepository {
    /// Stores a `Post` in the DynamoDB table using PutItem.
    async fn create(&self, post: &Post) -> Result<(), RepoError> {
        self.client
            .put_item()
            .set_item(Some(post_to_item(post)))
            .table_name(&self.table_name)
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to put post (id: {})", self.table_name, post.post_id))
            .map_err(RepoError::BackendError)?; // Map anyhow::Error -> RepoError
        tracing::debug!(post_id = %post.post_id, table_name = %self.table_name, "DynamoDB: Post stored");
        Ok(())
    }

    /// Retrieves a `Post` from DynamoDB using GetItem.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let id_str = id.to_string();
        let resp = self.client
            .get_item()
            .table_name(&self.table_name)
            .key("post_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to get post (id: {})", self.table_name, id_str))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_post(&item) {
                Some(post) => Ok(Some(post)),
                None => {
                    tracing::error!(post_id = %id_str, table_name = %self.table_name, "DynamoDB: Retrieved item but failed to parse into Post");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse post data retrieved from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Ok(None), // Item not found is not an error
        }
    }

    /// Lists the newest posts. Scans every page, then sorts by `created_at`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Post>, RepoError> {
        tracing::debug!("DynamoDB: Scanning table '{}' for recent posts", self.table_name);
        let mut posts: Vec<Post> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self.client.scan().table_name(&self.table_name);

            // Apply ExclusiveStartKey if paginating from previous response
            if let Some(lek) = last_evaluated_key {
                request_builder = request_builder.set_exclusive_start_key(Some(lek));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!("DynamoDB: Failed to scan table '{}'", self.table_name))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                tracing::debug!("DynamoDB Scan (table: {}): Returned {} items", self.table_name, items.len());
                for item in items {
                    match item_to_post(&item) {
                        Some(post) => posts.push(post),
                        None => {
                            // one bad row should not hide the rest of the history
                            let item_id = item.get("post_id").and_then(|v| v.as_s().ok());
                            tracing::warn!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Skipping unparseable post");
                        }
                    }
                }
            }

            // Check for next page
            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break; // Exit loop if no more pages
            }
        }

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        tracing::info!("DynamoDB (table: {}): Listed {} recent posts", self.table_name, posts.len());
        Ok(posts)
    }
}

fn post_to_item(post: &Post) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("post_id".to_string(), AttributeValue::S(post.post_id.to_string())),
        ("topic".to_string(), AttributeValue::S(post.topic.clone())),
        ("platform".to_string(), AttributeValue::S(post.platform.clone())),
        ("tone".to_string(), AttributeValue::S(post.tone.clone())),
        ("caption".to_string(), AttributeValue::S(post.caption.clone())),
        ("image_url".to_string(), AttributeValue::S(post.image_url.clone())),
        ("created_at".to_string(), AttributeValue::S(post.created_at.to_rfc3339())),
    ])
}

// Helper function to convert DynamoDB item map to Post struct
fn item_to_post(item: &HashMap<String, AttributeValue>) -> Option<Post> {
    let text = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();

    let post_id = Uuid::parse_str(&text("post_id")?).ok()?;
    let created_at = DateTime::parse_from_rfc3339(&text("created_at")?)
        .ok()?
        .with_timezone(&Utc);

    Some(Post {
        post_id,
        topic: text("topic")?,
        platform: text("platform")?,
        tone: text("tone")?,
        caption: text("caption")?,
        // empty strings are stored as-is; older rows may lack the attribute
        image_url: text("image_url").unwrap_or_default(),
        created_at,
    })
}

/// Process-local post history, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        info!("Initializing InMemoryPostRepository");
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: &Post) -> Result<(), RepoError> {
        self.posts.write().await.push(post.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.iter().find(|p| p.post_id == id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.posts.read().await.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        Ok(posts)
    }
}
