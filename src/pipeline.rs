//! One generate-and-display cycle: caption, hashtags, length limit, image, history.

use crate::domain::{CaptionGenerator, PostRepository};
use crate::errors::AppError;
use crate::image_search::ImageFinder;
use crate::models::{GenerateRequest, GenerateResponse, Post};
use crate::text::{enforce_platform_limit, extract_keywords, make_hashtags, parse_keyword_list};
use tracing::{debug, info, warn};

pub const MAX_KEYWORDS: usize = 6;
pub const MAX_HASHTAGS: usize = 8;

const NO_IMAGE_NOTICE: &str = "No suitable image found. You can still use the caption!";

/// Appends hashtags built from the caption's own keywords when it has none.
pub fn with_hashtags(caption: &str) -> String {
    if caption.contains('#') {
        return caption.to_string();
    }
    let tags = make_hashtags(&extract_keywords(caption, MAX_KEYWORDS), MAX_HASHTAGS);
    if tags.is_empty() {
        return caption.to_string();
    }
    format!("{}\n\n{}", caption.trim(), tags.join(" "))
}

/// Image search terms: the model's list, else ranked caption words, else the topic.
pub async fn image_keywords(
    generator: &dyn CaptionGenerator,
    request: &GenerateRequest,
    topic: &str,
    caption: &str,
) -> Vec<String> {
    let from_model = match generator.image_keywords(caption, request.platform).await {
        Ok(raw) => parse_keyword_list(&raw),
        Err(e) => {
            warn!(error = %e, "Keyword extraction by model failed, ranking caption words instead");
            Vec::new()
        }
    };
    if !from_model.is_empty() {
        return from_model;
    }

    let ranked = extract_keywords(caption, MAX_KEYWORDS);
    if !ranked.is_empty() {
        return ranked;
    }
    vec![topic.to_string()]
}

pub async fn generate_post(
    generator: &dyn CaptionGenerator,
    finder: &ImageFinder,
    repo: &dyn PostRepository,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(AppError::InvalidInput("Please enter a topic.".to_string()));
    }
    info!(%topic, platform = %request.platform, tone = %request.tone, "Generating post");

    let mut caption = generator
        .generate(topic, request.platform, request.tone, request.include_hashtags)
        .await?;
    if request.include_hashtags {
        caption = with_hashtags(&caption);
    }
    let caption = enforce_platform_limit(&caption, request.platform.as_str());

    let keywords = image_keywords(generator, request, topic, &caption).await;
    debug!(?keywords, "Searching for a matching image");
    let image = finder.best_image(&keywords, topic).await;

    let post = Post::new(
        topic,
        request.platform,
        request.tone,
        &caption,
        image.as_ref().map(|i| i.url.as_str()).unwrap_or(""),
    );
    let post_id = match repo.create(&post).await {
        Ok(()) => {
            info!(post_id = %post.post_id, "Post saved to history");
            Some(post.post_id)
        }
        Err(e) => {
            warn!(error = %e, "Could not save post to history");
            None
        }
    };

    Ok(GenerateResponse {
        post_id,
        credit: image.as_ref().and_then(|i| i.credit()),
        notice: image.is_none().then(|| NO_IMAGE_NOTICE.to_string()),
        caption,
        platform: request.platform,
        tone: request.tone,
        image,
    })
}
