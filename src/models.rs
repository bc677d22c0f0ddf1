use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Character limit applied when a platform name is not recognised.
pub const DEFAULT_CHAR_LIMIT: usize = 2200;

/// Social platforms a caption can be generated for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Twitter,
    Linkedin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
        }
    }

    pub fn char_limit(&self) -> usize {
        match self {
            Platform::Instagram => 2200,
            Platform::Twitter => 280, // X
            Platform::Linkedin => 3000,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            other => Err(format!("unsupported platform '{}'", other)),
        }
    }
}

/// Voice the caption is written in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Playful,
    Inspirational,
    Bold,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "Friendly",
            Tone::Professional => "Professional",
            Tone::Playful => "Playful",
            Tone::Inspirational => "Inspirational",
            Tone::Bold => "Bold",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single photo returned by the image search API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub url: String,
    pub author: Option<String>,
    pub link: Option<String>,
    pub alt_description: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageResult {
    /// Attribution line required by the image provider, if the author is known.
    pub fn credit(&self) -> Option<String> {
        self.author
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| format!("Photo by {} on Unsplash", name))
    }
}

/// A generated post as it is stored in the history table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub post_id: Uuid,
    pub topic: String,
    pub platform: String,
    pub tone: String,
    pub caption: String,
    /// Empty when no image was found.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(topic: &str, platform: Platform, tone: Tone, caption: &str, image_url: &str) -> Self {
        Self {
            post_id: Uuid::new_v4(),
            topic: topic.to_string(),
            platform: platform.as_str().to_string(),
            tone: tone.as_str().to_string(),
            caption: caption.to_string(),
            image_url: image_url.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct GenerateRequest {
    pub topic: String,
    pub platform: Platform,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_include_hashtags")]
    pub include_hashtags: bool,
}

fn default_include_hashtags() -> bool {
    true
}

#[derive(Serialize, Debug, Clone)]
pub struct GenerateResponse {
    /// `None` when the history write failed.
    pub post_id: Option<Uuid>,
    pub caption: String,
    pub platform: Platform,
    pub tone: Tone,
    pub image: Option<ImageResult>,
    pub credit: Option<String>,
    pub notice: Option<String>,
}
