use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Where generated posts are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostsBackend {
    DynamoDb,
    Memory,
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    /// Checked when the image client is built, not here.
    pub unsplash_access_key: Option<String>,
    /// Overrides the public Unsplash search endpoint.
    pub unsplash_endpoint: Option<String>,
    pub llm: LlmConfig,
    pub posts_backend: PostsBackend,
    pub posts_table_name: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_source<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let bind_address_str = non_empty("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let llm = LlmConfig {
            endpoint: non_empty("OPENAI_ENDPOINT")
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key: non_empty("OPENAI_API_KEY"),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            temperature: parse_or("TEMPERATURE", non_empty("TEMPERATURE"), 0.7)?,
            max_tokens: parse_or("MAX_TOKENS", non_empty("MAX_TOKENS"), 400)?,
        };

        let posts_backend = match non_empty("POSTS_BACKEND").as_deref().map(str::to_ascii_lowercase) {
            None => PostsBackend::DynamoDb,
            Some(v) if v == "dynamodb" => PostsBackend::DynamoDb,
            Some(v) if v == "memory" => PostsBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidVar(
                    "POSTS_BACKEND".into(),
                    format!("expected 'dynamodb' or 'memory', got '{}'", other),
                ));
            }
        };

        let posts_table_name = non_empty("POSTS_TABLE_NAME").unwrap_or_else(|| "posts".to_string());

        let aws_region = non_empty("AWS_DEFAULT_REGION").unwrap_or_else(|| "ca-central-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = non_empty("AWS_ENDPOINT_URL"); // Optional

        Ok(Config {
            bind_address,
            unsplash_access_key: non_empty("UNSPLASH_ACCESS_KEY"),
            unsplash_endpoint: non_empty("UNSPLASH_API_URL"),
            llm,
            posts_backend,
            posts_table_name,
            aws_region,
            localstack_endpoint,
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidVar(name.to_string(), e.to_string())),
    }
}
