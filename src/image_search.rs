//! Royalty-free image lookup.
//!
//! [`UnsplashClient`] talks to the search API; [`ImageFinder`] plans the
//! fallback queries and picks one photo from the first query that returns any.

use crate::domain::ImageSearch;
use crate::errors::SearchError;
use crate::models::ImageResult;
use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::Deserialize;
use std::{collections::HashSet, env, sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

pub const UNSPLASH_API: &str = "https://api.unsplash.com/search/photos";
pub const ACCESS_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";

/// Results requested per candidate query.
pub const PER_PAGE: u32 = 12;
const MAX_PER_PAGE: u32 = 30;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    results: Vec<ApiPhoto>,
}

#[derive(Debug, Deserialize)]
struct ApiPhoto {
    #[serde(default)]
    user: Option<ApiUser>,
    #[serde(default)]
    links: Option<ApiLinks>,
    #[serde(default)]
    urls: Option<ApiUrls>,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiLinks {
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUrls {
    regular: Option<String>,
}

impl ApiSearchResponse {
    fn into_results(self) -> Vec<ImageResult> {
        self.results
            .into_iter()
            .filter_map(|photo| {
                // a hit without a displayable rendition is useless to the caller
                let url = photo.urls.and_then(|u| u.regular)?;
                Some(ImageResult {
                    url,
                    author: photo.user.and_then(|u| u.name),
                    link: photo.links.and_then(|l| l.html),
                    alt_description: photo.alt_description,
                    width: photo.width,
                    height: photo.height,
                })
            })
            .collect()
    }
}

/// HTTP client for the Unsplash photo search endpoint.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: reqwest::Client,
    access_key: String,
    endpoint: String,
}

impl UnsplashClient {
    /// Builds a client from an explicit key, falling back to `UNSPLASH_ACCESS_KEY`.
    ///
    /// A missing or blank key is a configuration error raised here, before any search.
    pub fn new(access_key: Option<String>) -> Result<Self, SearchError> {
        Self::from_parts(access_key, env::var(ACCESS_KEY_VAR).ok())
    }

    fn from_parts(explicit: Option<String>, from_env: Option<String>) -> Result<Self, SearchError> {
        let access_key = explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
            .ok_or(SearchError::MissingCredential)?;

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("Initialized Unsplash image search client");

        Ok(Self {
            client,
            access_key: access_key.trim().to_string(),
            endpoint: UNSPLASH_API.to_string(),
        })
    }

    /// Points the client at another search endpoint (proxies, local fakes).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<ImageResult>, SearchError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE).to_string();
        debug!(%query, %per_page, "Unsplash: searching photos");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("page", "1"),
                ("per_page", per_page.as_str()),
                ("content_filter", "high"),
                ("orientation", "landscape"),
            ])
            .header("Accept-Version", "v1")
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let data: ApiSearchResponse = response.json().await?;
        let results = data.into_results();
        debug!(%query, hits = results.len(), "Unsplash: search complete");
        Ok(results)
    }
}

/// Ordered search queries: all keywords joined, each keyword, then the fallback.
///
/// Duplicates keep their first position and blank queries are dropped.
pub fn candidate_queries<S: AsRef<str>>(keywords: &[S], fallback_query: &str) -> Vec<String> {
    let joined = keywords
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(" ");

    let mut seen = HashSet::new();
    std::iter::once(joined)
        .chain(keywords.iter().map(|k| k.as_ref().to_string()))
        .chain(std::iter::once(fallback_query.to_string()))
        .filter(|q| seen.insert(q.clone()))
        .filter(|q| !q.trim().is_empty())
        .collect()
}

/// Picks an image for a caption by walking the candidate queries in order.
#[derive(Clone)]
pub struct ImageFinder {
    search: Arc<dyn ImageSearch>,
}

impl ImageFinder {
    pub fn new(search: Arc<dyn ImageSearch>) -> Self {
        Self { search }
    }

    pub async fn best_image<S: AsRef<str> + Sync>(
        &self,
        keywords: &[S],
        fallback_query: &str,
    ) -> Option<ImageResult> {
        let mut rng = StdRng::from_entropy();
        self.best_image_with_rng(keywords, fallback_query, &mut rng).await
    }

    /// Returns a uniformly random hit from the first query with any results.
    ///
    /// Failed queries are skipped; `None` means every candidate came back empty.
    pub async fn best_image_with_rng<S, R>(
        &self,
        keywords: &[S],
        fallback_query: &str,
        rng: &mut R,
    ) -> Option<ImageResult>
    where
        S: AsRef<str> + Sync,
        R: Rng + Send + ?Sized,
    {
        for query in candidate_queries(keywords, fallback_query) {
            match self.search.search(&query, PER_PAGE).await {
                Ok(hits) if hits.is_empty() => {
                    debug!(%query, "No images for query, trying next candidate");
                }
                Ok(hits) => {
                    info!(%query, hits = hits.len(), "Image query matched");
                    return hits.choose(rng).cloned();
                }
                Err(SearchError::Unauthorized(status)) => {
                    // skipped like any other failure
                    error!(%query, status, "Image search rejected the access key");
                }
                Err(e) => {
                    warn!(%query, error = %e, "Image query failed, trying next candidate");
                }
            }
        }
        info!(fallback = %fallback_query, "No image found for any candidate query");
        None
    }
}
