//! Job Search Gateway — best-effort listing lookup against the JSearch API.
//!
//! An empty result set is a normal outcome and renders as `NO_RESULTS`.
//! Only transport failures (DNS, timeout, refused connection) are errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://jsearch.p.rapidapi.com/search";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
/// At most this many listings are rendered.
const MAX_LISTINGS: usize = 3;

/// Sentinel returned when the search yields nothing usable.
pub const NO_RESULTS: &str = "No jobs found for this query.";

#[derive(Debug, Error)]
#[error("Job search unavailable: {cause}")]
pub struct SearchUnavailable {
    pub cause: String,
}

impl From<reqwest::Error> for SearchUnavailable {
    fn from(e: reqwest::Error) -> Self {
        Self {
            cause: e.to_string(),
        }
    }
}

/// One listing record. Every field may be missing upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListing {
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub location: Option<String>,
    pub job_apply_link: Option<String>,
}

impl JobListing {
    /// Renders the listing as a bullet entry, with placeholders for missing fields.
    pub fn to_bullet(&self) -> String {
        format!(
            "• {} at {}, {}\n  {}",
            self.job_title.as_deref().unwrap_or("Unknown Title"),
            self.employer_name.as_deref().unwrap_or("Unknown Company"),
            self.location.as_deref().unwrap_or("Unknown Location"),
            self.job_apply_link.as_deref().unwrap_or("#"),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JobListing>,
}

/// Collapses whitespace runs into `+` so the query travels as one token sequence.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join("+")
}

/// Formats the first `MAX_LISTINGS` listings separated by blank lines, or the sentinel.
pub fn format_listings(listings: &[JobListing]) -> String {
    if listings.is_empty() {
        return NO_RESULTS.to_string();
    }
    listings
        .iter()
        .take(MAX_LISTINGS)
        .map(JobListing::to_bullet)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
pub trait JobSearchGateway: Send + Sync {
    /// Returns formatted listing text, or `NO_RESULTS` when nothing was found.
    async fn search(&self, query: &str) -> Result<String, SearchUnavailable>;
}

/// Calls `search` and folds a transport failure into the `NO_RESULTS` sentinel.
pub async fn search_or_degrade(jobs: &dyn JobSearchGateway, query: &str) -> String {
    match jobs.search(query).await {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Job search degraded to empty result: {e}");
            NO_RESULTS.to_string()
        }
    }
}

/// RapidAPI JSearch implementation of `JobSearchGateway`.
#[derive(Clone)]
pub struct JSearchClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl JSearchClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl JobSearchGateway for JSearchClient {
    async fn search(&self, query: &str) -> Result<String, SearchUnavailable> {
        let query = normalize_query(query);

        let response = self
            .client
            .get(&self.api_url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[("query", query.as_str()), ("page", "1"), ("num_pages", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Job search returned {status} for query {query:?}");
            return Ok(NO_RESULTS.to_string());
        }

        let body = response.text().await?;
        let listings = match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => parsed.data,
            Err(e) => {
                warn!("Job search body was not decodable: {e}");
                Vec::new()
            }
        };

        debug!("Job search for {query:?} returned {} listings", listings.len());
        Ok(format_listings(&listings))
    }
}
