//! Serper.dev web search client
//!
//! External collaborator with a deliberately soft contract: this client
//! never surfaces an error. A missing API key, transport failure, non-2xx
//! status, or undecodable payload all collapse to an empty response, and the
//! condition is logged instead.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Default API endpoint
const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// One ranked web result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Result title
    pub title: String,
    /// Result URL
    pub url: String,
    /// Provider-supplied snippet
    pub snippet: String,
    /// 1-based rank in the provider's ordering
    pub position: usize,
}

/// Full provider response for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The query as sent
    pub query: String,
    /// Ranked results, possibly empty
    pub results: Vec<ProviderResult>,
    /// Provider-reported search time, when present
    pub search_time: f64,
}

impl ProviderResponse {
    fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            results: Vec::new(),
            search_time: 0.0,
        }
    }
}

/// Client for the Serper.dev Google Search API
pub struct SerperClient {
    api_key: Option<String>,
    endpoint: String,
    country: String,
    language: String,
    client: reqwest::Client,
}

impl SerperClient {
    /// Create a client. A `None` key disables web search (all queries
    /// return empty responses).
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("serper api key not set - web search disabled");
        }
        Self {
            api_key,
            endpoint: SERPER_ENDPOINT.to_string(),
            country: "us".to_string(),
            language: "en".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API endpoint (tests, proxies)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the result country and language
    #[must_use]
    pub fn with_locale(mut self, country: impl Into<String>, language: impl Into<String>) -> Self {
        self.country = country.into();
        self.language = language.into();
        self
    }

    /// Whether the client can actually reach the provider
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search the web. Never fails: any error path yields an empty response.
    pub async fn search(&self, query: &str, num_results: usize) -> ProviderResponse {
        let Some(api_key) = self.api_key.as_deref() else {
            return ProviderResponse::empty(query);
        };

        let body = serde_json::json!({
            "q": query,
            "num": num_results,
            "gl": self.country,
            "hl": self.language,
        });

        let response = match self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "serper request failed");
                return ProviderResponse::empty(query);
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "serper api error");
                return ProviderResponse::empty(query);
            }
        };

        let payload: SerperPayload = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "serper payload decode failed");
                return ProviderResponse::empty(query);
            }
        };

        let results = payload
            .organic
            .into_iter()
            .take(num_results)
            .enumerate()
            .map(|(i, item)| ProviderResult {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                position: i + 1,
            })
            .collect();

        ProviderResponse {
            query: query.to_string(),
            results,
            search_time: payload
                .search_parameters
                .map(|p| p.time_used)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperPayload {
    #[serde(default)]
    organic: Vec<OrganicItem>,
    #[serde(default, rename = "searchParameters")]
    search_parameters: Option<SearchParameters>,
}

#[derive(Debug, Deserialize)]
struct OrganicItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchParameters {
    #[serde(default, rename = "timeUsed")]
    time_used: f64,
}
