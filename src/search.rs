use reqwest::{Client, ClientBuilder, Url};
use std::time::Duration;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::ResultPage;

const SEARCH_PATH: &str = "/search";

/// Builds `<base>/search?query=..&page=..&hitsPerPage=..`.
pub fn build_search_url(base: &str, term: &str, page: u32, hits_per_page: u32) -> Result<Url> {
    let endpoint = format!("{}{}", base.trim_end_matches('/'), SEARCH_PATH);
    Url::parse_with_params(
        &endpoint,
        &[
            ("query", term.to_string()),
            ("page", page.to_string()),
            ("hitsPerPage", hits_per_page.to_string()),
        ],
    )
    .map_err(|e| AppError::ConfigError(format!("Invalid search endpoint {}: {}", endpoint, e)))
}

/// Thin client for the Hacker News search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    api_base: String,
    hits_per_page: u32,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self> {
        // No request timeout: a hung search simply never completes.
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            hits_per_page: config.hits_per_page,
        })
    }

    pub async fn fetch_page(&self, term: &str, page: u32) -> Result<ResultPage> {
        let url = build_search_url(&self.api_base, term, page, self.hits_per_page)?;
        tracing::debug!(%url, "requesting search page");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        ResultPage::from_json(&body)
    }
}
