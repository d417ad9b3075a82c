use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use crate::{
    Config,
    error::AdapterError,
    model::{ResolvedQuery, UpstreamResponse},
    requester::{self, RequestConfig, is_transient_error},
};

use super::PrecipitationProvider;

/// dClimate `apiv3` grid-history client.
#[derive(Debug, Clone)]
pub struct DClimateProvider {
    auth_token: String,
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
    http: Client,
}

impl DClimateProvider {
    pub fn new(auth_token: String, config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("precip-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            auth_token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
            http,
        })
    }

    /// `{base}/{endpoint}/{lat}_{lon}?date=YYYY-MM-DD`
    fn request_config(&self, query: &ResolvedQuery) -> RequestConfig {
        RequestConfig {
            url: format!("{}/{}/{}", self.base_url, query.endpoint, query.location),
            query: vec![("date".to_string(), query.formatted_date.clone())],
            headers: vec![
                ("Authorization".to_string(), self.auth_token.clone()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            timeout: self.timeout,
            max_attempts: self.max_attempts,
            retry_delay: self.retry_delay,
        }
    }
}

#[async_trait]
impl PrecipitationProvider for DClimateProvider {
    #[instrument(skip(self), fields(location = %query.location, date = %query.formatted_date))]
    async fn fetch_daily(&self, query: &ResolvedQuery) -> Result<UpstreamResponse, AdapterError> {
        let config = self.request_config(query);
        requester::request(&self.http, &config, is_transient_error).await
    }
}
