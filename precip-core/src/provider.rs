use crate::{
    Config,
    error::AdapterError,
    model::{ResolvedQuery, UpstreamResponse},
    provider::dclimate::DClimateProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod dclimate;

/// Source of daily precipitation records.
#[async_trait]
pub trait PrecipitationProvider: Send + Sync + Debug {
    /// Fetch the raw upstream body for one location and local date.
    async fn fetch_daily(&self, query: &ResolvedQuery) -> Result<UpstreamResponse, AdapterError>;
}

/// Construct the dClimate provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn PrecipitationProvider>> {
    let token = config.auth_token().ok_or_else(|| {
        anyhow::anyhow!(
            "No dClimate auth token configured.\n\
             Hint: run `precip configure` or set the AUTH_TOKEN environment variable."
        )
    })?;

    Ok(Box::new(DClimateProvider::new(token.to_owned(), config)?))
}
