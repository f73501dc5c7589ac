use crate::error::CliError;
use connectors::warehouse::bigquery::{
    adapter::{BigQueryAdapter, BigQueryConfig},
    auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider},
};
use engine_config::settings::BigQuerySettings;
use std::sync::Arc;
use tracing::info;

/// Static token when one is configured, the metadata server otherwise.
fn token_provider(settings: &BigQuerySettings) -> Arc<dyn TokenProvider> {
    match &settings.access_token {
        Some(token) => {
            info!("Using access token from BIGQUERY_ACCESS_TOKEN");
            Arc::new(StaticTokenProvider::new(token.clone()))
        }
        None => Arc::new(MetadataTokenProvider::new(reqwest::Client::new())),
    }
}

pub fn connect(settings: &BigQuerySettings) -> Result<BigQueryAdapter, CliError> {
    let mut config = BigQueryConfig::new(settings.project_id.clone());
    config.location = settings.location.clone();
    config.timeout = settings.timeout;

    let adapter = BigQueryAdapter::new(config, token_provider(settings))?;
    Ok(adapter)
}
