use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::dao::clue_lookup::{DailyDoubleLookup, LookupError, LookupResult};

use super::{
    config::RestLookupConfig,
    error::{RestLookupError, RestResult},
};

/// Row projection returned by the clue table.
#[derive(Debug, Deserialize)]
struct ClueRow {
    is_daily_double: bool,
}

/// Daily double lookup querying the hosted database's REST interface.
#[derive(Clone)]
pub struct RestClueLookup {
    client: Client,
    endpoint: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestClueLookup {
    /// Build the HTTP client for the configured table.
    pub fn new(config: RestLookupConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestLookupError::ClientBuilder { source })?;

        let endpoint = Arc::<str>::from(format!(
            "{}/rest/v1/{}",
            config.base_url.trim_end_matches('/'),
            config.table
        ));

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.map(Arc::<str>::from),
        })
    }

    async fn fetch(&self, clue_id: String) -> LookupResult<bool> {
        let mut builder = self.client.get(self.endpoint.as_ref()).query(&[
            ("id", format!("eq.{clue_id}")),
            ("select", "is_daily_double".to_string()),
        ]);
        if let Some(ref key) = self.api_key {
            builder = builder.header("apikey", key.as_ref()).bearer_auth(key.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RestLookupError::RequestSend {
                clue_id: clue_id.clone(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(RestLookupError::RequestStatus {
                clue_id,
                status: response.status(),
            }
            .into());
        }

        let rows: Vec<ClueRow> =
            response
                .json()
                .await
                .map_err(|source| RestLookupError::DecodeResponse {
                    clue_id: clue_id.clone(),
                    source,
                })?;

        rows.first()
            .map(|row| row.is_daily_double)
            .ok_or(LookupError::NotFound(clue_id))
    }
}

impl DailyDoubleLookup for RestClueLookup {
    fn is_daily_double(&self, clue_id: &str) -> BoxFuture<'static, LookupResult<bool>> {
        let this = self.clone();
        let clue_id = clue_id.to_string();
        async move { this.fetch(clue_id).await }.boxed()
    }
}
