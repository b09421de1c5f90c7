use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{LedgerError, SettingsError};
use crate::ledger::{MirrorReader, RetrievedState, StateStatus};
use crate::request::Network;

pub const MAINNET_MIRROR_URL: &str = "https://mainnet-public.mirrornode.hedera.com/";
pub const TESTNET_MIRROR_URL: &str = "https://testnet.mirrornode.hedera.com/";

/// Upper bound on one mirror request, so a stalled read counts as one failed
/// poll attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default public mirror node for `network`.
pub fn default_mirror_url(network: Network) -> &'static str {
    match network {
        Network::Mainnet => MAINNET_MIRROR_URL,
        Network::Testnet => TESTNET_MIRROR_URL,
    }
}

/// Rewrite `0.0.X@S.N` into the `0.0.X-S-N` form the mirror REST API
/// expects. Ids already in that form pass through unchanged.
pub fn normalize_transaction_id(transaction_id: &str) -> String {
    let trimmed = transaction_id.trim();
    match trimmed.split_once('@') {
        Some((account, valid_start)) => {
            format!("{account}-{}", valid_start.replacen('.', "-", 1))
        }
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<MirrorTransaction>,
}

#[derive(Debug, Deserialize)]
struct MirrorTransaction {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    entity_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    consensus_timestamp: Option<String>,
}

/// Decode a `/api/v1/transactions/{id}` body into the broker's view of the
/// transaction. An empty list means the record has not propagated yet.
pub fn parse_transaction_state(body: &str) -> Result<Option<RetrievedState>, LedgerError> {
    let response: TransactionsResponse = serde_json::from_str(body)?;
    // Duplicate submissions are listed alongside the accepted record.
    let mut records = response.transactions;
    if records.is_empty() {
        return Ok(None);
    }
    let preferred = records
        .iter()
        .position(|record| record.result.as_deref() == Some("SUCCESS"))
        .unwrap_or(0);
    let record = records.swap_remove(preferred);

    let result = record.result.unwrap_or_default();
    let status = match result.as_str() {
        "SUCCESS" => StateStatus::Completed,
        "" => StateStatus::Pending,
        other => StateStatus::Failed(other.to_string()),
    };

    let mut details = Map::new();
    if let Some(name) = record.name {
        details.insert("name".into(), Value::String(name));
    }
    if let Some(timestamp) = record.consensus_timestamp {
        details.insert("consensusTimestamp".into(), Value::String(timestamp));
    }
    if !result.is_empty() {
        details.insert("result".into(), Value::String(result));
    }

    let topic_id = match status {
        StateStatus::Completed => record.entity_id,
        _ => None,
    };

    Ok(Some(RetrievedState {
        status,
        topic_id,
        details,
    }))
}

/// Builder for [`MirrorNodeClient`].
#[derive(Default)]
pub struct MirrorNodeClientBuilder {
    network: Network,
    base: Option<Url>,
    client: Option<Client>,
    timeout: Option<Duration>,
}

impl MirrorNodeClientBuilder {
    /// Network whose public mirror is used when no base URL is set.
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn base_url(mut self, url: Url) -> Self {
        self.base = Some(url);
        self
    }

    pub fn base_url_opt(mut self, url: Option<Url>) -> Self {
        self.base = url;
        self
    }

    /// Provide a custom reqwest client instance. Its own timeout applies.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Per-request timeout for the built-in client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<MirrorNodeClient, SettingsError> {
        let base = match self.base {
            Some(base) => base,
            None => Url::parse(default_mirror_url(self.network))?,
        };
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
                .build()?,
        };
        Ok(MirrorNodeClient { base, client })
    }
}

/// Mirror node REST client used as the confirmation read side.
#[derive(Clone)]
pub struct MirrorNodeClient {
    base: Url,
    client: Client,
}

impl MirrorNodeClient {
    pub fn builder() -> MirrorNodeClientBuilder {
        MirrorNodeClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn transaction_url(&self, transaction_id: &str) -> Result<Url, LedgerError> {
        let slug = format!("api/v1/transactions/{}", normalize_transaction_id(transaction_id));
        self.base
            .join(&slug)
            .map_err(|err| LedgerError::Network(format!("invalid mirror URL: {err}")))
    }
}

#[async_trait]
impl MirrorReader for MirrorNodeClient {
    async fn retrieve_state(
        &self,
        transaction_id: &str,
    ) -> Result<Option<RetrievedState>, LedgerError> {
        let url = self.transaction_url(transaction_id)?;
        debug!(%url, "querying mirror node");
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.error_for_status()?.text().await?;
        parse_transaction_state(&body)
    }
}
