use std::env;
use std::path::Path;

use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::credential::OperatorCredential;
use crate::error::SettingsError;
use crate::poller::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use crate::request::Network;
use crate::strategy::ExecutionStrategyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfirmationSettings {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

/// Operator account used for autonomous signing. The key is a hex encoded
/// ed25519 seed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSettings {
    pub account_id: String,
    pub private_key: String,
}

impl std::fmt::Debug for OperatorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorSettings")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerSettings {
    pub network: Network,
    /// Overrides the public mirror node for `network`.
    pub mirror_url: Option<String>,
    pub prefer_wallet_only: bool,
    pub confirmation: ConfirmationSettings,
    pub operator: Option<OperatorSettings>,
}

impl BrokerSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read broker settings from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse broker settings in {}", path.display()))
    }

    pub fn operator_credential(&self) -> Result<Option<OperatorCredential>, SettingsError> {
        match &self.operator {
            Some(operator) => Ok(Some(OperatorCredential::from_hex(
                operator.account_id.clone(),
                &operator.private_key,
            )?)),
            None => Ok(None),
        }
    }

    pub fn mirror_base_url(&self) -> Result<Option<Url>, SettingsError> {
        match self.mirror_url.as_deref() {
            Some(url) => Ok(Some(Url::parse(url)?)),
            None => Ok(None),
        }
    }

    /// Strategy registry seeded with the configured policy and no hooks.
    pub fn strategy_config(&self) -> ExecutionStrategyConfig {
        ExecutionStrategyConfig::new().with_prefer_wallet_only(self.prefer_wallet_only)
    }
}

/// Apply `LEDGER_*` environment overrides on top of `base`.
pub fn resolve_settings(base: &BrokerSettings) -> BrokerSettings {
    resolve_settings_with(base, |key| env::var(key).ok())
}

/// Same as [`resolve_settings`] with an explicit variable lookup.
pub fn resolve_settings_with<F>(base: &BrokerSettings, lookup: F) -> BrokerSettings
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = base.clone();
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(raw) = var("LEDGER_NETWORK") {
        match Network::parse(&raw) {
            Some(network) => cfg.network = network,
            None => warn!(value = %raw, "ignoring unknown LEDGER_NETWORK"),
        }
    }

    if let Some(url) = var("LEDGER_MIRROR_URL") {
        cfg.mirror_url = Some(url);
    }

    if let Some(raw) = var("LEDGER_PREFER_WALLET_ONLY") {
        match parse_bool(&raw) {
            Some(flag) => cfg.prefer_wallet_only = flag,
            None => warn!(value = %raw, "ignoring unparseable LEDGER_PREFER_WALLET_ONLY"),
        }
    }

    if let Some(raw) = var("LEDGER_CONFIRM_MAX_ATTEMPTS") {
        match raw.trim().parse() {
            Ok(attempts) => cfg.confirmation.max_attempts = attempts,
            Err(_) => warn!(value = %raw, "ignoring unparseable LEDGER_CONFIRM_MAX_ATTEMPTS"),
        }
    }

    if let Some(raw) = var("LEDGER_CONFIRM_INTERVAL_MS") {
        match raw.trim().parse() {
            Ok(interval) => cfg.confirmation.interval_ms = interval,
            Err(_) => warn!(value = %raw, "ignoring unparseable LEDGER_CONFIRM_INTERVAL_MS"),
        }
    }

    match (var("LEDGER_OPERATOR_ID"), var("LEDGER_OPERATOR_KEY")) {
        (Some(account_id), Some(private_key)) => {
            cfg.operator = Some(OperatorSettings {
                account_id,
                private_key,
            });
        }
        (Some(_), None) => warn!("ignoring LEDGER_OPERATOR_ID without LEDGER_OPERATOR_KEY"),
        (None, Some(_)) => warn!("ignoring LEDGER_OPERATOR_KEY without LEDGER_OPERATOR_ID"),
        (None, None) => {}
    }

    cfg
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
