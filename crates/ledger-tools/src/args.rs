//! Argument handling shared by every tool: the common `network` and `mode`
//! keys plus the confirmation knobs, split off from the operation params.

use std::time::Duration;

use ledger_broker::{ExecuteOptions, Network};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::tool::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// Run the request through the broker's strategy chain.
    Execute,
    /// Return unsigned bytes for the user's wallet.
    Prepare,
}

impl ToolMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "execute" | "" => Some(Self::Execute),
            "prepare" | "return_bytes" => Some(Self::Prepare),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolArgs {
    pub network: Network,
    pub mode: ToolMode,
    pub options: ExecuteOptions,
    pub params: Map<String, Value>,
}

impl ToolArgs {
    /// Split `args` into common keys and operation params. `null` is treated
    /// as an empty object.
    pub fn parse(
        args: Value,
        default_network: Network,
        default_options: ExecuteOptions,
    ) -> Result<Self, ToolError> {
        let mut params = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::InvalidInput(format!(
                    "arguments must be a JSON object, got {other}"
                )))
            }
        };

        let network = match take_str(&mut params, "network")? {
            Some(raw) => Network::parse(&raw)
                .ok_or_else(|| ToolError::InvalidInput(format!("unknown network: {raw}")))?,
            None => default_network,
        };

        let mode = match take_str(&mut params, "mode")? {
            Some(raw) => ToolMode::parse(&raw)
                .ok_or_else(|| ToolError::InvalidInput(format!("unknown mode: {raw}")))?,
            None => ToolMode::Execute,
        };

        let mut options = default_options;
        if let Some(wait) = params.remove("wait_for_confirmation") {
            let wait = wait.as_bool().ok_or_else(|| {
                ToolError::InvalidInput("wait_for_confirmation must be a boolean".into())
            })?;
            options = options.wait_for_confirmation(wait);
        }
        if let Some(attempts) = take_u64(&mut params, "max_attempts")? {
            let attempts = u32::try_from(attempts)
                .map_err(|_| ToolError::InvalidInput("max_attempts is too large".into()))?;
            options = options.max_attempts(attempts);
        }
        if let Some(interval) = take_u64(&mut params, "interval_ms")? {
            options = options.interval(Duration::from_millis(interval));
        }

        Ok(Self {
            network,
            mode,
            options,
            params,
        })
    }

    /// Deserialize the remaining keys into an operation's param struct.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|err| ToolError::InvalidInput(err.to_string()))
    }
}

fn take_str(params: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ToolError::InvalidInput(format!("{key} must be a string"))),
    }
}

fn take_u64(params: &mut Map<String, Value>, key: &str) -> Result<Option<u64>, ToolError> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidInput(format!("{key} must be a non-negative integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn common_keys_are_split_from_params() {
        let args = ToolArgs::parse(
            json!({
                "network": "mainnet",
                "mode": "prepare",
                "max_attempts": 3,
                "interval_ms": 10,
                "wait_for_confirmation": false,
                "topicId": "0.0.7",
            }),
            Network::Testnet,
            ExecuteOptions::default(),
        )
        .unwrap();

        assert_eq!(args.network, Network::Mainnet);
        assert_eq!(args.mode, ToolMode::Prepare);
        assert_eq!(args.options.max_attempts, 3);
        assert_eq!(args.options.interval, Duration::from_millis(10));
        assert!(!args.options.wait_for_confirmation);
        assert_eq!(args.params.len(), 1);
        assert_eq!(args.params["topicId"], "0.0.7");
    }

    #[test]
    fn defaults_apply_when_keys_are_absent() {
        let args = ToolArgs::parse(Value::Null, Network::Testnet, ExecuteOptions::default()).unwrap();
        assert_eq!(args.network, Network::Testnet);
        assert_eq!(args.mode, ToolMode::Execute);
        assert_eq!(args.options, ExecuteOptions::default());
    }

    #[test]
    fn bad_values_are_rejected() {
        for bad in [
            json!("nope"),
            json!({ "network": "devnet" }),
            json!({ "mode": "sign" }),
            json!({ "max_attempts": -1 }),
            json!({ "wait_for_confirmation": "yes" }),
        ] {
            let err = ToolArgs::parse(bad, Network::Testnet, ExecuteOptions::default()).unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput(_)));
        }
    }
}
