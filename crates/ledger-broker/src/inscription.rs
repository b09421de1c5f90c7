//! Request builder for content inscriptions. An inscription's completion is
//! only observable by querying the read side after submission, so requests
//! built here are subject to confirmation polling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;
use crate::request::{Network, OperationKind, OperationRequest};

/// Where the inscribed content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InscriptionSource {
    Url {
        url: String,
    },
    /// Inline content, base64 encoded.
    Buffer {
        #[serde(rename = "base64", alias = "data")]
        data: String,
        #[serde(rename = "fileName", alias = "file_name")]
        file_name: String,
        #[serde(
            rename = "mimeType",
            alias = "mime_type",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        mime_type: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InscriptionMode {
    File,
    Hashinal,
}

impl Default for InscriptionMode {
    fn default() -> Self {
        Self::File
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionParams {
    pub source: InscriptionSource,
    #[serde(default)]
    pub mode: InscriptionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, alias = "chunk_size", skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
}

impl InscriptionParams {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: InscriptionSource::Url { url: url.into() },
            mode: InscriptionMode::File,
            metadata: None,
            tags: Vec::new(),
            chunk_size: None,
        }
    }

    pub fn hashinal(mut self, metadata: Map<String, Value>) -> Self {
        self.mode = InscriptionMode::Hashinal;
        self.metadata = Some(metadata);
        self
    }

    fn validate(&self) -> Result<(), RequestError> {
        match &self.source {
            InscriptionSource::Url { url } if url.trim().is_empty() => {
                return Err(RequestError::InvalidPayload("source url is empty".into()));
            }
            InscriptionSource::Buffer { data, .. } if data.is_empty() => {
                return Err(RequestError::InvalidPayload("source buffer is empty".into()));
            }
            _ => {}
        }

        if self.mode == InscriptionMode::Hashinal {
            let has_name = self
                .metadata
                .as_ref()
                .and_then(|meta| meta.get("name"))
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty());
            if !has_name {
                return Err(RequestError::InvalidPayload(
                    "hashinal inscriptions require metadata with a name".into(),
                ));
            }
        }

        if self.chunk_size == Some(0) {
            return Err(RequestError::InvalidPayload(
                "chunk size must be positive".into(),
            ));
        }

        Ok(())
    }
}

pub fn inscribe(
    network: Network,
    params: &InscriptionParams,
) -> Result<OperationRequest, RequestError> {
    params.validate()?;
    OperationRequest::from_payload(OperationKind::Inscribe, network, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_inscription_builds_polled_request() {
        let request = inscribe(
            Network::Testnet,
            &InscriptionParams::from_url("https://example.com/a.png"),
        )
        .unwrap();
        assert_eq!(request.operation(), OperationKind::Inscribe);
        assert!(request.requires_confirmation());
        assert_eq!(
            request.payload()["source"],
            json!({ "type": "url", "url": "https://example.com/a.png" })
        );
        assert_eq!(request.payload()["mode"], json!("file"));
    }

    #[test]
    fn buffer_source_parses_from_agent_json() {
        let params: InscriptionParams = serde_json::from_value(json!({
            "source": {
                "type": "buffer",
                "base64": "aGVsbG8=",
                "file_name": "hello.txt",
                "mimeType": "text/plain"
            },
            "tags": ["greeting"]
        }))
        .unwrap();
        let request = inscribe(Network::Mainnet, &params).unwrap();
        assert_eq!(request.payload()["source"]["fileName"], json!("hello.txt"));
        assert_eq!(request.payload()["tags"], json!(["greeting"]));
    }

    #[test]
    fn hashinal_without_name_is_rejected() {
        let mut metadata = Map::new();
        metadata.insert("creator".into(), json!("agent"));
        let params = InscriptionParams::from_url("https://example.com/a.png").hashinal(metadata);
        let err = inscribe(Network::Testnet, &params).unwrap_err();
        assert!(matches!(err, RequestError::InvalidPayload(_)));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = inscribe(Network::Testnet, &InscriptionParams::from_url("  ")).unwrap_err();
        assert!(err.to_string().contains("url"));
    }
}
