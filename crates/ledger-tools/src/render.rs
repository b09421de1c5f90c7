use ledger_broker::ExecutionResult;
use serde_json::{json, Map, Value};

use base64::{engine::general_purpose, Engine as _};

/// Render a broker result as the JSON observation handed back to the agent.
/// Coded failures are ordinary observations, not tool errors.
pub fn render_result(result: &ExecutionResult) -> Value {
    match result {
        ExecutionResult::Success { ledger_result } => {
            let mut rendered = match serde_json::to_value(ledger_result) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            if let Some(status) = rendered.remove("status") {
                rendered.insert("transaction_status".into(), status);
            }
            rendered.insert("status".into(), json!("success"));
            Value::Object(rendered)
        }
        ExecutionResult::PendingSignature {
            operation_name,
            unsigned_bytes,
            details,
        } => {
            let mut rendered = json!({
                "status": "pending_signature",
                "operation": operation_name,
                "transaction_bytes": general_purpose::STANDARD.encode(unsigned_bytes),
                "message": format!("{operation_name} is ready for wallet signature"),
            });
            if !details.is_empty() {
                rendered["details"] = Value::Object(details.clone());
            }
            rendered
        }
        ExecutionResult::Failure(error) => json!({
            "status": "failure",
            "kind": error.kind.as_str(),
            "message": error.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_broker::{CodedError, LedgerOutcome, LedgerReceipt, ExecutionPath};

    #[test]
    fn success_keeps_ledger_status_apart() {
        let mut receipt = LedgerReceipt::with_transaction_id("0.0.2-1-1");
        receipt.status = Some("SUCCESS".into());
        receipt.topic_id = Some("0.0.40".into());
        let rendered = render_result(&ExecutionResult::success(LedgerOutcome::from_receipt(
            ExecutionPath::Operator,
            receipt,
        )));
        assert_eq!(rendered["status"], "success");
        assert_eq!(rendered["transaction_status"], "SUCCESS");
        assert_eq!(rendered["transaction_id"], "0.0.2-1-1");
        assert_eq!(rendered["topic_id"], "0.0.40");
        assert_eq!(rendered["path"], "operator");
        assert_eq!(rendered["confirmation"]["state"], "not_required");
    }

    #[test]
    fn pending_signature_is_an_observation() {
        let rendered = render_result(&ExecutionResult::PendingSignature {
            operation_name: "hcs2.deleteEntry".into(),
            unsigned_bytes: b"AAA".to_vec(),
            details: Map::new(),
        });
        assert_eq!(rendered["status"], "pending_signature");
        assert_eq!(rendered["transaction_bytes"], "QUFB");
        assert_eq!(rendered["operation"], "hcs2.deleteEntry");
        assert!(rendered.get("details").is_none());
    }

    #[test]
    fn failure_exposes_kind() {
        let rendered = render_result(&ExecutionResult::failure(CodedError::wallet_submit_failed(
            "user rejected",
        )));
        assert_eq!(
            rendered,
            json!({ "status": "failure", "kind": "wallet_submit_failed", "message": "user rejected" })
        );
    }
}
