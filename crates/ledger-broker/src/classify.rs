//! Maps strategy failures onto the coded error taxonomy. Pure, no state.

use crate::error::{CodedError, LedgerError};

/// Why a strategy attempt did not produce a result.
#[derive(Debug)]
pub enum StrategyFailure {
    /// The direct signer's own submission failed.
    DirectSigner(LedgerError),
    /// Building the unsigned bytes or handing them to the wallet failed.
    WalletHandoff(LedgerError),
    /// Autonomous submission with the operator credential failed.
    Operator(LedgerError),
    /// The read side reported the submitted transaction as failed.
    ConfirmedFailed {
        transaction_id: String,
        reason: String,
    },
    /// No strategy was able to sign.
    NoSigningPath(String),
}

impl StrategyFailure {
    pub fn no_signing_path(reason: impl Into<String>) -> Self {
        Self::NoSigningPath(reason.into())
    }
}

pub fn classify(failure: &StrategyFailure, prefer_wallet_only: bool) -> CodedError {
    match failure {
        StrategyFailure::DirectSigner(err) => {
            CodedError::operation_failed(format!("direct signer failed: {err}"))
        }
        StrategyFailure::WalletHandoff(err) if prefer_wallet_only => {
            CodedError::wallet_submit_failed(format!("wallet submission failed: {err}"))
        }
        StrategyFailure::WalletHandoff(err) => {
            CodedError::operation_failed(format!("wallet submission failed: {err}"))
        }
        StrategyFailure::Operator(err) => {
            CodedError::operation_failed(format!("operator submission failed: {err}"))
        }
        StrategyFailure::ConfirmedFailed {
            transaction_id,
            reason,
        } => CodedError::operation_failed(format!(
            "transaction {transaction_id} reported failed: {reason}"
        )),
        StrategyFailure::NoSigningPath(reason) => CodedError::wallet_unavailable(reason.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn wallet_handoff_depends_on_policy() {
        let failure = StrategyFailure::WalletHandoff(LedgerError::Wallet("user rejected".into()));
        let strict = classify(&failure, true);
        assert_eq!(strict.kind, ErrorKind::WalletSubmitFailed);
        assert!(strict.message.contains("user rejected"));
        assert_eq!(classify(&failure, false).kind, ErrorKind::OperationFailed);
    }

    #[test]
    fn submissions_are_operation_failures_under_any_policy() {
        for prefer in [true, false] {
            let direct = StrategyFailure::DirectSigner(LedgerError::Rejected("INVALID_TOPIC_ID".into()));
            let operator = StrategyFailure::Operator(LedgerError::Network("reset".into()));
            assert_eq!(classify(&direct, prefer).kind, ErrorKind::OperationFailed);
            assert_eq!(classify(&operator, prefer).kind, ErrorKind::OperationFailed);
        }
    }

    #[test]
    fn missing_path_is_wallet_unavailable() {
        let coded = classify(&StrategyFailure::no_signing_path("no wallet connected"), false);
        assert_eq!(coded.kind, ErrorKind::WalletUnavailable);
        assert_eq!(coded.message, "no wallet connected");
    }
}
