#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ledger_broker::{
    DirectSigner, LedgerError, LedgerReceipt, LedgerWriteClient, MirrorReader, Network,
    OperatorCredential, OperationRequest, RetrievedState, Sleeper, TransactionDelegate,
    UnsignedTransaction, WalletExecutor, WalletInfo, WalletSubmission,
};

pub const OPERATOR_KEY_HEX: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

pub fn operator() -> OperatorCredential {
    OperatorCredential::from_hex("0.0.1001", OPERATOR_KEY_HEX).expect("test operator key")
}

/// Direct signer that submits by itself and counts calls.
pub struct CountingSigner {
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl CountingSigner {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: None,
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(reason.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectSigner for CountingSigner {
    fn account_id(&self) -> &str {
        "0.0.7007"
    }

    async fn execute(&self, request: &OperationRequest) -> Result<LedgerReceipt, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(reason) => Err(LedgerError::Rejected(reason.clone())),
            None => {
                let mut receipt = LedgerReceipt::with_transaction_id("0.0.7007-1-1");
                receipt.status = Some("SUCCESS".into());
                receipt
                    .details
                    .insert("operation".into(), request.operation_name().into());
                Ok(receipt)
            }
        }
    }
}

/// Ledger write client used by the operator path.
pub struct CountingLedger {
    calls: AtomicUsize,
    fail_with: Option<String>,
    accounts: Mutex<Vec<String>>,
}

impl CountingLedger {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: None,
            accounts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(reason.to_string()),
            accounts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn accounts(&self) -> Vec<String> {
        self.accounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerWriteClient for CountingLedger {
    async fn submit(
        &self,
        _request: &OperationRequest,
        credential: &OperatorCredential,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .unwrap()
            .push(credential.account_id().to_string());
        match &self.fail_with {
            Some(reason) => Err(LedgerError::Network(reason.clone())),
            None => {
                let mut receipt = LedgerReceipt::with_transaction_id("0.0.1001-5-5");
                receipt.status = Some("SUCCESS".into());
                receipt.topic_id = Some("0.0.4242".into());
                Ok(receipt)
            }
        }
    }
}

/// Delegate that returns fixed unsigned bytes.
pub struct FixedDelegate {
    calls: AtomicUsize,
    bytes: Option<Vec<u8>>,
    payers: Mutex<Vec<WalletInfo>>,
}

impl FixedDelegate {
    pub fn returning(bytes: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            bytes: Some(bytes.to_vec()),
            payers: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            bytes: None,
            payers: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payers(&self) -> Vec<WalletInfo> {
        self.payers.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionDelegate for FixedDelegate {
    async fn build(
        &self,
        _request: &OperationRequest,
        wallet: &WalletInfo,
    ) -> Result<UnsignedTransaction, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payers.lock().unwrap().push(wallet.clone());
        match &self.bytes {
            Some(bytes) => Ok(UnsignedTransaction::new(bytes.clone())),
            None => Err(LedgerError::Build("missing registry memo".into())),
        }
    }
}

/// Wallet executor that records the bytes it was handed.
pub struct RecordingExecutor {
    calls: AtomicUsize,
    transaction_id: Option<String>,
    received: Mutex<Vec<(Vec<u8>, Network)>>,
}

impl RecordingExecutor {
    pub fn returning(transaction_id: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            transaction_id: Some(transaction_id.to_string()),
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            transaction_id: None,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<(Vec<u8>, Network)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletExecutor for RecordingExecutor {
    async fn execute(
        &self,
        unsigned: &[u8],
        network: Network,
    ) -> Result<WalletSubmission, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .unwrap()
            .push((unsigned.to_vec(), network));
        match &self.transaction_id {
            Some(transaction_id) => Ok(WalletSubmission {
                transaction_id: transaction_id.clone(),
            }),
            None => Err(LedgerError::Wallet("user rejected the request".into())),
        }
    }
}

/// Read side that replays scripted responses, then repeats the fallback.
pub struct ScriptedMirror {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<Option<RetrievedState>, LedgerError>>>,
    fallback: Option<RetrievedState>,
}

impl ScriptedMirror {
    pub fn never_found() -> Arc<Self> {
        Self::scripted(Vec::new(), None)
    }

    pub fn scripted(
        script: Vec<Result<Option<RetrievedState>, LedgerError>>,
        fallback: Option<RetrievedState>,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            fallback,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MirrorReader for ScriptedMirror {
    async fn retrieve_state(
        &self,
        _transaction_id: &str,
    ) -> Result<Option<RetrievedState>, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(step) => step,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
