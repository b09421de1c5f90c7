mod support;

use std::time::Duration;

use ledger_broker::{ConfirmationPoller, MirrorNodeClient, PollOutcome};
use reqwest::Url;
use support::RecordingSleeper;
use tokio::net::TcpListener;

/// Accepts connections and keeps them open without ever answering.
async fn silent_listener() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[tokio::test]
async fn stalled_mirror_still_exhausts_the_budget() {
    let client = MirrorNodeClient::builder()
        .base_url(silent_listener().await)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let sleeper = RecordingSleeper::new();
    let poller = ConfirmationPoller::new(std::sync::Arc::new(client)).with_sleeper(sleeper.clone());

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        poller.await_confirmation("0.0.1-1-1", 2, Duration::from_millis(1)),
    )
    .await
    .expect("polling should end once each read times out");

    match outcome {
        PollOutcome::Pending {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 2);
            assert!(last_error.is_some());
        }
        other => panic!("expected pending outcome, got {other:?}"),
    }
    assert_eq!(sleeper.delays().len(), 1);
}
