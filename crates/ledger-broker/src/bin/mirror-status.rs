//! Look up one transaction on the mirror node using the `LEDGER_*`
//! environment settings, e.g. `mirror-status 0.0.1234@1700000000.000000001`.

use anyhow::{bail, Context};
use ledger_broker::telemetry::init_tracing;
use ledger_broker::{resolve_settings, BrokerSettings, MirrorNodeClient, MirrorReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,ledger_broker=debug");

    let Some(transaction_id) = std::env::args().nth(1) else {
        bail!("usage: mirror-status <transaction-id> [settings.json]");
    };
    let base = match std::env::args().nth(2) {
        Some(path) => BrokerSettings::from_json_file(path)?,
        None => BrokerSettings::default(),
    };
    let settings = resolve_settings(&base);

    let client = MirrorNodeClient::builder()
        .network(settings.network)
        .base_url_opt(settings.mirror_base_url()?)
        .build()?;
    let state = client
        .retrieve_state(&transaction_id)
        .await
        .with_context(|| format!("failed to query {}", client.base_url()))?;

    match state {
        Some(state) => println!("{}", serde_json::to_string_pretty(&state)?),
        None => println!("{transaction_id} is not indexed yet"),
    }
    Ok(())
}
