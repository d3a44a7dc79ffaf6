mod args;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use watcher_core::{
    config::WatcherConfig,
    orchestrator::{PollOrchestrator, PollSettings, Report},
    rpc::RpcGateway,
    watch::WalletWatch,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = args::load_args();
    let mut config = WatcherConfig::from_path(&args.config)?;
    if let Some(url) = args.rpc_url {
        config.rpc.endpoint = url;
        config.validate()?;
    }

    tracing::info!(
        "Starting wallet watcher against {} for {} wallets",
        config.rpc.endpoint,
        config.wallets.len()
    );

    let gateway = RpcGateway::new(
        &config.rpc.endpoint,
        config.rpc.request_timeout(),
        config.rpc.commitment()?,
    );
    match gateway.health_check().await {
        Ok(height) => tracing::info!("RPC connected, block height {height}"),
        Err(err) => tracing::warn!("RPC health check failed: {err}"),
    }

    let watches: Vec<WalletWatch> = config.wallets.iter().map(WalletWatch::from).collect();
    let (report_tx, mut report_rx) = mpsc::channel::<Report>(256);

    // Output sink: one line per reported transaction.
    let printer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            println!("{report}");
        }
    });

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        ctrl_c.cancel();
    });

    let mut orchestrator = PollOrchestrator::new(
        Arc::new(gateway),
        watches,
        PollSettings::from(&config),
        report_tx,
    );
    orchestrator.run(shutdown, args.max_cycles).await;

    // Dropping the orchestrator closes the channel and lets the printer drain.
    drop(orchestrator);
    if let Err(err) = printer.await {
        tracing::error!("Report printer ended: {err:?}");
    }

    Ok(())
}
