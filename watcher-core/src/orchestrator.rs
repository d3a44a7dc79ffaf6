// Concurrent polling loop: one task per wallet per cycle, joined before the pause.

use crate::classifier::{classify, Direction};
use crate::config::WatcherConfig;
use crate::error::GatewayError;
use crate::gateway::LedgerGateway;
use crate::models::{QuoteAsset, Signature};
use crate::watch::{WalletPhase, WalletWatch};
use chrono::{DateTime, Local, TimeZone};
use futures::future::join_all;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub signature_limit: usize,
    /// Deadline applied to every gateway call.
    pub call_timeout: Duration,
    pub interval: Duration,
    pub quote: QuoteAsset,
    pub report_unknown: bool,
}

impl From<&WatcherConfig> for PollSettings {
    fn from(cfg: &WatcherConfig) -> Self {
        Self {
            signature_limit: cfg.rpc.signature_limit,
            call_timeout: cfg.rpc.request_timeout(),
            interval: cfg.poll_interval(),
            quote: cfg.quote.clone(),
            report_unknown: cfg.poll.report_unknown,
        }
    }
}

/// One classified transaction, emitted at most once per signature.
#[derive(Debug, Clone)]
pub struct Report {
    pub signature: Signature,
    pub wallet_name: String,
    pub address: String,
    pub timestamp: Option<DateTime<Local>>,
    pub direction: Direction,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.timestamp {
            Some(ts) => write!(f, "{} {}", ts.format(TIMESTAMP_FORMAT), self.wallet_name)?,
            None => write!(f, "- {}", self.wallet_name)?,
        }
        if let Some(label) = self.direction.label() {
            write!(f, " {label}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Reported(Report),
    /// New signature with an undetermined direction while unknowns are not reported.
    Suppressed(Signature),
    AlreadyReported(Signature),
    /// The report sink is gone; the cursor was not advanced.
    SinkClosed(Signature),
    NoSignatures,
    NotFound(Signature),
    TransactionFailed(Signature),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub reported: usize,
    pub skipped: usize,
    pub errored: usize,
}

pub fn local_time(block_time: Option<i64>) -> Option<DateTime<Local>> {
    block_time.and_then(|t| Local.timestamp_opt(t, 0).single())
}

async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| GatewayError::Timeout(deadline))?
}

/// A single cycle for one wallet. Emits through `reports` before committing the cursor.
pub async fn poll_wallet(
    gateway: &dyn LedgerGateway,
    watch: &mut WalletWatch,
    settings: &PollSettings,
    reports: &mpsc::Sender<Report>,
) -> Result<CycleOutcome, GatewayError> {
    watch.set_phase(WalletPhase::Fetching);

    let signatures = with_deadline(
        settings.call_timeout,
        gateway.list_signatures(&watch.address, settings.signature_limit),
    )
    .await?;

    let Some(latest) = signatures.into_iter().next() else {
        info!(wallet = %watch.name, "no valid transaction");
        return Ok(CycleOutcome::NoSignatures);
    };

    let record = with_deadline(settings.call_timeout, gateway.get_transaction(&latest)).await?;
    let Some(record) = record else {
        info!(wallet = %watch.name, signature = %latest, "transaction not available yet");
        return Ok(CycleOutcome::NotFound(latest));
    };
    if record.is_failed() {
        debug!(wallet = %watch.name, signature = %latest, "latest transaction failed");
        return Ok(CycleOutcome::TransactionFailed(latest));
    }

    watch.set_phase(WalletPhase::Classifying);
    if !watch.should_report(&latest) {
        return Ok(CycleOutcome::AlreadyReported(latest));
    }

    let direction = classify(&watch.address, &record, &settings.quote);
    if !direction.is_known() && !settings.report_unknown {
        watch.commit(latest.clone());
        return Ok(CycleOutcome::Suppressed(latest));
    }

    let report = Report {
        signature: latest.clone(),
        wallet_name: watch.name.clone(),
        address: watch.address.clone(),
        timestamp: local_time(record.block_time),
        direction,
    };
    if reports.send(report.clone()).await.is_err() {
        warn!(wallet = %watch.name, "report sink closed; cursor left unchanged");
        return Ok(CycleOutcome::SinkClosed(latest));
    }
    info!(
        wallet = %report.wallet_name,
        address = %report.address,
        signature = %report.signature,
        "transaction reported"
    );
    watch.commit(latest);
    Ok(CycleOutcome::Reported(report))
}

async fn run_wallet(
    gateway: &dyn LedgerGateway,
    watch: &mut WalletWatch,
    settings: &PollSettings,
    reports: &mpsc::Sender<Report>,
) -> Result<CycleOutcome, GatewayError> {
    watch.set_phase(WalletPhase::Idle);
    let result = poll_wallet(gateway, watch, settings, reports).await;
    let phase = match &result {
        Ok(CycleOutcome::Reported(_)) => WalletPhase::Reported,
        Ok(CycleOutcome::SinkClosed(_)) => WalletPhase::Errored,
        Ok(_) => WalletPhase::Skipped,
        Err(err) => {
            warn!(wallet = %watch.name, error = %err, "poll cycle failed");
            WalletPhase::Errored
        }
    };
    watch.set_phase(phase);
    result
}

pub struct PollOrchestrator {
    gateway: Arc<dyn LedgerGateway>,
    watches: Vec<WalletWatch>,
    settings: Arc<PollSettings>,
    reports: mpsc::Sender<Report>,
}

impl PollOrchestrator {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        watches: Vec<WalletWatch>,
        settings: PollSettings,
        reports: mpsc::Sender<Report>,
    ) -> Self {
        Self {
            gateway,
            watches,
            settings: Arc::new(settings),
            reports,
        }
    }

    pub fn watches(&self) -> &[WalletWatch] {
        &self.watches
    }

    /// Polls every wallet concurrently and waits for all of them.
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let mut pending = Vec::with_capacity(self.watches.len());
        for mut watch in std::mem::take(&mut self.watches) {
            let snapshot = watch.clone();
            let gateway = Arc::clone(&self.gateway);
            let settings = Arc::clone(&self.settings);
            let reports = self.reports.clone();
            let handle = tokio::spawn(async move {
                let outcome = run_wallet(gateway.as_ref(), &mut watch, &settings, &reports).await;
                (watch, outcome)
            });
            pending.push((snapshot, handle));
        }

        let (snapshots, handles): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        let joined = join_all(handles).await;

        let mut summary = CycleSummary::default();
        for (snapshot, result) in snapshots.into_iter().zip(joined) {
            match result {
                Ok((watch, outcome)) => {
                    match outcome {
                        Ok(CycleOutcome::Reported(_)) => summary.reported += 1,
                        Ok(CycleOutcome::SinkClosed(_)) => summary.errored += 1,
                        Ok(_) => summary.skipped += 1,
                        Err(_) => summary.errored += 1,
                    }
                    self.watches.push(watch);
                }
                Err(join_err) => {
                    error!(wallet = %snapshot.name, error = %join_err, "wallet task aborted");
                    let mut restored = snapshot;
                    restored.set_phase(WalletPhase::Errored);
                    summary.errored += 1;
                    self.watches.push(restored);
                }
            }
        }
        summary
    }

    /// Runs cycles separated by the configured pause until `shutdown` fires or `max_cycles`
    /// cycles have completed. Returns the number of completed cycles.
    pub async fn run(&mut self, shutdown: CancellationToken, max_cycles: Option<u64>) -> u64 {
        info!(
            wallets = self.watches.len(),
            interval_ms = self.settings.interval.as_millis() as u64,
            "starting wallet watcher"
        );

        let mut cycles = 0u64;
        while !shutdown.is_cancelled() && max_cycles.map_or(true, |max| cycles < max) {
            let summary = self.run_cycle().await;
            cycles += 1;
            debug!(
                cycle = cycles,
                reported = summary.reported,
                skipped = summary.skipped,
                errored = summary.errored,
                "cycle complete"
            );

            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        info!(cycles, "wallet watcher stopped");
        cycles
    }
}
