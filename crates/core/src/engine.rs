//! The polling loop: scan, strategize, execute, repeat.
//!
//! Single-threaded by design: candidates are processed strictly
//! sequentially, one submission in flight at a time, so the liquidator
//! identity never races itself on nonce ordering or a shared collateral
//! pool. Nothing is cached across cycles; every cycle re-derives candidates
//! from scratch.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::executor::{ExecutionOutcome, Executor};
use crate::scanner::{ScanError, Scanner};
use crate::strategist::Strategist;
use sentinel_ledger::{LedgerReader, LedgerSubmitter};

pub struct Engine<L: ?Sized> {
    scanner: Scanner<L>,
    strategist: Strategist,
    executor: Executor<L>,
    config: Arc<ResolvedConfig>,
}

impl<L> Engine<L>
where
    L: LedgerReader + LedgerSubmitter + ?Sized,
{
    pub fn new(ledger: Arc<L>, config: Arc<ResolvedConfig>) -> Self {
        Self {
            scanner: Scanner::new(ledger.clone(), config.clone()),
            strategist: Strategist::new(config.min_profit_pct),
            executor: Executor::new(ledger, config.clone()),
            config,
        }
    }

    /// Run until the shutdown signal flips.
    ///
    /// The signal is honored between cycles and between candidates; an
    /// in-flight ledger call finishes (or times out) on its own rather than
    /// being aborted, so a submission is never left in an unknown state.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            threshold = %self.config.health_factor_threshold,
            min_profit_pct = self.strategist.min_profit_pct(),
            liquidator = %self.config.liquidator,
            "Engine started"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                info!("Shutdown signal received, stopping");
                return Ok(());
            }

            match self.run_cycle(&shutdown).await {
                Ok(()) => {}
                Err(ScanError::Ledger(e)) => {
                    warn!(error = %e, "Scan cycle failed, retrying on the next interval");
                }
                // Arithmetic failures are correctness bugs, not transients.
                Err(e @ ScanError::Math(_)) => return Err(e.into()),
            }
        }
    }

    /// One cycle: scan, then a strictly sequential liquidation pass.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> Result<(), ScanError> {
        let now = unix_now();
        let candidates = self.scanner.scan_cycle(now).await?;
        info!(candidates = candidates.len(), "Scan cycle complete");

        let mut confirmed = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;

        for candidate in &candidates {
            if *shutdown.borrow() {
                info!("Shutdown requested, abandoning remaining candidates");
                break;
            }

            let outcome = match self.strategist.select_pair(candidate) {
                Some(pair) => self.executor.execute(candidate, &pair).await,
                None => {
                    debug!(user = %candidate.user, "No viable collateral/debt pair, skipping");
                    ExecutionOutcome::Skipped
                }
            };

            match outcome {
                ExecutionOutcome::Confirmed(_) => confirmed += 1,
                ExecutionOutcome::Failed { .. } => failed += 1,
                ExecutionOutcome::Skipped => skipped += 1,
            }
        }

        if confirmed + failed + skipped > 0 {
            info!(confirmed, failed, skipped, "Liquidation pass finished");
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
