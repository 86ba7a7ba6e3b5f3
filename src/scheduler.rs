// src/scheduler.rs
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::engine;
use crate::notify::Notifier;
use crate::sources::Source;
use crate::store::SeenStore;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval: Duration,
}

/// Run one pass: every source gets its cycle, strictly in order. A
/// failing cycle is logged and never stops the rest of the pass.
/// Returns the number of sources whose cycle errored.
pub async fn run_pass(
    sources: &[Box<dyn Source>],
    store: &dyn SeenStore,
    notifier: &dyn Notifier,
) -> usize {
    let mut failed = 0usize;
    for source in sources {
        tracing::info!(source = source.name(), "checking");
        match engine::run_cycle(source.as_ref(), store, notifier).await {
            Ok(report) => {
                tracing::info!(
                    target: "monitor",
                    source = source.name(),
                    listed = report.listed,
                    matched = report.matched,
                    notified = report.notified,
                    body_errors = report.body_errors,
                    notify_errors = report.notify_errors,
                    "cycle done"
                );
            }
            Err(e) => {
                failed += 1;
                counter!("monitor_cycle_errors_total").increment(1);
                tracing::error!(error = ?e, source = source.name(), "cycle failed");
            }
        }
    }
    gauge!("monitor_last_pass_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    failed
}

/// Spawn the polling loop: one pass immediately, then one every
/// `cfg.interval`, until the handle is aborted or the process exits.
pub fn spawn(
    sources: Vec<Box<dyn Source>>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
    cfg: SchedulerCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        loop {
            // First tick fires immediately.
            ticker.tick().await;
            let failed = run_pass(&sources, store.as_ref(), notifier.as_ref()).await;
            tracing::info!(target: "monitor", sources = sources.len(), failed, "pass done");
        }
    })
}
