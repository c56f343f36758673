//! Periodic sync of every job that still needs it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use locsync_common::AppResult;
use locsync_db::repositories::JobRepository;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::dispatch::{DispatchError, SyncDispatcher};

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Jobs considered.
    pub total: usize,
    /// Jobs synced or queued.
    pub dispatched: usize,
    /// Jobs whose dispatch failed.
    pub failed: usize,
}

/// Drives [`SyncDispatcher::dispatch`] over all non-final jobs.
#[derive(Clone)]
pub struct SyncScheduler {
    job_repo: JobRepository,
    dispatcher: Arc<dyn SyncDispatcher>,
    concurrency: usize,
}

impl SyncScheduler {
    /// Create a scheduler running at most `concurrency` dispatches at once.
    #[must_use]
    pub fn new(
        job_repo: JobRepository,
        dispatcher: Arc<dyn SyncDispatcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            job_repo,
            dispatcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Dispatch every syncable job once.
    ///
    /// A failing job is logged and counted; it does not stop the others.
    pub async fn tick(&self) -> AppResult<TickReport> {
        let ids = self.job_repo.find_syncable_ids().await?;
        let mut report = TickReport {
            total: ids.len(),
            ..TickReport::default()
        };

        let results: Vec<(String, Result<(), DispatchError>)> = stream::iter(ids)
            .map(|id| {
                let dispatcher = self.dispatcher.clone();
                async move {
                    let result = dispatcher.dispatch(&id).await;
                    (id, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (job_id, result) in results {
            match result {
                Ok(()) => report.dispatched += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(job_id = %job_id, error = %e, "Failed to sync job");
                }
            }
        }

        Ok(report)
    }

    /// Tick every `period` until `shutdown` resolves.
    ///
    /// A tick in progress runs to completion before shutdown is observed.
    pub async fn run<F>(&self, period: Duration, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(period_secs = period.as_secs(), "Sync scheduler started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => match self.tick().await {
                    Ok(report) if report.failed > 0 => warn!(
                        total = report.total,
                        dispatched = report.dispatched,
                        failed = report.failed,
                        "Sync tick finished with failures"
                    ),
                    Ok(report) => debug!(total = report.total, "Sync tick finished"),
                    Err(e) => error!(error = %e, "Failed to list syncable jobs"),
                },
            }
        }
        info!("Sync scheduler stopped");
    }
}
