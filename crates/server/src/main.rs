//! locsync entry point.

mod app;
mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use apalis::prelude::*;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use locsync_common::Config;
use locsync_core::{SubmitJobInput, TranslationTargetInput};
use locsync_queue::{
    InlineDispatcher, RedisDispatcher, SyncDispatcher, SyncJobTask, SyncScheduler,
    SyncWorkerContext, sync_worker,
};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "locsync", version, about = "Sync CMS content with Smartling translation jobs")]
struct Cli {
    /// Configuration file. Without it, `config/` and `LOCSYNC_*` variables are used.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate, then sync jobs on a schedule until interrupted.
    Run,
    /// Sync every pending job once, or only the given one.
    Sync {
        #[arg(long)]
        job: Option<String>,
    },
    /// Submit a source for translation.
    Submit {
        #[arg(long)]
        content_type: String,
        #[arg(long)]
        object_id: String,
        /// Target as `TRANSLATION_ID:LOCALE`; repeatable.
        #[arg(long = "translation", value_parser = parse_target, required = true)]
        translations: Vec<TranslationTargetInput>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        reference_number: Option<String>,
        /// RFC 3339 timestamp in the future.
        #[arg(long)]
        due_date: Option<DateTime<Utc>>,
    },
    /// Fill in content hashes for jobs stored without one.
    PopulateHashes {
        #[arg(long, default_value_t = 100)]
        batch_size: u64,
    },
    /// Fetch the vendor project and store it.
    RefreshProject,
    /// Apply database migrations.
    Migrate,
}

fn parse_target(value: &str) -> Result<TranslationTargetInput, String> {
    match value.split_once(':') {
        Some((id, locale)) if !id.is_empty() && !locale.is_empty() => Ok(TranslationTargetInput {
            translation_id: id.to_string(),
            locale: locale.to_string(),
        }),
        _ => Err(format!("expected TRANSLATION_ID:LOCALE, got {value:?}")),
    }
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Resolves once `true` is sent on the channel, or the sender is gone.
async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "locsync=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    init_tracing(config.logging.json);

    let app = App::connect(config).await?;

    match cli.command {
        Command::Run => run(app).await,
        Command::Sync { job: Some(job_id) } => {
            let report = app.sync.sync_job(&job_id).await?;
            info!(
                job_id = %job_id,
                from = ?report.previous_status,
                to = ?report.job.status,
                imported = report.imported.len(),
                "Job synced"
            );
            Ok(())
        }
        Command::Sync { job: None } => {
            let scheduler = SyncScheduler::new(
                app.job_repo(),
                Arc::new(InlineDispatcher::new(app.sync.clone())),
                app.config.scheduler.concurrency,
            );
            let report = scheduler.tick().await?;
            info!(
                total = report.total,
                dispatched = report.dispatched,
                failed = report.failed,
                "Sync finished"
            );
            if report.failed > 0 {
                anyhow::bail!("{} of {} jobs failed to sync", report.failed, report.total);
            }
            Ok(())
        }
        Command::Submit {
            content_type,
            object_id,
            translations,
            user,
            name,
            description,
            reference_number,
            due_date,
        } => {
            let submission = app
                .submission
                .get_or_create_job(SubmitJobInput {
                    content_type,
                    object_id,
                    translations,
                    user_id: user,
                    name,
                    description,
                    reference_number,
                    due_date,
                })
                .await?;
            let job = submission.job();
            info!(
                job_id = %job.id,
                name = %job.name,
                created = submission.is_created(),
                "Submission stored"
            );
            Ok(())
        }
        Command::PopulateHashes { batch_size } => {
            let updated = app.submission.populate_missing_hashes(batch_size).await?;
            info!(updated, "Populated content hashes");
            Ok(())
        }
        Command::RefreshProject => {
            let current = app.project_cache.refresh().await?;
            info!(
                project_uid = %current.project.project_uid,
                name = %current.project.name,
                target_locales = current.target_locales.len(),
                "Project refreshed"
            );
            Ok(())
        }
        Command::Migrate => {
            locsync_db::migrate(&app.db).await?;
            info!("Migrations completed");
            Ok(())
        }
    }
}

async fn run(app: App) -> anyhow::Result<()> {
    info!("Running database migrations...");
    locsync_db::migrate(&app.db).await?;
    info!("Migrations completed");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (dispatcher, worker): (Arc<dyn SyncDispatcher>, Option<JoinHandle<()>>) =
        match &app.config.queue {
            Some(queue) => {
                info!("Connecting to Redis...");
                let client = redis::Client::open(queue.redis_url.as_str())
                    .context("Invalid Redis URL")?;
                let conn = redis::aio::ConnectionManager::new(client)
                    .await
                    .context("Failed to connect to Redis")?;
                let storage = apalis_redis::RedisStorage::<SyncJobTask>::new(conn);
                info!("Connected to Redis job queue");

                let ctx = SyncWorkerContext::new(app.sync.clone());
                let worker_storage = storage.clone();
                let rx = shutdown_rx.clone();
                let handle = tokio::spawn(async move {
                    let monitor = Monitor::new().register({
                        WorkerBuilder::new("locsync-sync")
                            .data(ctx)
                            .backend(worker_storage)
                            .build_fn(sync_worker)
                    });

                    let signal = async move {
                        stopped(rx).await;
                        Ok(())
                    };
                    if let Err(e) = monitor.run_with_signal(signal).await {
                        tracing::error!(error = %e, "Sync worker failed");
                    }
                });
                info!("Sync worker started");

                (Arc::new(RedisDispatcher::new(storage)), Some(handle))
            }
            None => (Arc::new(InlineDispatcher::new(app.sync.clone())), None),
        };

    let scheduler = SyncScheduler::new(
        app.job_repo(),
        dispatcher,
        app.config.scheduler.concurrency,
    );
    let period = app.config.scheduler.sync_interval();
    let scheduler_task = tokio::spawn({
        let rx = shutdown_rx.clone();
        async move { scheduler.run(period, stopped(rx)).await }
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    scheduler_task.await?;
    if let Some(worker) = worker {
        worker.await?;
    }
    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        let target = parse_target("t1:fr").unwrap();
        assert_eq!(target.translation_id, "t1");
        assert_eq!(target.locale, "fr");

        assert!(parse_target("t1").is_err());
        assert!(parse_target(":fr").is_err());
        assert!(parse_target("t1:").is_err());
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "locsync",
            "submit",
            "--content-type",
            "page",
            "--object-id",
            "42",
            "--translation",
            "t1:fr",
            "--translation",
            "t2:de",
            "--due-date",
            "2030-01-01T00:00:00Z",
        ])
        .unwrap();

        match cli.command {
            Command::Submit {
                translations,
                due_date,
                ..
            } => {
                assert_eq!(translations.len(), 2);
                assert_eq!(translations[1].locale, "de");
                assert!(due_date.is_some());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_translation() {
        let result = Cli::try_parse_from([
            "locsync",
            "submit",
            "--content-type",
            "page",
            "--object-id",
            "42",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_sync_single_job() {
        let cli = Cli::try_parse_from(["locsync", "--config", "local.toml", "sync", "--job", "j1"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("local.toml")));
        assert!(matches!(cli.command, Command::Sync { job: Some(ref id) } if id == "j1"));
    }

    #[tokio::test]
    async fn test_stopped_resolves_on_send() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(stopped(rx));
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }
}
