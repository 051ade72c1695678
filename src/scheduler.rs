// Scheduled season runs: cron expression or fixed interval.
// Each firing is one run-to-completion pass; a failed run is logged and the
// schedule keeps going. With no cron and interval_secs = 0 the task exits
// and the service stays trigger-only.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScheduleConfig;
use crate::pipeline::Pipeline;
use tracing::{info, instrument, warn};

/// Spawns the season scheduler. Returns a join handle.
pub fn spawn(
    pipeline: Arc<Pipeline>,
    config: ScheduleConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(pipeline, config, shutdown_rx).await;
    })
}

#[instrument(skip(pipeline, config, shutdown_rx), fields(cron = ?config.cron, interval_secs = config.interval_secs))]
async fn run(
    pipeline: Arc<Pipeline>,
    config: ScheduleConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    let (fire_tx, mut fire_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(season_timer(config, fire_tx));

    loop {
        tokio::select! {
            fired = fire_rx.recv() => {
                match fired {
                    Some(()) => match pipeline.run_season().await {
                        Ok(_) => info!("scheduled season run complete"),
                        Err(e) => {
                            let err = format!("{e:#}");
                            warn!(error = %err, "scheduled season run failed");
                        }
                    },
                    // Timer task gone (no schedule configured or it exited).
                    None => break,
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Scheduler shutting down");
                break;
            }
        }
    }
}

/// Sends on `tx` at each season run time (cron or fixed interval). Uses local
/// time for cron.
async fn season_timer(config: ScheduleConfig, tx: tokio::sync::mpsc::Sender<()>) {
    if let Some(ref cron_str) = config.cron {
        let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
            warn!(cron = %cron_str, "invalid schedule.cron; scheduled runs disabled");
            return;
        };
        loop {
            let now = chrono::Local::now();
            let next = schedule.after(&now).next();
            if let Some(next) = next {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else if config.interval_secs > 0 {
        let interval = Duration::from_secs(config.interval_secs);
        loop {
            tokio::time::sleep(interval).await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    } else {
        info!("no schedule configured; season runs via POST /trigger only");
    }
}
