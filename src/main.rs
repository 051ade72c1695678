use anyhow::Result;
use challenge_scheduler::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let store = Arc::new(
        leaderboard_repo::sqlite::SqliteLeaderboardStore::connect(
            &app_config.store.path,
            &app_config.store.table,
            app_config.store.max_pool_size,
            app_config.store.scan_page_size,
        )
        .await?,
    );
    store.init().await?;

    let leaderboard = Arc::new(leaderboard_repo::LeaderboardRepo::new(store));
    let metrics = Arc::new(metrics_client::MetricsClient::new(
        app_config.metrics.url.clone(),
    )?);
    let challenge = Arc::new(challenge_client::ChallengeClient::new(
        app_config.challenge.url.clone(),
    )?);
    let aggregator = Arc::new(skill_aggregator::SkillAggregator::new(
        leaderboard.clone(),
        metrics,
    ));
    let pipeline = Arc::new(pipeline::Pipeline::new(leaderboard, aggregator, challenge));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let scheduler_handle =
        scheduler::spawn(pipeline.clone(), app_config.schedule.clone(), shutdown_rx);

    let app = routes::app(pipeline);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = scheduler_handle.await;
            }
        }
    }

    Ok(())
}
