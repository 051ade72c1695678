// One season run: enumerate buckets, score each, submit the payload.
// Buckets are processed one at a time, in directory order; the first
// failure aborts the run so the endpoint never sees a partial season.

use std::sync::Arc;

use crate::challenge_client::ChallengeClient;
use crate::leaderboard_repo::LeaderboardRepo;
use crate::models::{BucketAggregate, SeasonPayload};
use crate::season::SeasonWindow;
use crate::skill_aggregator::SkillAggregator;
use anyhow::Context;
use tracing::{info, instrument, warn};

pub struct Pipeline {
    leaderboard: Arc<LeaderboardRepo>,
    aggregator: Arc<SkillAggregator>,
    challenge: Arc<ChallengeClient>,
}

impl Pipeline {
    pub fn new(
        leaderboard: Arc<LeaderboardRepo>,
        aggregator: Arc<SkillAggregator>,
        challenge: Arc<ChallengeClient>,
    ) -> Self {
        Self {
            leaderboard,
            aggregator,
            challenge,
        }
    }

    /// Assembles the payload for `window`: one entry per bucket, in directory
    /// order. A bucket with an empty id is logged and skipped; any other
    /// failure aborts the whole run.
    #[instrument(skip(self, window), fields(operation = "prepare_season_payload"))]
    pub async fn prepare_season_payload(
        &self,
        window: &SeasonWindow,
    ) -> anyhow::Result<SeasonPayload> {
        let bucket_ids = self.leaderboard.get_all_unique_buckets().await?;
        info!(buckets = bucket_ids.len(), "assembling season payload");

        let mut buckets = Vec::with_capacity(bucket_ids.len());
        for bucket_id in bucket_ids {
            if bucket_id.is_empty() {
                warn!("skipping bucket with empty id");
                continue;
            }
            let average_skill = self
                .aggregator
                .average_skill(&bucket_id, window)
                .await
                .with_context(|| format!("average skill for bucket {bucket_id}"))?;
            let users = self
                .leaderboard
                .get_users_in_bucket(&bucket_id)
                .await
                .with_context(|| format!("membership for bucket {bucket_id}"))?;
            buckets.push(BucketAggregate {
                bucket_id,
                average_skill,
                users,
            });
        }

        Ok(SeasonPayload {
            season_id: window.season_id(),
            start_date: window.start_date(),
            buckets,
        })
    }

    /// Runs one season pass anchored to today and submits the result.
    #[instrument(skip(self), fields(operation = "run_season"))]
    pub async fn run_season(&self) -> anyhow::Result<serde_json::Value> {
        let window = SeasonWindow::current();
        let payload = self.prepare_season_payload(&window).await?;
        let response = self
            .challenge
            .submit(&payload)
            .await
            .context("challenge submission")?;
        tracing::debug!(response = %response, "challenge endpoint response");
        info!(
            season_id = %payload.season_id,
            buckets = payload.buckets.len(),
            "season challenges submitted"
        );
        Ok(response)
    }
}
