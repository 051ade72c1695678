// Average daily skill per bucket over the rolling three-month window.
// DB and HTTP access stay in the repo/client; the scoring rules here are pure.

use std::sync::Arc;

use crate::leaderboard_repo::LeaderboardRepo;
use crate::metrics_client::MetricsClient;
use crate::season::SeasonWindow;
use anyhow::Context;
use tracing::{info, instrument, warn};

/// Daily rates at or below this count as noise.
pub const MIN_MEANINGFUL_DAILY_RATE: f64 = 0.1;

/// Substitute rate when a bucket's computed rate is noise.
pub const DEFAULT_DAILY_RATE: f64 = 2.5;

pub struct SkillAggregator {
    leaderboard: Arc<LeaderboardRepo>,
    metrics: Arc<MetricsClient>,
}

impl SkillAggregator {
    pub fn new(leaderboard: Arc<LeaderboardRepo>, metrics: Arc<MetricsClient>) -> Self {
        Self {
            leaderboard,
            metrics,
        }
    }

    /// Average skill per day for one bucket's members over `window`.
    /// A bucket with no members scores 0.0 without a metrics call.
    #[instrument(skip(self, window), fields(operation = "average_skill"))]
    pub async fn average_skill(
        &self,
        bucket_id: &str,
        window: &SeasonWindow,
    ) -> anyhow::Result<f64> {
        let users = self.leaderboard.get_users_in_bucket(bucket_id).await?;
        if users.is_empty() {
            return Ok(0.0);
        }
        let totals = self
            .metrics
            .three_month_totals(&users)
            .await
            .with_context(|| format!("metrics lookup for bucket {bucket_id}"))?;
        let values = coerce_totals(&totals);
        Ok(daily_rate(&values, window.rolling_window_days()))
    }
}

/// Whole-number totals from the raw metrics map, in the map's order.
fn coerce_totals(totals: &serde_json::Map<String, serde_json::Value>) -> Vec<i64> {
    totals
        .iter()
        .map(|(user_id, value)| coerce_total(user_id, value))
        .collect()
}

/// Coerces one metric value to a whole-number total. Fractions truncate
/// toward zero; a value that is not numeric at all counts as 0 (no recorded
/// activity) and is logged, so one bad record never poisons the average.
fn coerce_total(user_id: &str, value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                f.trunc() as i64
            } else {
                warn!(user_id, value = %n, "unrepresentable skill total, treating as 0");
                0
            }
        }
        serde_json::Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => f.trunc() as i64,
            Err(_) => {
                warn!(user_id, value = %s, "non-numeric skill total, treating as 0");
                0
            }
        },
        other => {
            warn!(user_id, value = %other, "non-numeric skill total, treating as 0");
            0
        }
    }
}

/// Zero-handling rule: an all-zero (or empty) set of totals reduces to a
/// single zero; otherwise zero totals are dropped so inactive members do not
/// dilute the mean of the active ones.
fn meaningful_totals(values: &[i64]) -> Vec<i64> {
    if values.iter().all(|v| *v == 0) {
        vec![0]
    } else {
        values.iter().copied().filter(|v| *v != 0).collect()
    }
}

/// Mean total divided by the window's day count, with the noise floor
/// applied: rates at or below MIN_MEANINGFUL_DAILY_RATE become
/// DEFAULT_DAILY_RATE.
fn daily_rate(values: &[i64], window_days: u32) -> f64 {
    let totals = meaningful_totals(values);
    // Sum in f64: totals are unbounded and an integer sum could wrap.
    let mean = totals.iter().map(|&t| t as f64).sum::<f64>() / totals.len() as f64;
    let rate = mean / window_days as f64;
    if rate <= MIN_MEANINGFUL_DAILY_RATE {
        info!(rate, "daily rate at or below threshold, substituting default");
        DEFAULT_DAILY_RATE
    } else {
        rate
    }
}
