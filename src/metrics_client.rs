// Client for the per-user skill metrics endpoint.

use crate::version;
use serde::Serialize;
use tracing::instrument;

pub struct MetricsClient {
    client: reqwest::Client,
    url: String,
}

impl MetricsClient {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self { client, url })
    }

    /// Three-month challenge totals keyed by user id. Fails on a non-success
    /// status or a response body that is not a JSON object.
    #[instrument(skip(self, user_ids), fields(operation = "three_month_totals", users = user_ids.len()))]
    pub async fn three_month_totals(
        &self,
        user_ids: &[String],
    ) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        #[derive(Serialize)]
        struct Payload<'a> {
            user_ids: &'a [String],
        }
        let response = self
            .client
            .post(&self.url)
            .json(&Payload { user_ids })
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "metrics endpoint returned {}",
            response.status()
        );
        let totals = response
            .json::<serde_json::Map<String, serde_json::Value>>()
            .await
            .map_err(|e| anyhow::anyhow!("metrics response is not a JSON object: {}", e))?;
        Ok(totals)
    }
}
