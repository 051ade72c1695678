// Client for the challenge-creation endpoint.

use crate::models::SeasonPayload;
use crate::version;
use tracing::instrument;

pub struct ChallengeClient {
    client: reqwest::Client,
    url: String,
}

impl ChallengeClient {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self { client, url })
    }

    /// Submits the season payload and returns the endpoint's parsed response.
    /// The HTTP status is not interpreted; the endpoint reports failures
    /// in-body, so only an unparseable body is an error.
    #[instrument(skip(self, payload), fields(operation = "submit", season_id = %payload.season_id, buckets = payload.buckets.len()))]
    pub async fn submit(&self, payload: &SeasonPayload) -> anyhow::Result<serde_json::Value> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let body = response.text().await?;
        let parsed = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("challenge endpoint returned non-JSON body: {}", e))?;
        Ok(parsed)
    }
}
