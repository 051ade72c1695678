// Wire models for the challenge-creation endpoint.
// Field names are the wire contract (snake_case); do not rename.

use serde::{Deserialize, Serialize};

/// One bucket's entry in the season payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAggregate {
    pub bucket_id: String,
    /// Average skill per day over the rolling three-month window.
    pub average_skill: f64,
    pub users: Vec<String>,
}

/// Payload submitted to the challenge endpoint, one entry per playable bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonPayload {
    /// e.g. "season_2026_08"
    pub season_id: String,
    /// First day of the season month, e.g. "2026-08-01".
    pub start_date: String,
    pub buckets: Vec<BucketAggregate>,
}
