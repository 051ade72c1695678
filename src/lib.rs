// Library for tests to access modules

pub mod challenge_client;
pub mod config;
pub mod leaderboard_repo;
pub mod metrics_client;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod scheduler;
pub mod season;
pub mod skill_aggregator;
pub mod version;
