// HTTP routes

mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::Pipeline;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pipeline: Arc<Pipeline>,
}

pub fn app(pipeline: Arc<Pipeline>) -> Router {
    let state = AppState { pipeline };
    Router::new()
        .route("/", get(|| async { "Challenge scheduler up" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/trigger", post(http::trigger_handler)) // POST /trigger
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
