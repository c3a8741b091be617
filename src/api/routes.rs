//! HTTP surface: health check and on-demand trigger.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::notify::TelegramNotifier;
use crate::store::SqliteSeenStore;
use crate::types::WorkflowResult;
use crate::workflow::run_workflow;

#[derive(Clone)]
pub struct ApiState {
    pub cfg: Config,
    pub store: Option<SqliteSeenStore>,
    pub notifier: Option<Arc<TelegramNotifier>>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run", post(run_now))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Executes the workflow synchronously. Fatal-to-run errors surface as a
/// generic 500; every other condition returns 200 with the run summary.
async fn run_now(State(state): State<ApiState>) -> Result<Json<WorkflowResult>, AppError> {
    info!("on-demand run triggered");
    let result = run_workflow(&state.cfg, state.store.as_ref(), state.notifier.as_deref()).await?;
    Ok(Json(result))
}
