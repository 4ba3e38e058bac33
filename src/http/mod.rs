//! HTTP intake surface.

mod intake;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{store::SubmissionStore, tasks::TriggerQueue};

pub use intake::{SubmitRequest, SubmitResponse};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SubmissionStore>,
    pub queue: Arc<TriggerQueue>,
}

impl AppState {
    pub fn new(store: Arc<SubmissionStore>, queue: Arc<TriggerQueue>) -> Self {
        Self { store, queue }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/submit", post(intake::submit))
        .with_state(state)
}
