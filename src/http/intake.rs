use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::Submission,
    tasks::{Trigger, TriggerSource},
};

use super::AppState;

const MISSING_FIELDS: &str = "link or phone missing";
const ACCEPTED: &str = "Data received";
const INVALID_BODY: &str = "invalid JSON body";

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, alias = "telefon")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitResponse {
    Success { message: String },
    Error { reason: String },
}

impl SubmitResponse {
    fn error(reason: impl Into<String>) -> Self {
        SubmitResponse::Error {
            reason: reason.into(),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(super) async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> (StatusCode, Json<SubmitResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(target: "http", error = %rejection, "rejected malformed submission");
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::error(format!(
                    "{INVALID_BODY}: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    let (Some(link), Some(phone)) = (present(request.link), present(request.phone)) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(SubmitResponse::error(MISSING_FIELDS)),
        );
    };

    match state.store.append(Submission::new(link, phone)).await {
        Ok(index) => {
            state
                .queue
                .push(Trigger::new(TriggerSource::Submission { index }));
            tracing::info!(target: "http", index, "submission accepted");
            (
                StatusCode::OK,
                Json(SubmitResponse::Success {
                    message: ACCEPTED.to_string(),
                }),
            )
        }
        Err(err) => {
            tracing::error!(target: "http", error = %err, "failed to store submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::error(err.to_string())),
            )
        }
    }
}
