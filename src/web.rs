use std::sync::Arc;

use alexa::{RequestEnvelope, RequestType, ResponseEnvelope};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::skill::{Outcome, Skill};
use crate::verification::RequestVerifier;

#[derive(Debug, Error)]
#[error("{source}")]
pub struct ApiError {
    status_code: StatusCode,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            status_code,
            source,
        }
    }
}

// The source is only meant for our own logs, so it is left out of the response
impl From<&ApiError> for ApiErrorJson {
    fn from(value: &ApiError) -> Self {
        let error = ApiErrorJsonError {
            code: value.status_code.as_u16(),
            status: value.status_code.to_string(),
        };

        Self { error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(ApiErrorJson::from(&self))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ApiErrorJsonError {
    code: u16,
    status: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorJson {
    error: ApiErrorJsonError,
}

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<RequestVerifier>,
    pub skill: Arc<Skill>,
}

impl AppState {
    pub fn new(verifier: RequestVerifier, skill: Skill) -> Self {
        Self {
            verifier: Arc::new(verifier),
            skill: Arc::new(skill),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let fulfillment = Router::new().route("/alexa", post(fulfillment));

    Router::new()
        .nest("/fulfillment", fulfillment)
        .with_state(state)
}

async fn fulfillment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Option<ResponseEnvelope>>, ApiError> {
    let payload: RequestEnvelope = serde_json::from_slice(&body).map_err(|err| {
        warn!("Failed to parse request: {err}");
        ApiError::new(StatusCode::BAD_REQUEST, err.into())
    })?;

    state
        .verifier
        .verify(&headers, &body, payload.request.timestamp)
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.into()))?;

    let request = &payload.request;
    info!(
        request_type = %request.kind,
        request_id = %request.request_id,
        "Request received"
    );

    match &request.kind {
        RequestType::Intent => {
            if let Some(name) = request.intent_name() {
                info!(intent = %name, "-> IntentRequest");
            }
        }
        RequestType::AudioPlayer(event) => info!(%event, "-> AudioPlayerRequest"),
        RequestType::SessionEnded => info!(reason = ?request.reason, "-> Session ended"),
        RequestType::Launch | RequestType::Other(_) => {}
    }

    let outcome = state.skill.dispatch(request);
    if outcome == Outcome::Unhandled {
        error!(
            payload = %String::from_utf8_lossy(&body),
            "Unhandled request"
        );
    }

    Ok(Json(outcome.into_response()))
}
