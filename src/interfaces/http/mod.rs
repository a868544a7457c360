//! HTTP surface: a single multipart endpoint in front of the coordinator.

pub mod multipart;

use crate::application::coordinator::RequestCoordinator;
use crate::config::DecodeLimits;
use crate::error::RequestError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use multipart::decode_multipart;
use serde::Serialize;
use std::sync::Arc;

pub const SUBMIT_PATH: &str = "/api/reembolso";
pub const SUCCESS_MESSAGE: &str = "Request submitted!";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RequestCoordinator>,
    pub limits: DecodeLimits,
}

impl AppState {
    pub fn new(coordinator: RequestCoordinator, limits: DecodeLimits) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            limits,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

type Reply = (StatusCode, Json<MessageBody>);

fn reply(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.limits.max_body_bytes;
    Router::new()
        .route(SUBMIT_PATH, post(submit).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn submit(State(state): State<AppState>, multipart: Result<Multipart, MultipartRejection>) -> Reply {
    let limits = state.limits;
    let decode = async move {
        let multipart = multipart.map_err(|rejection| RequestError::DecodeError(rejection.body_text()))?;
        decode_multipart(multipart, limits).await
    };

    match state.coordinator.run(decode).await {
        Ok(_) => reply(StatusCode::OK, SUCCESS_MESSAGE),
        Err(failure) => reply(StatusCode::INTERNAL_SERVER_ERROR, failure.to_string()),
    }
}

async fn method_not_allowed() -> Reply {
    reply(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
}
