//! Global boundary for unexpected faults.
//!
//! A panic anywhere below this layer becomes a 500 response carrying a
//! `global.unexpected_error` failure outcome with problem details. Expected
//! failures never reach here; they travel as outcomes.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use crate::outcome::{global, Outcome};

type Panic = Box<dyn Any + Send + 'static>;

pub fn catch_panic_layer() -> CatchPanicLayer<fn(Panic) -> Response> {
    CatchPanicLayer::custom(unexpected_error as fn(Panic) -> Response)
}

fn unexpected_error(panic: Panic) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Unhandled panic while serving request");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let problem = json!({
        "type": "about:blank",
        "title": "Internal Server Error",
        "status": status.as_u16(),
        "detail": detail,
    });
    let outcome = Outcome::<()>::failure(global::UNEXPECTED.with_details(problem));

    (status, Json(outcome)).into_response()
}
