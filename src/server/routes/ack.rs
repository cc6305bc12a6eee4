//! `POST /api/generate-video`: acknowledges a frame list without processing it.
//!
//! Encoding happens on the studio side; this endpoint only validates the payload shape and
//! echoes its size.

use axum::body::Bytes;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use serde_json::Value;

use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};

pub const ACK_MESSAGE: &str =
    "Video generation not implemented server-side. Use client-side generation.";

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: &'static str,
    pub frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<Value>,
}

/// Validate a decoded payload. `fps` is echoed untouched.
///
/// `frames` must have a non-zero length: an array counts its elements, a string its UTF-16
/// units. A `null` body has no fields to read and is a server error.
pub fn acknowledge(body: &Value) -> ApiResult<AckResponse> {
    if body.is_null() {
        tracing::error!("generate-video payload is null");
        return Err(ApiError::internal("Failed to generate video"));
    }
    let frames = match body.get("frames") {
        Some(Value::Array(frames)) if !frames.is_empty() => frames.len(),
        Some(Value::String(frames)) if !frames.is_empty() => frames.encode_utf16().count(),
        _ => return Err(ApiError::bad_request("No frames provided")),
    };
    Ok(AckResponse {
        message: ACK_MESSAGE,
        frames,
        fps: body.get("fps").cloned(),
    })
}

async fn generate_video(body: Bytes) -> ApiResult<Json<AckResponse>> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "generate-video payload is not JSON");
        ApiError::internal("Failed to generate video")
    })?;
    let ack = acknowledge(&value)?;
    tracing::info!(frames = ack.frames, "acknowledged generate-video request");
    Ok(Json(ack))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate-video", post(generate_video))
}
