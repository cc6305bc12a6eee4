use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;

use crate::foundation::core::FrameRate;
use crate::foundation::error::ReelError;
use crate::scene::params::AnimationParams;
use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::studio::{FramesSummary, StudioState, VideoSummary};

/// Body of `POST /api/studio/frames`. Missing fields fall back to the defaults (3 s, 30 fps).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateFramesRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub fps: Option<u32>,
}

impl GenerateFramesRequest {
    pub fn into_params(self) -> Result<AnimationParams, ReelError> {
        let defaults = AnimationParams::default();
        let fps = match self.fps {
            Some(fps) => FrameRate::new(fps)?,
            None => defaults.fps,
        };
        let duration = self
            .duration
            .unwrap_or_else(|| i64::from(defaults.duration_secs()));
        Ok(AnimationParams::new(self.text, duration, fps))
    }
}

async fn get_state(State(state): State<AppState>) -> Json<StudioState> {
    Json(state.studio.state().await)
}

async fn generate_frames(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<FramesSummary>> {
    let req: GenerateFramesRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateFramesRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?
    };
    let params = req.into_params()?;
    Ok(Json(state.studio.generate_frames(params).await?))
}

async fn frame_preview(
    State(state): State<AppState>,
    Path(index): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    let jpeg = state.studio.frame(index).await?;
    Ok((
        [(header::CONTENT_TYPE, "image/jpeg")],
        Bytes::copy_from_slice(&jpeg),
    ))
}

async fn create_video(State(state): State<AppState>) -> ApiResult<Json<VideoSummary>> {
    match state.studio.create_video().await {
        Ok(summary) => Ok(Json(summary)),
        Err(e @ (ReelError::State(_) | ReelError::Validation(_))) => Err(e.into()),
        Err(e) => Err(ApiError::internal(format!("Error creating video: {e}"))),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/studio", get(get_state))
        .route("/api/studio/frames", post(generate_frames))
        .route("/api/studio/frames/{index}", get(frame_preview))
        .route("/api/studio/video", post(create_video))
}
