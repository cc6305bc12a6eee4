use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use serde::Deserialize;

use crate::resource::VideoHandle;
use crate::server::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    #[serde(default)]
    pub download: bool,
}

/// Serve a clip inline for playback, or as an attachment with `?download=true`.
async fn get_video(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<VideoQuery>,
) -> ApiResult<Response> {
    let handle: VideoHandle = handle.parse()?;
    let video = state.studio.video(handle).await?;

    let disposition = if query.download {
        format!("attachment; filename=\"{}\"", video.file_name())
    } else {
        "inline".to_string()
    };
    Ok((
        [
            (header::CONTENT_TYPE, video.container.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        Bytes::copy_from_slice(&video.bytes),
    )
        .into_response())
}

async fn revoke_video(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<StatusCode> {
    let handle: VideoHandle = handle.parse()?;
    state.studio.revoke_video(handle).await?;
    tracing::info!(%handle, "revoked video");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/videos/{handle}", get(get_video).delete(revoke_video))
}
