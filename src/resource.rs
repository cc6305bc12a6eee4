//! Transient handles to encoded clips.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encode::sink::EncodedVideo;
use crate::foundation::error::{ReelError, ReelResult};

/// Revocable reference to an [`EncodedVideo`] held by a [`VideoStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoHandle(Uuid);

impl VideoHandle {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Path the HTTP service serves this clip under.
    pub fn url(&self) -> String {
        format!("/api/videos/{}", self.0)
    }
}

impl std::fmt::Display for VideoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VideoHandle {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ReelError::not_found(format!("no video with handle '{s}'")))
    }
}

/// Holds at most one live clip. Publishing a new clip revokes the previous handle first.
#[derive(Debug, Default)]
pub struct VideoStore {
    current: Option<(VideoHandle, EncodedVideo)>,
}

impl VideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, video: EncodedVideo) -> VideoHandle {
        if let Some(old) = self.revoke_current() {
            tracing::debug!(handle = %old, "revoked previous video");
        }
        let handle = VideoHandle::fresh();
        self.current = Some((handle, video));
        handle
    }

    pub fn get(&self, handle: VideoHandle) -> ReelResult<&EncodedVideo> {
        match &self.current {
            Some((h, video)) if *h == handle => Ok(video),
            _ => Err(ReelError::not_found(format!("no video with handle '{handle}'"))),
        }
    }

    pub fn current_handle(&self) -> Option<VideoHandle> {
        self.current.as_ref().map(|(h, _)| *h)
    }

    /// Release `handle`. Revoking an unknown or already revoked handle is an error.
    pub fn revoke(&mut self, handle: VideoHandle) -> ReelResult<()> {
        if self.current_handle() != Some(handle) {
            return Err(ReelError::not_found(format!("no video with handle '{handle}'")));
        }
        self.current = None;
        Ok(())
    }

    /// Release whatever is live, returning its handle.
    pub fn revoke_current(&mut self) -> Option<VideoHandle> {
        self.current.take().map(|(h, _)| h)
    }
}
