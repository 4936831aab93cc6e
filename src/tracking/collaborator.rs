//! Tracking collaborator interfaces
//!
//! The tracking algorithm and video playback live outside this crate. These
//! traits are the seams the tracking loop drives them through.

use crate::geometry::{CanonicalBox, CanvasDimensions};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while seeding or running a tracker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Seek failed: {0}")]
    SeekFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Tracker initialization failed: {0}")]
    InitFailed(String),

    #[error("Tracker request failed: {0}")]
    RequestFailed(String),

    #[error("No async runtime available to drive the tracking loop")]
    NoRuntime,

    #[error("Tracking task aborted: {0}")]
    Aborted(String),
}

/// Result type for tracking operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Video element the box is drawn over. Also the frame source handed to
/// the tracker.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Intrinsic pixel size of the decoded video. Valid once data is loaded.
    fn intrinsic_size(&self) -> CanvasDimensions;

    /// Move the playback position and resolve once the seek has completed.
    async fn seek(&self, position: Duration) -> TrackingResult<()>;

    /// Start or resume playback.
    fn play(&self) -> TrackingResult<()>;
}

/// Factory for per-gesture tracker state.
pub trait Tracker: Send + Sync {
    /// Seed a tracker with the box drawn on the current frame of `source`.
    fn init(&self, source: &dyn VideoSource, initial: CanonicalBox) -> TrackingResult<Box<dyn TrackerHandle>>;
}

/// Opaque tracker state for one drawn box.
#[async_trait]
pub trait TrackerHandle: Send {
    /// Estimate the box on the frame `source` currently shows.
    ///
    /// Never called again before the previous call resolved.
    async fn next(&mut self, source: &dyn VideoSource) -> TrackingResult<CanonicalBox>;
}
