use crate::geometry::CanonicalBox;
use crate::render::{FrameRenderer, SharedSurface};
use crate::tracking::cancel::CancelToken;
use crate::tracking::clock::FrameClock;
use crate::tracking::collaborator::{Tracker, TrackerHandle, TrackingError, TrackingResult, VideoSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Lifecycle of the tracking loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopState {
    NotStarted,
    Running,
    /// Cancelled, out of frames, or failed.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    Cancelled,
    /// The frame clock will not produce more frames.
    ClockClosed,
}

/// Progress reported to whoever owns the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    /// Seek finished, tracker seeded, playback started.
    Started { run_id: Uuid, initial: CanonicalBox },
    /// A tracked box was rendered.
    Frame { run_id: Uuid, index: u64, bbox: CanonicalBox },
    Stopped { run_id: Uuid, reason: StopReason, frames: u64 },
    Failed { run_id: Uuid, error: TrackingError },
}

/// Handle to one spawned tracking run.
pub struct TrackingRun {
    run_id: Uuid,
    token: CancelToken,
    task: JoinHandle<TrackingResult<StopReason>>,
}

impl TrackingRun {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Ask the run to stop. It exits at its next check without rendering
    /// any further frame.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end.
    pub async fn join(self) -> TrackingResult<StopReason> {
        self.task
            .await
            .map_err(|e| TrackingError::Aborted(e.to_string()))?
    }
}

/// Drives the per-display-frame cycle of asking the tracker for the next
/// box and drawing it.
///
/// Each step waits for a display frame, requests one box, renders it and
/// only then loops, so at most one tracker request is ever in flight.
/// Starting a new run cancels the previous one first.
pub struct TrackingLoopController {
    renderer: FrameRenderer,
    surface: SharedSurface,
    clock: Arc<dyn FrameClock>,
    seek_position: Duration,
    events: mpsc::UnboundedSender<TrackingEvent>,
    active: Option<TrackingRun>,
    started: bool,
}

impl TrackingLoopController {
    pub fn new(
        renderer: FrameRenderer,
        surface: SharedSurface,
        clock: Arc<dyn FrameClock>,
        seek_position: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<TrackingEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            renderer,
            surface,
            clock,
            seek_position,
            events,
            active: None,
            started: false,
        };
        (controller, rx)
    }

    pub fn state(&self) -> LoopState {
        match &self.active {
            None if !self.started => LoopState::NotStarted,
            None => LoopState::Stopped,
            Some(run) if run.is_finished() => LoopState::Stopped,
            Some(_) => LoopState::Running,
        }
    }

    pub fn active(&self) -> Option<&TrackingRun> {
        self.active.as_ref()
    }

    /// Seek `video` to the configured position, seed `tracker` with
    /// `initial` once the seek completes, start playback and loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        video: Arc<dyn VideoSource>,
        tracker: Arc<dyn Tracker>,
        initial: CanonicalBox,
    ) -> TrackingResult<Uuid> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TrackingError::NoRuntime)?;
        self.cancel();

        let run_id = Uuid::new_v4();
        let token = CancelToken::new();
        let runner = Runner {
            run_id,
            token: token.clone(),
            renderer: self.renderer,
            surface: self.surface.clone(),
            clock: self.clock.clone(),
            seek_position: self.seek_position,
            events: self.events.clone(),
            frames: 0,
        };
        let task = runtime.spawn(runner.run(video, tracker, initial));

        tracing::debug!("Tracking run {} spawned for {:?}", run_id, initial);
        self.active = Some(TrackingRun { run_id, token, task });
        self.started = true;
        Ok(run_id)
    }

    /// Cancel the active run, if any, and hand it back so the caller can
    /// wait for it to wind down.
    pub fn cancel(&mut self) -> Option<TrackingRun> {
        let run = self.active.take()?;
        if !run.is_finished() {
            tracing::debug!("Cancelling tracking run {}", run.run_id);
        }
        run.cancel();
        Some(run)
    }
}

impl Drop for TrackingLoopController {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct Runner {
    run_id: Uuid,
    token: CancelToken,
    renderer: FrameRenderer,
    surface: SharedSurface,
    clock: Arc<dyn FrameClock>,
    seek_position: Duration,
    events: mpsc::UnboundedSender<TrackingEvent>,
    frames: u64,
}

impl Runner {
    async fn run(
        mut self,
        video: Arc<dyn VideoSource>,
        tracker: Arc<dyn Tracker>,
        initial: CanonicalBox,
    ) -> TrackingResult<StopReason> {
        let result = self.drive(video.as_ref(), tracker.as_ref(), initial).await;
        match &result {
            Ok(reason) => {
                tracing::info!(
                    "Tracking run {} stopped ({:?}, frames={})",
                    self.run_id,
                    reason,
                    self.frames
                );
                self.emit(TrackingEvent::Stopped {
                    run_id: self.run_id,
                    reason: *reason,
                    frames: self.frames,
                });
            }
            Err(error) => {
                tracing::error!(
                    "Tracking run {} failed after {} frames: {}",
                    self.run_id,
                    self.frames,
                    error
                );
                self.emit(TrackingEvent::Failed {
                    run_id: self.run_id,
                    error: error.clone(),
                });
            }
        }
        result
    }

    async fn drive(
        &mut self,
        video: &dyn VideoSource,
        tracker: &dyn Tracker,
        initial: CanonicalBox,
    ) -> TrackingResult<StopReason> {
        let token = self.token.clone();

        // Seed only once playback is known to sit on the seek target.
        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(StopReason::Cancelled),
            seeked = video.seek(self.seek_position) => seeked?,
        }
        if token.is_cancelled() {
            return Ok(StopReason::Cancelled);
        }

        let mut handle: Box<dyn TrackerHandle> = tracker.init(video, initial)?;
        video.play()?;
        tracing::info!("Tracking run {} started from {:?}", self.run_id, initial);
        self.emit(TrackingEvent::Started {
            run_id: self.run_id,
            initial,
        });

        loop {
            let ticked = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(StopReason::Cancelled),
                ticked = self.clock.next_frame() => ticked,
            };
            if !ticked {
                return Ok(StopReason::ClockClosed);
            }
            if token.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }

            let bbox = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(StopReason::Cancelled),
                next = handle.next(video) => next?,
            };
            // A box that resolves after cancellation belongs to a stale run.
            if !render_if_live(&self.surface, &self.renderer, &token, bbox) {
                return Ok(StopReason::Cancelled);
            }
            let index = self.frames;
            self.frames += 1;
            tracing::trace!("Tracking run {} frame {}: {:?}", self.run_id, index, bbox);
            self.emit(TrackingEvent::Frame {
                run_id: self.run_id,
                index,
                bbox,
            });
        }
    }

    fn emit(&self, event: TrackingEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Tracking run {} has no event listener", self.run_id);
        }
    }
}

/// Render `bbox` unless `token` was cancelled. The check happens under the
/// surface lock, so a cancel that lands before the lock is taken always wins
/// over this render.
fn render_if_live(
    surface: &SharedSurface,
    renderer: &FrameRenderer,
    token: &CancelToken,
    bbox: CanonicalBox,
) -> bool {
    let mut surface = surface.lock();
    if token.is_cancelled() {
        return false;
    }
    renderer.render(&mut *surface, bbox);
    true
}
