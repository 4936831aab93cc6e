//! Headless host
//!
//! A synthetic 1280x720 video, a tracker that drifts the box at constant
//! velocity, and a driver that replays one drag over a raster surface.

use crate::config::SessionConfig;
use crate::geometry::{CanonicalBox, CanvasDimensions, Point};
use crate::input::{EventTarget, InputDispatcher, PointerEventKind, PointerInput};
use crate::render::PixmapSurface;
use crate::session::{InteractionSession, SessionParts, SessionResult};
use crate::tracking::{IntervalClock, Tracker, TrackerHandle, TrackingEvent, TrackingResult, VideoSource};
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct DemoVideo {
    size: CanvasDimensions,
}

impl DemoVideo {
    pub fn new(size: CanvasDimensions) -> Self {
        Self { size }
    }
}

#[async_trait]
impl VideoSource for DemoVideo {
    fn intrinsic_size(&self) -> CanvasDimensions {
        self.size
    }

    async fn seek(&self, position: Duration) -> TrackingResult<()> {
        tracing::debug!("Demo video seeked to {:?}", position);
        Ok(())
    }

    fn play(&self) -> TrackingResult<()> {
        tracing::debug!("Demo video playing");
        Ok(())
    }
}

/// Moves the seeded box by `(dx, dy)` pixels per frame.
pub struct DriftTracker {
    dx: i32,
    dy: i32,
}

impl DriftTracker {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl Tracker for DriftTracker {
    fn init(&self, _source: &dyn VideoSource, initial: CanonicalBox) -> TrackingResult<Box<dyn TrackerHandle>> {
        Ok(Box::new(Drift {
            current: initial,
            dx: self.dx,
            dy: self.dy,
        }))
    }
}

struct Drift {
    current: CanonicalBox,
    dx: i32,
    dy: i32,
}

#[async_trait]
impl TrackerHandle for Drift {
    async fn next(&mut self, _source: &dyn VideoSource) -> TrackingResult<CanonicalBox> {
        self.current = self.current.translated(self.dx, self.dy);
        Ok(self.current)
    }
}

#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Drag start and end in client coordinates.
    pub drag: (Point, Point),
    /// Tracked frames to render before stopping, at least one.
    pub frames: u64,
    pub velocity: (i32, i32),
    pub output: PathBuf,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            drag: (Point::new(100.0, 100.0), Point::new(300.0, 400.0)),
            frames: 120,
            velocity: (3, 1),
            output: PathBuf::from("boxtrack.png"),
        }
    }
}

/// Draw one box, track it for `options.frames` frames and save the final
/// surface as PNG. Returns the last tracked box.
pub async fn run_demo(config: &SessionConfig, options: &DemoOptions) -> SessionResult<Option<CanonicalBox>> {
    let surface = Arc::new(ParkingMutex::new(PixmapSurface::new(CanvasDimensions::new(1, 1))?));
    let parts = SessionParts {
        video: Arc::new(DemoVideo::new(CanvasDimensions::new(1280, 720))),
        tracker: Arc::new(DriftTracker::new(options.velocity.0, options.velocity.1)),
        surface: surface.clone(),
        clock: Arc::new(IntervalClock::new(config.frame_rate)),
    };
    let (mut session, mut events) = InteractionSession::new(parts, config)?;
    let dispatcher = InputDispatcher::new();
    session.mount(&dispatcher);
    session.on_data_loaded()?;

    let (from, to) = options.drag;
    dispatcher.dispatch(EventTarget::Container, PointerEventKind::MouseDown, PointerInput::mouse(from.x, from.y));
    dispatcher.dispatch(EventTarget::Document, PointerEventKind::MouseMove, PointerInput::mouse(to.x, to.y));
    dispatcher.dispatch(EventTarget::Document, PointerEventKind::MouseUp, PointerInput::mouse(to.x, to.y));
    session.pump()?;

    let mut last = None;
    while let Some(event) = events.recv().await {
        match event {
            TrackingEvent::Started { run_id, initial } => {
                tracing::info!("Demo run {} tracking {:?}", run_id, initial);
            }
            TrackingEvent::Frame { index, bbox, .. } => {
                last = Some(bbox);
                if index + 1 >= options.frames {
                    break;
                }
            }
            TrackingEvent::Stopped { .. } => break,
            TrackingEvent::Failed { error, .. } => return Err(error.into()),
        }
    }
    session.unmount();

    surface.lock().save_png(&options.output)?;
    tracing::info!("Wrote {:?}", options.output);
    Ok(last)
}
