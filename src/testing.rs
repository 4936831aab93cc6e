//! Fakes shared by unit tests

use crate::geometry::{CanonicalBox, CanvasDimensions, Point};
use crate::render::{DrawingSurface, RenderError, RenderResult, StrokeStyle};
use crate::tracking::{Tracker, TrackerHandle, TrackingError, TrackingResult, VideoSource};
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    Stroke(CanonicalBox, StrokeStyle),
}

/// Surface that logs draw calls instead of rasterizing.
pub struct RecordingSurface {
    pub dimensions: CanvasDimensions,
    pub origin: Point,
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new(dimensions: CanvasDimensions) -> Self {
        Self {
            dimensions,
            origin: Point::default(),
            ops: Vec::new(),
        }
    }

    /// Boxes stroked so far, in order.
    pub fn strokes(&self) -> Vec<CanonicalBox> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Stroke(b, _) => Some(*b),
                SurfaceOp::Clear => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn dimensions(&self) -> CanvasDimensions {
        self.dimensions
    }

    fn resize(&mut self, dimensions: CanvasDimensions) -> RenderResult<()> {
        if dimensions.is_empty() {
            return Err(RenderError::InvalidDimensions(dimensions.width, dimensions.height));
        }
        self.dimensions = dimensions;
        Ok(())
    }

    fn client_origin(&self) -> Point {
        self.origin
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn stroke_rect(&mut self, rect: CanonicalBox, style: &StrokeStyle) {
        self.ops.push(SurfaceOp::Stroke(rect, *style));
    }
}

/// Video whose seeks resolve immediately unless told otherwise.
pub struct ScriptedVideo {
    size: CanvasDimensions,
    stall_seek: bool,
    fail_seek: bool,
    seeks: ParkingMutex<Vec<Duration>>,
    plays: AtomicUsize,
}

impl ScriptedVideo {
    pub fn new(size: CanvasDimensions) -> Self {
        Self {
            size,
            stall_seek: false,
            fail_seek: false,
            seeks: ParkingMutex::new(Vec::new()),
            plays: AtomicUsize::new(0),
        }
    }

    /// Seeks never complete.
    pub fn with_stalled_seek(mut self) -> Self {
        self.stall_seek = true;
        self
    }

    pub fn with_failing_seek(mut self) -> Self {
        self.fail_seek = true;
        self
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.seeks.lock().clone()
    }

    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSource for ScriptedVideo {
    fn intrinsic_size(&self) -> CanvasDimensions {
        self.size
    }

    async fn seek(&self, position: Duration) -> TrackingResult<()> {
        self.seeks.lock().push(position);
        if self.stall_seek {
            std::future::pending::<()>().await;
        }
        if self.fail_seek {
            return Err(TrackingError::SeekFailed("decoder gone".to_string()));
        }
        Ok(())
    }

    fn play(&self) -> TrackingResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct TrackerStats {
    requests: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Tracker that moves the seeded box by a fixed step every frame.
pub struct ScriptedTracker {
    dx: i32,
    dy: i32,
    fail_at: Option<u64>,
    fail_init: bool,
    seeds: ParkingMutex<Vec<CanonicalBox>>,
    stats: Arc<TrackerStats>,
}

impl ScriptedTracker {
    pub fn drifting(dx: i32, dy: i32) -> Self {
        Self {
            dx,
            dy,
            fail_at: None,
            fail_init: false,
            seeds: ParkingMutex::new(Vec::new()),
            stats: Arc::new(TrackerStats::default()),
        }
    }

    /// Request number `index` (0-based, per handle) rejects.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn seeds(&self) -> Vec<CanonicalBox> {
        self.seeds.lock().clone()
    }

    pub fn requests(&self) -> u64 {
        self.stats.requests.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Tracker for ScriptedTracker {
    fn init(&self, _source: &dyn VideoSource, initial: CanonicalBox) -> TrackingResult<Box<dyn TrackerHandle>> {
        if self.fail_init {
            return Err(TrackingError::InitFailed("model not loaded".to_string()));
        }
        self.seeds.lock().push(initial);
        Ok(Box::new(ScriptedHandle {
            current: initial,
            dx: self.dx,
            dy: self.dy,
            fail_at: self.fail_at,
            index: 0,
            stats: self.stats.clone(),
        }))
    }
}

struct ScriptedHandle {
    current: CanonicalBox,
    dx: i32,
    dy: i32,
    fail_at: Option<u64>,
    index: u64,
    stats: Arc<TrackerStats>,
}

#[async_trait]
impl TrackerHandle for ScriptedHandle {
    async fn next(&mut self, _source: &dyn VideoSource) -> TrackingResult<CanonicalBox> {
        let in_flight = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.stats.requests.fetch_add(1, Ordering::SeqCst);

        // Give any concurrent request a chance to overlap.
        tokio::task::yield_now().await;

        let index = self.index;
        self.index += 1;
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_at == Some(index) {
            return Err(TrackingError::RequestFailed("lost target".to_string()));
        }
        self.current = self.current.translated(self.dx, self.dy);
        Ok(self.current)
    }
}
