//! Display-frame scheduling

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{Interval, MissedTickBehavior};

/// Source of display-frame callbacks.
#[async_trait]
pub trait FrameClock: Send + Sync {
    /// Wait for the next display frame. Returns `false` once the clock
    /// will never produce another frame.
    async fn next_frame(&self) -> bool;
}

/// 60 Hz.
const DEFAULT_PERIOD: Duration = Duration::from_micros(16_667);

/// Fixed-rate clock for hosts without a compositor callback.
pub struct IntervalClock {
    interval: Mutex<Interval>,
}

impl IntervalClock {
    /// Must be called from within a tokio runtime. Rates that do not map
    /// to a usable period fall back to 60 Hz.
    pub fn new(frames_per_second: f64) -> Self {
        let period = Duration::try_from_secs_f64(1.0 / frames_per_second)
            .ok()
            .filter(|p| !p.is_zero())
            .unwrap_or(DEFAULT_PERIOD);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval: Mutex::new(interval),
        }
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&self) -> bool {
        self.interval.lock().await.tick().await;
        true
    }
}

/// Clock ticked by the host, one [`FrameTrigger::request_frame`] per
/// display frame.
///
/// Frames are not queued. A call to [`FrameClock::next_frame`] waits for a
/// frame requested after it started waiting, and any number of requests
/// made while nobody waits collapse into at most one.
pub struct ManualClock {
    frames: Mutex<watch::Receiver<u64>>,
}

#[derive(Clone)]
pub struct FrameTrigger {
    tx: Arc<watch::Sender<u64>>,
}

impl ManualClock {
    pub fn new() -> (FrameTrigger, ManualClock) {
        let (tx, rx) = watch::channel(0);
        (
            FrameTrigger { tx: Arc::new(tx) },
            ManualClock {
                frames: Mutex::new(rx),
            },
        )
    }
}

impl FrameTrigger {
    /// Signal one display frame. Returns `false` if the clock is gone.
    pub fn request_frame(&self) -> bool {
        self.tx.send_modify(|frame| *frame = frame.wrapping_add(1));
        !self.tx.is_closed()
    }
}

#[async_trait]
impl FrameClock for ManualClock {
    async fn next_frame(&self) -> bool {
        let mut frames = self.frames.lock().await;
        // Frames requested before this call are stale.
        frames.borrow_and_update();
        frames.changed().await.is_ok()
    }
}
