//! Frame-synchronous tracking
//!
//! Once a box is drawn, the tracking loop seeds the external tracker, then
//! asks it for the box's new position once per display frame and redraws.

pub mod cancel;
pub mod clock;
pub mod collaborator;
pub mod controller;

pub use cancel::CancelToken;
pub use clock::{FrameClock, FrameTrigger, IntervalClock, ManualClock};
pub use collaborator::{Tracker, TrackerHandle, TrackingError, TrackingResult, VideoSource};
pub use controller::{LoopState, StopReason, TrackingEvent, TrackingLoopController, TrackingRun};
