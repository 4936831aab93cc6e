//! boxtrack - draw a box over a paused video frame and follow it.
//!
//! The user drags out a box with mouse or touch input. Once released, the
//! video restarts, an external tracker is seeded with the box, and every
//! display frame the tracker's estimate is drawn over the video.

pub mod config;
pub mod demo;
pub mod geometry;
pub mod input;
pub mod render;
pub mod session;
pub mod tracking;

#[cfg(test)]
mod testing;

pub use config::SessionConfig;
pub use geometry::{normalize, CanonicalBox, CanvasDimensions, Point, RawBox};
pub use session::{GestureOutcome, InteractionSession, SessionError, SessionParts, SessionResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxtrack_lib=debug,boxtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
