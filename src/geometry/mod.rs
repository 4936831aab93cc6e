//! Box geometry
//!
//! Signed boxes produced while dragging, the canonical non-negative form
//! used for rendering and tracking, and the rule that maps one to the other.

pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::{CanonicalBox, CanvasDimensions, Point, RawBox};
