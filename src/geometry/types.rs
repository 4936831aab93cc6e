use serde::{Deserialize, Serialize};

/// A position in surface-local (or client) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Box as it exists mid-gesture.
///
/// `(x, y)` is the anchor where the gesture started. `w` and `h` are signed
/// deltas from the anchor to the pointer and go negative when the user drags
/// up or to the left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RawBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Zero-sized box anchored at `p`.
    pub fn anchored_at(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Replace the deltas so the box spans from the anchor to `p`.
    /// The anchor itself never moves.
    pub fn dragged_to(self, p: Point) -> Self {
        Self::new(self.x, self.y, p.x - self.x, p.y - self.y)
    }
}

impl From<CanonicalBox> for RawBox {
    fn from(b: CanonicalBox) -> Self {
        Self::new(
            f64::from(b.xmin),
            f64::from(b.ymin),
            f64::from(b.width),
            f64::from(b.height),
        )
    }
}

/// Integer box with non-negative size, laid out `(xmin, ymin, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CanonicalBox {
    pub xmin: i32,
    pub ymin: i32,
    pub width: u32,
    pub height: u32,
}

impl CanonicalBox {
    pub const EMPTY: CanonicalBox = CanonicalBox {
        xmin: 0,
        ymin: 0,
        width: 0,
        height: 0,
    };

    pub fn new(xmin: i32, ymin: i32, width: u32, height: u32) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shift the box by whole pixels, keeping its size.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            xmin: self.xmin.saturating_add(dx),
            ymin: self.ymin.saturating_add(dy),
            ..self
        }
    }
}

/// Pixel size of the drawing surface, mirrored from the video's intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

impl CanvasDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp `p` into `[0, width] x [0, height]`. NaN coordinates land on 0.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.max(0.0).min(f64::from(self.width)),
            p.y.max(0.0).min(f64::from(self.height)),
        )
    }
}
