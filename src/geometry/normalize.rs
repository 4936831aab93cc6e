//! Canonicalization of signed boxes

use super::types::{CanonicalBox, RawBox};

/// Map a possibly backwards-drawn box to `(xmin, ymin, width, height)`.
///
/// A missing box maps to `(0, 0, 0, 0)`. Negative deltas move the minimum
/// corner back by their magnitude. Every field is rounded to the nearest
/// integer with halves going up, so integral input passes through unchanged.
pub fn normalize(raw: Option<RawBox>) -> CanonicalBox {
    let Some(raw) = raw else {
        return CanonicalBox::EMPTY;
    };

    let xmin = if raw.w < 0.0 { raw.x - raw.w.abs() } else { raw.x };
    let ymin = if raw.h < 0.0 { raw.y - raw.h.abs() } else { raw.y };

    // `as` saturates and maps NaN to 0, so this never fails.
    CanonicalBox {
        xmin: round_half_up(xmin) as i32,
        ymin: round_half_up(ymin) as i32,
        width: round_half_up(raw.w.abs()) as u32,
        height: round_half_up(raw.h.abs()) as u32,
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

impl RawBox {
    pub fn normalized(self) -> CanonicalBox {
        normalize(Some(self))
    }
}
