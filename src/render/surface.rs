use crate::geometry::{CanonicalBox, CanvasDimensions, Point};
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid surface size: {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("Invalid stroke width: {0}")]
    InvalidLineWidth(f32),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const YELLOW: Rgba = Rgba::opaque(255, 255, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl FromStr for Rgba {
    type Err = RenderError;

    /// Parses `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RenderError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

impl TryFrom<String> for Rgba {
    type Error = RenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        if c.a == 255 {
            format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
        }
    }
}

/// Outline style for highlighted boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    color: Rgba,
    line_width: f32,
}

impl StrokeStyle {
    pub fn new(color: Rgba, line_width: f32) -> RenderResult<Self> {
        if !line_width.is_finite() || line_width <= 0.0 {
            return Err(RenderError::InvalidLineWidth(line_width));
        }
        Ok(Self { color, line_width })
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }
}

impl Default for StrokeStyle {
    /// 2px yellow.
    fn default() -> Self {
        Self {
            color: Rgba::YELLOW,
            line_width: 2.0,
        }
    }
}

/// A 2D pixel surface layered over the video.
///
/// `clear` and `stroke_rect` cannot fail, so a render that has started
/// clearing always finishes drawing.
pub trait DrawingSurface: Send {
    fn dimensions(&self) -> CanvasDimensions;

    /// Reallocate the pixel buffer. Contents are discarded.
    fn resize(&mut self, dimensions: CanvasDimensions) -> RenderResult<()>;

    /// On-screen position of the surface's top-left corner in client
    /// coordinates. Changes when the page scrolls.
    fn client_origin(&self) -> Point;

    fn clear(&mut self);

    fn stroke_rect(&mut self, rect: CanonicalBox, style: &StrokeStyle);
}

/// Surface shared between live preview and the tracking loop. Holding the
/// lock for a whole render keeps clear + stroke atomic.
pub type SharedSurface = Arc<ParkingMutex<dyn DrawingSurface>>;

pub fn share_surface<S: DrawingSurface + 'static>(surface: S) -> SharedSurface {
    Arc::new(ParkingMutex::new(surface))
}
