//! Box rendering
//!
//! A drawing surface abstraction, a tiny-skia raster implementation of it,
//! and the renderer that clears and outlines one box per call.

pub mod pixmap;
pub mod renderer;
pub mod surface;

pub use pixmap::PixmapSurface;
pub use renderer::FrameRenderer;
pub use surface::{share_surface, DrawingSurface, RenderError, RenderResult, Rgba, SharedSurface, StrokeStyle};
