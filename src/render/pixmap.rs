//! Raster drawing surface backed by tiny-skia

use super::surface::{DrawingSurface, RenderError, RenderResult, StrokeStyle};
use crate::geometry::{CanonicalBox, CanvasDimensions, Point};
use std::path::Path;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

pub struct PixmapSurface {
    pixmap: Pixmap,
    origin: Point,
}

impl PixmapSurface {
    pub fn new(dimensions: CanvasDimensions) -> RenderResult<Self> {
        Ok(Self {
            pixmap: allocate(dimensions)?,
            origin: Point::default(),
        })
    }

    pub fn set_client_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight RGBA at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn save_png(&self, path: &Path) -> RenderResult<()> {
        self.pixmap
            .save_png(path)
            .map_err(|e| RenderError::ExportFailed(e.to_string()))
    }
}

fn allocate(dimensions: CanvasDimensions) -> RenderResult<Pixmap> {
    Pixmap::new(dimensions.width, dimensions.height)
        .ok_or(RenderError::InvalidDimensions(dimensions.width, dimensions.height))
}

impl DrawingSurface for PixmapSurface {
    fn dimensions(&self) -> CanvasDimensions {
        CanvasDimensions::new(self.pixmap.width(), self.pixmap.height())
    }

    fn resize(&mut self, dimensions: CanvasDimensions) -> RenderResult<()> {
        self.pixmap = allocate(dimensions)?;
        Ok(())
    }

    fn client_origin(&self) -> Point {
        self.origin
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn stroke_rect(&mut self, rect: CanonicalBox, style: &StrokeStyle) {
        let Some(bounds) = Rect::from_xywh(
            rect.xmin as f32,
            rect.ymin as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            tracing::trace!("Skipping unrepresentable rect {:?}", rect);
            return;
        };
        let path = PathBuilder::from_rect(bounds);

        let color = style.color();
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = false;

        let stroke = Stroke {
            width: style.line_width(),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
