use crate::geometry::{CanonicalBox, CanvasDimensions, Point, RawBox};
use crate::input::types::{ClientPosition, PointerEventKind};
use thiserror::Error;

/// Errors raised while turning pointer events into box edits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{0} event carries neither client coordinates nor a touch point")]
    MissingCoordinates(PointerEventKind),

    #[error("{0} event does not drive a drawing gesture")]
    UnsupportedEvent(PointerEventKind),
}

pub type InputResult<T> = Result<T, InputError>;

/// Box-drawing state. The live box only exists while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing(RawBox),
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawingState::Drawing(_))
    }

    pub fn raw_box(&self) -> Option<RawBox> {
        match self {
            DrawingState::Idle => None,
            DrawingState::Drawing(raw) => Some(*raw),
        }
    }
}

/// Pointer gesture state machine.
///
/// Translates client coordinates into surface-local ones, clamps them to the
/// canvas and replaces the live [`RawBox`] wholesale on every transition.
/// It performs no rendering or tracking itself; callers act on the values it
/// returns.
#[derive(Debug, Default)]
pub struct PointerInputController {
    state: DrawingState,
    canvas: CanvasDimensions,
}

impl PointerInputController {
    pub fn new(canvas: CanvasDimensions) -> Self {
        Self {
            state: DrawingState::Idle,
            canvas,
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn canvas(&self) -> CanvasDimensions {
        self.canvas
    }

    pub fn set_canvas(&mut self, canvas: CanvasDimensions) {
        self.canvas = canvas;
    }

    /// Idle -> Drawing. Anchors a zero-sized box at the clamped pointer.
    ///
    /// `origin` is the on-screen top-left of the drawing surface.
    pub fn begin(
        &mut self,
        kind: PointerEventKind,
        pointer: &dyn ClientPosition,
        origin: Point,
    ) -> InputResult<RawBox> {
        let p = self.to_surface(kind, pointer, origin)?;
        if let DrawingState::Drawing(previous) = self.state {
            tracing::debug!("Gesture restarted, dropping box anchored at {:?}", previous.anchor());
        }
        let raw = RawBox::anchored_at(p);
        self.state = DrawingState::Drawing(raw);
        tracing::debug!("Drawing started at ({}, {})", raw.x, raw.y);
        Ok(raw)
    }

    /// Drawing -> Drawing. Returns the canonical preview box, or `None`
    /// when no gesture is in progress.
    pub fn drag(
        &mut self,
        kind: PointerEventKind,
        pointer: &dyn ClientPosition,
        origin: Point,
    ) -> InputResult<Option<CanonicalBox>> {
        let DrawingState::Drawing(raw) = self.state else {
            return Ok(None);
        };
        let p = self.to_surface(kind, pointer, origin)?;
        let raw = raw.dragged_to(p);
        self.state = DrawingState::Drawing(raw);
        Ok(Some(raw.normalized()))
    }

    /// Drawing -> Idle. Returns the finished canonical box, or `None` when
    /// no gesture was in progress.
    pub fn finish(&mut self) -> Option<CanonicalBox> {
        let raw = std::mem::take(&mut self.state).raw_box()?;
        let canonical = raw.normalized();
        tracing::debug!("Drawing finished: {:?}", canonical);
        Some(canonical)
    }

    fn to_surface(
        &self,
        kind: PointerEventKind,
        pointer: &dyn ClientPosition,
        origin: Point,
    ) -> InputResult<Point> {
        let client = pointer
            .client_position()
            .ok_or(InputError::MissingCoordinates(kind))?;
        Ok(self
            .canvas
            .clamp(Point::new(client.x - origin.x, client.y - origin.y)))
    }
}
