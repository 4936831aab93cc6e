use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Anything that can report where on screen the user is pointing.
///
/// The drawing controller depends only on this, never on whether the
/// coordinates came from a mouse or a finger.
pub trait ClientPosition {
    /// Client (viewport) coordinates, or `None` when the event carries none.
    fn client_position(&self) -> Option<Point>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseInput {
    pub client_x: f64,
    pub client_y: f64,
}

impl ClientPosition for MouseInput {
    fn client_position(&self) -> Option<Point> {
        Some(Point::new(self.client_x, self.client_y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchInput {
    /// Touches currently on the surface, first one drives the gesture.
    pub touches: Vec<TouchPoint>,
}

impl ClientPosition for TouchInput {
    fn client_position(&self) -> Option<Point> {
        self.touches
            .first()
            .map(|t| Point::new(t.client_x, t.client_y))
    }
}

/// Mouse and touch payloads behind one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerInput {
    Mouse(MouseInput),
    Touch(TouchInput),
}

impl PointerInput {
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Mouse(MouseInput { client_x, client_y })
    }

    /// Single-finger touch.
    pub fn touch(client_x: f64, client_y: f64) -> Self {
        Self::Touch(TouchInput {
            touches: vec![TouchPoint {
                identifier: 0,
                client_x,
                client_y,
            }],
        })
    }

    /// Touch event whose touch list is empty, as `touchend` and
    /// `touchcancel` usually are.
    pub fn touch_released() -> Self {
        Self::Touch(TouchInput::default())
    }
}

impl ClientPosition for PointerInput {
    fn client_position(&self) -> Option<Point> {
        match self {
            PointerInput::Mouse(m) => m.client_position(),
            PointerInput::Touch(t) => t.client_position(),
        }
    }
}

/// Stage of a box-drawing gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

/// Host event types a session can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl PointerEventKind {
    /// Gesture phase this event drives. `touchcancel` drives none.
    pub fn phase(self) -> Option<GesturePhase> {
        match self {
            PointerEventKind::MouseDown | PointerEventKind::TouchStart => Some(GesturePhase::Start),
            PointerEventKind::MouseMove | PointerEventKind::TouchMove => Some(GesturePhase::Move),
            PointerEventKind::MouseUp | PointerEventKind::TouchEnd => Some(GesturePhase::End),
            PointerEventKind::TouchCancel => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PointerEventKind::MouseDown => "mousedown",
            PointerEventKind::MouseMove => "mousemove",
            PointerEventKind::MouseUp => "mouseup",
            PointerEventKind::TouchStart => "touchstart",
            PointerEventKind::TouchMove => "touchmove",
            PointerEventKind::TouchEnd => "touchend",
            PointerEventKind::TouchCancel => "touchcancel",
        }
    }
}

impl std::fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointerEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mousedown" => Ok(PointerEventKind::MouseDown),
            "mousemove" => Ok(PointerEventKind::MouseMove),
            "mouseup" => Ok(PointerEventKind::MouseUp),
            "touchstart" => Ok(PointerEventKind::TouchStart),
            "touchmove" => Ok(PointerEventKind::TouchMove),
            "touchend" => Ok(PointerEventKind::TouchEnd),
            "touchcancel" => Ok(PointerEventKind::TouchCancel),
            other => Err(format!("unknown pointer event: {}", other)),
        }
    }
}

/// Where the host delivered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTarget {
    /// The element wrapping the video and the drawing surface.
    Container,
    /// The whole page, so drags leaving the container keep tracking.
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub kind: PointerEventKind,
    pub pointer: PointerInput,
}

impl InputEvent {
    pub fn new(kind: PointerEventKind, pointer: PointerInput) -> Self {
        Self { kind, pointer }
    }
}
