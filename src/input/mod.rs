//! Pointer and touch input
//!
//! Unifies mouse and touch gesture streams into box-drawing transitions
//! and routes host events to the sessions listening for them.

pub mod controller;
pub mod dispatch;
pub mod types;

pub use controller::{DrawingState, InputError, InputResult, PointerInputController};
pub use dispatch::{InputDispatcher, Route, Subscription, SESSION_ROUTES};
pub use types::{
    ClientPosition, EventTarget, GesturePhase, InputEvent, MouseInput, PointerEventKind, PointerInput,
    TouchInput, TouchPoint,
};
