//! Host event routing
//!
//! The host pushes every pointer event it sees into an [`InputDispatcher`]
//! together with where it was delivered. Sessions subscribe to the routes
//! they care about and receive matching events, in dispatch order, on their
//! own queue. Dropping the [`Subscription`] detaches the session.

use crate::input::types::{EventTarget, InputEvent, PointerEventKind, PointerInput};
use parking_lot::Mutex as ParkingMutex;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// One `(target, event kind)` pair a subscriber listens on.
pub type Route = (EventTarget, PointerEventKind);

/// Routes a box-drawing session needs: gestures start on the container,
/// move and end anywhere on the page.
pub const SESSION_ROUTES: [Route; 6] = [
    (EventTarget::Container, PointerEventKind::MouseDown),
    (EventTarget::Container, PointerEventKind::TouchStart),
    (EventTarget::Document, PointerEventKind::MouseMove),
    (EventTarget::Document, PointerEventKind::MouseUp),
    (EventTarget::Document, PointerEventKind::TouchMove),
    (EventTarget::Document, PointerEventKind::TouchEnd),
];

struct Listener {
    id: u64,
    routes: Vec<Route>,
    tx: mpsc::UnboundedSender<InputEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

#[derive(Clone, Default)]
pub struct InputDispatcher {
    registry: Arc<ParkingMutex<Registry>>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener for `routes`. Events flow until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, routes: &[Route]) -> (Subscription, mpsc::UnboundedReceiver<InputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            routes: routes.to_vec(),
            tx,
        });
        tracing::debug!("Input listener {} attached ({} routes)", id, routes.len());

        let subscription = Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        };
        (subscription, rx)
    }

    /// Deliver an event to every listener subscribed to `(target, kind)`.
    /// Returns how many listeners received it.
    pub fn dispatch(&self, target: EventTarget, kind: PointerEventKind, pointer: PointerInput) -> usize {
        let event = InputEvent::new(kind, pointer);
        let mut registry = self.registry.lock();
        // Receivers dropped without unsubscribing are pruned here.
        registry.listeners.retain(|l| !l.tx.is_closed());

        let mut delivered = 0;
        for listener in registry
            .listeners
            .iter()
            .filter(|l| l.routes.contains(&(target, kind)))
        {
            if listener.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

/// Scoped attachment to an [`InputDispatcher`].
pub struct Subscription {
    id: u64,
    registry: Weak<ParkingMutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|l| l.id != self.id);
            tracing::debug!("Input listener {} detached", self.id);
        }
    }
}
