//! Interaction session
//!
//! Owns one drawing surface over one video. Pointer events drive the
//! drawing controller; finished gestures hand the box to the tracking loop.

use crate::config::{ConfigError, SessionConfig};
use crate::geometry::{CanonicalBox, CanvasDimensions, RawBox};
use crate::input::{
    DrawingState, GesturePhase, InputDispatcher, InputError, InputEvent, PointerInputController, Subscription,
    SESSION_ROUTES,
};
use crate::render::{FrameRenderer, RenderError, SharedSurface};
use crate::tracking::{FrameClock, LoopState, Tracker, TrackingError, TrackingEvent, TrackingLoopController, VideoSource};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session is not mounted")]
    NotMounted,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What a single input event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Event arrived in a state where it means nothing.
    Ignored,
    Started(RawBox),
    /// Live preview drawn for the box so far.
    Previewed(CanonicalBox),
    /// Box finished, drawn and handed to the tracker.
    Finished(CanonicalBox),
}

/// External collaborators a session drives.
pub struct SessionParts {
    pub video: Arc<dyn VideoSource>,
    pub tracker: Arc<dyn Tracker>,
    pub surface: SharedSurface,
    pub clock: Arc<dyn FrameClock>,
}

pub struct InteractionSession {
    controller: PointerInputController,
    renderer: FrameRenderer,
    surface: SharedSurface,
    video: Arc<dyn VideoSource>,
    tracker: Arc<dyn Tracker>,
    tracking: TrackingLoopController,
    input: Option<(Subscription, mpsc::UnboundedReceiver<InputEvent>)>,
}

impl InteractionSession {
    /// Build a session and the channel its tracking progress and failures
    /// are reported on.
    pub fn new(
        parts: SessionParts,
        config: &SessionConfig,
    ) -> SessionResult<(Self, mpsc::UnboundedReceiver<TrackingEvent>)> {
        config.validate()?;
        let renderer = FrameRenderer::new(config.stroke_style()?);
        let canvas = parts.surface.lock().dimensions();
        let (tracking, tracking_events) = TrackingLoopController::new(
            renderer,
            parts.surface.clone(),
            parts.clock,
            config.seek_position(),
        );

        let session = Self {
            controller: PointerInputController::new(canvas),
            renderer,
            surface: parts.surface,
            video: parts.video,
            tracker: parts.tracker,
            tracking,
            input: None,
        };
        Ok((session, tracking_events))
    }

    /// Start listening on `dispatcher`. Remounting replaces the previous
    /// subscription.
    pub fn mount(&mut self, dispatcher: &InputDispatcher) {
        let (subscription, rx) = dispatcher.subscribe(&SESSION_ROUTES);
        tracing::debug!("Session mounted (listener {})", subscription.id());
        self.input = Some((subscription, rx));
    }

    /// Stop listening and stop tracking.
    pub fn unmount(&mut self) {
        if self.input.take().is_some() {
            tracing::debug!("Session unmounted");
        }
        self.tracking.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        self.input.is_some()
    }

    pub fn drawing_state(&self) -> DrawingState {
        self.controller.state()
    }

    pub fn loop_state(&self) -> LoopState {
        self.tracking.state()
    }

    pub fn canvas(&self) -> CanvasDimensions {
        self.controller.canvas()
    }

    pub fn tracking(&self) -> &TrackingLoopController {
        &self.tracking
    }

    /// The video's data has loaded: size the surface to match it.
    pub fn on_data_loaded(&mut self) -> SessionResult<CanvasDimensions> {
        let size = self.video.intrinsic_size();
        self.surface.lock().resize(size)?;
        self.controller.set_canvas(size);
        tracing::info!("Canvas sized to {}x{}", size.width, size.height);
        Ok(size)
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> SessionResult<GestureOutcome> {
        let phase = event
            .kind
            .phase()
            .ok_or(InputError::UnsupportedEvent(event.kind))?;
        let origin = self.surface.lock().client_origin();

        match phase {
            GesturePhase::Start => {
                // Nothing else may write the surface while a box is drawn.
                self.tracking.cancel();
                let raw = self.controller.begin(event.kind, &event.pointer, origin)?;
                Ok(GestureOutcome::Started(raw))
            }
            GesturePhase::Move => match self.controller.drag(event.kind, &event.pointer, origin)? {
                Some(preview) => {
                    self.renderer.render(&mut *self.surface.lock(), preview);
                    Ok(GestureOutcome::Previewed(preview))
                }
                None => Ok(GestureOutcome::Ignored),
            },
            GesturePhase::End => {
                let Some(canonical) = self.controller.finish() else {
                    return Ok(GestureOutcome::Ignored);
                };
                self.renderer.render(&mut *self.surface.lock(), canonical);
                self.tracking
                    .start(self.video.clone(), self.tracker.clone(), canonical)?;
                Ok(GestureOutcome::Finished(canonical))
            }
        }
    }

    /// Handle every queued input event in dispatch order. Stops at the
    /// first failure, leaving later events queued.
    pub fn pump(&mut self) -> SessionResult<usize> {
        let mut handled = 0;
        while let Some(event) = self.try_next_event()? {
            self.handle_event(&event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Handle input events as they arrive until the dispatcher goes away.
    pub async fn listen(&mut self) -> SessionResult<()> {
        loop {
            let event = {
                let (_, rx) = self.input.as_mut().ok_or(SessionError::NotMounted)?;
                rx.recv().await
            };
            match event {
                Some(event) => {
                    self.handle_event(&event)?;
                }
                None => return Ok(()),
            }
        }
    }

    fn try_next_event(&mut self) -> SessionResult<Option<InputEvent>> {
        let (_, rx) = self.input.as_mut().ok_or(SessionError::NotMounted)?;
        Ok(rx.try_recv().ok())
    }
}

impl Drop for InteractionSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::input::{EventTarget, PointerEventKind, PointerInput};
    use crate::render::{share_surface, PixmapSurface, StrokeStyle};
    use crate::testing::{RecordingSurface, ScriptedTracker, ScriptedVideo, SurfaceOp};
    use crate::tracking::{FrameTrigger, ManualClock, StopReason};
    use parking_lot::Mutex as ParkingMutex;
    use std::time::Duration;

    struct Harness {
        session: InteractionSession,
        dispatcher: InputDispatcher,
        surface: Arc<ParkingMutex<RecordingSurface>>,
        tracker: Arc<ScriptedTracker>,
        video: Arc<ScriptedVideo>,
        trigger: FrameTrigger,
        events: mpsc::UnboundedReceiver<TrackingEvent>,
    }

    fn harness_with(video: ScriptedVideo, tracker: ScriptedTracker) -> Harness {
        let surface = Arc::new(ParkingMutex::new(RecordingSurface::new(CanvasDimensions::new(1, 1))));
        let video = Arc::new(video);
        let tracker = Arc::new(tracker);
        let (trigger, clock) = ManualClock::new();
        let parts = SessionParts {
            video: video.clone(),
            tracker: tracker.clone(),
            surface: surface.clone(),
            clock: Arc::new(clock),
        };
        let (mut session, events) = InteractionSession::new(parts, &SessionConfig::default()).unwrap();
        let dispatcher = InputDispatcher::new();
        session.mount(&dispatcher);
        session.on_data_loaded().unwrap();
        Harness {
            session,
            dispatcher,
            surface,
            tracker,
            video,
            trigger,
            events,
        }
    }

    fn harness() -> Harness {
        harness_with(
            ScriptedVideo::new(CanvasDimensions::new(1280, 720)),
            ScriptedTracker::drifting(2, 1),
        )
    }

    fn mouse(h: &Harness, target: EventTarget, kind: PointerEventKind, x: f64, y: f64) {
        h.dispatcher.dispatch(target, kind, PointerInput::mouse(x, y));
    }

    fn draw(h: &Harness, from: (f64, f64), to: (f64, f64)) {
        mouse(h, EventTarget::Container, PointerEventKind::MouseDown, from.0, from.1);
        mouse(h, EventTarget::Document, PointerEventKind::MouseMove, to.0, to.1);
        mouse(h, EventTarget::Document, PointerEventKind::MouseUp, to.0, to.1);
    }

    #[tokio::test]
    async fn test_data_loaded_sizes_canvas() {
        let h = harness();
        assert_eq!(h.session.canvas(), CanvasDimensions::new(1280, 720));
        assert_eq!(h.surface.lock().dimensions, CanvasDimensions::new(1280, 720));
    }

    #[tokio::test]
    async fn test_forward_drag_end_to_end() {
        let mut h = harness();
        mouse(&h, EventTarget::Container, PointerEventKind::MouseDown, 100.0, 100.0);
        h.session.pump().unwrap();
        assert_eq!(
            h.session.drawing_state(),
            DrawingState::Drawing(RawBox::new(100.0, 100.0, 0.0, 0.0))
        );

        mouse(&h, EventTarget::Document, PointerEventKind::MouseMove, 300.0, 400.0);
        h.session.pump().unwrap();
        assert_eq!(
            h.session.drawing_state(),
            DrawingState::Drawing(RawBox::new(100.0, 100.0, 200.0, 300.0))
        );

        mouse(&h, EventTarget::Document, PointerEventKind::MouseUp, 300.0, 400.0);
        h.session.pump().unwrap();
        assert_eq!(h.session.drawing_state(), DrawingState::Idle);

        let expected = CanonicalBox::new(100, 100, 200, 300);
        assert!(matches!(
            h.events.recv().await,
            Some(TrackingEvent::Started { initial, .. }) if initial == expected
        ));
        assert_eq!(h.tracker.seeds(), vec![expected]);
        assert_eq!(h.video.seeks(), vec![Duration::ZERO]);
        assert_eq!(h.video.play_count(), 1);
    }

    #[tokio::test]
    async fn test_backward_drag_matches_forward() {
        let mut h = harness();
        mouse(&h, EventTarget::Container, PointerEventKind::MouseDown, 300.0, 400.0);
        mouse(&h, EventTarget::Document, PointerEventKind::MouseMove, 100.0, 100.0);
        h.session.pump().unwrap();
        assert_eq!(
            h.session.drawing_state(),
            DrawingState::Drawing(RawBox::new(300.0, 400.0, -200.0, -300.0))
        );

        mouse(&h, EventTarget::Document, PointerEventKind::MouseUp, 100.0, 100.0);
        h.session.pump().unwrap();
        h.events.recv().await;
        assert_eq!(h.tracker.seeds(), vec![CanonicalBox::new(100, 100, 200, 300)]);
    }

    #[tokio::test]
    async fn test_preview_and_optimistic_final_render() {
        let mut h = harness();
        draw(&h, (10.0, 10.0), (40.0, 30.0));
        assert_eq!(h.session.pump().unwrap(), 3);

        // Preview on move, final render on release, both before any tracking.
        let b = CanonicalBox::new(10, 10, 30, 20);
        assert_eq!(
            h.surface.lock().ops,
            vec![
                SurfaceOp::Clear,
                SurfaceOp::Stroke(b, StrokeStyle::default()),
                SurfaceOp::Clear,
                SurfaceOp::Stroke(b, StrokeStyle::default()),
            ]
        );
    }

    #[tokio::test]
    async fn test_tracked_frames_are_rendered() {
        let mut h = harness();
        draw(&h, (100.0, 100.0), (300.0, 400.0));
        h.session.pump().unwrap();
        h.events.recv().await;

        for i in 1..=3 {
            h.trigger.request_frame();
            match h.events.recv().await {
                Some(TrackingEvent::Frame { bbox, .. }) => {
                    assert_eq!(bbox, CanonicalBox::new(100 + 2 * i, 100 + i, 200, 300));
                }
                other => panic!("expected frame, got {:?}", other),
            }
        }
        let strokes = h.surface.lock().strokes();
        assert_eq!(strokes.last(), Some(&CanonicalBox::new(106, 103, 200, 300)));
        assert_eq!(h.session.loop_state(), LoopState::Running);
        assert_eq!(h.tracker.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_frames_requested_while_drawing_are_not_replayed() {
        let mut h = harness();
        mouse(&h, EventTarget::Container, PointerEventKind::MouseDown, 100.0, 100.0);
        h.session.pump().unwrap();
        for _ in 0..5 {
            h.trigger.request_frame();
        }
        mouse(&h, EventTarget::Document, PointerEventKind::MouseMove, 300.0, 400.0);
        mouse(&h, EventTarget::Document, PointerEventKind::MouseUp, 300.0, 400.0);
        h.session.pump().unwrap();
        assert!(matches!(h.events.recv().await, Some(TrackingEvent::Started { .. })));

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.tracker.requests(), 0);

        h.trigger.request_frame();
        assert!(matches!(
            h.events.recv().await,
            Some(TrackingEvent::Frame { index: 0, .. })
        ));
        assert_eq!(h.tracker.requests(), 1);
    }

    #[tokio::test]
    async fn test_move_while_idle_is_noop() {
        let mut h = harness();
        mouse(&h, EventTarget::Document, PointerEventKind::MouseMove, 50.0, 50.0);
        h.session.pump().unwrap();
        assert_eq!(h.session.drawing_state(), DrawingState::Idle);
        assert!(h.surface.lock().ops.is_empty());
    }

    #[tokio::test]
    async fn test_release_while_idle_does_not_track() {
        let mut h = harness();
        mouse(&h, EventTarget::Document, PointerEventKind::MouseUp, 50.0, 50.0);
        h.session.pump().unwrap();
        assert_eq!(h.session.loop_state(), LoopState::NotStarted);
        assert!(h.video.seeks().is_empty());
    }

    #[tokio::test]
    async fn test_drag_leaving_container_is_clamped() {
        let mut h = harness();
        draw(&h, (1200.0, 700.0), (5000.0, 5000.0));
        h.session.pump().unwrap();
        h.events.recv().await;
        assert_eq!(h.tracker.seeds(), vec![CanonicalBox::new(1200, 700, 80, 20)]);
    }

    #[tokio::test]
    async fn test_scrolled_surface_offsets_coordinates() {
        let mut h = harness();
        h.surface.lock().origin = Point::new(20.0, -100.0);
        draw(&h, (120.0, 0.0), (220.0, 50.0));
        h.session.pump().unwrap();
        h.events.recv().await;
        assert_eq!(h.tracker.seeds(), vec![CanonicalBox::new(100, 100, 100, 50)]);
    }

    #[tokio::test]
    async fn test_touch_gesture() {
        let mut h = harness();
        h.dispatcher
            .dispatch(EventTarget::Container, PointerEventKind::TouchStart, PointerInput::touch(5.0, 5.0));
        h.dispatcher
            .dispatch(EventTarget::Document, PointerEventKind::TouchMove, PointerInput::touch(25.0, 15.0));
        // touchend carries no touches; that is fine for a release
        h.dispatcher
            .dispatch(EventTarget::Document, PointerEventKind::TouchEnd, PointerInput::touch_released());
        h.session.pump().unwrap();
        h.events.recv().await;
        assert_eq!(h.tracker.seeds(), vec![CanonicalBox::new(5, 5, 20, 10)]);
    }

    #[tokio::test]
    async fn test_touch_move_without_touches_fails_loudly() {
        let mut h = harness();
        h.dispatcher
            .dispatch(EventTarget::Container, PointerEventKind::TouchStart, PointerInput::touch(5.0, 5.0));
        h.dispatcher
            .dispatch(EventTarget::Document, PointerEventKind::TouchMove, PointerInput::touch_released());
        h.dispatcher
            .dispatch(EventTarget::Document, PointerEventKind::TouchMove, PointerInput::touch(9.0, 9.0));

        let err = h.session.pump().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Input(InputError::MissingCoordinates(PointerEventKind::TouchMove))
        ));
        // Drawing survives, and the queued move is still processed afterwards.
        assert!(h.session.drawing_state().is_drawing());
        assert_eq!(h.session.pump().unwrap(), 1);
        assert_eq!(
            h.session.drawing_state().raw_box(),
            Some(RawBox::new(5.0, 5.0, 4.0, 4.0))
        );
    }

    #[tokio::test]
    async fn test_touch_cancel_is_unsupported() {
        let mut h = harness();
        let event = InputEvent::new(PointerEventKind::TouchCancel, PointerInput::touch_released());
        assert!(matches!(
            h.session.handle_event(&event),
            Err(SessionError::Input(InputError::UnsupportedEvent(PointerEventKind::TouchCancel)))
        ));
    }

    #[tokio::test]
    async fn test_new_gesture_cancels_tracking() {
        let mut h = harness();
        draw(&h, (100.0, 100.0), (300.0, 400.0));
        h.session.pump().unwrap();
        let first = match h.events.recv().await {
            Some(TrackingEvent::Started { run_id, .. }) => run_id,
            other => panic!("expected start, got {:?}", other),
        };

        mouse(&h, EventTarget::Container, PointerEventKind::MouseDown, 10.0, 10.0);
        h.session.pump().unwrap();
        assert_eq!(
            h.events.recv().await,
            Some(TrackingEvent::Stopped { run_id: first, reason: StopReason::Cancelled, frames: 0 })
        );
        assert_eq!(h.session.loop_state(), LoopState::Stopped);

        // Frames requested while drawing never reach the surface.
        let before = h.surface.lock().ops.len();
        h.trigger.request_frame();
        tokio::task::yield_now().await;
        assert_eq!(h.surface.lock().ops.len(), before);
        assert_eq!(h.tracker.requests(), 0);
    }

    #[tokio::test]
    async fn test_seek_failure_is_reported() {
        let mut h = harness_with(
            ScriptedVideo::new(CanvasDimensions::new(640, 480)).with_failing_seek(),
            ScriptedTracker::drifting(0, 0),
        );
        draw(&h, (1.0, 1.0), (11.0, 11.0));
        h.session.pump().unwrap();
        assert!(matches!(
            h.events.recv().await,
            Some(TrackingEvent::Failed { error: TrackingError::SeekFailed(_), .. })
        ));
        assert!(h.tracker.seeds().is_empty());
        assert_eq!(h.session.drawing_state(), DrawingState::Idle);
    }

    #[tokio::test]
    async fn test_unmount_detaches_and_stops() {
        let mut h = harness();
        draw(&h, (0.0, 0.0), (10.0, 10.0));
        h.session.pump().unwrap();
        h.events.recv().await;

        h.session.unmount();
        assert_eq!(h.dispatcher.listener_count(), 0);
        assert!(matches!(h.events.recv().await, Some(TrackingEvent::Stopped { reason: StopReason::Cancelled, .. })));
        assert!(matches!(h.session.pump(), Err(SessionError::NotMounted)));
    }

    #[tokio::test]
    async fn test_drop_detaches_listener() {
        let h = harness();
        let dispatcher = h.dispatcher.clone();
        assert_eq!(dispatcher.listener_count(), 1);
        drop(h);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_listen_processes_until_dispatcher_dropped() {
        let h = harness();
        draw(&h, (10.0, 10.0), (20.0, 20.0));
        let Harness { mut session, dispatcher, tracker, mut events, .. } = h;
        drop(dispatcher);
        // Queued events still drain before the closed channel ends the loop.
        session.listen().await.unwrap();
        events.recv().await;
        assert_eq!(tracker.seeds(), vec![CanonicalBox::new(10, 10, 10, 10)]);
    }

    #[tokio::test]
    async fn test_pixmap_surface_session() {
        let surface = share_surface(PixmapSurface::new(CanvasDimensions::new(1, 1)).unwrap());
        let (_trigger, clock) = ManualClock::new();
        let parts = SessionParts {
            video: Arc::new(ScriptedVideo::new(CanvasDimensions::new(320, 240))),
            tracker: Arc::new(ScriptedTracker::drifting(0, 0)),
            surface: surface.clone(),
            clock: Arc::new(clock),
        };
        let (mut session, _events) = InteractionSession::new(parts, &SessionConfig::default()).unwrap();
        session.on_data_loaded().unwrap();
        assert_eq!(surface.lock().dimensions(), CanvasDimensions::new(320, 240));

        let down = InputEvent::new(PointerEventKind::MouseDown, PointerInput::mouse(50.0, 50.0));
        let drag = InputEvent::new(PointerEventKind::MouseMove, PointerInput::mouse(10.0, 20.0));
        session.handle_event(&down).unwrap();
        assert_eq!(
            session.handle_event(&drag).unwrap(),
            GestureOutcome::Previewed(CanonicalBox::new(10, 20, 40, 30))
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let surface = share_surface(RecordingSurface::new(CanvasDimensions::new(1, 1)));
        let (_trigger, clock) = ManualClock::new();
        let parts = SessionParts {
            video: Arc::new(ScriptedVideo::new(CanvasDimensions::new(1, 1))),
            tracker: Arc::new(ScriptedTracker::drifting(0, 0)),
            surface,
            clock: Arc::new(clock),
        };
        let config = SessionConfig {
            line_width: -1.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            InteractionSession::new(parts, &config),
            Err(SessionError::Config(_))
        ));
    }
}
