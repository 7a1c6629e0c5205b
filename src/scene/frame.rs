use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::Drawables;
use crate::error::FrameError;
use crate::host::HostRequest;
use crate::sequence::Step;

/// What a handler sees during one frame or timer callback.
///
/// Timers and host requests are queued here and applied by the registry after
/// the handler returns, stamped with the scene's liveness.
pub struct SceneFrame<'a> {
    /// Time of this callback. For timers this is the deadline, not wall clock.
    pub now: Instant,
    /// Seconds since the previous frame; 0 on the first frame and for timers.
    pub dt: f32,
    pub camera: &'a mut Camera,
    pub drawables: &'a mut Drawables,
    effect: Option<&'a mut CrtParams>,
    timers: &'a mut Vec<(Duration, Step)>,
    requests: &'a mut Vec<HostRequest>,
}

impl<'a> SceneFrame<'a> {
    pub(crate) fn new(
        now: Instant,
        dt: f32,
        camera: &'a mut Camera,
        drawables: &'a mut Drawables,
        effect: Option<&'a mut CrtParams>,
        timers: &'a mut Vec<(Duration, Step)>,
        requests: &'a mut Vec<HostRequest>,
    ) -> Self {
        Self {
            now,
            dt,
            camera,
            drawables,
            effect,
            timers,
            requests,
        }
    }

    pub fn effect(&self) -> Option<&CrtParams> {
        self.effect.as_deref()
    }

    pub fn effect_mut(&mut self) -> Option<&mut CrtParams> {
        self.effect.as_deref_mut()
    }

    /// Delivers `step` to this scene's handler after `after`.
    pub fn schedule(&mut self, after: Duration, step: Step) {
        self.timers.push((after, step));
    }

    pub fn navigate(&mut self, route: impl Into<String>) {
        self.requests.push(HostRequest::Navigate(route.into()));
    }

    pub fn play_cue(&mut self, clip: impl Into<String>) {
        self.requests.push(HostRequest::PlayCue(clip.into()));
    }

    pub fn stop_cue(&mut self) {
        self.requests.push(HostRequest::StopCue);
    }
}

/// Per-scene callbacks driven by the render loop and the timer queue.
pub trait FrameHandler {
    /// Called once when the render loop starts.
    fn on_start(&mut self, _frame: &mut SceneFrame<'_>) {}

    fn on_frame(&mut self, frame: &mut SceneFrame<'_>) -> Result<(), FrameError>;

    fn on_timer(&mut self, _step: Step, _frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        Ok(())
    }
}

/// Adapts a closure into a [`FrameHandler`] with no timers.
pub struct FnHandler<F>(F);

pub fn frame_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(&mut SceneFrame<'_>),
{
    FnHandler(f)
}

impl<F> FrameHandler for FnHandler<F>
where
    F: FnMut(&mut SceneFrame<'_>),
{
    fn on_frame(&mut self, frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        (self.0)(frame);
        Ok(())
    }
}

/// Lets the owner keep a handle on a handler the registry also drives.
impl<H: FrameHandler> FrameHandler for Rc<RefCell<H>> {
    fn on_start(&mut self, frame: &mut SceneFrame<'_>) {
        match self.try_borrow_mut() {
            Ok(mut handler) => handler.on_start(frame),
            Err(_) => log::warn!("frame handler is borrowed; start skipped"),
        }
    }

    fn on_frame(&mut self, frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        self.try_borrow_mut()
            .map_err(|e| FrameError::Handler(e.to_string()))?
            .on_frame(frame)
    }

    fn on_timer(&mut self, step: Step, frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        self.try_borrow_mut()
            .map_err(|e| FrameError::Handler(e.to_string()))?
            .on_timer(step, frame)
    }
}
