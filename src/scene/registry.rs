//! The scene registry and the per-scene render loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::Drawables;
use crate::error::{FrameError, RenderError, SceneError};
use crate::host::HostRequest;
use crate::schedule::{Liveness, Scheduler};
use crate::scene::{Backend, FrameHandler, SceneConfig, SceneFrame, SceneId, SceneOutput};
use crate::sequence::Step;

/// Consecutive failed frames after which a scene is marked inert.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Default)]
struct RenderLoop {
    last_tick: Option<Instant>,
    frames: u64,
    consecutive_failures: u32,
    handler_errors: u64,
}

/// Result of driving one frame of a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered { dt: f32 },
    /// Unknown scene or no running loop.
    Skipped,
    /// Transient failure; the loop keeps running.
    Failed(RenderError),
    /// The output is gone and the loop has been stopped.
    Inert,
}

/// One registered scene and everything it owns.
pub struct Scene<O> {
    id: SceneId,
    camera: Camera,
    drawables: Drawables,
    output: O,
    alive: Liveness,
    render_loop: Option<RenderLoop>,
    handler: Option<Box<dyn FrameHandler>>,
    inert: bool,
}

impl<O: SceneOutput> Scene<O> {
    /// Identifier the scene was registered under.
    pub fn id(&self) -> &SceneId {
        &self.id
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The scene's drawable world. Groups built here survive resizes.
    pub fn drawables(&self) -> &Drawables {
        &self.drawables
    }

    pub fn drawables_mut(&mut self) -> &mut Drawables {
        &mut self.drawables
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Camera, drawables and output borrowed together, for building content.
    pub fn parts_mut(&mut self) -> (&mut Camera, &mut Drawables, &mut O) {
        (&mut self.camera, &mut self.drawables, &mut self.output)
    }

    /// CRT parameters, or `None` when the scene was created without the CRT stage.
    pub fn effect(&self) -> Option<&CrtParams> {
        self.output.effect()
    }

    pub fn effect_mut(&mut self) -> Option<&mut CrtParams> {
        self.output.effect_mut()
    }

    /// Flag revoked when this scene is destroyed.
    pub fn liveness(&self) -> &Liveness {
        &self.alive
    }

    /// Whether the render loop is running.
    pub fn is_running(&self) -> bool {
        self.render_loop.is_some()
    }

    /// Whether the output failed for good. An inert scene never renders again.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Frames driven since the render loop started.
    pub fn frames(&self) -> u64 {
        self.render_loop.as_ref().map_or(0, |l| l.frames)
    }

    /// Errors returned by the frame handler since the render loop started.
    /// They are logged and counted but never stop the loop.
    pub fn handler_errors(&self) -> u64 {
        self.render_loop.as_ref().map_or(0, |l| l.handler_errors)
    }

    fn record_handler_error(&mut self, what: &str, error: &FrameError) {
        log::warn!("scene '{}': {what}: {error}", self.id);
        if let Some(render_loop) = self.render_loop.as_mut() {
            render_loop.handler_errors += 1;
        }
    }

    fn release(&mut self) {
        self.alive.revoke();
        self.render_loop = None;
        self.handler = None;
        self.drawables.clear();
        self.output.release();
    }

    /// Runs `call` against the handler, if there is one.
    fn call_handler<R>(
        &mut self,
        now: Instant,
        dt: f32,
        timers: &mut Vec<(Duration, Step)>,
        requests: &mut Vec<HostRequest>,
        call: impl FnOnce(&mut dyn FrameHandler, &mut SceneFrame<'_>) -> R,
    ) -> Option<R> {
        let handler = self.handler.as_mut()?;
        let mut frame = SceneFrame::new(
            now,
            dt,
            &mut self.camera,
            &mut self.drawables,
            self.output.effect_mut(),
            timers,
            requests,
        );
        Some(call(handler.as_mut(), &mut frame))
    }
}

/// Owns every live scene, keyed by identifier, plus the shared timer queue.
///
/// Create one at application start, pass it to whichever screen needs a
/// rendered background and call [`shutdown`](Self::shutdown) on exit.
///
/// Creating a scene under an identifier that is already live replaces it:
/// the new output is created first and, only if that succeeds, the old scene
/// is destroyed exactly as [`destroy_scene`](Self::destroy_scene) would.
pub struct SceneRegistry<B: Backend> {
    backend: B,
    scenes: HashMap<SceneId, Scene<B::Output>>,
    timers: Scheduler<(SceneId, Step)>,
    requests: Vec<HostRequest>,
}

impl<B: Backend> SceneRegistry<B> {
    /// Creates an empty registry that builds outputs with `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            scenes: HashMap::new(),
            timers: Scheduler::new(),
            requests: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a scene on `config.container` and registers it under `id`.
    ///
    /// The output is sized from `config.size`, or from the container's
    /// viewport when no size is given. The camera starts with the output's
    /// aspect and the CRT stage with `config`'s intensity. An existing scene
    /// under the same identifier is replaced.
    ///
    /// # Errors
    /// [`SceneError::DetachedContainer`] when the container has no drawable
    /// area, [`SceneError::InvalidSize`] for a zero dimension, or whatever
    /// the backend reports while creating the output. The registry is left
    /// untouched on error.
    ///
    /// # Example
    /// ```
    /// use scanline::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};
    ///
    /// let mut scenes = SceneRegistry::new(HeadlessBackend::new());
    /// let scene = scenes.create_scene("intro", SceneConfig::new(HeadlessContainer::new(1280, 720)))?;
    /// assert_eq!(scene.id().as_str(), "intro");
    /// # Ok::<(), scanline::SceneError>(())
    /// ```
    pub fn create_scene(
        &mut self,
        id: impl Into<SceneId>,
        config: SceneConfig<B::Container>,
    ) -> Result<&mut Scene<B::Output>, SceneError> {
        let id = id.into();
        let viewport = self
            .backend
            .viewport(&config.container)
            .ok_or(SceneError::DetachedContainer)?;
        let (width, height) = config.size.unwrap_or(viewport);
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidSize { width, height });
        }

        let output = self
            .backend
            .create_output(&config.container, (width, height), config.post)?;

        if self.scenes.contains_key(&id) {
            log::warn!("scene '{id}' is already live; replacing it");
            self.destroy_scene(id.as_str());
        }

        log::info!(
            "created scene '{id}' at {width}x{height} (crt: {})",
            match output.effect().and_then(CrtParams::intensity) {
                Some(i) => format!("{i:.2}"),
                None if output.effect().is_some() => "defaults".to_string(),
                None => "off".to_string(),
            }
        );

        let scene = Scene {
            id: id.clone(),
            camera: Camera::for_viewport(width, height),
            drawables: Drawables::new(),
            output,
            alive: Liveness::new(),
            render_loop: None,
            handler: None,
            inert: false,
        };
        Ok(self.scenes.entry(id).insert_entry(scene).into_mut())
    }

    /// Tears a scene down. Unknown identifiers are ignored.
    ///
    /// Stops the render loop, revokes the scene's liveness so queued timers
    /// become no-ops, drops the handler and releases the output.
    pub fn destroy_scene(&mut self, id: &str) -> bool {
        let Some(mut scene) = self.scenes.remove(id) else {
            log::debug!("destroy of unknown scene '{id}' ignored");
            return false;
        };
        scene.release();
        let purged = self.timers.purge_dead();
        log::info!("destroyed scene '{id}' ({purged} pending timers dropped)");
        true
    }

    /// Updates the camera aspect and output size. Unknown identifiers are ignored.
    pub fn resize(&mut self, id: &str, width: u32, height: u32) -> bool {
        let Some(scene) = self.scenes.get_mut(id) else {
            return false;
        };
        if width == 0 || height == 0 {
            log::debug!("ignoring {width}x{height} resize of '{id}'");
            return true;
        }
        scene.camera.set_aspect(width, height);
        scene.output.resize(width, height);
        log::info!("resized scene '{id}' to {width}x{height}");
        true
    }

    /// Applies [`CrtParams::set_intensity`] to a scene's effect, if it has one.
    pub fn set_intensity(&mut self, id: &str, value: f32) -> bool {
        match self.scenes.get_mut(id).and_then(|s| s.output.effect_mut()) {
            Some(effect) => {
                effect.set_intensity(value);
                true
            }
            None => false,
        }
    }

    /// Starts the render loop of `id`, installing `handler` if one is given.
    ///
    /// The handler's `on_start` runs immediately and any timers it schedules
    /// are timed from now. Frames are driven by [`frame`](Self::frame), once
    /// per display refresh; the first frame has a delta of zero.
    ///
    /// # Errors
    /// [`SceneError::UnknownScene`], [`SceneError::SceneInert`] or
    /// [`SceneError::LoopAlreadyRunning`].
    pub fn start_render_loop(
        &mut self,
        id: &str,
        handler: Option<Box<dyn FrameHandler>>,
    ) -> Result<(), SceneError> {
        self.start_render_loop_at(id, handler, Instant::now())
    }

    /// Starts the loop, timing timers scheduled by `on_start` from `now`.
    pub fn start_render_loop_at(
        &mut self,
        id: &str,
        handler: Option<Box<dyn FrameHandler>>,
        now: Instant,
    ) -> Result<(), SceneError> {
        let Self {
            scenes,
            timers,
            requests,
            ..
        } = self;
        let scene = scenes
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownScene(SceneId::new(id)))?;
        if scene.inert {
            return Err(SceneError::SceneInert(scene.id.clone()));
        }
        if scene.render_loop.is_some() {
            return Err(SceneError::LoopAlreadyRunning(scene.id.clone()));
        }
        if handler.is_some() {
            scene.handler = handler;
        }
        scene.render_loop = Some(RenderLoop::default());

        let mut pending = Vec::new();
        scene.call_handler(now, 0.0, &mut pending, requests, |h, frame| h.on_start(frame));
        for (after, step) in pending {
            timers.schedule(now, after, scene.alive.clone(), (scene.id.clone(), step));
        }
        log::info!("render loop started for '{id}'");
        Ok(())
    }

    /// Stops rescheduling frames. Safe to call repeatedly.
    pub fn stop_render_loop(&mut self, id: &str) -> bool {
        let stopped = self
            .scenes
            .get_mut(id)
            .and_then(|s| s.render_loop.take())
            .is_some();
        if stopped {
            log::info!("render loop stopped for '{id}'");
        }
        stopped
    }

    /// Runs one frame: measures the delta, calls the handler, then composites.
    ///
    /// Handler errors are logged and counted in
    /// [`Scene::handler_errors`]; they never stop the loop. Transient surface
    /// errors are logged and the loop keeps going. A fatal error, or [`MAX_CONSECUTIVE_FAILURES`] failed
    /// frames in a row, stops the loop and marks the scene inert; that is
    /// reported once.
    pub fn frame(&mut self, id: &str, now: Instant) -> FrameOutcome {
        let Self {
            scenes,
            timers,
            requests,
            ..
        } = self;
        let Some(scene) = scenes.get_mut(id) else {
            return FrameOutcome::Skipped;
        };
        if scene.inert {
            return FrameOutcome::Inert;
        }
        let Some(render_loop) = scene.render_loop.as_mut() else {
            return FrameOutcome::Skipped;
        };
        let dt = render_loop
            .last_tick
            .map_or(0.0, |prev| now.saturating_duration_since(prev).as_secs_f32());
        render_loop.last_tick = Some(now);
        render_loop.frames += 1;

        let mut pending = Vec::new();
        if let Some(Err(e)) = scene.call_handler(now, dt, &mut pending, requests, |h, frame| {
            h.on_frame(frame)
        }) {
            scene.record_handler_error("frame", &e);
        }
        for (after, step) in pending {
            timers.schedule(now, after, scene.alive.clone(), (scene.id.clone(), step));
        }

        let mut draws = Vec::new();
        scene.drawables.collect(&mut draws);
        log::trace!("scene '{id}': dt {dt:.4}s, {} draws", draws.len());

        let result = scene.output.render(dt, &scene.camera, &draws);
        let failures = match scene.render_loop.as_mut() {
            Some(render_loop) => {
                if result.is_ok() {
                    render_loop.consecutive_failures = 0;
                } else {
                    render_loop.consecutive_failures += 1;
                }
                render_loop.consecutive_failures
            }
            None => 0,
        };

        match result {
            Ok(()) => FrameOutcome::Rendered { dt },
            Err(e) if e.is_fatal() || failures >= MAX_CONSECUTIVE_FAILURES => {
                log::error!("scene '{id}' is inert after {failures} failed frame(s): {e}");
                scene.inert = true;
                scene.render_loop = None;
                FrameOutcome::Inert
            }
            Err(e) => {
                log::warn!("scene '{id}': {e}; retrying next frame");
                FrameOutcome::Failed(e)
            }
        }
    }

    /// Delivers every timer due at `now`. Follow-up timers are scheduled
    /// from the firing timer's deadline so late dispatch does not drift.
    pub fn dispatch_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some((deadline, (id, step))) = self.timers.pop_due(now) {
            let Self {
                scenes,
                timers,
                requests,
                ..
            } = self;
            let Some(scene) = scenes.get_mut(&id) else {
                log::debug!("timer {step:?} for missing scene '{id}' dropped");
                continue;
            };
            let mut pending = Vec::new();
            if let Some(Err(e)) =
                scene.call_handler(deadline, 0.0, &mut pending, requests, |h, frame| {
                    h.on_timer(step, frame)
                })
            {
                scene.record_handler_error(&format!("timer {step:?}"), &e);
            }
            for (after, next) in pending {
                timers.schedule(deadline, after, scene.alive.clone(), (scene.id.clone(), next));
            }
            fired += 1;
        }
        fired
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Host requests queued by handlers since the last call.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    pub fn scene(&self, id: &str) -> Option<&Scene<B::Output>> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene<B::Output>> {
        self.scenes.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &SceneId> {
        self.scenes.keys()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Destroys every scene.
    pub fn shutdown(&mut self) {
        let ids: Vec<SceneId> = self.scenes.keys().cloned().collect();
        for id in ids {
            self.destroy_scene(id.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{MeshId, Primitive};
    use crate::scene::{HeadlessBackend, HeadlessContainer, frame_fn};
    use std::cell::Cell;
    use std::rc::Rc;

    fn registry() -> SceneRegistry<HeadlessBackend> {
        SceneRegistry::new(HeadlessBackend::new())
    }

    fn config(w: u32, h: u32) -> SceneConfig<HeadlessContainer> {
        SceneConfig::new(HeadlessContainer::new(w, h))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn create_defaults_to_viewport() {
        let mut reg = registry();
        let scene = reg.create_scene("intro", config(1280, 720)).unwrap();
        assert_eq!(scene.output().size(), (1280, 720));
        assert!((scene.camera().aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert!(scene.effect().is_some());
        assert!(reg.contains("intro"));
    }

    #[test]
    fn explicit_size_and_intensity() {
        let mut reg = registry();
        let scene = reg
            .create_scene("s", config(800, 600).size(400, 400).crt(0.0))
            .unwrap();
        assert_eq!(scene.output().size(), (400, 400));
        assert_eq!(scene.effect().unwrap().curvature, 0.3);
    }

    #[test]
    fn detached_container_is_rejected() {
        let mut reg = registry();
        let err = reg
            .create_scene("s", SceneConfig::new(HeadlessContainer::detached()).size(10, 10))
            .err();
        assert!(matches!(err, Some(SceneError::DetachedContainer)));
        assert!(!reg.contains("s"));
        assert_eq!(reg.backend().created(), 0);
    }

    #[test]
    fn crt_can_be_disabled() {
        let mut reg = registry();
        let scene = reg.create_scene("plain", config(64, 64).without_crt()).unwrap();
        assert!(scene.effect().is_none());
        assert!(!reg.set_intensity("plain", 0.5));
    }

    #[test]
    fn destroy_twice_is_a_noop() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        assert!(reg.destroy_scene("a"));
        assert!(!reg.destroy_scene("a"));
        assert!(!reg.destroy_scene("never-created"));
        assert!(reg.is_empty());
    }

    #[test]
    fn destroy_revokes_liveness_and_stops_loop() {
        let mut reg = registry();
        let scene = reg.create_scene("a", config(64, 64)).unwrap();
        let alive = scene.liveness().clone();
        reg.start_render_loop("a", None).unwrap();
        reg.destroy_scene("a");
        assert!(!alive.is_alive());
        assert_eq!(reg.frame("a", Instant::now()), FrameOutcome::Skipped);
    }

    #[test]
    fn duplicate_id_replaces_the_old_scene() {
        let mut reg = registry();
        let old = reg.create_scene("a", config(64, 64)).unwrap().liveness().clone();
        let new = reg.create_scene("a", config(32, 32)).unwrap().liveness().clone();
        assert!(!old.is_alive());
        assert!(new.is_alive());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.scene("a").unwrap().output().size(), (32, 32));
    }

    #[test]
    fn failed_replacement_keeps_the_old_scene() {
        let mut reg = registry();
        let old = reg.create_scene("a", config(64, 64)).unwrap().liveness().clone();
        assert!(reg
            .create_scene("a", SceneConfig::new(HeadlessContainer::detached()))
            .is_err());
        assert!(old.is_alive());
        assert!(reg.contains("a"));
    }

    #[test]
    fn resize_updates_aspect_and_keeps_contents() {
        let mut reg = registry();
        let scene = reg.create_scene("a", config(640, 480)).unwrap();
        let group = scene.drawables_mut().add_group("g", true);
        scene
            .drawables_mut()
            .spawn(group, Primitive::new(MeshId(0)));

        assert!(reg.resize("a", 1000, 250));
        let scene = reg.scene("a").unwrap();
        assert_eq!(scene.id().as_str(), "a");
        assert_eq!(scene.camera().aspect, 4.0);
        assert_eq!(scene.output().size(), (1000, 250));
        assert_eq!(scene.drawables().len(), 1);
        assert_eq!(scene.drawables().group_count(), 1);
        assert!(!reg.resize("missing", 10, 10));
    }

    #[test]
    fn render_loop_measures_deltas() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        let seen = Rc::new(Cell::new(0.0f32));
        let sink = seen.clone();
        reg.start_render_loop(
            "a",
            Some(Box::new(frame_fn(move |frame| sink.set(sink.get() + frame.dt)))),
        )
        .unwrap();

        let t0 = Instant::now();
        assert_eq!(reg.frame("a", t0), FrameOutcome::Rendered { dt: 0.0 });
        assert_eq!(reg.frame("a", t0 + ms(250)), FrameOutcome::Rendered { dt: 0.25 });
        assert!((seen.get() - 0.25).abs() < 1e-6);
        let effect_time = reg.scene("a").unwrap().effect().unwrap().time();
        assert!((effect_time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn stopped_loop_pauses_effect_time() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.start_render_loop("a", None).unwrap();
        let t0 = Instant::now();
        reg.frame("a", t0);
        reg.frame("a", t0 + ms(100));
        assert!(reg.stop_render_loop("a"));
        assert!(!reg.stop_render_loop("a"));
        assert_eq!(reg.frame("a", t0 + ms(900)), FrameOutcome::Skipped);
        let time = reg.scene("a").unwrap().effect().unwrap().time();
        assert!((time - 0.1).abs() < 1e-6);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.start_render_loop("a", None).unwrap();
        assert!(matches!(
            reg.start_render_loop("a", None),
            Err(SceneError::LoopAlreadyRunning(_))
        ));
        assert!(matches!(
            reg.start_render_loop("b", None),
            Err(SceneError::UnknownScene(_))
        ));
    }

    #[test]
    fn transient_failures_retry_then_go_inert() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.start_render_loop("a", None).unwrap();
        let t0 = Instant::now();

        reg.scene_mut("a")
            .unwrap()
            .output_mut()
            .fail_next([RenderError::Timeout]);
        assert_eq!(reg.frame("a", t0), FrameOutcome::Failed(RenderError::Timeout));
        assert!(matches!(reg.frame("a", t0 + ms(16)), FrameOutcome::Rendered { .. }));

        reg.scene_mut("a").unwrap().output_mut().fail_next([
            RenderError::Lost,
            RenderError::Lost,
            RenderError::Lost,
        ]);
        assert!(matches!(reg.frame("a", t0 + ms(32)), FrameOutcome::Failed(_)));
        assert!(matches!(reg.frame("a", t0 + ms(48)), FrameOutcome::Failed(_)));
        assert_eq!(reg.frame("a", t0 + ms(64)), FrameOutcome::Inert);

        let scene = reg.scene("a").unwrap();
        assert!(scene.is_inert());
        assert!(!scene.is_running());
        assert_eq!(reg.frame("a", t0 + ms(80)), FrameOutcome::Inert);
        assert!(matches!(
            reg.start_render_loop("a", None),
            Err(SceneError::SceneInert(_))
        ));
    }

    #[test]
    fn handler_errors_are_counted_but_do_not_stop_the_loop() {
        struct Failing;
        impl FrameHandler for Failing {
            fn on_frame(&mut self, _frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
                Err(FrameError::Handler("boom".into()))
            }
        }

        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.start_render_loop("a", Some(Box::new(Failing))).unwrap();
        let t0 = Instant::now();
        for i in 0..5 {
            let outcome = reg.frame("a", t0 + ms(16 * i));
            assert!(matches!(outcome, FrameOutcome::Rendered { .. }), "{outcome:?}");
        }

        let scene = reg.scene("a").unwrap();
        assert_eq!(scene.handler_errors(), 5);
        assert_eq!(scene.output().frames(), 5);
        assert!(scene.is_running());
        assert!(!scene.is_inert());
    }

    #[test]
    fn fatal_failure_goes_inert_immediately() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.start_render_loop("a", None).unwrap();
        reg.scene_mut("a")
            .unwrap()
            .output_mut()
            .fail_next([RenderError::OutOfMemory]);
        assert_eq!(reg.frame("a", Instant::now()), FrameOutcome::Inert);
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut reg = registry();
        reg.create_scene("a", config(64, 64)).unwrap();
        reg.create_scene("b", config(64, 64)).unwrap();
        reg.shutdown();
        assert!(reg.is_empty());
    }
}
