use std::time::Instant;

use crate::config::SequenceConfig;
use crate::error::FrameError;
use crate::scene::{FrameHandler, Scene, SceneFrame, SceneOutput};
use crate::sequence::glitch::{GlitchIntensity, apply_glitch};
use crate::sequence::intro::{IntroGroups, build_intro, drift_starfield};
use crate::sequence::{EnterAction, Phase, PhaseTable, PhaseView, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Running(Phase),
    Finished,
    Cancelled,
}

/// Drives the intro through its phases.
///
/// Registered as a scene's [`FrameHandler`]: frames animate the active phase
/// and timers advance it. Every timer it arms is remembered, so a step that
/// arrives late, twice or after [`cancel`](Self::cancel) is ignored.
pub struct PhaseSequencer {
    table: PhaseTable,
    groups: IntroGroups,
    state: State,
    /// The only step this sequencer will act on next.
    pending: Option<Step>,
    /// When the active phase was entered, until the first frame after it.
    entered_at: Option<Instant>,
    phase_time: f32,
    elapsed: f32,
    glitch: GlitchIntensity,
    dolly_speed: f32,
    exit_route: String,
    navigated: bool,
    swaps: u32,
}

impl PhaseSequencer {
    /// Builds the intro content into `scene` and returns an idle sequencer
    /// for it. The sequence starts when the scene's render loop does.
    pub fn build<O: SceneOutput>(scene: &mut Scene<O>, config: &SequenceConfig) -> Self {
        let (camera, drawables, output) = scene.parts_mut();
        let groups = build_intro(camera, drawables, output, config);
        Self::new(groups, config)
    }

    /// Sequencer over groups that were already built, e.g. by
    /// [`build_intro`](crate::sequence::intro::build_intro).
    pub fn new(groups: IntroGroups, config: &SequenceConfig) -> Self {
        Self {
            table: PhaseTable::new(config),
            groups,
            state: State::Idle,
            pending: None,
            entered_at: None,
            phase_time: 0.0,
            elapsed: 0.0,
            glitch: GlitchIntensity::new(config.timings.convergence_rate),
            dolly_speed: config.timings.dolly_speed,
            exit_route: config.exit_route.clone(),
            navigated: false,
            swaps: 0,
        }
    }

    /// Active phase, `None` before the start and after the end.
    pub fn phase(&self) -> Option<Phase> {
        match self.state {
            State::Running(phase) => Some(phase),
            _ => None,
        }
    }

    /// Drawable groups holding each phase's content.
    pub fn groups(&self) -> &IntroGroups {
        &self.groups
    }

    /// Current glitch level and the target it is easing towards.
    pub fn glitch(&self) -> &GlitchIntensity {
        &self.glitch
    }

    /// Seconds since the active phase was entered.
    pub fn phase_time(&self) -> f32 {
        self.phase_time
    }

    /// Group visibility swaps performed so far.
    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    /// Whether the last phase ended and the exit route was requested.
    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == State::Cancelled
    }

    /// Whether navigation was requested, by finishing or by [`skip`](Self::skip).
    /// It is requested at most once.
    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    /// Stops the sequence without navigating. Pending timers become no-ops.
    pub fn cancel(&mut self) {
        if matches!(self.state, State::Idle | State::Running(_)) {
            log::debug!("intro cancelled");
            self.state = State::Cancelled;
        }
        self.pending = None;
    }

    /// Cancels the sequence and returns the exit route, unless navigation
    /// already happened.
    ///
    /// The caller navigates with the returned route; the sequencer itself
    /// queues nothing, so a skip inside a frame cannot race the finish timer.
    ///
    /// # Example
    /// ```
    /// use scanline::SequenceConfig;
    /// use scanline::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};
    /// use scanline::PhaseSequencer;
    ///
    /// let mut scenes = SceneRegistry::new(HeadlessBackend::new());
    /// let scene = scenes.create_scene("intro", SceneConfig::new(HeadlessContainer::new(640, 480)))?;
    /// let mut intro = PhaseSequencer::build(scene, &SequenceConfig::default());
    /// assert_eq!(intro.skip().as_deref(), Some("/home"));
    /// assert_eq!(intro.skip(), None);
    /// # Ok::<(), scanline::SceneError>(())
    /// ```
    pub fn skip(&mut self) -> Option<String> {
        self.cancel();
        if self.navigated {
            return None;
        }
        log::info!("intro skipped");
        self.navigated = true;
        Some(self.exit_route.clone())
    }

    fn enter(&mut self, phase: Phase, frame: &mut SceneFrame<'_>) {
        let spec = self.table.spec(phase);
        let incoming = self.groups.group_for(phase);
        match spec.enter {
            EnterAction::Show => frame.drawables.set_visible(incoming, true),
            EnterAction::Swap => {
                if let State::Running(previous) = self.state {
                    frame
                        .drawables
                        .set_visible(self.groups.group_for(previous), false);
                }
                frame.drawables.set_visible(incoming, true);
                self.swaps += 1;
            }
            EnterAction::Dolly => {}
        }
        self.glitch.set_target(spec.settle_glitch);
        self.state = State::Running(phase);
        self.phase_time = 0.0;
        self.entered_at = Some(frame.now);

        let (after, step) = self.table.exit_step(phase);
        self.pending = Some(step);
        frame.schedule(after, step);
        log::info!("phase '{}' entered", phase.name());
    }

    fn lead_in(&mut self, next: Phase, frame: &mut SceneFrame<'_>) {
        let Some(lead_in) = &self.table.spec(next).lead_in else {
            self.enter(next, frame);
            return;
        };
        self.glitch.set_target(lead_in.peak);
        if let Some(cue) = &lead_in.cue {
            frame.play_cue(cue.as_str());
        }
        let step = Step::Enter(next);
        self.pending = Some(step);
        frame.schedule(lead_in.hold, step);
        log::debug!("glitching into '{}'", next.name());
    }

    fn finish(&mut self, frame: &mut SceneFrame<'_>) {
        self.state = State::Finished;
        self.pending = None;
        if !self.navigated {
            self.navigated = true;
            frame.navigate(self.exit_route.as_str());
        }
        log::info!("intro finished after {:.2}s", self.elapsed);
    }
}

impl FrameHandler for PhaseSequencer {
    fn on_start(&mut self, frame: &mut SceneFrame<'_>) {
        if self.state == State::Idle {
            self.enter(Phase::Boot, frame);
        }
    }

    fn on_frame(&mut self, frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        let dt = frame.dt;
        self.elapsed += dt;
        drift_starfield(frame.drawables, self.groups.backdrop, self.elapsed);

        let glitch = self.glitch.update(dt);
        if let Some(effect) = frame.effect_mut() {
            apply_glitch(effect, glitch);
        }

        if let State::Running(phase) = self.state {
            // The frame delta may start before the phase was entered.
            let dt = match self.entered_at.take() {
                Some(at) => dt.min(frame.now.saturating_duration_since(at).as_secs_f32()),
                None => dt,
            };
            self.phase_time += dt;
            let animate = self.table.spec(phase).animate;
            animate(&mut PhaseView {
                drawables: &mut *frame.drawables,
                camera: &mut *frame.camera,
                group: self.groups.group_for(phase),
                t: self.phase_time,
                dt,
                dolly_speed: self.dolly_speed,
            });
        }
        Ok(())
    }

    fn on_timer(&mut self, step: Step, frame: &mut SceneFrame<'_>) -> Result<(), FrameError> {
        if !matches!(self.state, State::Running(_)) || self.pending != Some(step) {
            log::debug!("ignoring stale step {step:?} ({:?})", self.state);
            return Ok(());
        }
        match step {
            Step::LeadIn(next) => self.lead_in(next, frame),
            Step::Enter(next) => self.enter(next, frame),
            Step::Finish => self.finish(frame),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostRequest;
    use crate::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    const TICK: u64 = 10;

    struct Run {
        reg: SceneRegistry<HeadlessBackend>,
        seq: Rc<RefCell<PhaseSequencer>>,
        t0: Instant,
        now_ms: u64,
        requests: Vec<HostRequest>,
    }

    impl Run {
        fn start() -> Self {
            let mut reg = SceneRegistry::new(HeadlessBackend::new());
            let scene = reg
                .create_scene("intro", SceneConfig::new(HeadlessContainer::new(1280, 720)).crt(0.8))
                .unwrap();
            let seq = Rc::new(RefCell::new(PhaseSequencer::build(
                scene,
                &SequenceConfig::default(),
            )));
            let t0 = Instant::now();
            reg.start_render_loop_at("intro", Some(Box::new(seq.clone())), t0)
                .unwrap();
            Self {
                reg,
                seq,
                t0,
                now_ms: 0,
                requests: Vec::new(),
            }
        }

        /// Timers then a frame, as the application does each refresh.
        fn tick_at(&mut self, ms: u64) {
            let now = self.t0 + Duration::from_millis(ms);
            self.reg.dispatch_timers(now);
            self.reg.frame("intro", now);
            self.requests.extend(self.reg.take_requests());
            self.now_ms = ms;
        }

        fn run_until(&mut self, ms: u64) {
            let mut t = self.now_ms;
            while t + TICK <= ms {
                t += TICK;
                self.tick_at(t);
            }
            if t < ms {
                self.tick_at(ms);
            }
        }

        fn navigations(&self) -> usize {
            self.requests
                .iter()
                .filter(|r| matches!(r, HostRequest::Navigate(_)))
                .count()
        }

        fn visible(&self, phase: Phase) -> bool {
            let group = self.seq.borrow().groups().group_for(phase);
            self.reg
                .scene("intro")
                .unwrap()
                .drawables()
                .is_visible(group)
        }
    }

    #[test]
    fn stays_in_boot_before_its_dwell() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(2990);

        let seq = run.seq.borrow();
        assert_eq!(seq.phase(), Some(Phase::Boot));
        assert_eq!(seq.swaps(), 0);
        // The lead-in has started the glitch but the groups are untouched.
        assert_eq!(seq.glitch().target(), 1.0);
        drop(seq);
        assert!(run.visible(Phase::Boot));
        assert!(!run.visible(Phase::Secondary));
    }

    #[test]
    fn swaps_at_the_end_of_the_hold() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(3000);
        let seq = run.seq.borrow();
        assert_eq!(seq.phase(), Some(Phase::Secondary));
        assert_eq!(seq.swaps(), 1);
        assert_eq!(seq.glitch().target(), 0.0);
        drop(seq);
        assert!(!run.visible(Phase::Boot));
        assert!(run.visible(Phase::Secondary));
    }

    #[test]
    fn phase_clock_starts_at_the_swap() {
        let mut run = Run::start();
        run.tick_at(0);
        let mut ms = 0;
        while ms < 3200 {
            ms += 400;
            run.tick_at(ms);
        }
        // Swapped at 3.0 s; the frame at 3.2 s covers 2.8..3.2 s.
        let seq = run.seq.borrow();
        assert_eq!(seq.phase(), Some(Phase::Secondary));
        assert!((seq.phase_time() - 0.2).abs() < 1e-4, "{}", seq.phase_time());
    }

    #[test]
    fn full_run_navigates_once_after_all_dwells() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(10_299);
        assert_eq!(run.seq.borrow().phase(), Some(Phase::Transition));
        assert_eq!(run.navigations(), 0);

        run.tick_at(10_300);
        assert_eq!(run.navigations(), 1);
        assert!(
            run.requests
                .contains(&HostRequest::Navigate("/home".to_string()))
        );

        run.run_until(12_000);
        assert_eq!(run.navigations(), 1);
        assert!(run.seq.borrow().is_finished());
        assert_eq!(run.seq.borrow().swaps(), 2);
        assert_eq!(run.seq.borrow_mut().skip(), None);
    }

    #[test]
    fn reveal_cue_plays_with_its_lead_in() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(5990);
        assert!(!run.requests.iter().any(|r| matches!(r, HostRequest::PlayCue(_))));
        run.run_until(6000);
        assert_eq!(
            run.requests,
            vec![HostRequest::PlayCue("assets/audio/intro2.wav".to_string())]
        );
    }

    #[test]
    fn transition_dollies_and_glitches_up() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(10_200);
        assert_eq!(run.seq.borrow().glitch().target(), 1.5);
        let scene = run.reg.scene("intro").unwrap();
        // 0.7 s at 10 units per second from z = 8.
        let z = scene.camera().position.z;
        assert!(z > 0.7 && z < 1.1, "camera at z = {z}");
        // Reveal content stays up through the transition.
        assert!(run.visible(Phase::Transition));
        let aberration = scene.effect().unwrap().chromatic_aberration;
        assert!(aberration > 1.0 && aberration <= 8.5);
    }

    #[test]
    fn timers_after_destroy_change_nothing() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(2600);
        assert!(run.reg.destroy_scene("intro"));
        assert_eq!(run.reg.pending_timers(), 0);

        let fired = run.reg.dispatch_timers(run.t0 + Duration::from_secs(20));
        assert_eq!(fired, 0);
        let seq = run.seq.borrow();
        assert_eq!(seq.phase(), Some(Phase::Boot));
        assert_eq!(seq.swaps(), 0);
        assert!(run.reg.take_requests().is_empty());
    }

    #[test]
    fn cancelled_sequencer_ignores_its_timers() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(2600);
        run.seq.borrow_mut().cancel();
        run.run_until(11_000);
        let seq = run.seq.borrow();
        assert!(seq.is_cancelled());
        assert_eq!(seq.swaps(), 0);
        drop(seq);
        assert_eq!(run.navigations(), 0);
        assert!(run.visible(Phase::Boot));
    }

    #[test]
    fn skip_navigates_exactly_once() {
        let mut run = Run::start();
        run.tick_at(0);
        run.run_until(1000);
        assert_eq!(run.seq.borrow_mut().skip(), Some("/home".to_string()));
        assert_eq!(run.seq.borrow_mut().skip(), None);
        run.run_until(12_000);
        assert_eq!(run.navigations(), 0);
        assert_eq!(run.seq.borrow().swaps(), 0);
    }
}
