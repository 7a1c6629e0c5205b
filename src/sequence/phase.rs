//! Phases, timer steps and the fixed phase table.

use std::time::Duration;

use crate::camera::Camera;
use crate::config::SequenceConfig;
use crate::drawable::{Drawables, GroupId};
use crate::sequence::intro;

/// A named stage of the intro. The order is fixed and linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Boot,
    /// Rotating emblem.
    Secondary,
    /// Brand mark.
    Reveal,
    /// Camera dolly before handing off.
    Transition,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Boot,
        Phase::Secondary,
        Phase::Reveal,
        Phase::Transition,
    ];

    pub fn index(self) -> usize {
        match self {
            Phase::Boot => 0,
            Phase::Secondary => 1,
            Phase::Reveal => 2,
            Phase::Transition => 3,
        }
    }

    /// `None` for the terminal phase.
    pub fn next(self) -> Option<Phase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Boot => "boot",
            Phase::Secondary => "secondary",
            Phase::Reveal => "reveal",
            Phase::Transition => "transition",
        }
    }
}

/// Timer events delivered to a sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Glitch up ahead of entering the phase.
    LeadIn(Phase),
    Enter(Phase),
    /// End of the terminal phase: navigate away.
    Finish,
}

/// What entering a phase does to the drawable groups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnterAction {
    /// Show the phase's group.
    Show,
    /// Hide the outgoing group and show the incoming one.
    Swap,
    /// Keep the groups; the per-frame action moves the camera instead.
    Dolly,
}

/// Glitch burst that hides the swap into a phase.
#[derive(Clone, Debug, PartialEq)]
pub struct LeadIn {
    pub peak: f32,
    pub hold: Duration,
    /// Audio cue started with the burst.
    pub cue: Option<String>,
}

/// Mutable view a phase's per-frame action works on.
pub struct PhaseView<'a> {
    pub drawables: &'a mut Drawables,
    pub camera: &'a mut Camera,
    pub group: GroupId,
    /// Seconds since the phase was entered.
    pub t: f32,
    pub dt: f32,
    pub dolly_speed: f32,
}

pub type PhaseAction = fn(&mut PhaseView<'_>);

pub struct PhaseSpec {
    pub phase: Phase,
    /// Total active time, including the next phase's lead-in hold.
    pub dwell: Duration,
    pub lead_in: Option<LeadIn>,
    pub enter: EnterAction,
    /// Glitch target once the phase is entered.
    pub settle_glitch: f32,
    pub animate: PhaseAction,
}

/// (dwell, enter-action, per-frame-action) for every phase, in order.
pub struct PhaseTable {
    specs: [PhaseSpec; 4],
}

impl PhaseTable {
    pub fn new(config: &SequenceConfig) -> Self {
        let t = &config.timings;
        let lead_in = |cue: Option<String>| {
            Some(LeadIn {
                peak: t.glitch_peak,
                hold: t.glitch_hold,
                cue,
            })
        };
        Self {
            specs: [
                PhaseSpec {
                    phase: Phase::Boot,
                    dwell: t.boot,
                    lead_in: None,
                    enter: EnterAction::Show,
                    settle_glitch: 0.0,
                    animate: intro::animate_boot,
                },
                PhaseSpec {
                    phase: Phase::Secondary,
                    dwell: t.secondary,
                    lead_in: lead_in(None),
                    enter: EnterAction::Swap,
                    settle_glitch: 0.0,
                    animate: intro::animate_secondary,
                },
                PhaseSpec {
                    phase: Phase::Reveal,
                    dwell: t.reveal,
                    lead_in: lead_in(config.reveal_cue.clone()),
                    enter: EnterAction::Swap,
                    settle_glitch: 0.0,
                    animate: intro::animate_reveal,
                },
                PhaseSpec {
                    phase: Phase::Transition,
                    dwell: t.transition,
                    lead_in: None,
                    enter: EnterAction::Dolly,
                    settle_glitch: t.exit_glitch_peak,
                    animate: intro::animate_transition,
                },
            ],
        }
    }

    pub fn spec(&self, phase: Phase) -> &PhaseSpec {
        &self.specs[phase.index()]
    }

    /// The step that ends `phase`, and how long after entering it fires.
    pub fn exit_step(&self, phase: Phase) -> (Duration, Step) {
        let dwell = self.spec(phase).dwell;
        match phase.next() {
            Some(next) => match &self.spec(next).lead_in {
                Some(lead_in) => (dwell.saturating_sub(lead_in.hold), Step::LeadIn(next)),
                None => (dwell, Step::Enter(next)),
            },
            None => (dwell, Step::Finish),
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.specs.iter().map(|s| s.dwell).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_linear() {
        assert_eq!(Phase::Boot.next(), Some(Phase::Secondary));
        assert_eq!(Phase::Secondary.next(), Some(Phase::Reveal));
        assert_eq!(Phase::Reveal.next(), Some(Phase::Transition));
        assert_eq!(Phase::Transition.next(), None);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn exit_steps_follow_the_timeline() {
        let table = PhaseTable::new(&SequenceConfig::default());
        assert_eq!(
            table.exit_step(Phase::Boot),
            (Duration::from_millis(2500), Step::LeadIn(Phase::Secondary))
        );
        assert_eq!(
            table.exit_step(Phase::Secondary),
            (Duration::from_millis(3000), Step::LeadIn(Phase::Reveal))
        );
        assert_eq!(
            table.exit_step(Phase::Reveal),
            (Duration::from_millis(3000), Step::Enter(Phase::Transition))
        );
        assert_eq!(
            table.exit_step(Phase::Transition),
            (Duration::from_millis(800), Step::Finish)
        );
        assert_eq!(table.total_duration(), Duration::from_millis(10_300));
    }

    #[test]
    fn reveal_lead_in_carries_the_cue() {
        let table = PhaseTable::new(&SequenceConfig::default());
        let cue = table
            .spec(Phase::Reveal)
            .lead_in
            .as_ref()
            .and_then(|l| l.cue.as_deref());
        assert_eq!(cue, Some("assets/audio/intro2.wav"));
        assert!(table.spec(Phase::Secondary).lead_in.as_ref().unwrap().cue.is_none());
    }
}
