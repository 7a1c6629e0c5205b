//! The timed intro: boot, secondary, reveal and transition phases.
//!
//! Phases are a fixed enum with a table of (dwell, enter action, per-frame
//! action). Their content is built once into drawable groups and swapped by
//! visibility. The [`PhaseSequencer`] is a scene's frame handler; timers it
//! schedules go through the scene registry and die with the scene.

mod glitch;
pub mod intro;
mod motion;
mod phase;
mod sequencer;

pub use glitch::{GlitchIntensity, apply_glitch};
pub use intro::IntroGroups;
pub use phase::{EnterAction, LeadIn, Phase, PhaseAction, PhaseSpec, PhaseTable, PhaseView, Step};
pub use sequencer::PhaseSequencer;
