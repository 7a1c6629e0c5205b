//! Application and sequence configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Durations and rates of the intro sequence.
///
/// Each dwell is the total time its phase is active, including the glitch
/// hold that ends it, so a full run lasts the sum of the four dwells.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceTimings {
    pub boot: Duration,
    pub secondary: Duration,
    pub reveal: Duration,
    pub transition: Duration,
    /// Heavy-glitch hold that hides a group swap.
    pub glitch_hold: Duration,
    pub glitch_peak: f32,
    /// Glitch target for the final transition phase.
    pub exit_glitch_peak: f32,
    /// Convergence rate `k` of the glitch easing.
    pub convergence_rate: f32,
    /// Camera dolly speed during the transition, in units per second.
    pub dolly_speed: f32,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            boot: Duration::from_millis(3000),
            secondary: Duration::from_millis(3500),
            reveal: Duration::from_millis(3000),
            transition: Duration::from_millis(800),
            glitch_hold: Duration::from_millis(500),
            glitch_peak: 1.0,
            exit_glitch_peak: 1.5,
            convergence_rate: 5.0,
            dolly_speed: 10.0,
        }
    }
}

impl SequenceTimings {
    pub fn total(&self) -> Duration {
        self.boot + self.secondary + self.reveal + self.transition
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequenceConfig {
    pub timings: SequenceTimings,
    /// Route requested once the sequence ends or is skipped.
    pub exit_route: String,
    /// Audio cue started as the reveal phase is being entered.
    pub reveal_cue: Option<String>,
    /// Image shown on the brand badge. Untextured when `None`.
    pub badge_image: Option<PathBuf>,
    pub star_count: usize,
    pub star_seed: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            timings: SequenceTimings::default(),
            exit_route: "/home".to_string(),
            reveal_cue: Some("assets/audio/intro2.wav".to_string()),
            badge_image: None,
            star_count: 2000,
            star_seed: 0x5ca1,
        }
    }
}

impl SequenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timings(mut self, timings: SequenceTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn exit_route(mut self, route: impl Into<String>) -> Self {
        self.exit_route = route.into();
        self
    }

    pub fn reveal_cue(mut self, clip: Option<String>) -> Self {
        self.reveal_cue = clip;
        self
    }

    pub fn badge_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.badge_image = Some(path.into());
        self
    }

    pub fn stars(mut self, count: usize, seed: u32) -> Self {
        self.star_count = count;
        self.star_seed = seed;
        self
    }
}

pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub intro_intensity: f32,
    pub home_intensity: f32,
    pub skip_intro: bool,
    pub sequence: SequenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Scanline".to_string(),
            width: 1280,
            height: 720,
            intro_intensity: 0.8,
            home_intensity: 0.5,
            skip_intro: false,
            sequence: SequenceConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn intro_intensity(mut self, intensity: f32) -> Self {
        self.intro_intensity = intensity;
        self
    }

    pub fn skip_intro(mut self, skip: bool) -> Self {
        self.skip_intro = skip;
        self
    }

    pub fn sequence(mut self, sequence: SequenceConfig) -> Self {
        self.sequence = sequence;
        self
    }

    /// Defaults overridden by `SCANLINE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `SCANLINE_SKIP_INTRO`, `SCANLINE_CRT_INTENSITY`,
    /// `SCANLINE_WIDTH` and `SCANLINE_HEIGHT` as returned by `lookup`.
    /// Values that do not parse are reported and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(skip) = parse_var(&lookup, "SCANLINE_SKIP_INTRO", parse_flag) {
            self.skip_intro = skip;
        }
        if let Some(intensity) = parse_var(&lookup, "SCANLINE_CRT_INTENSITY", |v| {
            v.parse::<f32>().ok().filter(|i| i.is_finite())
        }) {
            self.intro_intensity = intensity.clamp(0.0, 1.0);
        }
        if let Some(width) = parse_var(&lookup, "SCANLINE_WIDTH", parse_extent) {
            self.width = width;
        }
        if let Some(height) = parse_var(&lookup, "SCANLINE_HEIGHT", parse_extent) {
            self.height = height;
        }
        self
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        log::warn!("ignoring {key}={raw:?}");
    }
    parsed
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_extent(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_timeline_totals_ten_point_three_seconds() {
        assert_eq!(SequenceTimings::default().total(), Duration::from_millis(10_300));
    }

    #[test]
    fn overrides_apply() {
        let config = AppConfig::new().with_overrides(env(&[
            ("SCANLINE_SKIP_INTRO", "yes"),
            ("SCANLINE_CRT_INTENSITY", "0.25"),
            ("SCANLINE_WIDTH", "640"),
            ("SCANLINE_HEIGHT", "480"),
        ]));
        assert!(config.skip_intro);
        assert_eq!(config.intro_intensity, 0.25);
        assert_eq!((config.width, config.height), (640, 480));
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = AppConfig::new().with_overrides(env(&[
            ("SCANLINE_SKIP_INTRO", "maybe"),
            ("SCANLINE_CRT_INTENSITY", "NaN"),
            ("SCANLINE_WIDTH", "0"),
            ("SCANLINE_HEIGHT", "tall"),
        ]));
        let defaults = AppConfig::default();
        assert_eq!(config.skip_intro, defaults.skip_intro);
        assert_eq!(config.intro_intensity, defaults.intro_intensity);
        assert_eq!((config.width, config.height), (defaults.width, defaults.height));
    }

    #[test]
    fn intensity_override_is_clamped() {
        let config = AppConfig::new().with_overrides(env(&[("SCANLINE_CRT_INTENSITY", "3")]));
        assert_eq!(config.intro_intensity, 1.0);
    }
}
