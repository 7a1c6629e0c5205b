use crate::crt::{CrtField, CrtParams};

/// Eased distortion scalar. `current` approaches `target` every frame and
/// never snaps or overshoots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchIntensity {
    current: f32,
    target: f32,
    rate: f32,
}

impl GlitchIntensity {
    pub fn new(rate: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            rate: rate.max(0.0),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// `current += (target - current) * dt * k`, with the step factor capped
    /// at 1 so a long frame lands on the target instead of past it.
    pub fn update(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            let step = (dt * self.rate).clamp(0.0, 1.0);
            let eased = self.current + (self.target - self.current) * step;
            // Rounding must not carry the value past the target.
            let (lo, hi) = if self.current <= self.target {
                (self.current, self.target)
            } else {
                (self.target, self.current)
            };
            self.current = eased.clamp(lo, hi);
        }
        self.current
    }
}

/// Chromatic aberration and noise driven by the glitch value.
pub fn apply_glitch(params: &mut CrtParams, glitch: f32) {
    params.set(CrtField::ChromaticAberration, 1.0 + glitch * 5.0);
    params.set(CrtField::Noise, 0.3 + glitch * 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn between(value: f32, a: f32, b: f32) -> bool {
        value >= a.min(b) && value <= a.max(b)
    }

    #[test]
    fn never_overshoots() {
        let deltas = [0.0, 0.001, 0.016, 0.05, 0.2, 0.199, 1.0, 7.5, 120.0];
        for target in [1.0, 1.5, 0.0, -0.5] {
            let mut g = GlitchIntensity::new(5.0);
            g.set_target(0.7);
            g.update(0.1);
            g.set_target(target);
            for dt in deltas {
                let before = g.current();
                let after = g.update(dt);
                assert!(
                    between(after, before, target),
                    "dt {dt}: {before} -> {after} with target {target}"
                );
            }
        }
    }

    #[test]
    fn converges_at_rate_k() {
        let mut g = GlitchIntensity::new(5.0);
        g.set_target(1.0);
        assert!((g.update(0.1) - 0.5).abs() < 1e-6);
        assert!((g.update(0.1) - 0.75).abs() < 1e-6);
        assert_eq!(g.update(0.0), g.current());
        assert_eq!(g.update(10.0), 1.0);
    }

    #[test]
    fn negative_or_nan_delta_is_ignored() {
        let mut g = GlitchIntensity::new(5.0);
        g.set_target(1.0);
        assert_eq!(g.update(-1.0), 0.0);
        assert_eq!(g.update(f32::NAN), 0.0);
    }

    #[test]
    fn fan_out_to_effect() {
        let mut params = CrtParams::new().with_intensity(0.8);
        apply_glitch(&mut params, 1.5);
        assert_eq!(params.chromatic_aberration, 8.5);
        assert!((params.noise - 3.3).abs() < 1e-5);
        apply_glitch(&mut params, 0.0);
        assert_eq!(params.chromatic_aberration, 1.0);
        assert!((params.noise - 0.3).abs() < 1e-6);
    }
}
