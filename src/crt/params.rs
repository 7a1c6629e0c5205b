//! The CRT effect parameter set and its single intensity control.

/// One tunable scalar of the CRT effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrtField {
    ScanlineIntensity,
    ScanlineCount,
    Vignette,
    Curvature,
    ChromaticAberration,
    Flicker,
    Noise,
    Brightness,
    Contrast,
    Saturation,
    PhosphorGlow,
}

impl CrtField {
    pub const ALL: [CrtField; 11] = [
        CrtField::ScanlineIntensity,
        CrtField::ScanlineCount,
        CrtField::Vignette,
        CrtField::Curvature,
        CrtField::ChromaticAberration,
        CrtField::Flicker,
        CrtField::Noise,
        CrtField::Brightness,
        CrtField::Contrast,
        CrtField::Saturation,
        CrtField::PhosphorGlow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CrtField::ScanlineIntensity => "scanline_intensity",
            CrtField::ScanlineCount => "scanline_count",
            CrtField::Vignette => "vignette",
            CrtField::Curvature => "curvature",
            CrtField::ChromaticAberration => "chromatic_aberration",
            CrtField::Flicker => "flicker",
            CrtField::Noise => "noise",
            CrtField::Brightness => "brightness",
            CrtField::Contrast => "contrast",
            CrtField::Saturation => "saturation",
            CrtField::PhosphorGlow => "phosphor_glow",
        }
    }

    /// Inclusive valid range. Aberration and noise leave headroom for glitch peaks.
    pub fn range(self) -> (f32, f32) {
        match self {
            CrtField::ScanlineIntensity => (0.0, 1.0),
            CrtField::ScanlineCount => (1.0, 4096.0),
            CrtField::Vignette => (0.0, 4.0),
            CrtField::Curvature => (0.0, 2.0),
            CrtField::ChromaticAberration => (0.0, 16.0),
            CrtField::Flicker => (0.0, 2.0),
            CrtField::Noise => (0.0, 8.0),
            CrtField::Brightness => (0.0, 4.0),
            CrtField::Contrast => (0.0, 4.0),
            CrtField::Saturation => (0.0, 4.0),
            CrtField::PhosphorGlow => (0.0, 2.0),
        }
    }
}

/// `field = base + intensity * span`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntensityMapping {
    pub field: CrtField,
    pub base: f32,
    pub span: f32,
}

const fn map(field: CrtField, base: f32, span: f32) -> IntensityMapping {
    IntensityMapping { field, base, span }
}

/// Fields driven by [`CrtParams::set_intensity`]. Others keep their values.
pub const INTENSITY_TABLE: [IntensityMapping; 7] = [
    map(CrtField::ScanlineIntensity, 0.5, 0.5),
    map(CrtField::Curvature, 0.3, 0.4),
    map(CrtField::ChromaticAberration, 0.5, 1.0),
    map(CrtField::Flicker, 0.1, 0.4),
    map(CrtField::Noise, 0.2, 0.4),
    map(CrtField::Vignette, 0.8, 0.6),
    map(CrtField::PhosphorGlow, 0.2, 0.4),
];

/// Inputs to the CRT emulation pass.
///
/// `time` is the stage's own clock: it only moves through [`advance`](Self::advance),
/// so a paused render loop freezes flicker, noise and the scanline band.
#[derive(Clone, Debug, PartialEq)]
pub struct CrtParams {
    pub scanline_intensity: f32,
    pub scanline_count: f32,
    pub vignette: f32,
    pub curvature: f32,
    pub chromatic_aberration: f32,
    pub flicker: f32,
    pub noise: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub phosphor_glow: f32,
    pub tint: [f32; 3],
    time: f32,
    intensity: Option<f32>,
}

impl Default for CrtParams {
    fn default() -> Self {
        Self {
            scanline_intensity: 0.7,
            scanline_count: 800.0,
            vignette: 1.2,
            curvature: 0.5,
            chromatic_aberration: 1.0,
            flicker: 0.3,
            noise: 0.4,
            brightness: 1.15,
            contrast: 1.1,
            saturation: 1.2,
            phosphor_glow: 0.4,
            tint: [1.0, 0.98, 0.95],
            time: 0.0,
            intensity: None,
        }
    }
}

impl CrtParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.set_intensity(intensity);
        self
    }

    /// Clamps `value` to `[0, 1]` and fans it out through [`INTENSITY_TABLE`].
    pub fn set_intensity(&mut self, value: f32) {
        let i = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        for m in INTENSITY_TABLE {
            self.set(m.field, m.base + i * m.span);
        }
        self.intensity = Some(i);
    }

    /// Last value applied through [`set_intensity`](Self::set_intensity).
    pub fn intensity(&self) -> Option<f32> {
        self.intensity
    }

    pub fn get(&self, field: CrtField) -> f32 {
        match field {
            CrtField::ScanlineIntensity => self.scanline_intensity,
            CrtField::ScanlineCount => self.scanline_count,
            CrtField::Vignette => self.vignette,
            CrtField::Curvature => self.curvature,
            CrtField::ChromaticAberration => self.chromatic_aberration,
            CrtField::Flicker => self.flicker,
            CrtField::Noise => self.noise,
            CrtField::Brightness => self.brightness,
            CrtField::Contrast => self.contrast,
            CrtField::Saturation => self.saturation,
            CrtField::PhosphorGlow => self.phosphor_glow,
        }
    }

    /// Writes one field, clamped to its range.
    pub fn set(&mut self, field: CrtField, value: f32) {
        let (lo, hi) = field.range();
        let v = value.clamp(lo, hi);
        let slot = match field {
            CrtField::ScanlineIntensity => &mut self.scanline_intensity,
            CrtField::ScanlineCount => &mut self.scanline_count,
            CrtField::Vignette => &mut self.vignette,
            CrtField::Curvature => &mut self.curvature,
            CrtField::ChromaticAberration => &mut self.chromatic_aberration,
            CrtField::Flicker => &mut self.flicker,
            CrtField::Noise => &mut self.noise,
            CrtField::Brightness => &mut self.brightness,
            CrtField::Contrast => &mut self.contrast,
            CrtField::Saturation => &mut self.saturation,
            CrtField::PhosphorGlow => &mut self.phosphor_glow,
        };
        *slot = v;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances the effect clock. Negative deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.time += dt;
        }
    }

    pub fn uniforms(&self, width: u32, height: u32) -> CrtUniforms {
        CrtUniforms {
            resolution: [width as f32, height as f32],
            time: self.time,
            scanline_intensity: self.scanline_intensity,
            scanline_count: self.scanline_count,
            vignette: self.vignette,
            curvature: self.curvature,
            chromatic_aberration: self.chromatic_aberration,
            flicker: self.flicker,
            noise: self.noise,
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
            phosphor_glow: self.phosphor_glow,
            _pad0: [0.0; 2],
            tint: self.tint,
            _pad1: 0.0,
        }
    }
}

/// GPU layout of [`CrtParams`], matching `CrtUniforms` in `crt.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CrtUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub scanline_intensity: f32,
    pub scanline_count: f32,
    pub vignette: f32,
    pub curvature: f32,
    pub chromatic_aberration: f32,
    pub flicker: f32,
    pub noise: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub phosphor_glow: f32,
    pub _pad0: [f32; 2],
    pub tint: [f32; 3],
    pub _pad1: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_is_clamped() {
        let mut p = CrtParams::new();
        p.set_intensity(3.0);
        assert_eq!(p.intensity(), Some(1.0));
        let high = p.clone();
        p.set_intensity(1.0);
        assert_eq!(p, high);

        p.set_intensity(-2.0);
        assert_eq!(p.intensity(), Some(0.0));
        assert_eq!(p.curvature, 0.3);
    }

    #[test]
    fn intensity_endpoints_are_exact() {
        let mut p = CrtParams::new();
        p.set_intensity(0.0);
        for m in INTENSITY_TABLE {
            assert_eq!(p.get(m.field), m.base, "{}", m.field.name());
        }
        p.set_intensity(1.0);
        for m in INTENSITY_TABLE {
            assert_eq!(p.get(m.field), m.base + m.span, "{}", m.field.name());
        }
        assert_eq!(p.scanline_intensity, 1.0);
        assert_eq!(p.chromatic_aberration, 1.5);
    }

    #[test]
    fn intensity_leaves_unmapped_fields() {
        let mut p = CrtParams::new();
        p.set_intensity(0.25);
        assert_eq!(p.scanline_count, 800.0);
        assert_eq!(p.brightness, 1.15);
        assert_eq!(p.tint, [1.0, 0.98, 0.95]);
    }

    #[test]
    fn set_clamps_to_range() {
        let mut p = CrtParams::new();
        p.set(CrtField::ScanlineIntensity, 4.0);
        assert_eq!(p.scanline_intensity, 1.0);
        p.set(CrtField::Noise, -1.0);
        assert_eq!(p.noise, 0.0);
    }

    #[test]
    fn clock_only_moves_forward() {
        let mut p = CrtParams::new();
        p.advance(0.5);
        p.advance(-1.0);
        p.advance(0.25);
        assert_eq!(p.time(), 0.75);
        assert_eq!(p.uniforms(320, 240).time, 0.75);
    }

    #[test]
    fn uniform_layout_is_80_bytes() {
        assert_eq!(std::mem::size_of::<CrtUniforms>(), 80);
    }
}
