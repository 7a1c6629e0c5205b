//! Content of the intro: the starfield backdrop and one group per phase.
//!
//! Everything is built up front and uploaded once; phases only toggle group
//! visibility and animate opacity and transforms.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, FRAC_PI_8};

use glam::{Quat, Vec3};

use crate::camera::Camera;
use crate::color::Color;
use crate::config::SequenceConfig;
use crate::drawable::{Drawables, FillBar, GroupId, MIN_SCALE, Primitive, Reveal, Spin, Stretch};
use crate::geometry::{RawGeometry, epitrochoid, regular_polygon, scatter_points};
use crate::scene::SceneOutput;
use crate::sequence::motion::{apply_fill_bars, apply_reveals, apply_spins, apply_stretches};
use crate::sequence::{Phase, PhaseView};

/// Distance of the camera from the content plane.
pub const CAMERA_DISTANCE: f32 = 8.0;

const STAR_EXTENT: f32 = 50.0;
const STAR_SIZE: f32 = 0.1;
const STARFIELD_RATE_Y: f32 = 0.02;
const STARFIELD_RATE_X: f32 = 0.01;

const HOUSING: Color = Color::hex(0x333333);

/// Groups created by [`build_intro`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntroGroups {
    pub backdrop: GroupId,
    pub boot: GroupId,
    pub secondary: GroupId,
    pub reveal: GroupId,
}

impl IntroGroups {
    /// Group whose content is on screen while `phase` is active.
    pub fn group_for(&self, phase: Phase) -> GroupId {
        match phase {
            Phase::Boot => self.boot,
            Phase::Secondary => self.secondary,
            Phase::Reveal | Phase::Transition => self.reveal,
        }
    }
}

/// Uploads the intro meshes and spawns every group. Only the backdrop and
/// the boot group start visible.
pub fn build_intro<O: SceneOutput>(
    camera: &mut Camera,
    drawables: &mut Drawables,
    output: &mut O,
    config: &SequenceConfig,
) -> IntroGroups {
    camera.position = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);

    let groups = IntroGroups {
        backdrop: build_starfield(drawables, output, config.star_count, config.star_seed),
        boot: build_boot(drawables, output),
        secondary: build_secondary(drawables, output),
        reveal: build_reveal(drawables, output, config),
    };
    log::debug!(
        "intro built: {} primitives in {} groups",
        drawables.len(),
        drawables.group_count()
    );
    groups
}

/// Always-visible point cloud behind every phase.
pub fn build_starfield<O: SceneOutput>(
    drawables: &mut Drawables,
    output: &mut O,
    count: usize,
    seed: u32,
) -> GroupId {
    let group = drawables.add_group("backdrop", true);
    let points = scatter_points(count, STAR_EXTENT, seed);
    let mesh = output.upload_mesh(&RawGeometry::point_cloud(&points, STAR_SIZE));
    drawables.spawn(group, Primitive::new(mesh).color(Color::rgb(0.6, 1.0, 0.85)).opacity(0.8));
    group
}

/// Orients the starfield for `elapsed` seconds of slow drift.
pub fn drift_starfield(drawables: &mut Drawables, group: GroupId, elapsed: f32) {
    if let Some(g) = drawables.group_mut(group) {
        g.transform.rotation = Quat::from_rotation_y(elapsed * STARFIELD_RATE_Y)
            * Quat::from_rotation_x(elapsed * STARFIELD_RATE_X);
    }
}

fn build_boot<O: SceneOutput>(drawables: &mut Drawables, output: &mut O) -> GroupId {
    let group = drawables.add_group("boot", true);

    let outer = output.upload_mesh(&RawGeometry::ring(2.5, 2.8, 6));
    let inner = output.upload_mesh(&RawGeometry::ring(1.8, 2.0, 6));
    for mesh in [outer, inner] {
        drawables.spawn(group, Primitive::new(mesh).color(Color::PHOSPHOR).opacity(0.8));
    }

    let line = output.upload_mesh(&RawGeometry::cuboid(2.0, 0.08, 0.01));
    for i in 0..5 {
        let entity = drawables.spawn(
            group,
            Primitive::new(line)
                .at(0.0, 0.5 - i as f32 * 0.25, 0.0)
                .color(Color::PHOSPHOR)
                .opacity(0.0),
        );
        drawables.attach(entity, Reveal::new(i as f32 * 0.15, 2.0, 1.0));
    }

    let frame = output.upload_mesh(&RawGeometry::cuboid(3.0, 0.3, 0.01));
    drawables.spawn(
        group,
        Primitive::new(frame)
            .at(0.0, -1.2, 0.0)
            .color(Color::PHOSPHOR)
            .opacity(0.3),
    );

    // Unit-wide so the fill bar's X scale is its width.
    let fill = output.upload_mesh(&RawGeometry::cuboid(1.0, 0.25, 0.02));
    let bar = drawables.spawn(
        group,
        Primitive::new(fill)
            .at(-1.45, -1.2, 0.0)
            .scaled(Vec3::new(MIN_SCALE, 1.0, 1.0))
            .color(Color::PHOSPHOR)
            .opacity(0.9),
    );
    drawables.attach(
        bar,
        FillBar {
            left: -1.45,
            width: 2.9,
            duration: 2.0,
        },
    );

    let strip = output.upload_mesh(&RawGeometry::plane(5.0, 0.02));
    for i in 0..8 {
        drawables.spawn(
            group,
            Primitive::new(strip)
                .at(0.0, 2.0 - i as f32 * 0.5, 0.1)
                .color(Color::PHOSPHOR)
                .opacity(0.1),
        );
    }
    group
}

fn build_secondary<O: SceneOutput>(drawables: &mut Drawables, output: &mut O) -> GroupId {
    let group = drawables.add_group("secondary", false);

    let housing = output.upload_mesh(&RawGeometry::prism(&epitrochoid(1.5, 0.5, 0.3, 1.2, 64), 0.3));
    let entity = drawables.spawn(
        group,
        Primitive::new(housing).at(0.0, 0.0, -0.15).color(HOUSING).opacity(0.0),
    );
    drawables.attach(entity, Reveal::new(0.0, 2.0, 0.7));

    let rotor = output.upload_mesh(&RawGeometry::prism(&regular_polygon(3, 1.2, -FRAC_PI_2), 0.25));
    let entity = drawables.spawn(group, Primitive::new(rotor).color(Color::PHOSPHOR).opacity(0.0));
    drawables.attach(entity, Reveal::new(0.0, 2.0, 0.9));
    drawables.attach(entity, Spin { rate: 3.0 });

    for (inner, outer, z) in [(1.8, 2.2, 0.2), (2.2, 2.8, 0.15)] {
        let ring = output.upload_mesh(&RawGeometry::ring(inner, outer, 32));
        let entity = drawables.spawn(
            group,
            Primitive::new(ring).at(0.0, 0.0, z).color(Color::PHOSPHOR).opacity(0.0),
        );
        drawables.attach(entity, Reveal::new(0.0, 2.0, 0.7));
    }
    group
}

/// One bar of a glyph: center offset, size and Z rotation.
struct Bar(f32, f32, f32, f32, f32);

/// Brand mark glyphs as (x offset, bars), revealed left to right.
const BRAND_GLYPHS: [(f32, &[Bar]); 4] = [
    (
        -2.0,
        &[
            Bar(0.0, 0.5, 0.1, 1.2, 0.0),
            Bar(0.25, 1.0, 0.6, 0.1, 0.0),
            Bar(0.25, 0.5, 0.6, 0.1, 0.0),
            Bar(0.45, 0.75, 0.1, 0.6, 0.0),
            Bar(0.35, 0.1, 0.4, 0.1, FRAC_PI_6),
        ],
    ),
    (
        -0.7,
        &[
            Bar(0.0, 0.5, 0.12, 1.4, FRAC_PI_4),
            Bar(0.0, 0.5, 0.12, 1.4, -FRAC_PI_4),
        ],
    ),
    (0.4, &[Bar(0.0, 0.5, 0.5, 0.12, 0.0)]),
    (
        1.3,
        &[
            Bar(0.0, 1.0, 0.7, 0.12, 0.0),
            Bar(0.15, 0.4, 0.12, 1.3, FRAC_PI_8),
        ],
    ),
];

const GLYPH_STAGGER: f32 = 0.15;

fn build_reveal<O: SceneOutput>(
    drawables: &mut Drawables,
    output: &mut O,
    config: &SequenceConfig,
) -> GroupId {
    let group = drawables.add_group("reveal", false);
    if let Some(g) = drawables.group_mut(group) {
        g.transform.position.y = 0.3;
    }

    for (i, (x, bars)) in BRAND_GLYPHS.iter().enumerate() {
        for &Bar(bx, by, w, h, angle) in bars.iter() {
            let mesh = output.upload_mesh(&RawGeometry::cuboid(w, h, 0.15));
            let entity = drawables.spawn(
                group,
                Primitive::new(mesh)
                    .at(x + bx, by, 0.0)
                    .rotated_z(angle)
                    .color(Color::AMBER)
                    .opacity(0.0),
            );
            drawables.attach(entity, Reveal::new(i as f32 * GLYPH_STAGGER, 3.0, 1.0));
        }
    }

    let underline = output.upload_mesh(&RawGeometry::cuboid(4.5, 0.08, 0.05));
    let entity = drawables.spawn(
        group,
        Primitive::new(underline)
            .at(0.0, -0.3, 0.0)
            .scaled(Vec3::new(MIN_SCALE, 1.0, 1.0))
            .color(Color::AMBER)
            .opacity(0.0),
    );
    drawables.attach(entity, Reveal::new(0.6, 2.0, 0.9));
    drawables.attach(entity, Stretch { delay: 0.6, rate: 2.0 });

    let badge_mesh = output.upload_mesh(&RawGeometry::cuboid(1.2, 0.5, 0.05));
    let mut badge = Primitive::new(badge_mesh)
        .at(0.0, -0.8, 0.0)
        .color(Color::AMBER)
        .opacity(0.0);
    if let Some(path) = &config.badge_image {
        badge = badge.textured(output.load_texture(path)).color(Color::WHITE);
    }
    let entity = drawables.spawn(group, badge);
    drawables.attach(entity, Reveal::new(0.8, 2.0, 0.8));

    let frame = output.upload_mesh(&RawGeometry::ring(2.5, 3.0, 64));
    let entity = drawables.spawn(
        group,
        Primitive::new(frame).at(0.0, 0.0, -0.1).color(Color::AMBER).opacity(0.0),
    );
    drawables.attach(entity, Reveal::new(1.0, 0.5, 0.4));

    group
}

pub fn animate_boot(view: &mut PhaseView<'_>) {
    apply_reveals(view.drawables, view.group, view.t);
    apply_fill_bars(view.drawables, view.group, view.t);
    let pulse = 1.0 + 0.1 * (view.t * 5.0).sin();
    if let Some(g) = view.drawables.group_mut(view.group) {
        g.transform.scale = Vec3::new(pulse, pulse, 1.0);
    }
}

pub fn animate_secondary(view: &mut PhaseView<'_>) {
    apply_reveals(view.drawables, view.group, view.t);
    apply_spins(view.drawables, view.group, view.dt);
    let t = view.t;
    let scale = 1.0 + 0.05 * (t * 3.0).sin();
    if let Some(g) = view.drawables.group_mut(view.group) {
        g.transform.scale = Vec3::new(scale, scale, 1.0);
        g.transform.rotation =
            Quat::from_rotation_x(0.1 * (t * 2.0).sin()) * Quat::from_rotation_y(0.1 * (t * 1.5).cos());
    }
}

pub fn animate_reveal(view: &mut PhaseView<'_>) {
    apply_reveals(view.drawables, view.group, view.t);
    apply_stretches(view.drawables, view.group, view.t);
    let t = view.t;
    if let Some(g) = view.drawables.group_mut(view.group) {
        g.transform.position.y = 0.3 + 0.1 * (t * 2.0).sin();
        g.transform.rotation = Quat::from_rotation_y(0.05 * (t * 1.5).sin());
    }
}

pub fn animate_transition(view: &mut PhaseView<'_>) {
    view.camera.advance(view.dt * view.dolly_speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::Opacity;
    use crate::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};

    #[test]
    fn only_backdrop_and_boot_start_visible() {
        let mut reg = SceneRegistry::new(HeadlessBackend::new());
        let scene = reg
            .create_scene("intro", SceneConfig::new(HeadlessContainer::new(800, 600)))
            .unwrap();
        let (camera, drawables, output) = scene.parts_mut();
        let groups = build_intro(camera, drawables, output, &SequenceConfig::default());

        assert!(drawables.is_visible(groups.backdrop));
        assert!(drawables.is_visible(groups.boot));
        assert!(!drawables.is_visible(groups.secondary));
        assert!(!drawables.is_visible(groups.reveal));
        assert_eq!(camera.position.z, CAMERA_DISTANCE);

        // 2 hexagons, 5 lines, frame, fill, 8 strips.
        assert_eq!(drawables.member_count(groups.boot), 17);
        assert_eq!(drawables.member_count(groups.secondary), 4);
        // 10 glyph bars, underline, badge, frame.
        assert_eq!(drawables.member_count(groups.reveal), 13);
        assert!(output.meshes() > 0);
    }

    #[test]
    fn boot_lines_cascade() {
        let mut reg = SceneRegistry::new(HeadlessBackend::new());
        let scene = reg
            .create_scene("intro", SceneConfig::new(HeadlessContainer::new(800, 600)))
            .unwrap();
        let (camera, drawables, output) = scene.parts_mut();
        let groups = build_intro(camera, drawables, output, &SequenceConfig::default());

        let mut view = PhaseView {
            drawables: &mut *drawables,
            camera: &mut *camera,
            group: groups.boot,
            t: 0.2,
            dt: 0.2,
            dolly_speed: 10.0,
        };
        animate_boot(&mut view);

        let mut lit: Vec<f32> = drawables
            .world()
            .query::<(&Reveal, &Opacity)>()
            .iter()
            .map(|(_, (_, o))| o.0)
            .filter(|o| *o > 0.0)
            .collect();
        lit.sort_by(f32::total_cmp);
        // Lines 0 and 1 have started, the rest are still waiting.
        assert_eq!(lit.len(), 2);
        assert!((lit[0] - 0.1).abs() < 1e-5);
        assert!((lit[1] - 0.4).abs() < 1e-5);
    }

    #[test]
    fn transition_dollies_forward() {
        let mut camera = Camera::new().at(Vec3::new(0.0, 0.0, 8.0));
        let mut drawables = Drawables::new();
        let group = drawables.add_group("reveal", true);
        let mut view = PhaseView {
            drawables: &mut drawables,
            camera: &mut camera,
            group,
            t: 0.1,
            dt: 0.1,
            dolly_speed: 10.0,
        };
        animate_transition(&mut view);
        assert!((camera.position.z - 7.0).abs() < 1e-5);
    }
}
