//! Drawable groups backed by a per-scene [`hecs::World`].
//!
//! Every visual primitive is an entity carrying a [`Member`] tag, a
//! [`Visual`], a [`Transform`], a [`Tint`] and an [`Opacity`]. Animation
//! components ([`Reveal`], [`Stretch`], [`FillBar`], [`Spin`]) are attached
//! per primitive and driven by elapsed phase time.
//!
//! Groups carry the shared visibility flag and a group transform. Visibility
//! is a single field write, so a timer swapping two groups is never observed
//! half-done by a frame.

use glam::{Mat4, Quat, Vec3};

use crate::color::Color;
use crate::mesh::Transform;

/// Handle to a mesh uploaded through a scene output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Handle to a texture loaded through a scene output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// Which group a primitive belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member(pub GroupId);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visual {
    pub mesh: MeshId,
    pub texture: Option<TextureId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint(pub Color);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Opacity(pub f32);

/// Opacity ramp: after `delay` seconds, rises at `rate` per second up to `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reveal {
    pub delay: f32,
    pub rate: f32,
    pub max: f32,
}

impl Reveal {
    pub fn new(delay: f32, rate: f32, max: f32) -> Self {
        Self { delay, rate, max }
    }

    /// `None` until the delay has passed.
    pub fn opacity_at(&self, t: f32) -> Option<f32> {
        (t > self.delay).then(|| ((t - self.delay) * self.rate).min(self.max))
    }
}

/// Horizontal stretch-in: X scale grows from 0 to 1 after `delay`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stretch {
    pub delay: f32,
    pub rate: f32,
}

/// Fill bar anchored at `left`, reaching `width` after `duration` seconds.
/// The primitive's mesh is expected to be one unit wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillBar {
    pub left: f32,
    pub width: f32,
    pub duration: f32,
}

impl FillBar {
    pub fn progress(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (t / self.duration).clamp(0.0, 1.0)
    }
}

/// Continuous rotation about Z in radians per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub rate: f32,
}

/// Scale used instead of zero so model matrices stay invertible.
pub const MIN_SCALE: f32 = 1e-3;

/// Entry description for [`Drawables::spawn`].
#[derive(Clone, Copy, Debug)]
pub struct Primitive {
    pub visual: Visual,
    pub transform: Transform,
    pub color: Color,
    pub opacity: f32,
}

impl Primitive {
    pub fn new(mesh: MeshId) -> Self {
        Self {
            visual: Visual {
                mesh,
                texture: None,
            },
            transform: Transform::default(),
            color: Color::WHITE,
            opacity: 1.0,
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }

    pub fn rotated_z(mut self, angle: f32) -> Self {
        self.transform.rotation = Quat::from_rotation_z(angle);
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn textured(mut self, texture: TextureId) -> Self {
        self.visual.texture = Some(texture);
        self
    }
}

#[derive(Clone, Debug)]
pub struct DrawableGroup {
    name: String,
    visible: bool,
    pub transform: Transform,
}

impl DrawableGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// One resolved draw: world matrix and final color with opacity applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub texture: Option<TextureId>,
    pub model: Mat4,
    pub color: Color,
}

/// Opacities at or below this are not drawn.
const VISIBLE_ALPHA: f32 = 1e-3;

#[derive(Default)]
pub struct Drawables {
    world: hecs::World,
    groups: Vec<DrawableGroup>,
}

impl Drawables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<String>, visible: bool) -> GroupId {
        self.groups.push(DrawableGroup {
            name: name.into(),
            visible,
            transform: Transform::default(),
        });
        GroupId(self.groups.len() - 1)
    }

    pub fn group(&self, id: GroupId) -> Option<&DrawableGroup> {
        self.groups.get(id.0)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut DrawableGroup> {
        self.groups.get_mut(id.0)
    }

    pub fn find_group(&self, name: &str) -> Option<GroupId> {
        self.groups.iter().position(|g| g.name == name).map(GroupId)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &DrawableGroup)> {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn set_visible(&mut self, id: GroupId, visible: bool) {
        if let Some(group) = self.groups.get_mut(id.0) {
            group.visible = visible;
        }
    }

    pub fn is_visible(&self, id: GroupId) -> bool {
        self.groups.get(id.0).is_some_and(|g| g.visible)
    }

    pub fn spawn(&mut self, group: GroupId, primitive: Primitive) -> hecs::Entity {
        self.world.spawn((
            Member(group),
            primitive.visual,
            primitive.transform,
            Tint(primitive.color),
            Opacity(primitive.opacity),
        ))
    }

    /// Attaches an animation or marker component to a spawned primitive.
    pub fn attach<C: hecs::Component>(&mut self, entity: hecs::Entity, component: C) {
        if self.world.insert_one(entity, component).is_err() {
            log::warn!("attach to despawned drawable {entity:?}");
        }
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// Number of primitives across all groups.
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn member_count(&self, group: GroupId) -> usize {
        self.world
            .query::<&Member>()
            .iter()
            .filter(|(_, m)| m.0 == group)
            .count()
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.groups.clear();
    }

    /// Resolves every primitive of every visible group into `out`.
    pub fn collect(&self, out: &mut Vec<DrawItem>) {
        let mut query = self
            .world
            .query::<(&Member, &Visual, &Transform, &Tint, &Opacity)>();
        for (_, (member, visual, transform, tint, opacity)) in query.iter() {
            let Some(group) = self.groups.get(member.0.0) else {
                continue;
            };
            let alpha = tint.0.a * opacity.0;
            if !group.visible || alpha <= VISIBLE_ALPHA {
                continue;
            }
            out.push(DrawItem {
                mesh: visual.mesh,
                texture: visual.texture,
                model: group.transform.matrix() * transform.matrix(),
                color: tint.0.with_alpha(alpha),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_waits_for_delay_then_caps() {
        let r = Reveal::new(0.6, 2.0, 0.9);
        assert_eq!(r.opacity_at(0.5), None);
        assert_eq!(r.opacity_at(0.6), None);
        assert!((r.opacity_at(0.85).unwrap() - 0.5).abs() < 1e-5);
        assert_eq!(r.opacity_at(5.0), Some(0.9));
    }

    #[test]
    fn fill_bar_progress_is_clamped() {
        let bar = FillBar {
            left: -1.45,
            width: 2.9,
            duration: 2.0,
        };
        assert_eq!(bar.progress(-1.0), 0.0);
        assert_eq!(bar.progress(1.0), 0.5);
        assert_eq!(bar.progress(9.0), 1.0);
    }

    #[test]
    fn hidden_groups_and_transparent_primitives_are_skipped() {
        let mut d = Drawables::new();
        let shown = d.add_group("shown", true);
        let hidden = d.add_group("hidden", false);
        d.spawn(shown, Primitive::new(MeshId(0)));
        d.spawn(shown, Primitive::new(MeshId(1)).opacity(0.0));
        d.spawn(hidden, Primitive::new(MeshId(2)));

        let mut out = Vec::new();
        d.collect(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mesh, MeshId(0));

        d.set_visible(hidden, true);
        out.clear();
        d.collect(&mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn group_transform_composes_with_primitive() {
        let mut d = Drawables::new();
        let g = d.add_group("g", true);
        d.spawn(g, Primitive::new(MeshId(0)).at(1.0, 0.0, 0.0).opacity(0.5));
        if let Some(group) = d.group_mut(g) {
            group.transform.position = Vec3::new(0.0, 0.3, 0.0);
        }

        let mut out = Vec::new();
        d.collect(&mut out);
        let p = out[0].model.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 0.3, 0.0)).length() < 1e-6);
        assert_eq!(out[0].color.a, 0.5);
    }

    #[test]
    fn members_are_counted_per_group() {
        let mut d = Drawables::new();
        let a = d.add_group("a", true);
        let b = d.add_group("b", false);
        for _ in 0..3 {
            d.spawn(a, Primitive::new(MeshId(0)));
        }
        d.spawn(b, Primitive::new(MeshId(0)));
        assert_eq!(d.member_count(a), 3);
        assert_eq!(d.member_count(b), 1);
        assert_eq!(d.len(), 4);
        assert_eq!(d.find_group("b"), Some(b));
    }
}
