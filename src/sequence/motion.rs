//! Per-primitive animation systems, run over one group at a time.
//!
//! All of them are functions of phase time or frame delta, never of frame
//! count, so dropped frames only make the next step larger.

use glam::Quat;

use crate::drawable::{Drawables, FillBar, GroupId, MIN_SCALE, Member, Opacity, Reveal, Spin, Stretch};
use crate::mesh::Transform;

/// Staggered opacity ramps.
pub fn apply_reveals(drawables: &mut Drawables, group: GroupId, t: f32) {
    for (_, (member, reveal, opacity)) in drawables
        .world_mut()
        .query_mut::<(&Member, &Reveal, &mut Opacity)>()
    {
        if member.0 != group {
            continue;
        }
        if let Some(value) = reveal.opacity_at(t) {
            opacity.0 = value;
        }
    }
}

pub fn apply_stretches(drawables: &mut Drawables, group: GroupId, t: f32) {
    for (_, (member, stretch, transform)) in drawables
        .world_mut()
        .query_mut::<(&Member, &Stretch, &mut Transform)>()
    {
        if member.0 != group {
            continue;
        }
        let x = ((t - stretch.delay) * stretch.rate).clamp(0.0, 1.0);
        transform.scale.x = x.max(MIN_SCALE);
    }
}

/// Loading bars grow rightwards from their left edge.
pub fn apply_fill_bars(drawables: &mut Drawables, group: GroupId, t: f32) {
    for (_, (member, bar, transform)) in drawables
        .world_mut()
        .query_mut::<(&Member, &FillBar, &mut Transform)>()
    {
        if member.0 != group {
            continue;
        }
        let width = (bar.progress(t) * bar.width).max(MIN_SCALE);
        transform.scale.x = width;
        transform.position.x = bar.left + width * 0.5;
    }
}

pub fn apply_spins(drawables: &mut Drawables, group: GroupId, dt: f32) {
    for (_, (member, spin, transform)) in drawables
        .world_mut()
        .query_mut::<(&Member, &Spin, &mut Transform)>()
    {
        if member.0 != group {
            continue;
        }
        transform.rotation = (Quat::from_rotation_z(spin.rate * dt) * transform.rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{MeshId, Primitive};
    use glam::Vec3;

    fn setup() -> (Drawables, GroupId, GroupId) {
        let mut d = Drawables::new();
        let a = d.add_group("a", true);
        let b = d.add_group("b", false);
        (d, a, b)
    }

    #[test]
    fn reveals_only_touch_their_group() {
        let (mut d, a, b) = setup();
        let mine = d.spawn(a, Primitive::new(MeshId(0)).opacity(0.0));
        d.attach(mine, Reveal::new(0.15, 2.0, 1.0));
        let other = d.spawn(b, Primitive::new(MeshId(0)).opacity(0.0));
        d.attach(other, Reveal::new(0.0, 2.0, 1.0));

        apply_reveals(&mut d, a, 0.1);
        assert_eq!(d.world().get::<&Opacity>(mine).unwrap().0, 0.0);

        apply_reveals(&mut d, a, 0.4);
        let o = d.world().get::<&Opacity>(mine).unwrap().0;
        assert!((o - 0.5).abs() < 1e-5);
        assert_eq!(d.world().get::<&Opacity>(other).unwrap().0, 0.0);
    }

    #[test]
    fn fill_bar_grows_from_left_edge() {
        let (mut d, a, _) = setup();
        let bar = d.spawn(a, Primitive::new(MeshId(0)).at(-1.45, -1.2, 0.0));
        d.attach(
            bar,
            FillBar {
                left: -1.45,
                width: 2.9,
                duration: 2.0,
            },
        );

        apply_fill_bars(&mut d, a, 1.0);
        let t = *d.world().get::<&Transform>(bar).unwrap();
        assert!((t.scale.x - 1.45).abs() < 1e-5);
        assert!((t.position.x + 0.725).abs() < 1e-5);

        apply_fill_bars(&mut d, a, 9.0);
        let t = *d.world().get::<&Transform>(bar).unwrap();
        assert!((t.scale.x - 2.9).abs() < 1e-5);
        assert!(t.position.x.abs() < 1e-5);
    }

    #[test]
    fn stretch_starts_collapsed() {
        let (mut d, a, _) = setup();
        let line = d.spawn(a, Primitive::new(MeshId(0)).scaled(Vec3::new(MIN_SCALE, 1.0, 1.0)));
        d.attach(line, Stretch { delay: 0.6, rate: 2.0 });
        apply_stretches(&mut d, a, 0.3);
        assert_eq!(d.world().get::<&Transform>(line).unwrap().scale.x, MIN_SCALE);
        apply_stretches(&mut d, a, 0.85);
        assert!((d.world().get::<&Transform>(line).unwrap().scale.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn spin_is_delta_based() {
        let (mut d, a, _) = setup();
        let rotor = d.spawn(a, Primitive::new(MeshId(0)));
        d.attach(rotor, Spin { rate: 3.0 });
        apply_spins(&mut d, a, 0.25);
        apply_spins(&mut d, a, 0.25);
        let q = d.world().get::<&Transform>(rotor).unwrap().rotation;
        assert!(q.abs_diff_eq(Quat::from_rotation_z(1.5), 1e-5));
    }
}
