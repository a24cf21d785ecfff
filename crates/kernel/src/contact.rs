//! Narrow-phase contact tests, dispatched on the closed `Shape` enum.

use glam::Vec3;
use groundfall_common::{BodyHandle, ColliderHandle, Pose};
use serde::{Deserialize, Serialize};

use crate::shape::{Heightfield, Shape};

/// Signed distance between two shapes along a unit normal pointing from the
/// first shape towards the second. Negative distance means overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separation {
    pub normal: Vec3,
    pub distance: f32,
}

impl Separation {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            distance: self.distance,
        }
    }
}

/// An overlapping collider pair found during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit normal from A towards B.
    pub normal: Vec3,
    /// Overlap depth, always positive.
    pub depth: f32,
}

/// Separation of two posed shapes, or `None` when the pair has no test
/// (heightfield against heightfield) or the box is entirely off the grid.
pub fn separation(a: &Shape, pose_a: &Pose, b: &Shape, pose_b: &Pose) -> Option<Separation> {
    match (a, b) {
        (Shape::Cuboid { half_extents: ha }, Shape::Cuboid { half_extents: hb }) => {
            Some(cuboid_cuboid(pose_a, *ha, pose_b, *hb))
        }
        (Shape::Heightfield(field), Shape::Cuboid { half_extents }) => {
            heightfield_cuboid(pose_a, field, pose_b, *half_extents)
        }
        (Shape::Cuboid { half_extents }, Shape::Heightfield(field)) => {
            heightfield_cuboid(pose_b, field, pose_a, *half_extents).map(Separation::flipped)
        }
        (Shape::Heightfield(_), Shape::Heightfield(_)) => None,
    }
}

fn box_axes(pose: &Pose) -> [Vec3; 3] {
    [
        pose.orientation * Vec3::X,
        pose.orientation * Vec3::Y,
        pose.orientation * Vec3::Z,
    ]
}

/// Half-length of a box's shadow on `axis`.
fn projected_radius(axes: &[Vec3; 3], half_extents: Vec3, axis: Vec3) -> f32 {
    half_extents.x * axes[0].dot(axis).abs()
        + half_extents.y * axes[1].dot(axis).abs()
        + half_extents.z * axes[2].dot(axis).abs()
}

/// Separating-axis test over the six face normals of two oriented boxes.
///
/// Returns the axis with the largest gap; when every gap is negative that is
/// the axis of least overlap.
///
/// The normal's sign follows the offset between the box centres. A box that
/// crosses the other's centre plane within one step is therefore pushed out
/// through the far face. There is no continuous collision detection, so
/// thin fixed boxes need `speed * time_step` below their half-height.
pub fn cuboid_cuboid(pose_a: &Pose, half_a: Vec3, pose_b: &Pose, half_b: Vec3) -> Separation {
    let axes_a = box_axes(pose_a);
    let axes_b = box_axes(pose_b);
    let offset = pose_b.position - pose_a.position;

    let mut best = Separation {
        normal: Vec3::Y,
        distance: f32::NEG_INFINITY,
    };
    for axis in axes_a.iter().chain(axes_b.iter()).copied() {
        let along = offset.dot(axis);
        let gap = along.abs()
            - projected_radius(&axes_a, half_a, axis)
            - projected_radius(&axes_b, half_b, axis);
        if gap > best.distance {
            best = Separation {
                normal: if along < 0.0 { -axis } else { axis },
                distance: gap,
            };
        }
    }
    best
}

fn cuboid_corners(half: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(-half.x, -half.y, -half.z),
        Vec3::new(half.x, -half.y, -half.z),
        Vec3::new(-half.x, half.y, -half.z),
        Vec3::new(half.x, half.y, -half.z),
        Vec3::new(-half.x, -half.y, half.z),
        Vec3::new(half.x, -half.y, half.z),
        Vec3::new(-half.x, half.y, half.z),
        Vec3::new(half.x, half.y, half.z),
    ]
}

/// Deepest box vertex below the surface, measured along the field's up axis.
///
/// Vertices outside the grid are skipped; `None` if all of them are.
pub fn heightfield_cuboid(
    field_pose: &Pose,
    field: &Heightfield,
    box_pose: &Pose,
    half_extents: Vec3,
) -> Option<Separation> {
    let mut deepest: Option<f32> = None;
    for corner in cuboid_corners(half_extents) {
        let local = field_pose.inverse_transform_point(box_pose.transform_point(corner));
        let Some(surface) = field.height_at(local.x, local.z) else {
            continue;
        };
        let penetration = surface - local.y;
        deepest = Some(deepest.map_or(penetration, |d| d.max(penetration)));
    }
    deepest.map(|penetration| Separation {
        normal: field_pose.orientation * Vec3::Y,
        distance: -penetration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2};

    #[test]
    fn stacked_boxes_report_overlap_along_y() {
        let ground = Pose::default();
        let cube = Pose::from_translation(Vec3::new(0.0, 0.55, 0.0));
        let sep = cuboid_cuboid(&ground, Vec3::new(10.0, 0.1, 10.0), &cube, Vec3::splat(0.5));
        assert_eq!(sep.normal, Vec3::Y);
        assert!((sep.distance + 0.05).abs() < 1e-6);
    }

    #[test]
    fn separated_boxes_report_gap() {
        let a = Pose::default();
        let b = Pose::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let sep = cuboid_cuboid(&a, Vec3::ONE, &b, Vec3::splat(0.5));
        assert_eq!(sep.normal, Vec3::X);
        assert!((sep.distance - 1.5).abs() < 1e-6);
    }

    #[test]
    fn normal_points_from_a_to_b() {
        let a = Pose::from_translation(Vec3::new(0.0, 0.0, 0.8));
        let b = Pose::default();
        let sep = cuboid_cuboid(&a, Vec3::splat(0.5), &b, Vec3::splat(0.5));
        assert_eq!(sep.normal, -Vec3::Z);
        assert!((sep.distance + 0.2).abs() < 1e-6);
    }

    #[test]
    fn normal_follows_centre_offset_when_deeply_embedded() {
        let slab = Pose::default();
        let half_slab = Vec3::new(10.0, 0.1, 10.0);
        let above = Pose::from_translation(Vec3::new(0.0, 0.01, 0.0));
        let below = Pose::from_translation(Vec3::new(0.0, -0.01, 0.0));
        let up = cuboid_cuboid(&slab, half_slab, &above, Vec3::splat(0.5));
        let down = cuboid_cuboid(&slab, half_slab, &below, Vec3::splat(0.5));
        assert_eq!(up.normal, Vec3::Y);
        assert_eq!(down.normal, -Vec3::Y);
        assert!((up.distance + 0.59).abs() < 1e-6);
    }

    #[test]
    fn rotated_box_uses_its_own_face_normals() {
        let a = Pose::default();
        // 45 degrees about y: corner reaches sqrt(2) * 0.5 along x
        let b = Pose::new(
            Vec3::new(1.2, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
        );
        let sep = cuboid_cuboid(&a, Vec3::splat(0.5), &b, Vec3::splat(0.5));
        let expected = 1.2 - 0.5 - 0.5 * std::f32::consts::SQRT_2;
        assert!((sep.distance - expected).abs() < 1e-5);
    }

    #[test]
    fn box_over_flat_field() {
        let field = Heightfield::flat(5, 5, Vec2::ONE, 0.0).unwrap();
        let cube = Pose::from_translation(Vec3::new(0.0, 0.4, 0.0));
        let sep = heightfield_cuboid(&Pose::default(), &field, &cube, Vec3::splat(0.5)).unwrap();
        assert_eq!(sep.normal, Vec3::Y);
        assert!((sep.distance + 0.1).abs() < 1e-6);
    }

    #[test]
    fn box_off_the_grid_has_no_separation() {
        let field = Heightfield::flat(3, 3, Vec2::ONE, 0.0).unwrap();
        let cube = Pose::from_translation(Vec3::new(10.0, 0.0, 0.0));
        assert!(heightfield_cuboid(&Pose::default(), &field, &cube, Vec3::splat(0.5)).is_none());
    }

    #[test]
    fn deepest_vertex_wins_on_a_slope() {
        // heights rise with x: the +x corners sit deeper
        let field = Heightfield::new(3, 2, Vec2::ONE, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap();
        let cube = Pose::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let sep = heightfield_cuboid(&Pose::default(), &field, &cube, Vec3::splat(0.5)).unwrap();
        // corner at x=0.5, y=0.5 under a surface of 1.5
        assert!((sep.distance + 1.0).abs() < 1e-6);
    }

    #[test]
    fn dispatch_flips_normal_for_box_first() {
        let field = Shape::Heightfield(Heightfield::flat(5, 5, Vec2::ONE, 0.0).unwrap());
        let cube = Shape::cuboid(0.5, 0.5, 0.5);
        let cube_pose = Pose::from_translation(Vec3::new(0.0, 0.45, 0.0));
        let sep = separation(&cube, &cube_pose, &field, &Pose::default()).unwrap();
        assert_eq!(sep.normal, -Vec3::Y);
        assert!(separation(&field, &Pose::default(), &field, &Pose::default()).is_none());
    }
}
