//! Startup scene: ten cubes scattered in front of the default camera.

use glam::Vec3;

use super::store::{ObjectCreateInfo, ObjectStore};
use crate::error::MboxError;
use crate::transform::{compose, DecomposedTransform};

/// Positions of the seeded cubes.
pub const DEMO_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Shared rotation axis of the seeded cubes.
pub const DEMO_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

/// Angle step between consecutive cubes, in degrees.
pub const DEMO_ANGLE_STEP: f32 = 20.0;

/// Decomposed transform of the `index`-th demo cube.
#[must_use]
pub fn demo_transform(index: usize, color: Vec3) -> DecomposedTransform {
    DecomposedTransform {
        scale: 1.0,
        rotation_angle: DEMO_ANGLE_STEP * index as f32,
        rotation_axis: DEMO_AXIS,
        position: DEMO_POSITIONS[index % DEMO_POSITIONS.len()],
        color,
    }
}

/// Allocate the demo cubes into `store`, returning their slots.
///
/// # Errors
///
/// Propagates [`MboxError::CapacityExceeded`] from a capped store.
pub fn seed_demo_scene(
    store: &mut ObjectStore,
    color: Vec3,
) -> Result<Vec<usize>, MboxError> {
    (0..DEMO_POSITIONS.len())
        .map(|i| {
            store.alloc(ObjectCreateInfo {
                model: compose(&demo_transform(i, color)),
                color,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_ten_consecutive_slots() {
        let mut store = ObjectStore::new();
        let slots = seed_demo_scene(&mut store, Vec3::ONE).unwrap();
        assert_eq!(slots, (0..10).collect::<Vec<_>>());
        assert_eq!(store.len(), 10);

        let last = store.get(9).unwrap();
        assert_eq!(last.model.w_axis.truncate(), DEMO_POSITIONS[9]);
    }

    #[test]
    fn seeding_respects_capacity() {
        let mut store = ObjectStore::with_capacity(Some(4));
        assert!(seed_demo_scene(&mut store, Vec3::ONE).is_err());
        assert_eq!(store.len(), 4);
    }
}
