//! Scene content: the slot-addressed object store and demo seeding.

mod demo;
mod store;

pub use demo::{
    demo_transform, seed_demo_scene, DEMO_ANGLE_STEP, DEMO_AXIS,
    DEMO_POSITIONS,
};
pub use store::{
    ObjectCreateInfo, ObjectIter, ObjectStore, StoredObject, Visibility,
};
