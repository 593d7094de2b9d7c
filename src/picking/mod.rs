//! GPU object picking.
//!
//! Stored objects are drawn into an offscreen integer target with their
//! picking id (`slot + 1`) and kind; the texel under the cursor is read back
//! on click to find out which object, if any, is visible there.

mod pass;
mod target;

pub use pass::{PickPass, PickScope, PICK_FORMAT};
pub use target::{
    pick_id, slot_from_pick_id, window_to_framebuffer, PickKind, PickTarget,
    TexelInfo,
};
