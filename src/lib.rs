// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive 3D box scene editor built on wgpu.
//!
//! A scene of cubes is kept in an [`scene::ObjectStore`]. Clicking a cube
//! checks it out into the [`edit::EditSession`], where its scale,
//! angle/axis rotation, position and color become editable fields; clicking
//! the background or another cube writes it back. What was clicked is
//! found with GPU picking: every visible object is drawn into an offscreen
//! integer target carrying its id, and the texel under the cursor is read
//! back.
//!
//! # Key entry points
//!
//! - [`EditorEngine`] - owns the GPU passes, store, session and camera
//! - [`transform`] - compose / decompose between editable fields and model
//!   matrices
//! - [`picking::PickPass`] - the offscreen picking target
//! - [`options::Options`] - TOML configuration (camera, editor, panel
//!   ranges, lighting, key bindings)
//! - `Viewer` (feature `viewer`) - a ready-made winit window
//!
//! # Frame order
//!
//! Each frame uploads the camera uniform, redraws the picking target, draws
//! the lit scene (stored objects, the active object, the light marker) and
//! then closes the frame on the edit session, which is when a discarded
//! object finally disappears.

pub mod camera;
pub mod edit;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod transform;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::{EditorCommand, EditorEngine};
pub use error::MboxError;
pub use input::{InputEvent, MouseButton};
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
