//! Shared utilities.

/// Frame delta time and smoothed FPS.
pub mod frame_timing;
