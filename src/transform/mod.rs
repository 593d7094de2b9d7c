//! Transform codec: conversion between the editable decomposed form
//! (scale, angle/axis rotation, translation) and 4×4 affine model matrices.
//!
//! Matrices are addressed as `m[row][col]` with column vectors, which maps
//! directly onto glam's column-major [`Mat4`](glam::Mat4): `m[row][col]` is
//! `m.col(col)[row]`, translation lives in column 3.

/// Compose / decompose / projection primitives.
pub mod codec;
/// The editable decomposed transform.
pub mod decomposed;

pub use codec::{
    compose, decompose, frustum_hfov, rotate, scale, translate,
    OPENGL_TO_WGPU,
};
pub use decomposed::DecomposedTransform;
