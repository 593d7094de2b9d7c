//! Pure matrix primitives.
//!
//! [`compose`] always applies scale, then rotation, then translation, in
//! that order, through the in-place primitives [`scale`], [`rotate`] and
//! [`translate`]. The rotation writes the whole upper 3×3 block, so scale
//! only survives because [`rotate`] folds the block's current diagonal into
//! each row it writes. [`decompose`] inverts [`compose`] up to f32 conditioning.

use std::f64::consts::PI;

use glam::{DMat3, DVec3, Mat3, Mat4, Vec3, Vec4};

use super::decomposed::{DecomposedTransform, DEFAULT_ROTATION_AXIS};
use crate::error::MboxError;

/// Remaps OpenGL clip depth `[-1, 1]` (as produced by [`frustum_hfov`]) to
/// the `[0, 1]` range wgpu expects.
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// Matrices with `|det|` below this are refused by [`decompose`].
const SINGULAR_EPSILON: f32 = 1e-8;

/// f32 rounding noise of a composed block, relative to its largest entry.
const NOISE_FLOOR: f64 = 1e-6;

/// Noise floors within which a block counts as unrotated, or as built
/// from a unit axis.
const UNIT_AXIS_TOLERANCE: f64 = 4.0;

/// Share of the largest entry the excess eigenvalue must reach before its
/// eigenvector is trusted over the antisymmetric part.
const EIGEN_FLOOR: f64 = 0.1;

#[inline]
fn entry(m: &Mat4, row: usize, col: usize) -> f32 {
    m.col(col)[row]
}

#[inline]
fn entry_mut(m: &mut Mat4, row: usize, col: usize) -> &mut f32 {
    &mut m.col_mut(col)[row]
}

/// Multiply the first three diagonal entries by `s`.
pub fn scale(m: &mut Mat4, s: f32) {
    for i in 0..3 {
        *entry_mut(m, i, i) *= s;
    }
}

/// Overwrite the upper 3×3 block with the Rodrigues rotation of `theta`
/// radians about `r`.
///
/// Each written row is multiplied by that row's diagonal entry as it was
/// before the call, which is how a preceding [`scale`] carries through.
/// `r` is used as given.
pub fn rotate(m: &mut Mat4, theta: f32, r: Vec3) {
    let c = theta.cos();
    let s = theta.sin();
    let vs = 1.0 - c;

    let block = [
        [
            vs * r.x * r.x + c,
            vs * r.x * r.y - s * r.z,
            vs * r.x * r.z + s * r.y,
        ],
        [
            vs * r.x * r.y + s * r.z,
            vs * r.y * r.y + c,
            vs * r.y * r.z - s * r.x,
        ],
        [
            vs * r.x * r.z - s * r.y,
            vs * r.y * r.z + s * r.x,
            vs * r.z * r.z + c,
        ],
    ];

    for (i, row) in block.iter().enumerate() {
        let diagonal = entry(m, i, i);
        for (j, value) in row.iter().enumerate() {
            *entry_mut(m, i, j) = diagonal * value;
        }
    }
}

/// Add `t` into column 3. Repeated calls accumulate.
pub fn translate(m: &mut Mat4, t: Vec3) {
    for i in 0..3 {
        *entry_mut(m, i, 3) += t[i];
    }
}

/// Build the model matrix for a decomposed transform.
///
/// The angle is stored in degrees and converted here.
#[must_use]
pub fn compose(t: &DecomposedTransform) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    scale(&mut m, t.scale);
    rotate(&mut m, t.rotation_angle.to_radians(), t.rotation_axis);
    translate(&mut m, t.position);
    m
}

/// Recover the decomposed fields of a matrix produced by [`compose`].
///
/// With `L = σ·R(θ, r)` the upper block, the antisymmetric part of `L`
/// is `v = σ·sinθ·r`. The symmetric part `S` has `a = σ·cosθ` in every
/// direction perpendicular to `r`, and `a + b` along it, with
/// `b = σ(1 − cosθ)|r|²`. Those three numbers give
/// `tan²(θ/2) = 1 − 2ab/|v|²`, then `σ` and `|r|`.
///
/// The block is only known to f32 precision. When `b` agrees with a unit
/// axis to within that noise, which is always the case for small angles
/// about a short axis, the unit axis `v/|v|` with `θ = atan2(|v|, a)` is
/// reported instead. The fields can then differ from the ones that built
/// the matrix, but `compose(decompose(m))` still reproduces `m` to f32
/// precision. Unit axes round-trip field by field at any angle.
///
/// A zero angle leaves the axis undetermined and reports
/// [`DEFAULT_ROTATION_AXIS`]. Matrices not produced by [`compose`] give
/// unspecified (but finite) results.
///
/// # Errors
///
/// Returns [`MboxError::SingularTransform`] when the matrix is not
/// invertible.
pub fn decompose(
    model: &Mat4,
    color: Vec3,
) -> Result<DecomposedTransform, MboxError> {
    let determinant = model.determinant();
    if !determinant.is_finite() || determinant.abs() < SINGULAR_EPSILON {
        return Err(MboxError::SingularTransform { determinant });
    }

    let position = Vec3::new(
        entry(model, 0, 3),
        entry(model, 1, 3),
        entry(model, 2, 3),
    );
    let unrotated = |scale: f64| DecomposedTransform {
        scale: scale as f32,
        rotation_angle: 0.0,
        rotation_axis: DEFAULT_ROTATION_AXIS,
        position,
        color,
    };

    let block = Mat3::from_mat4(*model).as_dmat3();
    let magnitude = largest_entry(&block);
    let noise = NOISE_FLOOR * magnitude;

    let v = DVec3::new(
        (block.y_axis.z - block.z_axis.y) * 0.5,
        (block.z_axis.x - block.x_axis.z) * 0.5,
        (block.x_axis.y - block.y_axis.x) * 0.5,
    );
    let w = v.length();
    let sym = (block + block.transpose()) * 0.5;
    let trace = sym.x_axis.x + sym.y_axis.y + sym.z_axis.z;

    let isotropic = DMat3::from_diagonal(DVec3::splat(trace / 3.0));
    if w <= noise
        && largest_entry(&(sym - isotropic)) <= UNIT_AXIS_TOLERANCE * noise
    {
        return Ok(unrotated(trace / 3.0));
    }

    // Eigenvalues of S are (a, a, a + b); this b comes from their spread.
    let frobenius: f64 =
        sym.to_cols_array().iter().map(|x| x * x).sum();
    let spread_b =
        (6.0 * frobenius - 2.0 * trace * trace).max(0.0).sqrt() * 0.5;

    let direction = if w <= noise
        || (spread_b > w && spread_b > EIGEN_FLOOR * magnitude)
    {
        match excess_direction(&sym, trace, spread_b) {
            Some(dir) if w > noise && dir.dot(v) < 0.0 => -dir,
            Some(dir) => dir,
            None if w > noise => v / w,
            None => return Ok(unrotated(trace / 3.0)),
        }
    } else {
        v / w
    };

    let (p, q) = direction.any_orthonormal_pair();
    let a = (p.dot(sym * p) + q.dot(sym * q)) * 0.5;
    let b = direction.dot(sym * direction) - a;

    let (sigma, theta, axis) = if w <= noise {
        // Half turn: S = −σI + 2σ|r|²·r̂r̂ᵀ.
        if a >= 0.0 {
            return Ok(unrotated(trace / 3.0));
        }
        let sigma = -a;
        (sigma, PI, direction * (b / (2.0 * sigma)).max(0.0).sqrt())
    } else {
        let unit_scale = a.hypot(w);
        let unit_axis = (unit_scale, w.atan2(a), direction);
        if (b - (unit_scale - a)).abs() <= UNIT_AXIS_TOLERANCE * noise {
            unit_axis
        } else {
            solve_with_axis_length(a, b, w).map_or(
                unit_axis,
                |(sigma, theta, length)| (sigma, theta, direction * length),
            )
        }
    };

    Ok(DecomposedTransform {
        scale: sigma as f32,
        rotation_angle: theta.to_degrees() as f32,
        rotation_axis: axis.as_vec3(),
        position,
        color,
    })
}

fn largest_entry(m: &DMat3) -> f64 {
    m.to_cols_array().iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

/// Unit eigenvector of the single large eigenvalue of `sym`, whose
/// spectrum is `(a, a, a + b)`. Its largest component is positive.
fn excess_direction(sym: &DMat3, trace: f64, b: f64) -> Option<DVec3> {
    let excess =
        *sym - DMat3::from_diagonal(DVec3::splat((trace - b) / 3.0));
    let diagonal =
        DVec3::new(excess.x_axis.x, excess.y_axis.y, excess.z_axis.z);
    let k = if diagonal.x >= diagonal.y && diagonal.x >= diagonal.z {
        0
    } else if diagonal.y >= diagonal.z {
        1
    } else {
        2
    };
    // One power step squares away the error in the estimated `a`.
    (excess * excess.col(k)).try_normalize()
}

/// Solve `a = σ·cosθ`, `w = σ·sinθ·|r|` and `b = σ(1 − cosθ)|r|²` for
/// `(σ, θ, |r|)`.
fn solve_with_axis_length(a: f64, b: f64, w: f64) -> Option<(f64, f64, f64)> {
    let tan_sq = 1.0 - 2.0 * a * b / (w * w);
    if !tan_sq.is_finite() || tan_sq <= 0.0 {
        return None;
    }
    let theta = 2.0 * tan_sq.sqrt().atan();
    let cos = theta.cos();
    let sigma = if cos > 0.5 { a / cos } else { w * w / b - a };
    let length = w / (sigma * theta.sin());
    (sigma > 0.0 && length.is_finite() && length > 0.0)
        .then_some((sigma, theta, length))
}

/// Horizontal-FOV perspective projection (OpenGL clip conventions).
///
/// `fov` is in degrees; `top = right / aspect`.
#[must_use]
pub fn frustum_hfov(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let right = near * (fov.to_radians() / 2.0).tan();
    let top = right / aspect;
    let depth = far - near;

    Mat4::from_cols(
        Vec4::new(near / right, 0.0, 0.0, 0.0),
        Vec4::new(0.0, near / top, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -(far + near) / depth, -1.0),
        Vec4::new(0.0, 0.0, -(2.0 * far * near) / depth, 0.0),
    )
}
