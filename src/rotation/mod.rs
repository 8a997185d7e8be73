//! Rotation algebra in the $`z`$-$`y`$-$`z`$ Euler convention.

use std::error::Error;
use std::fmt;

use derive_builder::Builder;
use nalgebra::Matrix3;
use ndarray::{array, Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::precision::So3Float;


/// A triplet of Euler angles $`(\alpha, \beta, \gamma)`$ in radians.
pub type EulerAngles<T> = (T, T, T);

// =================
// Error definitions
// =================

/// Error for matrices or angles that do not describe a proper rotation.
#[derive(Debug, Clone)]
pub struct InvalidRotationError(pub String);

impl fmt::Display for InvalidRotationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid rotation: {}", self.0)
    }
}

impl Error for InvalidRotationError {}

/// Error for vectors that do not define a direction in space.
#[derive(Debug, Clone)]
pub struct InvalidDirectionError(pub String);

impl fmt::Display for InvalidDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid direction: {}", self.0)
    }
}

impl Error for InvalidDirectionError {}

// ==========
// Parameters
// ==========

/// A structure containing control parameters for the conversion of rotation matrices back to
/// Euler angles.
#[derive(Clone, Builder, Debug, Serialize, Deserialize, PartialEq)]
pub struct RotationParams {
    /// Maximum absolute deviation of any element of $`\mathbf{R}^{\mathsf{T}}\mathbf{R}`$ from
    /// the identity for $`\mathbf{R}`$ to be accepted as orthogonal.
    #[builder(default = "1e-6")]
    pub orthogonality_threshold: f64,

    /// Length of the projection of $`\mathbf{R}\hat{\mathbf{z}}`$ onto the $`xy`$-plane below
    /// which $`\beta`$ is treated as $`0`$ or $`\pi`$ and $`\gamma`$ is fixed to zero.
    #[builder(default = "1e-12")]
    pub gimbal_threshold: f64,
}

impl RotationParams {
    /// Returns a builder to construct a [`RotationParams`] structure.
    pub fn builder() -> RotationParamsBuilder {
        RotationParamsBuilder::default()
    }
}

impl Default for RotationParams {
    fn default() -> Self {
        Self {
            orthogonality_threshold: 1e-6,
            gimbal_threshold: 1e-12,
        }
    }
}

impl fmt::Display for RotationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Orthogonality threshold: {:.3e}",
            self.orthogonality_threshold
        )?;
        writeln!(f, "Gimbal threshold: {:.3e}", self.gimbal_threshold)
    }
}

// ====================
// Elementary rotations
// ====================

/// Returns the matrix of an anticlockwise rotation by `angle` about the space-fixed $`x`$-axis.
#[must_use]
pub fn rot_x<T: So3Float>(angle: T) -> Array2<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    array![[i, o, o], [o, c, -s], [o, s, c]]
}

/// Returns the matrix of an anticlockwise rotation by `angle` about the space-fixed $`y`$-axis.
#[must_use]
pub fn rot_y<T: So3Float>(angle: T) -> Array2<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    array![[c, o, s], [o, i, o], [-s, o, c]]
}

/// Returns the matrix of an anticlockwise rotation by `angle` about the space-fixed $`z`$-axis.
#[must_use]
pub fn rot_z<T: So3Float>(angle: T) -> Array2<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    array![[c, -s, o], [s, c, o], [o, o, i]]
}

// ===================
// Euler-angle algebra
// ===================

/// Returns the rotation matrix
/// $`\mathbf{R}_z(\alpha) \mathbf{R}_y(\beta) \mathbf{R}_z(\gamma)`$.
///
/// # Arguments
///
/// * `alpha` - The first Euler angle, applied last, about $`z`$.
/// * `beta` - The second Euler angle, about $`y`$.
/// * `gamma` - The third Euler angle, applied first, about $`z`$.
///
/// # Returns
///
/// A $`3 \times 3`$ proper orthogonal matrix.
#[must_use]
pub fn rotation_matrix<T: So3Float>(alpha: T, beta: T, gamma: T) -> Array2<T> {
    rot_z(alpha).dot(&rot_y(beta)).dot(&rot_z(gamma))
}

/// Recovers the Euler angles of a rotation matrix, the inverse of [`rotation_matrix`].
///
/// $`\beta \in [0, \pi]`$ and $`\alpha`$ are the polar and azimuthal angles of
/// $`\mathbf{R}\hat{\mathbf{z}}`$, both obtained through two-argument arctangents.
/// $`\gamma`$ is then read off the residual
/// $`\mathbf{R}_y(-\beta)\mathbf{R}_z(-\alpha)\mathbf{R} = \mathbf{R}_z(\gamma)`$.
///
/// When $`\beta`$ is $`0`$ or $`\pi`$ only $`\alpha \pm \gamma`$ is defined. In that case
/// $`\gamma`$ is fixed to zero and the whole $`z`$-rotation is carried by $`\alpha`$. This is a
/// gauge choice: `rotation_matrix` of the returned angles always reproduces `rmat`.
///
/// # Arguments
///
/// * `rmat` - A $`3 \times 3`$ rotation matrix.
/// * `params` - Thresholds for the orthogonality check and the gimbal branch.
///
/// # Errors
///
/// Errors if `rmat` is not $`3 \times 3`$, contains non-finite elements, is not orthogonal
/// within [`RotationParams::orthogonality_threshold`], or has a negative determinant.
pub fn matrix_to_euler<T: So3Float>(
    rmat: &Array2<T>,
    params: &RotationParams,
) -> Result<EulerAngles<T>, InvalidRotationError> {
    check_rotation_matrix(rmat, params)?;

    let zcol_xy = rmat[(0, 2)].hypot(rmat[(1, 2)]);
    let beta = zcol_xy.atan2(rmat[(2, 2)]);
    if zcol_xy > T::from_f64_lossy(params.gimbal_threshold) {
        let alpha = rmat[(1, 2)].atan2(rmat[(0, 2)]);
        let residual = rot_y(-beta).dot(&rot_z(-alpha)).dot(rmat);
        let gamma = residual[(1, 0)].atan2(residual[(0, 0)]);
        Ok((alpha, beta, gamma))
    } else {
        // R = R_z(alpha) R_y(beta) with beta in {0, pi}.
        let residual = rmat.dot(&rot_y(-beta));
        let alpha = residual[(1, 0)].atan2(residual[(0, 0)]);
        Ok((alpha, beta, T::zero()))
    }
}

/// Composes two rotations given by Euler angles.
///
/// # Returns
///
/// The Euler angles of $`\mathbf{R}(\alpha_1, \beta_1, \gamma_1)
/// \mathbf{R}(\alpha_2, \beta_2, \gamma_2)`$, following the gauge of [`matrix_to_euler`].
///
/// # Errors
///
/// Errors if any of the angles is not finite.
pub fn compose<T: So3Float>(
    first: EulerAngles<T>,
    second: EulerAngles<T>,
) -> Result<EulerAngles<T>, InvalidRotationError> {
    let (a1, b1, c1) = first;
    let (a2, b2, c2) = second;
    let product = rotation_matrix(a1, b1, c1).dot(&rotation_matrix(a2, b2, c2));
    matrix_to_euler(&product, &RotationParams::default())
}

/// Verifies that a matrix is a proper rotation matrix.
fn check_rotation_matrix<T: So3Float>(
    rmat: &Array2<T>,
    params: &RotationParams,
) -> Result<(), InvalidRotationError> {
    if rmat.dim() != (3, 3) {
        return Err(InvalidRotationError(format!(
            "expected a 3 × 3 matrix, got {:?}.",
            rmat.dim()
        )));
    }
    if rmat.iter().any(|x| !x.is_finite()) {
        return Err(InvalidRotationError(
            "the matrix contains non-finite elements.".to_string(),
        ));
    }

    let thresh = T::from_f64_lossy(params.orthogonality_threshold)
        .max(T::from_f64_lossy(64.0) * T::epsilon());
    let deviation = (&rmat.t().dot(rmat) - &Array2::<T>::eye(3))
        .iter()
        .fold(T::zero(), |acc, x| acc.max(x.abs()));
    if deviation > thresh {
        return Err(InvalidRotationError(format!(
            "the matrix deviates from orthogonality by {:.3e} (threshold {:.3e}).",
            deviation.into_f64(),
            thresh.into_f64()
        )));
    }

    let det = det3(rmat);
    if det < T::zero() {
        return Err(InvalidRotationError(format!(
            "the matrix has determinant {det:.6} and is an improper rotation."
        )));
    }
    Ok(())
}

/// Computes the determinant of a $`3 \times 3`$ matrix by cofactor expansion.
fn det3<T: So3Float>(m: &Array2<T>) -> T {
    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}

// ==========
// Directions
// ==========

/// Returns the unit direction $`\mathbf{R}(\alpha, \beta, \gamma)\hat{\mathbf{z}}
/// = (\cos\alpha \sin\beta, \sin\alpha \sin\beta, \cos\beta)`$.
#[must_use]
pub fn angles_to_direction<T: So3Float>(alpha: T, beta: T) -> Array1<T> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    array![ca * sb, sa * sb, cb]
}

/// Returns the azimuthal angle $`\alpha`$ and polar angle $`\beta`$ of a vector, the inverse of
/// [`angles_to_direction`]. Only the direction of the vector matters, so any nonzero finite
/// vector is accepted however small or large its length.
///
/// # Errors
///
/// Errors if `xyz` does not have three components or has zero or non-finite length.
pub fn direction_to_angles<T: So3Float>(
    xyz: ArrayView1<T>,
) -> Result<(T, T), InvalidDirectionError> {
    if xyz.len() != 3 {
        return Err(InvalidDirectionError(format!(
            "expected three Cartesian components, got {}.",
            xyz.len()
        )));
    }
    let (x, y, z) = (xyz[0], xyz[1], xyz[2]);
    let rho = x.hypot(y);
    if !(rho.hypot(z) > T::zero() && xyz.iter().all(|c| c.is_finite())) {
        return Err(InvalidDirectionError(format!(
            "the vector ({x}, {y}, {z}) has no well-defined direction."
        )));
    }
    Ok((y.atan2(x), rho.atan2(z)))
}

// ========
// Sampling
// ========

/// Draws Euler angles whose rotation is uniformly distributed over SO(3) with respect to the
/// Haar measure: $`\alpha, \gamma`$ uniform in $`[0, 2\pi)`$ and $`\cos\beta`$ uniform in
/// $`[-1, 1]`$.
pub fn random_angles<T: So3Float>() -> EulerAngles<T> {
    random_angles_with(&mut rand::thread_rng())
}

/// Same as [`random_angles`] but with a caller-supplied random number generator.
pub fn random_angles_with<T: So3Float, R: Rng + ?Sized>(rng: &mut R) -> EulerAngles<T> {
    let two_pi = 2.0 * std::f64::consts::PI;
    let alpha = two_pi * rng.gen::<f64>();
    let beta = (2.0 * rng.gen::<f64>() - 1.0).acos();
    let gamma = two_pi * rng.gen::<f64>();
    (
        T::from_f64_lossy(alpha),
        T::from_f64_lossy(beta),
        T::from_f64_lossy(gamma),
    )
}

/// Draws a rotation matrix uniformly distributed over SO(3).
pub fn random_rotation<T: So3Float>() -> Array2<T> {
    random_rotation_with(&mut rand::thread_rng())
}

/// Same as [`random_rotation`] but with a caller-supplied random number generator.
///
/// A matrix with independent standard-normal elements is QR-decomposed. The columns of
/// $`\mathbf{Q}`$ are then rescaled by the signs of the diagonal of $`\mathbf{R}`$, which makes
/// the distribution of $`\mathbf{Q}`$ Haar over O(3), and the first column is negated when the
/// determinant is negative, which maps the improper coset onto SO(3) without bias.
pub fn random_rotation_with<T: So3Float, R: Rng + ?Sized>(rng: &mut R) -> Array2<T> {
    let gaussian = Matrix3::<f64>::from_fn(|_, _| rng.sample(StandardNormal));
    let qr = gaussian.qr();
    let (mut q, r) = (qr.q(), qr.r());
    for (i, mut col) in q.column_iter_mut().enumerate() {
        if r[(i, i)] < 0.0 {
            col.neg_mut();
        }
    }
    if q.determinant() < 0.0 {
        q.column_mut(0).neg_mut();
    }
    Array2::from_shape_fn((3, 3), |(i, j)| T::from_f64_lossy(q[(i, j)]))
}
