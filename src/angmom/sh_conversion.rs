//! Conversion between complex and real spherical harmonics.

use std::cmp::Ordering;
use std::sync::Arc;

use lazy_static::lazy_static;
use log;
use ndarray::Array2;
use num::Complex;

use crate::angmom::degree_dim;
use crate::angmom::sh_rotation_3d::irr_repr;
use crate::auxiliary::cache::ComputeOnceCache;
use crate::precision::So3Float;

#[cfg(test)]
#[path = "sh_conversion_tests.rs"]
mod sh_conversion_tests;

lazy_static! {
    static ref SH_C2R_MATS: ComputeOnceCache<u32, Arc<Array2<Complex<f64>>>> =
        ComputeOnceCache::new();
}

/// Obtains the unitary matrix $`\mathbf{C}^{(l)}`$ expressing real spherical harmonics as linear
/// combinations of complex spherical harmonics,
/// $`Y_{lm} = \sum_{m'} C^{(l)}_{mm'} Y_l^{m'}`$.
///
/// The complex spherical harmonics $`Y_l^m`$ carry the Condon--Shortley phase, and the real
/// spherical harmonics $`Y_{lm}`$ are those of [`crate::angmom::spherical_harmonics`]. Then
///
/// ```math
/// Y_{lm} =
///     \begin{cases}
///         \frac{\mathbb{i}}{\sqrt{2}}
///         \left(Y_l^{-\lvert m \rvert} - (-1)^{\lvert m \rvert} Y_l^{\lvert m \rvert}\right)
///         & \mathrm{if}\ m < 0 \\
///         Y_l^0 & \mathrm{if}\ m = 0 \\
///         \frac{1}{\sqrt{2}}
///         \left(Y_l^{-\lvert m \rvert} + (-1)^{\lvert m \rvert} Y_l^{\lvert m \rvert}\right)
///         & \mathrm{if}\ m > 0. \\
///     \end{cases}
/// ```
///
/// Rows and columns are ordered by increasing $`m`$. The matrix is computed once per degree.
///
/// # Arguments
///
/// * `l` - The spherical harmonic degree.
///
/// # Returns
///
/// The $`(2l+1) \times (2l+1)`$ matrix $`\mathbf{C}^{(l)}`$.
pub fn sh_c2r_mat(l: u32) -> Arc<Array2<Complex<f64>>> {
    SH_C2R_MATS.get_or_compute(&l, || {
        log::debug!("Building the complex-to-real spherical-harmonic matrix for degree {l}.");
        let lusize = l as usize;
        let li = i64::from(l);
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        let mut cmat = Array2::<Complex<f64>>::zeros((degree_dim(l), degree_dim(l)));
        for m in -li..=li {
            let absm = m.unsigned_abs() as usize;
            let cs = if absm % 2 == 0 { 1.0 } else { -1.0 };
            match m.cmp(&0) {
                Ordering::Less => {
                    cmat[(lusize - absm, lusize - absm)] = Complex::new(0.0, inv_sqrt2);
                    cmat[(lusize - absm, lusize + absm)] = Complex::new(0.0, -cs * inv_sqrt2);
                }
                Ordering::Equal => {
                    cmat[(lusize, lusize)] = Complex::from(1.0);
                }
                Ordering::Greater => {
                    cmat[(lusize + absm, lusize - absm)] = Complex::from(inv_sqrt2);
                    cmat[(lusize + absm, lusize + absm)] = Complex::from(cs * inv_sqrt2);
                }
            }
        }
        Arc::new(cmat)
    })
}

/// Obtains the matrix $`\mathbf{C}^{(l)\dagger}`$ expressing complex spherical harmonics as
/// linear combinations of real spherical harmonics. See [`sh_c2r_mat`].
pub fn sh_r2c_mat(l: u32) -> Array2<Complex<f64>> {
    sh_c2r_mat(l).t().mapv(|x| x.conj())
}

/// Returns the irreducible representation matrix of degree $`l`$ in the basis of the complex
/// spherical harmonics $`Y_l^m`$ (with the Condon--Shortley phase) ordered by increasing $`m`$.
///
/// This is $`\mathbf{C}^{(l)\dagger} \mathbf{D}^{(l)} \mathbf{C}^{(l)}`$ with
/// $`\mathbf{D}^{(l)}`$ given by [`irr_repr`], so that
/// $`\mathbf{Y}^{\mathbb{C}}_l(\mathbf{R}\mathbf{x})
/// = \mathbf{D}^{(l)}_{\mathbb{C}}(\mathbf{R}) \mathbf{Y}^{\mathbb{C}}_l(\mathbf{x})`$.
/// For a rotation about $`z`$ by $`\alpha`$ the matrix is
/// $`\operatorname{diag}(e^{\mathbb{i} m \alpha})`$.
///
/// # Arguments
///
/// * `l` - The degree $`l`$.
/// * `alpha`, `beta`, `gamma` - The $`z`$-$`y`$-$`z`$ Euler angles in radians.
#[must_use]
pub fn irr_repr_complex<T: So3Float>(l: u32, alpha: T, beta: T, gamma: T) -> Array2<Complex<T>> {
    let cmat = sh_c2r_mat(l).mapv(|x| {
        Complex::new(T::from_f64_lossy(x.re), T::from_f64_lossy(x.im))
    });
    let cmat_h = cmat.t().mapv(|x| x.conj());
    let dmat = irr_repr(l, alpha, beta, gamma).mapv(|x| Complex::new(x, T::zero()));
    cmat_h.dot(&dmat).dot(&cmat)
}
