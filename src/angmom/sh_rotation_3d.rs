//! Rotation matrices for real spherical harmonics (real Wigner-$`D`$ matrices).
//!
//! The matrices are built by the recursion over the degree of Ivanic, J. & Ruedenberg, K.
//! Rotation Matrices for Real Spherical Harmonics. Direct Determination by Recursion.
//! *The Journal of Physical Chemistry* **100**, 6342–6347 (1996) and its additions and
//! corrections, *ibid.* **102**, 9099–9100 (1998), [DOI](https://doi.org/10.1021/jp953350u).

use std::cmp::Ordering;
use std::sync::Arc;

use lazy_static::lazy_static;
use log;
use ndarray::{array, Array2, Axis};

use crate::angmom::degree_dim;
use crate::auxiliary::cache::ComputeOnceCache;
use crate::precision::So3Float;
use crate::rotation::{rotation_matrix, InvalidRotationError};

#[cfg(test)]
#[path = "sh_rotation_3d_tests.rs"]
mod sh_rotation_3d_tests;

/// The coefficients $`(u^l_{mm'}, v^l_{mm'}, w^l_{mm'})`$ of the recursion for one degree,
/// indexed by $`(m + l, m' + l)`$.
type RecursionCoefficients = Array2<(f64, f64, f64)>;

lazy_static! {
    static ref RECURSION_COEFFICIENTS: ComputeOnceCache<u32, Arc<RecursionCoefficients>> =
        ComputeOnceCache::new();
}

/// Converts a non-negative offset index into `usize`.
fn idx(i: i64) -> usize {
    usize::try_from(i).expect("Negative index in the spherical-harmonic rotation recursion.")
}

/// Returns the coefficients $`u^l_{mm'}`$, $`v^l_{mm'}`$ and $`w^l_{mm'}`$ of Table 1 of
/// Ivanic and Ruedenberg for all $`-l \le m, m' \le l`$, cached per degree.
fn recursion_coefficients(l: u32) -> Arc<RecursionCoefficients> {
    RECURSION_COEFFICIENTS.get_or_compute(&l, || {
        log::debug!("Computing rotation recursion coefficients for degree {l}.");
        let li = i64::from(l);
        let coeffs = Array2::from_shape_fn((degree_dim(l), degree_dim(l)), |(mi, mdi)| {
            let m = mi as i64 - li;
            let mdash = mdi as i64 - li;
            let mabs = m.abs();
            let den_i = if mdash.abs() < li {
                (li + mdash) * (li - mdash)
            } else {
                (2 * li) * (2 * li - 1)
            };
            let den = den_i as f64;
            let u = (((li + m) * (li - m)) as f64 / den).sqrt();
            let v = if m == 0 {
                -0.5 * ((2 * (li - 1) * li) as f64 / den).sqrt()
            } else {
                0.5 * (((li + mabs - 1) * (li + mabs)) as f64 / den).sqrt()
            };
            let w = if m == 0 {
                0.0
            } else {
                -0.5 * (((li - mabs - 1) * (li - mabs)) as f64 / den).sqrt()
            };
            (u, v, w)
        });
        Arc::new(coeffs)
    })
}

/// One step of the recursion, holding the degree-one matrix and the matrix of degree
/// $`l - 1`$.
struct RecursionStep<'a, T> {
    l: i64,
    d1: &'a Array2<T>,
    prev: &'a Array2<T>,
}

impl<'a, T: So3Float> RecursionStep<'a, T> {
    /// The function $`{}_iP^l_{\mu m'}`$ of Table 2 of Ivanic and Ruedenberg, with
    /// $`-1 \le i \le 1`$, $`|\mu| \le l - 1`$ and $`|m'| \le l`$.
    fn p(&self, i: i64, mu: i64, mdash: i64) -> T {
        let l = self.l;
        let ii = idx(i + 1);
        let mui = idx(mu + l - 1);
        let last = idx(2 * l - 2);
        if mdash == l {
            self.d1[(ii, 2)] * self.prev[(mui, last)] - self.d1[(ii, 0)] * self.prev[(mui, 0)]
        } else if mdash == -l {
            self.d1[(ii, 2)] * self.prev[(mui, 0)] + self.d1[(ii, 0)] * self.prev[(mui, last)]
        } else {
            self.d1[(ii, 1)] * self.prev[(mui, idx(mdash + l - 1))]
        }
    }

    fn u(&self, m: i64, mdash: i64) -> T {
        self.p(0, m, mdash)
    }

    fn v(&self, m: i64, mdash: i64) -> T {
        match m.cmp(&0) {
            Ordering::Greater if m == 1 => self.p(1, 0, mdash) * T::SQRT_2(),
            Ordering::Greater => self.p(1, m - 1, mdash) - self.p(-1, -m + 1, mdash),
            Ordering::Less if m == -1 => self.p(-1, 0, mdash) * T::SQRT_2(),
            Ordering::Less => self.p(1, m + 1, mdash) + self.p(-1, -m - 1, mdash),
            Ordering::Equal => self.p(1, 1, mdash) + self.p(-1, -1, mdash),
        }
    }

    /// Only called with $`0 < |m| \le l - 2`$, where $`w^l_{mm'}`$ is nonzero.
    fn w(&self, m: i64, mdash: i64) -> T {
        if m > 0 {
            self.p(1, m + 1, mdash) + self.p(-1, -m - 1, mdash)
        } else {
            self.p(1, m - 1, mdash) - self.p(-1, -m + 1, mdash)
        }
    }
}

/// Computes the representation matrix of degree $`l \ge 2`$ from those of degrees $`1`$ and
/// $`l - 1`$ (Equation 8.1 of Ivanic and Ruedenberg).
///
/// # Arguments
///
/// * `l` - The degree $`l \ge 2`$.
/// * `d1` - The degree-one matrix, acting on $`(Y_{1,-1}, Y_{1,0}, Y_{1,1})`$.
/// * `prev` - The matrix of degree $`l - 1`$.
///
/// # Panics
///
/// Panics if `l < 2` or if the matrices have the wrong shapes.
#[must_use]
pub fn raise_degree<T: So3Float>(l: u32, d1: &Array2<T>, prev: &Array2<T>) -> Array2<T> {
    assert!(l >= 2, "`l` must be at least 2.");
    assert_eq!(d1.dim(), (3, 3), "`d1` must be a 3 × 3 matrix.");
    assert_eq!(
        prev.dim(),
        (degree_dim(l - 1), degree_dim(l - 1)),
        "`prev` must be a {0} × {0} matrix.",
        degree_dim(l - 1)
    );

    let coeffs = recursion_coefficients(l);
    let li = i64::from(l);
    let step = RecursionStep { l: li, d1, prev };
    Array2::from_shape_fn((degree_dim(l), degree_dim(l)), |(mi, mdi)| {
        let m = mi as i64 - li;
        let mdash = mdi as i64 - li;
        let (cu, cv, cw) = coeffs[(mi, mdi)];
        let mut value = T::from_f64_lossy(cv) * step.v(m, mdash);
        if cu != 0.0 {
            value = value + T::from_f64_lossy(cu) * step.u(m, mdash);
        }
        if cw != 0.0 {
            value = value + T::from_f64_lossy(cw) * step.w(m, mdash);
        }
        value
    })
}

/// Returns the degree-one matrix for a Cartesian rotation matrix, *i.e.* the rotation matrix in
/// the basis $`(y, z, x)`$.
fn degree_one<T: So3Float>(rmat: &Array2<T>) -> Array2<T> {
    rmat.select(Axis(0), &[1, 2, 0])
        .select(Axis(1), &[1, 2, 0])
}

/// Returns the representation matrices of all degrees $`0, 1, \ldots, l_{\mathrm{max}}`$ for a
/// Cartesian rotation matrix that is known to be valid.
fn ladder_from_matrix<T: So3Float>(lmax: u32, rmat: &Array2<T>) -> Vec<Array2<T>> {
    let mut ladder = vec![array![[T::one()]]];
    if lmax == 0 {
        return ladder;
    }
    let d1 = degree_one(rmat);
    ladder.push(d1.clone());
    for l in 2..=lmax {
        let next = raise_degree(l, &d1, &ladder[ladder.len() - 1]);
        ladder.push(next);
    }
    ladder
}

/// Returns the representation matrices of all degrees $`0, 1, \ldots, l_{\mathrm{max}}`$ for the
/// rotation $`\mathbf{R}(\alpha, \beta, \gamma)`$. Element $`l`$ of the result is
/// `irr_repr(l, alpha, beta, gamma)`.
#[must_use]
pub fn irr_repr_ladder<T: So3Float>(lmax: u32, alpha: T, beta: T, gamma: T) -> Vec<Array2<T>> {
    ladder_from_matrix(lmax, &rotation_matrix(alpha, beta, gamma))
}

/// Returns the irreducible representation matrix $`\mathbf{D}^{(l)}(\alpha, \beta, \gamma)`$
/// acting on the real spherical harmonics of degree $`l`$ ordered by increasing $`m`$.
///
/// The matrix is real orthogonal and satisfies
/// $`\mathbf{Y}_l(\mathbf{R}\mathbf{x}) = \mathbf{D}^{(l)}(\mathbf{R}) \mathbf{Y}_l(\mathbf{x})`$
/// for the real spherical harmonics of
/// [`crate::angmom::spherical_harmonics::spherical_harmonics`], and
/// $`\mathbf{D}^{(l)}(\hat{R}_1\hat{R}_2) = \mathbf{D}^{(l)}(\hat{R}_1)\mathbf{D}^{(l)}(\hat{R}_2)`$.
///
/// # Arguments
///
/// * `l` - The degree $`l`$.
/// * `alpha`, `beta`, `gamma` - The $`z`$-$`y`$-$`z`$ Euler angles in radians.
///
/// # Returns
///
/// A $`(2l+1) \times (2l+1)`$ matrix.
#[must_use]
pub fn irr_repr<T: So3Float>(l: u32, alpha: T, beta: T, gamma: T) -> Array2<T> {
    irr_repr_unchecked(l, &rotation_matrix(alpha, beta, gamma))
}

fn irr_repr_unchecked<T: So3Float>(l: u32, rmat: &Array2<T>) -> Array2<T> {
    let mut ladder = ladder_from_matrix(l, rmat);
    ladder.pop().unwrap_or_else(|| array![[T::one()]])
}

/// Returns the irreducible representation matrix of degree $`l`$ for a Cartesian rotation
/// matrix.
///
/// # Errors
///
/// Errors if `rmat` is not a $`3 \times 3`$ matrix with finite elements. Orthogonality is not
/// checked.
pub fn irr_repr_from_matrix<T: So3Float>(
    l: u32,
    rmat: &Array2<T>,
) -> Result<Array2<T>, InvalidRotationError> {
    if rmat.dim() != (3, 3) || rmat.iter().any(|x| !x.is_finite()) {
        return Err(InvalidRotationError(format!(
            "expected a finite 3 × 3 matrix, got shape {:?}.",
            rmat.dim()
        )));
    }
    Ok(irr_repr_unchecked(l, rmat))
}
