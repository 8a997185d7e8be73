//! Clebsch--Gordan coupling tensors in the basis of real spherical harmonics.
//!
//! The coupling tensor $`\mathbf{Q}^{(l_f, l_{\mathrm{in}}, l_{\mathrm{out}})}`$ has shape
//! $`(2l_f+1) \times (2l_{\mathrm{in}}+1) \times (2l_{\mathrm{out}}+1)`$ and intertwines the
//! tensor product of degrees $`l_{\mathrm{in}}`$ and $`l_{\mathrm{out}}`$ with degree $`l_f`$:
//!
//! ```math
//! \sum_{f'} D^{(l_f)}_{ff'} Q_{f'io}
//!     = \sum_{i'o'} Q_{fi'o'} D^{(l_{\mathrm{in}})}_{i'i} D^{(l_{\mathrm{out}})}_{o'o}.
//! ```
//!
//! Every tensor has unit Frobenius norm, and its sign is fixed so that its first element (in
//! row-major order) of magnitude above $`10^{-8}`$ is positive. Tensors are computed once per
//! degree triple and cached.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use derive_builder::Builder;
use factorial::Factorial;
use itertools::Itertools;
use lazy_static::lazy_static;
use log;
use nalgebra::DMatrix;
use ndarray::{Array3, Ix3};
use ndarray_einsum_beta::einsum;
use num::{BigUint, Complex};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::angmom::degree_dim;
use crate::angmom::sh_conversion::sh_c2r_mat;
use crate::angmom::sh_rotation_3d::irr_repr;
use crate::auxiliary::cache::ComputeOnceCache;
use crate::auxiliary::misc::kron;
use crate::precision::So3Float;

#[cfg(test)]
#[path = "clebsch_gordan_tests.rs"]
mod clebsch_gordan_tests;

/// Magnitude above which an element counts as nonzero when fixing the overall sign.
const SIGN_THRESHOLD: f64 = 1e-8;

/// Largest $`n`$ for which $`n!`$ is representable in double precision.
const MAX_EXACT_FACTORIAL: u32 = 170;

// =================
// Error definitions
// =================

/// Error for failures in the construction of coupling tensors.
#[derive(Debug, Clone)]
pub struct ClebschGordanError(pub String);

impl fmt::Display for ClebschGordanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Clebsch--Gordan error: {}", self.0)
    }
}

impl Error for ClebschGordanError {}

// ==========
// Parameters
// ==========

/// An enumerated type for the methods of constructing coupling tensors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouplingMethod {
    /// The closed-form Racah sum for the complex Clebsch--Gordan coefficients, transformed to the
    /// real basis.
    #[default]
    Racah,

    /// The common null space of $`\mathbf{I} - \mathbf{K}`$ over a set of sample rotations,
    /// where
    /// $`\mathbf{K} = \mathbf{D}^{(l_f)} \otimes \mathbf{D}^{(l_{\mathrm{in}})}
    /// \otimes \mathbf{D}^{(l_{\mathrm{out}})}`$.
    NullSpace,
}

impl fmt::Display for CouplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouplingMethod::Racah => write!(f, "Racah formula"),
            CouplingMethod::NullSpace => write!(f, "Invariant null space"),
        }
    }
}

fn default_sample_angles() -> Vec<(f64, f64, f64)> {
    vec![
        (4.41301023, 5.56684102, 4.59384642),
        (4.93325116, 6.12697327, 4.14574096),
        (0.53878964, 4.09050444, 5.36539036),
        (2.16017393, 3.48835314, 5.55174441),
        (2.52385107, 0.29089583, 3.90040975),
    ]
}

/// A structure containing control parameters for the construction of coupling tensors.
#[derive(Clone, Builder, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClebschGordanParams {
    /// The construction method.
    #[builder(default = "CouplingMethod::Racah")]
    pub method: CouplingMethod,

    /// Singular values below this threshold span the invariant null space in
    /// [`CouplingMethod::NullSpace`].
    #[builder(default = "1e-8")]
    pub null_space_threshold: f64,

    /// Euler angles of the rotations sampled by [`CouplingMethod::NullSpace`]. They must be
    /// generic enough to leave a single invariant direction.
    #[builder(default = "default_sample_angles()")]
    pub sample_angles: Vec<(f64, f64, f64)>,
}

impl ClebschGordanParams {
    /// Returns a builder to construct a [`ClebschGordanParams`] structure.
    pub fn builder() -> ClebschGordanParamsBuilder {
        ClebschGordanParamsBuilder::default()
    }
}

impl Default for ClebschGordanParams {
    fn default() -> Self {
        Self {
            method: CouplingMethod::Racah,
            null_space_threshold: 1e-8,
            sample_angles: default_sample_angles(),
        }
    }
}

impl fmt::Display for ClebschGordanParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coupling method: {}", self.method)?;
        if self.method == CouplingMethod::NullSpace {
            writeln!(
                f,
                "Null-space threshold: {:.3e}",
                self.null_space_threshold
            )?;
            writeln!(f, "Number of sample rotations: {}", self.sample_angles.len())?;
        }
        Ok(())
    }
}

// =====
// Cache
// =====

type CouplingResult = Result<Arc<Array3<f64>>, ClebschGordanError>;

/// A memoisation cache of coupling tensors keyed by $`(l_f, l_{\mathrm{in}}, l_{\mathrm{out}})`$.
///
/// Each tensor is computed at most once, in double precision, even under concurrent first
/// requests for the same key.
#[derive(Debug, Default)]
pub struct ClebschGordanCache {
    params: ClebschGordanParams,
    tensors: ComputeOnceCache<(u32, u32, u32), CouplingResult>,
}

impl ClebschGordanCache {
    /// Creates an empty cache whose tensors are constructed with `params`.
    pub fn new(params: ClebschGordanParams) -> Self {
        Self {
            params,
            tensors: ComputeOnceCache::new(),
        }
    }

    /// Returns the parameters with which tensors are constructed.
    pub fn params(&self) -> &ClebschGordanParams {
        &self.params
    }

    /// Returns the coupling tensor for the degree triple in double precision, computing it on the
    /// first request. Triples outside the triangle inequality give a zero tensor, which is not
    /// cached.
    ///
    /// # Errors
    ///
    /// Errors if [`CouplingMethod::NullSpace`] does not find exactly one invariant direction.
    pub fn get(&self, l_f: u32, l_in: u32, l_out: u32) -> CouplingResult {
        if !couples(l_f, l_in, l_out) {
            return Ok(Arc::new(Array3::zeros((
                degree_dim(l_f),
                degree_dim(l_in),
                degree_dim(l_out),
            ))));
        }
        self.tensors.get_or_compute(&(l_f, l_in, l_out), || {
            log::debug!(
                "Computing the coupling tensor for (l_f, l_in, l_out) = ({l_f}, {l_in}, {l_out}) with the {} method.",
                self.params.method
            );
            let raw = match self.params.method {
                CouplingMethod::Racah => racah_coupling(l_f, l_in, l_out)?,
                CouplingMethod::NullSpace => null_space_coupling(l_f, l_in, l_out, &self.params)?,
            };
            Ok(Arc::new(normalise_and_fix_sign(raw)))
        })
    }

    /// Returns the coupling tensor for the degree triple cast to the element type `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn clebsch_gordan<T: So3Float>(
        &self,
        l_f: u32,
        l_in: u32,
        l_out: u32,
    ) -> Result<Array3<T>, ClebschGordanError> {
        Ok(self.get(l_f, l_in, l_out)?.mapv(T::from_f64_lossy))
    }

    /// Returns the number of degree triples whose tensors have been computed.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns `true` if no tensor has been computed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the tensor for the degree triple has been computed.
    pub fn contains(&self, l_f: u32, l_in: u32, l_out: u32) -> bool {
        self.tensors.contains(&(l_f, l_in, l_out))
    }
}

lazy_static! {
    static ref CLEBSCH_GORDAN_CACHE: ClebschGordanCache = ClebschGordanCache::default();
    static ref LN_FACTORIALS: Vec<f64> = (0..=MAX_EXACT_FACTORIAL)
        .map(|n| {
            BigUint::from(n)
                .checked_factorial()
                .and_then(|nfac| nfac.to_f64())
                .map(f64::ln)
                .expect("Factorials up to 170 must be representable in double precision.")
        })
        .collect();
}

/// Returns the process-wide cache used by [`clebsch_gordan`], constructed with the default
/// [`ClebschGordanParams`].
pub fn global_clebsch_gordan_cache() -> &'static ClebschGordanCache {
    &CLEBSCH_GORDAN_CACHE
}

/// Returns `true` if degrees $`l_{\mathrm{in}}`$ and $`l_{\mathrm{out}}`$ couple to $`l_f`$,
/// *i.e.* $`|l_{\mathrm{in}} - l_{\mathrm{out}}| \le l_f \le l_{\mathrm{in}} + l_{\mathrm{out}}`$.
#[must_use]
pub fn couples(l_f: u32, l_in: u32, l_out: u32) -> bool {
    l_in.abs_diff(l_out) <= l_f && l_f <= l_in + l_out
}

/// Returns the coupling tensor $`\mathbf{Q}^{(l_f, l_{\mathrm{in}}, l_{\mathrm{out}})}`$ from the
/// process-wide cache.
///
/// For fixed $`l_{\mathrm{in}}, l_{\mathrm{out}}`$, the tensors of all coupling $`l_f`$, each
/// flattened to $`(2l_f+1) \times (2l_{\mathrm{in}}+1)(2l_{\mathrm{out}}+1)`$ and scaled by
/// $`\sqrt{2l_f+1}`$, stack into an orthogonal matrix.
///
/// # Arguments
///
/// * `l_f` - The coupled degree.
/// * `l_in` - The first degree of the product.
/// * `l_out` - The second degree of the product.
///
/// # Returns
///
/// The coupling tensor, all zero if the triangle inequality is violated.
///
/// # Errors
///
/// See [`ClebschGordanCache::get`].
pub fn clebsch_gordan<T: So3Float>(
    l_f: u32,
    l_in: u32,
    l_out: u32,
) -> Result<Array3<T>, ClebschGordanError> {
    CLEBSCH_GORDAN_CACHE.clebsch_gordan(l_f, l_in, l_out)
}

// ======================
// Racah closed-form sums
// ======================

/// Returns $`\ln n!`$.
fn ln_factorial(n: u32) -> f64 {
    if n <= MAX_EXACT_FACTORIAL {
        LN_FACTORIALS[n as usize]
    } else {
        LN_FACTORIALS[MAX_EXACT_FACTORIAL as usize]
            + (MAX_EXACT_FACTORIAL + 1..=n)
                .map(|k| f64::from(k).ln())
                .sum::<f64>()
    }
}

/// $`\ln n!`$ for an argument known to be non-negative.
fn ln_fac(n: i64) -> f64 {
    ln_factorial(u32::try_from(n).expect("Negative factorial argument in the Racah sum."))
}

/// Computes the Clebsch--Gordan coefficient $`\langle j_1 m_1 j_2 m_2 | J M \rangle`$ for
/// complex spherical harmonics with the Condon--Shortley phase, from the Racah formula.
///
/// # Returns
///
/// The coefficient, zero if $`M \ne m_1 + m_2`$, if any projection exceeds its degree, or if
/// the degrees violate the triangle inequality.
#[must_use]
pub fn clebsch_gordan_coefficient(j1: u32, m1: i64, j2: u32, m2: i64, j: u32, m: i64) -> f64 {
    let (j1, j2, jj) = (i64::from(j1), i64::from(j2), i64::from(j));
    if m != m1 + m2
        || m1.abs() > j1
        || m2.abs() > j2
        || m.abs() > jj
        || !((j1 - j2).abs() <= jj && jj <= j1 + j2)
    {
        return 0.0;
    }

    let ln_prefactor = 0.5
        * (((2 * jj + 1) as f64).ln()
            + ln_fac(jj + j1 - j2)
            + ln_fac(jj - j1 + j2)
            + ln_fac(j1 + j2 - jj)
            - ln_fac(j1 + j2 + jj + 1)
            + ln_fac(jj + m)
            + ln_fac(jj - m)
            + ln_fac(j1 - m1)
            + ln_fac(j1 + m1)
            + ln_fac(j2 - m2)
            + ln_fac(j2 + m2));

    let kmin = 0i64.max(j2 - jj - m1).max(j1 + m2 - jj);
    let kmax = (j1 + j2 - jj).min(j1 - m1).min(j2 + m2);
    (kmin..=kmax)
        .map(|k| {
            let ln_den = ln_fac(k)
                + ln_fac(j1 + j2 - jj - k)
                + ln_fac(j1 - m1 - k)
                + ln_fac(j2 + m2 - k)
                + ln_fac(jj - j2 + m1 + k)
                + ln_fac(jj - j1 - m2 + k);
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            sign * (ln_prefactor - ln_den).exp()
        })
        .sum()
}

/// Builds the (unnormalised) real coupling tensor from the complex Clebsch--Gordan coefficients.
///
/// The complex tensor $`T_{M m_1 m_2} = \langle l_{\mathrm{in}} m_1 l_{\mathrm{out}} m_2 | l_f M
/// \rangle`$ is transformed to the real basis with the matrices $`\mathbf{C}^{(l)}`$ of
/// [`sh_c2r_mat`]. The result is either purely real or purely imaginary, and the nonvanishing
/// part is returned.
fn racah_coupling(l_f: u32, l_in: u32, l_out: u32) -> Result<Array3<f64>, ClebschGordanError> {
    let (lf, li, lo) = (i64::from(l_f), i64::from(l_in), i64::from(l_out));
    let tcomplex = Array3::from_shape_fn(
        (degree_dim(l_f), degree_dim(l_in), degree_dim(l_out)),
        |(mf, mi, mo)| {
            Complex::from(clebsch_gordan_coefficient(
                l_in,
                mi as i64 - li,
                l_out,
                mo as i64 - lo,
                l_f,
                mf as i64 - lf,
            ))
        },
    );
    let cmat_f = sh_c2r_mat(l_f);
    let cmat_in_conj = sh_c2r_mat(l_in).mapv(|x| x.conj());
    let cmat_out_conj = sh_c2r_mat(l_out).mapv(|x| x.conj());
    let qcomplex = einsum(
        "fa,abc,ib,oc->fio",
        &[
            &cmat_f.view(),
            &tcomplex.view(),
            &cmat_in_conj.view(),
            &cmat_out_conj.view(),
        ],
    )
    .map_err(|err| ClebschGordanError(err.to_string()))?
    .into_dimensionality::<Ix3>()
    .map_err(|err| ClebschGordanError(err.to_string()))?
    .as_standard_layout()
    .into_owned();

    let re = qcomplex.mapv(|x| x.re);
    let im = qcomplex.mapv(|x| x.im);
    let re_norm_sq = re.iter().map(|x| x * x).sum::<f64>();
    let im_norm_sq = im.iter().map(|x| x * x).sum::<f64>();
    Ok(if re_norm_sq >= im_norm_sq { re } else { im })
}

// ====================
// Invariant null space
// ====================

/// Finds the coupling tensor as the single vector fixed by
/// $`\mathbf{K}_s = \mathbf{D}^{(l_f)} \otimes \mathbf{D}^{(l_{\mathrm{in}})} \otimes
/// \mathbf{D}^{(l_{\mathrm{out}})}`$ for all sample rotations $`s`$.
///
/// The invariant direction is the right singular vector of the stacked blocks
/// $`\mathbf{I} - \mathbf{K}_s`$ with vanishing singular value.
fn null_space_coupling(
    l_f: u32,
    l_in: u32,
    l_out: u32,
    params: &ClebschGordanParams,
) -> Result<Array3<f64>, ClebschGordanError> {
    if params.sample_angles.is_empty() {
        return Err(ClebschGordanError(
            "at least one sample rotation is needed to find the invariant direction.".to_string(),
        ));
    }
    let shape = (degree_dim(l_f), degree_dim(l_in), degree_dim(l_out));
    let n = shape.0 * shape.1 * shape.2;

    let kmats = params
        .sample_angles
        .iter()
        .map(|&(alpha, beta, gamma)| {
            kron(
                &irr_repr(l_f, alpha, beta, gamma),
                &kron(
                    &irr_repr(l_in, alpha, beta, gamma),
                    &irr_repr(l_out, alpha, beta, gamma),
                ),
            )
        })
        .collect_vec();
    let stacked = DMatrix::from_fn(kmats.len() * n, n, |r, c| {
        let (s, i) = (r / n, r % n);
        let delta = if i == c { 1.0 } else { 0.0 };
        delta - kmats[s][(i, c)]
    });

    let svd = stacked.svd(false, true);
    let v_t = svd.v_t.ok_or_else(|| {
        ClebschGordanError("the singular value decomposition returned no right vectors.".to_string())
    })?;
    let null_indices = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, sigma)| sigma.abs() < params.null_space_threshold)
        .map(|(i, _)| i)
        .collect_vec();
    if null_indices.len() != 1 {
        return Err(ClebschGordanError(format!(
            "expected one invariant direction for (l_f, l_in, l_out) = ({l_f}, {l_in}, {l_out}), found {}.",
            null_indices.len()
        )));
    }
    let vector = v_t.row(null_indices[0]);
    Array3::from_shape_vec(shape, vector.iter().copied().collect())
        .map_err(|err| ClebschGordanError(err.to_string()))
}

/// Scales a tensor to unit Frobenius norm and makes its first significant element positive.
fn normalise_and_fix_sign(mut q: Array3<f64>) -> Array3<f64> {
    let norm = q.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        q.mapv_inplace(|x| x / norm);
    }
    let flip = q
        .iter()
        .find(|x| x.abs() > SIGN_THRESHOLD)
        .map_or(false, |first| *first < 0.0);
    if flip {
        q.mapv_inplace(|x| -x);
    }
    q
}
