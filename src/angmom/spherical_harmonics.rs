//! Real spherical harmonics.
//!
//! The real spherical harmonics of degree $`l`$ are
//!
//! ```math
//! Y_{lm}(\theta, \phi) = \begin{cases}
//!     \sqrt{2}\, \bar{P}_{l|m|}(\cos\theta) \sin(|m|\phi) & m < 0, \\
//!     \bar{P}_{l0}(\cos\theta) & m = 0, \\
//!     \sqrt{2}\, \bar{P}_{lm}(\cos\theta) \cos(m\phi) & m > 0,
//! \end{cases}
//! ```
//!
//! where $`\bar{P}_{lm}`$ are the associated Legendre functions normalised so that
//! $`\int |Y_{lm}|^2 \, \mathrm{d}\Omega = 1`$, without the Condon--Shortley phase. The
//! harmonics are ordered by increasing $`m`$, which makes $`(Y_{1,-1}, Y_{1,0}, Y_{1,1})`$
//! proportional to $`(y, z, x)`$.

use std::sync::Arc;

use lazy_static::lazy_static;
use log;
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::angmom::degree_dim;
use crate::auxiliary::cache::ComputeOnceCache;
use crate::precision::So3Float;
use crate::rotation::{direction_to_angles, InvalidDirectionError};

#[cfg(test)]
#[path = "spherical_harmonics_tests.rs"]
mod spherical_harmonics_tests;

// ==================
// Struct definitions
// ==================

/// Recurrence coefficients of the normalised associated Legendre functions
/// $`\bar{P}_{l'm}`$ for all $`0 \le m \le l' \le l`$.
#[derive(Debug)]
struct LegendreTable {
    /// The highest degree $`l`$ covered by the table.
    degree: u32,

    /// Element $`m`$ is the factor $`\sqrt{(2m+1)/(2m)}`$ taking $`\bar{P}_{m-1,m-1}`$ to
    /// $`\bar{P}_{mm} / \sin\theta`$. Element $`0`$ is $`\bar{P}_{00} = 1/\sqrt{4\pi}`$.
    sectoral: Vec<f64>,

    /// Element $`m`$ is the factor $`\sqrt{2m+3}`$ taking $`\bar{P}_{mm}`$ to
    /// $`\bar{P}_{m+1,m} / \cos\theta`$.
    raising: Vec<f64>,

    /// Element $`m`$ lists the pairs $`(a_{l'm}, b_{l'm})`$ for $`l' = m+2, \ldots, l`$ of the
    /// three-term recurrence
    /// $`\bar{P}_{l'm} = a_{l'm} (x \bar{P}_{l'-1,m} - b_{l'm} \bar{P}_{l'-2,m})`$.
    recurrence: Vec<Vec<(f64, f64)>>,
}

impl LegendreTable {
    fn new(degree: u32) -> Self {
        let l = degree as usize;
        let sectoral = (0..=l)
            .map(|m| {
                if m == 0 {
                    (0.25 * std::f64::consts::FRAC_1_PI).sqrt()
                } else {
                    let mf = m as f64;
                    ((2.0 * mf + 1.0) / (2.0 * mf)).sqrt()
                }
            })
            .collect::<Vec<_>>();
        let raising = (0..=l)
            .map(|m| (2.0 * m as f64 + 3.0).sqrt())
            .collect::<Vec<_>>();
        let recurrence = (0..=l)
            .map(|m| {
                let mf2 = (m * m) as f64;
                (m + 2..=l)
                    .map(|lp| {
                        let lf = lp as f64;
                        let a = ((4.0 * lf * lf - 1.0) / (lf * lf - mf2)).sqrt();
                        let b = (((lf - 1.0) * (lf - 1.0) - mf2)
                            / (4.0 * (lf - 1.0) * (lf - 1.0) - 1.0))
                            .sqrt();
                        (a, b)
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        Self {
            degree,
            sectoral,
            raising,
            recurrence,
        }
    }

    /// Evaluates $`\bar{P}_{lm}(\cos\theta)`$ for $`m = 0, \ldots, l`$.
    ///
    /// # Arguments
    ///
    /// * `x` - $`\cos\theta`$.
    /// * `s` - $`\sin\theta`$. A negative value, which corresponds to the azimuth
    /// $`\phi + \pi`$, flips the sign of every $`\bar{P}_{lm}`$ with odd $`m`$.
    fn evaluate<T: So3Float>(&self, x: T, s: T) -> Vec<T> {
        let l = self.degree as usize;
        let mut p_mm = T::from_f64_lossy(self.sectoral[0]);
        (0..=l)
            .map(|m| {
                if m > 0 {
                    p_mm = p_mm * T::from_f64_lossy(self.sectoral[m]) * s;
                }
                if m == l {
                    return p_mm;
                }
                let mut prev = p_mm;
                let mut curr = T::from_f64_lossy(self.raising[m]) * x * p_mm;
                for &(a, b) in &self.recurrence[m] {
                    let next = T::from_f64_lossy(a) * (x * curr - T::from_f64_lossy(b) * prev);
                    prev = curr;
                    curr = next;
                }
                curr
            })
            .collect()
    }
}

lazy_static! {
    static ref LEGENDRE_TABLES: ComputeOnceCache<u32, Arc<LegendreTable>> =
        ComputeOnceCache::new();
}

/// Returns the cached Legendre recurrence table of degree `l`.
fn legendre_table(l: u32) -> Arc<LegendreTable> {
    LEGENDRE_TABLES.get_or_compute(&l, || {
        log::debug!("Building the Legendre recurrence table for degree {l}.");
        Arc::new(LegendreTable::new(l))
    })
}

// =========
// Functions
// =========

/// Combines normalised Legendre values with the azimuthal factors into real spherical harmonics.
fn real_harmonics<T: So3Float>(l: u32, legendre: &[T], alpha: T) -> Array1<T> {
    let li = i64::from(l);
    let sqrt2 = T::SQRT_2();
    Array1::from_iter((-li..=li).map(|m| {
        let k = m.unsigned_abs() as usize;
        let mk = T::from_i64_lossy(m.abs());
        match m.signum() {
            1 => sqrt2 * legendre[k] * (mk * alpha).cos(),
            -1 => sqrt2 * legendre[k] * (mk * alpha).sin(),
            _ => legendre[0],
        }
    }))
}

/// Evaluates the real spherical harmonics of degree $`l`$ at a direction given by angles.
///
/// # Arguments
///
/// * `l` - The degree $`l`$.
/// * `alpha` - The azimuthal angle $`\phi`$ in radians.
/// * `beta` - The polar angle $`\theta`$ in radians, measured from $`+z`$.
///
/// # Returns
///
/// The vector $`(Y_{l,-l}, \ldots, Y_{l,l})`$ of length $`2l + 1`$.
#[must_use]
pub fn spherical_harmonics<T: So3Float>(l: u32, alpha: T, beta: T) -> Array1<T> {
    let table = legendre_table(l);
    let (s, x) = beta.sin_cos();
    real_harmonics(l, &table.evaluate(x, s), alpha)
}

/// Evaluates the real spherical harmonics of degree $`l`$ at one Cartesian point, normalised
/// internally to a unit vector.
fn harmonics_at_point<T: So3Float>(
    l: u32,
    table: &LegendreTable,
    xyz: ArrayView1<T>,
) -> Result<Array1<T>, InvalidDirectionError> {
    let (alpha, beta) = direction_to_angles(xyz)?;
    let (s, x) = beta.sin_cos();
    Ok(real_harmonics(l, &table.evaluate(x, s), alpha))
}

/// Evaluates the real spherical harmonics of degree $`l`$ at a batch of Cartesian points.
///
/// Points are evaluated in parallel.
///
/// # Arguments
///
/// * `l` - The degree $`l`$.
/// * `xyz` - An $`N \times 3`$ array whose rows are Cartesian points. Each point is normalised
/// internally.
///
/// # Returns
///
/// A $`(2l+1) \times N`$ array whose column $`i`$ holds the harmonics at the direction of row
/// $`i`$ of `xyz`.
///
/// # Errors
///
/// Errors if `xyz` does not have three columns, or if any point is the zero vector or is not
/// finite.
pub fn spherical_harmonics_xyz<T: So3Float>(
    l: u32,
    xyz: ArrayView2<T>,
) -> Result<Array2<T>, InvalidDirectionError> {
    if xyz.ncols() != 3 {
        return Err(InvalidDirectionError(format!(
            "expected an N × 3 array of points, got {:?}.",
            xyz.dim()
        )));
    }
    let table = legendre_table(l);
    let columns = xyz
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|point| harmonics_at_point(l, &table, point))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Array2::from_shape_fn(
        (degree_dim(l), columns.len()),
        |(m, i)| columns[i][m],
    ))
}
