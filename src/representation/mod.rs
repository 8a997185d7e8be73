//! Reducible representations written as direct sums of irreducible ones.
//!
//! A reducible representation is described by an ordered list of (multiplicity, degree) pairs,
//! the *Rs* of the representation. The order of the list fixes the order of the blocks in the
//! carrier space: the first `multiplicity` blocks of dimension $`2l+1`$ belong to the first
//! entry, and so on.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::{s, Array2};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::angmom::sh_rotation_3d::{irr_repr_from_matrix, irr_repr_ladder};
use crate::angmom::{degree_dim, degree_label, parse_degree_label};
use crate::precision::So3Float;
use crate::rotation::InvalidRotationError;

pub mod change_of_basis;
pub mod tensor_product;

#[cfg(test)]
#[path = "representation_tests.rs"]
mod representation_tests;

// =================
// Error definitions
// =================

/// Error for malformed representation descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentationError(pub String);

impl fmt::Display for RepresentationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Representation error: {}", self.0)
    }
}

impl Error for RepresentationError {}

// ==================
// Struct definitions
// ==================

/// A structure describing a reducible representation of $`SO(3)`$ as an ordered direct sum of
/// irreducible representations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<(u32, u32)>", into = "Vec<(u32, u32)>")]
pub struct RepresentationDescriptor {
    /// The (multiplicity, degree) pairs in carrier-space order.
    entries: Vec<(u32, u32)>,
}

impl RepresentationDescriptor {
    /// Creates a representation descriptor from (multiplicity, degree) pairs.
    ///
    /// # Errors
    ///
    /// Errors if any multiplicity is zero.
    pub fn new(entries: Vec<(u32, u32)>) -> Result<Self, RepresentationError> {
        if let Some((mul, l)) = entries.iter().find(|(mul, _)| *mul == 0) {
            return Err(RepresentationError(format!(
                "multiplicity {mul} of degree {l} is not positive."
            )));
        }
        Ok(Self { entries })
    }

    /// Creates the descriptor of a single irreducible representation of degree `l`.
    #[must_use]
    pub fn irrep(l: u32) -> Self {
        Self {
            entries: vec![(1, l)],
        }
    }

    /// Creates a descriptor from a sequence of degrees, each with multiplicity one.
    pub fn from_degrees<I: IntoIterator<Item = u32>>(degrees: I) -> Self {
        Self {
            entries: degrees.into_iter().map(|l| (1, l)).collect(),
        }
    }

    /// Returns the (multiplicity, degree) pairs.
    pub fn entries(&self) -> &[(u32, u32)] {
        &self.entries
    }

    /// Returns `true` if the descriptor has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the dimension $`\sum_i n_i (2l_i + 1)`$ of the carrier space.
    pub fn dim(&self) -> usize {
        self.entries
            .iter()
            .map(|&(mul, l)| mul as usize * degree_dim(l))
            .sum()
    }

    /// Returns the largest degree present, or `None` if the descriptor is empty.
    pub fn max_degree(&self) -> Option<u32> {
        self.entries.iter().map(|&(_, l)| l).max()
    }

    /// Returns an iterator over the degrees of the irreducible blocks in carrier-space order,
    /// each degree repeated as many times as its multiplicity.
    pub fn irreps(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .flat_map(|&(mul, l)| std::iter::repeat(l).take(mul as usize))
    }

    /// Returns an equivalent descriptor in which adjacent entries of equal degree are merged by
    /// summing their multiplicities. The block order of the carrier space is unchanged.
    #[must_use]
    pub fn simplify(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .copied()
            .coalesce(|(mul_a, l_a), (mul_b, l_b)| {
                if l_a == l_b {
                    Ok((mul_a + mul_b, l_a))
                } else {
                    Err(((mul_a, l_a), (mul_b, l_b)))
                }
            })
            .collect();
        Self { entries }
    }
}

impl TryFrom<Vec<(u32, u32)>> for RepresentationDescriptor {
    type Error = RepresentationError;

    fn try_from(entries: Vec<(u32, u32)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<RepresentationDescriptor> for Vec<(u32, u32)> {
    fn from(rs: RepresentationDescriptor) -> Self {
        rs.entries
    }
}

impl fmt::Display for RepresentationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.entries
                .iter()
                .map(|&(mul, l)| if mul == 1 {
                    degree_label(l)
                } else {
                    format!("{mul}{}", degree_label(l))
                })
                .join(" ⊕ ")
        )
    }
}

impl FromStr for RepresentationDescriptor {
    type Err = RepresentationError;

    /// Parses a string such as `2P ⊕ D ⊕ L9` into a representation descriptor. Terms may also be
    /// separated by `+`. A term without a leading multiplicity has multiplicity one.
    ///
    /// # Errors
    ///
    /// Errors if a term has no recognisable degree label or a zero multiplicity.
    fn from_str(rs_str: &str) -> Result<Self, Self::Err> {
        if rs_str.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries = rs_str
            .split(|c: char| c == '⊕' || c == '+')
            .map(|term| {
                let term = term.trim();
                let label_start = term
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(term.len());
                let (mul_str, label) = term.split_at(label_start);
                let mul = if mul_str.is_empty() {
                    1
                } else {
                    mul_str.parse::<u32>().map_err(|err| {
                        RepresentationError(format!("invalid multiplicity in `{term}`: {err}."))
                    })?
                };
                let l = parse_degree_label(label).ok_or_else(|| {
                    RepresentationError(format!("unrecognised degree label in `{term}`."))
                })?;
                Ok::<_, RepresentationError>((mul, l))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }
}

// =========
// Functions
// =========

/// Assembles matrices into a block-diagonal matrix, the blocks placed along the diagonal in the
/// order given.
///
/// # Arguments
///
/// * `blocks` - The diagonal blocks. They need not be square.
///
/// # Returns
///
/// A matrix whose numbers of rows and columns are the sums of those of the blocks.
pub fn direct_sum<T: Clone + Zero>(blocks: &[Array2<T>]) -> Array2<T> {
    let nrows = blocks.iter().map(|block| block.nrows()).sum::<usize>();
    let ncols = blocks.iter().map(|block| block.ncols()).sum::<usize>();
    let mut out = Array2::<T>::zeros((nrows, ncols));
    let (mut row, mut col) = (0, 0);
    for block in blocks {
        let (r, c) = block.dim();
        out.slice_mut(s![row..row + r, col..col + c]).assign(block);
        row += r;
        col += c;
    }
    out
}

/// Returns the matrix of the reducible representation `rs` for the rotation
/// $`\mathbf{R}(\alpha, \beta, \gamma)`$: the direct sum of [`irr_repr`] over the irreducible
/// blocks of `rs` in carrier-space order.
///
/// [`irr_repr`]: crate::angmom::sh_rotation_3d::irr_repr
///
/// # Returns
///
/// A square matrix of dimension `rs.dim()`.
#[must_use]
pub fn rs_repr<T: So3Float>(
    rs: &RepresentationDescriptor,
    alpha: T,
    beta: T,
    gamma: T,
) -> Array2<T> {
    let Some(lmax) = rs.max_degree() else {
        return Array2::zeros((0, 0));
    };
    let ladder = irr_repr_ladder(lmax, alpha, beta, gamma);
    let blocks = rs
        .irreps()
        .map(|l| ladder[l as usize].clone())
        .collect_vec();
    direct_sum(&blocks)
}

/// Returns the matrix of the reducible representation `rs` for a Cartesian rotation matrix.
///
/// # Errors
///
/// Errors if `rmat` is not a finite $`3 \times 3`$ matrix.
pub fn rs_repr_from_matrix<T: So3Float>(
    rs: &RepresentationDescriptor,
    rmat: &Array2<T>,
) -> Result<Array2<T>, InvalidRotationError> {
    let blocks = rs
        .irreps()
        .map(|l| irr_repr_from_matrix(l, rmat))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(direct_sum(&blocks))
}
