//! Fixed changes of basis between Cartesian and spherical coordinates.

use anyhow::{self, format_err};
use lazy_static::lazy_static;
use log;
use ndarray::{array, Array2, Ix3};
use ndarray_einsum_beta::einsum;

use crate::auxiliary::misc::kron;
use crate::precision::So3Float;
use crate::representation::tensor_product::reduce_tensor_product;
use crate::representation::{RepresentationDescriptor, RepresentationError};
use crate::rotation::rotation_matrix;

#[cfg(test)]
#[path = "change_of_basis_tests.rs"]
mod change_of_basis_tests;

type Rank2ChangeOfBasis = (RepresentationDescriptor, Array2<f64>);

lazy_static! {
    static ref CARTESIAN_RANK2_TO_SPHERICAL: Result<Rank2ChangeOfBasis, RepresentationError> =
        build_cartesian_rank2_to_spherical()
            .map_err(|err| RepresentationError(format!("{err:#}")));
}

/// Returns the orthogonal matrix $`\mathbf{A}`$ taking Cartesian vector components
/// $`(x, y, z)`$ to the components in the basis of the real spherical harmonics of degree one,
/// $`(Y_{1,-1}, Y_{1,0}, Y_{1,1}) \propto (y, z, x)`$.
///
/// It satisfies $`\mathbf{D}^{(1)}(\hat{R}) \mathbf{A} = \mathbf{A} \mathbf{R}`$ for every
/// rotation.
#[must_use]
pub fn cartesian_vector_to_spherical<T: So3Float>() -> Array2<T> {
    let (o, i) = (T::zero(), T::one());
    array![[o, i, o], [o, o, i], [i, o, o]]
}

/// Returns the representation $`\mathbf{T} \mapsto \mathbf{R} \mathbf{T} \mathbf{R}^{\mathsf{T}}`$
/// of rank-2 Cartesian tensors, acting on the nine components $`T_{ab}`$ flattened in row-major
/// order, *i.e.* $`\mathbf{R} \otimes \mathbf{R}`$.
#[must_use]
pub fn cartesian_rank2_repr<T: So3Float>(alpha: T, beta: T, gamma: T) -> Array2<T> {
    let rmat = rotation_matrix(alpha, beta, gamma);
    kron(&rmat, &rmat)
}

/// Returns the decomposition of rank-2 Cartesian tensors into irreducible components.
///
/// The descriptor is that of the reduction of the tensor product of two degree-one
/// representations, $`S \oplus P \oplus D`$. The $`9 \times 9`$ orthogonal matrix $`\mathbf{B}`$
/// maps the row-major flattened components $`T_{ab}`$ to the irreducible components, so that
/// $`\mathbf{B} (\mathbf{R} \otimes \mathbf{R}) = \mathbf{D}_{S \oplus P \oplus D}(\hat{R})
/// \mathbf{B}`$. Row 0 is proportional to the trace, rows 1 to 3 to the antisymmetric part
/// and rows 4 to 8 to the symmetric traceless part.
///
/// The matrix is computed once.
///
/// # Errors
///
/// Errors if the coupling tensors could not be constructed.
pub fn cartesian_rank2_to_spherical<T: So3Float>(
) -> Result<(RepresentationDescriptor, Array2<T>), anyhow::Error> {
    let (rs, bmat) = (*CARTESIAN_RANK2_TO_SPHERICAL)
        .as_ref()
        .map_err(|err| err.clone())?;
    Ok((rs.clone(), bmat.mapv(T::from_f64_lossy)))
}

fn build_cartesian_rank2_to_spherical() -> Result<Rank2ChangeOfBasis, anyhow::Error> {
    log::debug!("Building the change of basis for rank-2 Cartesian tensors.");
    let p = RepresentationDescriptor::irrep(1);
    let (rs_out, q) = reduce_tensor_product::<f64>(&p, &p)?;
    let amat = cartesian_vector_to_spherical::<f64>();
    let bmat3 = einsum("ijk,ia,jb->kab", &[&q.view(), &amat.view(), &amat.view()])
        .map_err(|err| format_err!(err))?
        .into_dimensionality::<Ix3>()?;
    let bmat = Array2::from_shape_fn((9, 9), |(k, ab)| bmat3[(k, ab / 3, ab % 3)]);
    Ok((rs_out, bmat))
}
