//! Reduction of tensor products of reducible representations.

use anyhow::{self, ensure};
use log;
use ndarray::{s, Array3};

use crate::angmom::clebsch_gordan::{global_clebsch_gordan_cache, ClebschGordanCache};
use crate::angmom::degree_dim;
use crate::precision::So3Float;
use crate::representation::RepresentationDescriptor;

#[cfg(test)]
#[path = "tensor_product_tests.rs"]
mod tensor_product_tests;

/// Reduces the tensor product of two reducible representations into a direct sum of
/// irreducible representations, using the process-wide coupling-tensor cache.
///
/// See [`reduce_tensor_product_with`] for the details.
///
/// # Errors
///
/// Errors if a coupling tensor cannot be constructed.
pub fn reduce_tensor_product<T: So3Float>(
    rs_i: &RepresentationDescriptor,
    rs_j: &RepresentationDescriptor,
) -> Result<(RepresentationDescriptor, Array3<T>), anyhow::Error> {
    reduce_tensor_product_with(global_clebsch_gordan_cache(), rs_i, rs_j)
}

/// Reduces the tensor product of two reducible representations into a direct sum of
/// irreducible representations.
///
/// Every pair of irreducible blocks $`(l_i, l_j)`$, with blocks of `rs_i` outermost and blocks
/// of `rs_j` innermost, contributes one irreducible block of degree $`l_f`$ for each
/// $`l_f = \lvert l_i - l_j \rvert, \ldots, l_i + l_j`$ in ascending order. Each contribution
/// appears as its own entry $`(1, l_f)`$ of the output descriptor; equal degrees are not
/// merged.
///
/// The change-of-basis tensor $`\mathbf{Q}`$ has shape
/// $`(\dim \mathrm{Rs}_i, \dim \mathrm{Rs}_j, \dim \mathrm{Rs}_{\mathrm{out}})`$. Flattened to
/// the square matrix $`\mathbf{M}`$ with row index $`a \dim \mathrm{Rs}_j + b`$ it is orthogonal,
/// and it intertwines the representations:
///
/// ```math
/// \left(\mathbf{D}_{\mathrm{Rs}_i}(\hat{R}) \otimes \mathbf{D}_{\mathrm{Rs}_j}(\hat{R})\right)
/// \mathbf{M} = \mathbf{M} \mathbf{D}_{\mathrm{Rs}_{\mathrm{out}}}(\hat{R}).
/// ```
///
/// # Arguments
///
/// * `cache` - The cache from which coupling tensors are taken.
/// * `rs_i` - The descriptor of the first factor.
/// * `rs_j` - The descriptor of the second factor.
///
/// # Returns
///
/// A tuple of the output descriptor and the change-of-basis tensor.
///
/// # Errors
///
/// Errors if a coupling tensor cannot be constructed.
pub fn reduce_tensor_product_with<T: So3Float>(
    cache: &ClebschGordanCache,
    rs_i: &RepresentationDescriptor,
    rs_j: &RepresentationDescriptor,
) -> Result<(RepresentationDescriptor, Array3<T>), anyhow::Error> {
    log::debug!("Reducing the tensor product ({rs_i}) ⊗ ({rs_j}).");
    let dim_i = rs_i.dim();
    let dim_j = rs_j.dim();
    let dim_out = dim_i * dim_j;
    let mut q = Array3::<T>::zeros((dim_i, dim_j, dim_out));
    let mut degrees_out = Vec::new();

    let mut off_i = 0;
    let mut off_out = 0;
    for l_i in rs_i.irreps() {
        let di = degree_dim(l_i);
        let mut off_j = 0;
        for l_j in rs_j.irreps() {
            let dj = degree_dim(l_j);
            for l_f in l_i.abs_diff(l_j)..=l_i + l_j {
                let df = degree_dim(l_f);
                let cg = cache.get(l_f, l_i, l_j)?;
                let scale = (df as f64).sqrt();
                q.slice_mut(s![
                    off_i..off_i + di,
                    off_j..off_j + dj,
                    off_out..off_out + df
                ])
                .assign(
                    &cg.view()
                        .permuted_axes([1, 2, 0])
                        .mapv(|x| T::from_f64_lossy(scale * x)),
                );
                degrees_out.push(l_f);
                off_out += df;
            }
            off_j += dj;
        }
        off_i += di;
    }
    ensure!(
        off_out == dim_out,
        "The coupled blocks span {off_out} dimensions instead of {dim_out}."
    );

    let rs_out = RepresentationDescriptor::from_degrees(degrees_out);
    log::debug!("Tensor product reduced to {rs_out}.");
    Ok((rs_out, q))
}
