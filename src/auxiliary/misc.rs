//! Miscellaneous dense linear-algebra helpers.

use ndarray::{s, Array2, LinalgScalar};

#[cfg(test)]
#[path = "misc_tests.rs"]
mod misc_tests;

/// Computes the Kronecker product $`\mathbf{A} \otimes \mathbf{B}`$.
///
/// Row $`i_A n_B + i_B`$ and column $`j_A m_B + j_B`$ of the product hold
/// $`A_{i_A j_A} B_{i_B j_B}`$, *i.e.* composite indices are flattened in row-major order.
pub(crate) fn kron<T: LinalgScalar>(a: &Array2<T>, b: &Array2<T>) -> Array2<T> {
    let (a_rows, a_cols) = a.dim();
    let (b_rows, b_cols) = b.dim();
    let mut out = Array2::<T>::zeros((a_rows * b_rows, a_cols * b_cols));
    for ((i, j), &aij) in a.indexed_iter() {
        out.slice_mut(s![
            i * b_rows..(i + 1) * b_rows,
            j * b_cols..(j + 1) * b_cols
        ])
        .assign(&b.mapv(|bij| aij * bij));
    }
    out
}
