use approx;
use ndarray::{s, Array2, Array3};

use crate::angmom::clebsch_gordan::{
    clebsch_gordan, ClebschGordanCache, ClebschGordanParams, CouplingMethod,
};
use crate::auxiliary::misc::kron;
use crate::representation::tensor_product::{reduce_tensor_product, reduce_tensor_product_with};
use crate::representation::{rs_repr, RepresentationDescriptor};

fn flatten(q: &Array3<f64>) -> Array2<f64> {
    let (di, dj, d_o) = q.dim();
    q.to_owned().into_shape((di * dj, d_o)).unwrap()
}

fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    (a - b).iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn check_reduction(rs_i: &RepresentationDescriptor, rs_j: &RepresentationDescriptor) {
    let (rs_out, q) = reduce_tensor_product::<f64>(rs_i, rs_j).unwrap();
    assert_eq!(q.dim(), (rs_i.dim(), rs_j.dim(), rs_out.dim()));
    assert_eq!(rs_out.dim(), rs_i.dim() * rs_j.dim());

    let m = flatten(&q);
    let eye = Array2::<f64>::eye(rs_out.dim());
    approx::assert_abs_diff_eq!(max_abs_diff(&m.t().dot(&m), &eye), 0.0, epsilon = 1e-10);
    approx::assert_abs_diff_eq!(max_abs_diff(&m.dot(&m.t()), &eye), 0.0, epsilon = 1e-10);

    for (a, b, c) in [(0.4, 1.1, 2.3), (5.9, 2.8, 0.1), (3.3, 0.05, 4.4)] {
        let d_i = rs_repr(rs_i, a, b, c);
        let d_j = rs_repr(rs_j, a, b, c);
        let d_out = rs_repr(&rs_out, a, b, c);
        let lhs = kron(&d_i, &d_j).dot(&m);
        let rhs = m.dot(&d_out);
        approx::assert_abs_diff_eq!(max_abs_diff(&lhs, &rhs), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_tensor_product_scalar_times_degree_two() {
    let rs_i = RepresentationDescriptor::new(vec![(1, 0)]).unwrap();
    let rs_j = RepresentationDescriptor::new(vec![(2, 0)]).unwrap();
    let (rs_out, q) = reduce_tensor_product::<f64>(&rs_i, &rs_j).unwrap();
    assert_eq!(rs_out.entries(), &[(1, 0), (1, 0)]);
    approx::assert_abs_diff_eq!(
        max_abs_diff(&flatten(&q), &Array2::eye(2)),
        0.0,
        epsilon = 1e-14
    );
    check_reduction(&rs_i, &rs_j);
}

#[test]
fn test_tensor_product_mixed_degrees() {
    let rs_i = RepresentationDescriptor::new(vec![(3, 1), (2, 2)]).unwrap();
    let rs_j = RepresentationDescriptor::new(vec![(2, 0), (1, 1), (1, 3)]).unwrap();
    check_reduction(&rs_i, &rs_j);
}

#[test]
fn test_tensor_product_output_order() {
    let rs_i = RepresentationDescriptor::new(vec![(1, 1), (1, 0)]).unwrap();
    let rs_j = RepresentationDescriptor::new(vec![(1, 2), (1, 1)]).unwrap();
    let (rs_out, _) = reduce_tensor_product::<f64>(&rs_i, &rs_j).unwrap();
    assert_eq!(
        rs_out.irreps().collect::<Vec<_>>(),
        vec![1, 2, 3, 0, 1, 2, 2, 1]
    );
    assert!(rs_out.entries().iter().all(|&(mul, _)| mul == 1));
    assert_eq!(rs_out.simplify().to_string(), "P ⊕ D ⊕ F ⊕ S ⊕ P ⊕ 2D ⊕ P");
}

#[test]
fn test_tensor_product_blocks_are_scaled_coupling_tensors() {
    let rs_i = RepresentationDescriptor::new(vec![(1, 0), (1, 1)]).unwrap();
    let rs_j = RepresentationDescriptor::new(vec![(1, 2)]).unwrap();
    let (rs_out, q) = reduce_tensor_product::<f64>(&rs_i, &rs_j).unwrap();
    assert_eq!(rs_out.irreps().collect::<Vec<_>>(), vec![2, 1, 2, 3]);

    // Block of (l_i, l_j, l_f) = (1, 2, 3): rows 1..4, columns 0..5, output 13..20.
    let cg = clebsch_gordan::<f64>(3, 1, 2).unwrap();
    let block = q.slice(s![1..4, 0..5, 13..20]);
    for ((i, j, f), x) in block.indexed_iter() {
        approx::assert_relative_eq!(*x, 7.0f64.sqrt() * cg[(f, i, j)], epsilon = 1e-14);
    }
    assert!(q.slice(s![0..1, .., 5..]).iter().all(|x| *x == 0.0));
    assert!(q.slice(s![1..4, .., 0..5]).iter().all(|x| *x == 0.0));
}

#[test]
fn test_tensor_product_empty_factor() {
    let rs_i = RepresentationDescriptor::default();
    let rs_j = RepresentationDescriptor::new(vec![(2, 3)]).unwrap();
    let (rs_out, q) = reduce_tensor_product::<f64>(&rs_i, &rs_j).unwrap();
    assert!(rs_out.is_empty());
    assert_eq!(q.dim(), (0, 14, 0));
}

#[test]
fn test_tensor_product_with_null_space_cache() {
    let cache = ClebschGordanCache::new(
        ClebschGordanParams::builder()
            .method(CouplingMethod::NullSpace)
            .build()
            .unwrap(),
    );
    let rs = RepresentationDescriptor::new(vec![(1, 1)]).unwrap();
    let (rs_out, q) = reduce_tensor_product_with::<f64>(&cache, &rs, &rs).unwrap();
    let (rs_out_ref, q_ref) = reduce_tensor_product::<f64>(&rs, &rs).unwrap();
    assert_eq!(rs_out, rs_out_ref);
    assert_eq!(cache.len(), 3);
    for (x, y) in q.iter().zip(q_ref.iter()) {
        approx::assert_relative_eq!(*x, *y, epsilon = 1e-8);
    }
}

#[test]
fn test_tensor_product_single_precision() {
    let rs_i = RepresentationDescriptor::new(vec![(1, 1), (1, 2)]).unwrap();
    let rs_j = RepresentationDescriptor::new(vec![(1, 1)]).unwrap();
    let (_, q64) = reduce_tensor_product::<f64>(&rs_i, &rs_j).unwrap();
    let (_, q32) = reduce_tensor_product::<f32>(&rs_i, &rs_j).unwrap();
    for (x, y) in q64.iter().zip(q32.iter()) {
        assert!((x - f64::from(*y)).abs() < 1e-6);
    }
}
