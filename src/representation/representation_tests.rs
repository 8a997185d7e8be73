use std::str::FromStr;

use approx;
use ndarray::{array, s, Array2};

use crate::angmom::sh_rotation_3d::irr_repr;
use crate::representation::{
    direct_sum, rs_repr, rs_repr_from_matrix, RepresentationDescriptor, RepresentationError,
};
use crate::rotation::{compose, rotation_matrix};

fn frobenius_distance(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    (a - b).map(|x| x * x).sum().sqrt()
}

#[test]
fn test_representation_descriptor_construction() {
    let rs = RepresentationDescriptor::new(vec![(3, 1), (2, 2)]).unwrap();
    assert_eq!(rs.entries(), &[(3, 1), (2, 2)]);
    assert_eq!(rs.dim(), 19);
    assert_eq!(rs.max_degree(), Some(2));
    assert_eq!(rs.irreps().collect::<Vec<_>>(), vec![1, 1, 1, 2, 2]);

    let err = RepresentationDescriptor::new(vec![(1, 0), (0, 3)]).unwrap_err();
    assert_eq!(
        err,
        RepresentationError("multiplicity 0 of degree 3 is not positive.".to_string())
    );
    assert!(err.to_string().starts_with("Representation error"));

    let empty = RepresentationDescriptor::default();
    assert!(empty.is_empty());
    assert_eq!(empty.dim(), 0);
    assert_eq!(empty.max_degree(), None);

    assert_eq!(
        RepresentationDescriptor::from_degrees([0, 2, 2]).entries(),
        &[(1, 0), (1, 2), (1, 2)]
    );
    assert_eq!(RepresentationDescriptor::irrep(4).dim(), 9);
}

#[test]
fn test_representation_descriptor_simplify() {
    let rs = RepresentationDescriptor::from_degrees([0, 1, 1, 2, 1, 1, 1]);
    let simplified = rs.simplify();
    assert_eq!(simplified.entries(), &[(1, 0), (2, 1), (1, 2), (3, 1)]);
    assert_eq!(simplified.dim(), rs.dim());
    assert_eq!(
        simplified.irreps().collect::<Vec<_>>(),
        rs.irreps().collect::<Vec<_>>()
    );
    assert_eq!(simplified.simplify(), simplified);
}

#[test]
fn test_representation_descriptor_display_and_parse() {
    let rs = RepresentationDescriptor::new(vec![(2, 1), (1, 2), (4, 9)]).unwrap();
    assert_eq!(rs.to_string(), "2P ⊕ D ⊕ 4L9");
    assert_eq!(RepresentationDescriptor::from_str(&rs.to_string()).unwrap(), rs);
    assert_eq!(
        RepresentationDescriptor::from_str("S + 3F").unwrap().entries(),
        &[(1, 0), (3, 3)]
    );
    assert_eq!(
        RepresentationDescriptor::from_str("12L12").unwrap().entries(),
        &[(12, 12)]
    );
    assert!(RepresentationDescriptor::from_str("").unwrap().is_empty());
    assert!(RepresentationDescriptor::from_str("2Q").is_err());
    assert!(RepresentationDescriptor::from_str("0P").is_err());
    assert!(RepresentationDescriptor::from_str("P ⊕").is_err());
}

#[test]
fn test_representation_descriptor_serde() {
    let rs = RepresentationDescriptor::new(vec![(3, 1), (2, 2)]).unwrap();
    let yaml = serde_yaml::to_string(&rs).unwrap();
    let rs_de: RepresentationDescriptor = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(rs_de, rs);

    let rs_de: RepresentationDescriptor = serde_yaml::from_str("[[1, 0], [2, 3]]").unwrap();
    assert_eq!(rs_de.entries(), &[(1, 0), (2, 3)]);
    assert!(serde_yaml::from_str::<RepresentationDescriptor>("[[0, 1]]").is_err());
}

#[test]
fn test_direct_sum() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![[5.0]];
    let c = array![[6.0, 7.0, 8.0]];
    let sum = direct_sum(&[a, b, c]);
    let sum_ref = array![
        [1.0, 2.0, 0.0, 0.0, 0.0, 0.0],
        [3.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 5.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 6.0, 7.0, 8.0],
    ];
    assert_eq!(sum, sum_ref);
    assert_eq!(direct_sum::<f64>(&[]).dim(), (0, 0));
}

#[test]
fn test_rs_repr_blocks() {
    let rs = RepresentationDescriptor::new(vec![(2, 1), (1, 0), (1, 3)]).unwrap();
    let (a, b, c) = (0.7, 1.3, -2.2);
    let d = rs_repr(&rs, a, b, c);
    assert_eq!(d.dim(), (14, 14));
    let d1 = irr_repr(1, a, b, c);
    let d3 = irr_repr(3, a, b, c);
    assert_eq!(d.slice(s![0..3, 0..3]), d1);
    assert_eq!(d.slice(s![3..6, 3..6]), d1);
    approx::assert_relative_eq!(d[(6, 6)], 1.0, epsilon = 1e-14);
    assert_eq!(d.slice(s![7..14, 7..14]), d3);
    assert!(d.slice(s![0..3, 3..14]).iter().all(|x| *x == 0.0));

    assert_eq!(
        rs_repr(&RepresentationDescriptor::default(), a, b, c).dim(),
        (0, 0)
    );
}

#[test]
fn test_rs_repr_homomorphism() {
    let rs = RepresentationDescriptor::new(vec![(1, 2), (2, 0), (1, 4)]).unwrap();
    let (a1, b1, c1) = (1.1, 0.3, 4.0);
    let (a2, b2, c2) = (5.2, 2.9, 0.6);
    let (a, b, c) = compose((a1, b1, c1), (a2, b2, c2)).unwrap();
    let lhs = rs_repr(&rs, a, b, c);
    let rhs = rs_repr(&rs, a1, b1, c1).dot(&rs_repr(&rs, a2, b2, c2));
    approx::assert_relative_eq!(frobenius_distance(&lhs, &rhs), 0.0, epsilon = 1e-12);
}

#[test]
fn test_rs_repr_from_matrix() {
    let rs = RepresentationDescriptor::new(vec![(1, 1), (1, 2)]).unwrap();
    let rmat = rotation_matrix(0.4, 2.0, 1.0);
    let d = rs_repr_from_matrix(&rs, &rmat).unwrap();
    approx::assert_relative_eq!(
        frobenius_distance(&d, &rs_repr(&rs, 0.4, 2.0, 1.0)),
        0.0,
        epsilon = 1e-14
    );
    assert!(rs_repr_from_matrix(&rs, &Array2::<f64>::eye(4)).is_err());
}
