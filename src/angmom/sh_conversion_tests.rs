use std::f64::consts::PI;

use approx;
use ndarray::{array, Array1, Array2};
use num::Complex;

use crate::angmom::sh_conversion::{irr_repr_complex, sh_c2r_mat, sh_r2c_mat};
use crate::angmom::spherical_harmonics::spherical_harmonics;
use crate::rotation::compose;

type C128 = Complex<f64>;

fn complex_distance(a: &Array2<C128>, b: &Array2<C128>) -> f64 {
    (a - b).map(|x| x.norm_sqr()).sum().sqrt()
}

#[test]
fn test_sh_conversion_degree_one() {
    let (x, y, z) = (0.48, -0.6, 0.64);
    let n1 = (3.0 / (8.0 * PI)).sqrt();
    // Complex harmonics with the Condon--Shortley phase.
    let ycomplex = array![
        C128::new(x, -y) * n1,
        C128::from((3.0 / (4.0 * PI)).sqrt() * z),
        -C128::new(x, y) * n1,
    ];
    let yreal = sh_c2r_mat(1).dot(&ycomplex);
    let yreal_ref = spherical_harmonics(1, y.atan2(x), z.acos());
    for (c, r) in yreal.iter().zip(yreal_ref.iter()) {
        approx::assert_relative_eq!(c.re, *r, epsilon = 1e-14);
        approx::assert_relative_eq!(c.im, 0.0, epsilon = 1e-14);
    }
}

#[test]
fn test_sh_conversion_unitarity() {
    for l in 0..9u32 {
        let dim = 2 * l as usize + 1;
        let c2r = sh_c2r_mat(l);
        let r2c = sh_r2c_mat(l);
        let eye = Array2::<C128>::eye(dim);
        approx::assert_relative_eq!(
            complex_distance(&c2r.dot(&r2c), &eye),
            0.0,
            epsilon = 1e-14
        );
        approx::assert_relative_eq!(
            complex_distance(&r2c.dot(&*c2r), &eye),
            0.0,
            epsilon = 1e-14
        );
    }
}

#[test]
fn test_sh_conversion_z_rotation_is_diagonal() {
    let alpha: f64 = 1.234;
    for l in 0..6u32 {
        let li = i64::from(l);
        let d = irr_repr_complex(l, alpha, 0.0, 0.0);
        let diag = Array1::from_iter((-li..=li).map(|m| C128::from_polar(1.0, m as f64 * alpha)));
        approx::assert_relative_eq!(
            complex_distance(&d, &Array2::from_diag(&diag)),
            0.0,
            epsilon = 1e-13
        );
    }
}

#[test]
fn test_sh_conversion_y_rotation_is_real() {
    let beta: f64 = 0.9;
    for l in 0..6u32 {
        let d = irr_repr_complex(l, 0.0, beta, 0.0);
        assert!(d.iter().all(|x| x.im.abs() < 1e-13));
    }

    // The central element is the Legendre polynomial of cos(beta).
    let d2 = irr_repr_complex(2, 0.0, beta, 0.0);
    let cb = beta.cos();
    approx::assert_relative_eq!(d2[(2, 2)].re, 0.5 * (3.0 * cb * cb - 1.0), epsilon = 1e-13);
    let d3 = irr_repr_complex(3, 0.0, beta, 0.0);
    approx::assert_relative_eq!(
        d3[(3, 3)].re,
        0.5 * (5.0 * cb * cb * cb - 3.0 * cb),
        epsilon = 1e-13
    );
}

#[test]
fn test_sh_conversion_complex_homomorphism() {
    let (a1, b1, c1) = (0.3, 2.2, -0.8);
    let (a2, b2, c2) = (1.9, 0.4, 2.7);
    let (a, b, c) = compose((a1, b1, c1), (a2, b2, c2)).unwrap();
    for l in 0..6u32 {
        let lhs = irr_repr_complex(l, a, b, c);
        let rhs = irr_repr_complex(l, a1, b1, c1).dot(&irr_repr_complex(l, a2, b2, c2));
        approx::assert_relative_eq!(complex_distance(&lhs, &rhs), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_sh_conversion_single_precision() {
    let d64 = irr_repr_complex(3, 0.4f64, 1.0, 2.0);
    let d32 = irr_repr_complex(3, 0.4f32, 1.0, 2.0);
    for (a, b) in d64.iter().zip(d32.iter()) {
        assert!((a.re - f64::from(b.re)).abs() < 1e-5);
        assert!((a.im - f64::from(b.im)).abs() < 1e-5);
    }
}
