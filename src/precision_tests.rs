use crate::precision::{Precision, So3Float};

#[test]
fn test_precision_of_types() {
    assert_eq!(Precision::of::<f32>(), Precision::Single);
    assert_eq!(Precision::of::<f64>(), Precision::Double);
    assert_eq!(Precision::default(), Precision::Double);
    assert_eq!(Precision::Single.to_string(), "single");
    assert_eq!(Precision::Double.to_string(), "double");
}

#[test]
fn test_precision_conversions() {
    let x = f32::from_f64_lossy(std::f64::consts::PI);
    assert_eq!(x, std::f32::consts::PI);
    assert_eq!(f64::from_f64_lossy(0.1), 0.1);
    assert_eq!(1.5f32.into_f64(), 1.5);
    assert_eq!(f64::from_i64_lossy(-7), -7.0);
    assert!(Precision::Single.default_threshold() > Precision::Double.default_threshold());
}
