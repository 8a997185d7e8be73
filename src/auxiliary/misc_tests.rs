use ndarray::{array, Array2};

use crate::auxiliary::misc::kron;

#[test]
fn test_misc_kron() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![[0.0, 1.0, 2.0]];
    let ab = kron(&a, &b);
    let ab_ref = array![
        [0.0, 1.0, 2.0, 0.0, 2.0, 4.0],
        [0.0, 3.0, 6.0, 0.0, 4.0, 8.0],
    ];
    assert_eq!(ab, ab_ref);

    let id = Array2::<f64>::eye(3);
    assert_eq!(kron(&id, &array![[5.0]]), id.mapv(|x| 5.0 * x));
    assert_eq!(kron(&Array2::<f64>::eye(2), &id), Array2::<f64>::eye(6));
}
