// Every sign or magnitude decision the solver makes goes through these
// comparisons instead of raw `<`, `>` or `==` on floats.

pub const EPSILON: f64 = 1e-8;

pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn almost_greater_than(a: f64, b: f64) -> bool {
    a > b && !almost_equal(a, b)
}

pub fn almost_zero(a: f64) -> bool {
    almost_equal(a, 0.0)
}

/// `a` is lost in the noise of numbers of magnitude `scale`. Used where the
/// data itself may be far smaller than `EPSILON`.
pub fn negligible(a: f64, scale: f64) -> bool {
    a.abs() <= EPSILON * scale
}

// Largest magnitude in `values`, zero when empty.
pub fn magnitude<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> f64 {
    values.into_iter().fold(0.0, |m, v| m.max(v.abs()))
}

#[test]
fn equal_within_epsilon() {
    assert!(almost_equal(1.0, 1.0 + 1e-9));
    assert!(almost_equal(-3.0, -3.0 - 5e-9));
    assert!(!almost_equal(1.0, 1.0 + 1e-7));
    assert!(almost_zero(-1e-10));
}

#[test]
fn greater_than_ignores_noise() {
    assert!(almost_greater_than(1.0, 0.0));
    assert!(!almost_greater_than(1e-9, 0.0));
    assert!(!almost_greater_than(0.0, 1.0));
    assert!(!almost_greater_than(2.0, 2.0));
}

#[test]
fn negligible_follows_scale() {
    assert!(negligible(1e-9, 1.0));
    assert!(!negligible(1e-9, 1e-9));
    assert!(negligible(1e-6, 1e3));
    assert!(negligible(0.0, 0.0));
    assert_eq!(magnitude(&[1.0, -4.0, 2.5]), 4.0);
    assert_eq!(magnitude(&[] as &[f64]), 0.0);
}
