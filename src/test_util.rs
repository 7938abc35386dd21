#![cfg(test)]

use rulinalg::vector::Vector;

use crate::problem::{LinearProgram, SimplexSolution};

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!((actual - expected).abs() < tolerance,
            "expected {}, got {}", expected, actual);
}

pub fn assert_vector_close(actual: &Vector<f64>, expected: &Vector<f64>, tolerance: f64) {
    assert_eq!(actual.size(), expected.size());
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() < tolerance,
                "entry {}: expected {}, got {}", i, e, a);
    }
}

// Ax = b and x >= 0, within tolerance.
pub fn assert_feasible(program: &LinearProgram, x: &Vector<f64>) {
    let residual = program.a() * x - program.b();
    for (i, r) in residual.iter().enumerate() {
        assert!(r.abs() < 1e-6, "row {} violated by {}", i, r);
    }
    for (j, &v) in x.iter().enumerate() {
        assert!(v > -1e-6, "column {} is negative: {}", j, v);
    }
}

pub fn expect_optimum(solution: &SimplexSolution) -> (f64, &Vector<f64>) {
    match solution.optimum() {
        Some(optimum) => (optimum.objective, &optimum.x),
        None => panic!("Expected optimum, got {:?}", solution.kind()),
    }
}
