use rulinalg::matrix::{BaseMatrix, Matrix};
use rulinalg::vector::Vector;

use crate::error::Error;
use crate::tolerance::{magnitude, negligible};
#[cfg(test)]
use crate::test_util::assert_vector_close;

// LU decomposition with partial pivoting, PB = LU.
//
// Solving against the transpose reuses the same factors: B^T = U^T L^T P, so
// B^T x = v is a forward solve with U^T, a backward solve with L^T and
// finally undoing the row permutation.
#[derive(Debug, Clone)]
pub struct BasisFactorization {
    // L below the diagonal (unit diagonal implied), U on and above it.
    lu: Matrix<f64>,
    // Row i of PB is row perm[i] of B.
    perm: Vec<usize>,
}

impl BasisFactorization {
    pub fn decompose(basis: &Matrix<f64>) -> Result<BasisFactorization, Error> {
        if basis.rows() != basis.cols() {
            return Err(Error::MalformedProblem(format!(
                "basis matrix is {}x{}, expected a square matrix",
                basis.rows(), basis.cols())));
        }
        let n = basis.rows();
        // A pivot is compared with the size of its column in B, not with a
        // fixed threshold, so uniformly tiny columns still factor.
        let scale: Vec<f64> = (0..n)
            .map(|k| magnitude((0..n).map(|i| &basis[[i, k]])))
            .collect();
        let mut lu = basis.clone();
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot_abs = lu[[k, k]].abs();
            for i in k + 1..n {
                if lu[[i, k]].abs() > pivot_abs {
                    pivot_row = i;
                    pivot_abs = lu[[i, k]].abs();
                }
            }
            if negligible(pivot_abs, scale[k]) {
                return Err(Error::SingularBasis { column: k });
            }

            if pivot_row != k {
                for j in 0..n {
                    let tmp = lu[[k, j]];
                    lu[[k, j]] = lu[[pivot_row, j]];
                    lu[[pivot_row, j]] = tmp;
                }
                perm.swap(k, pivot_row);
            }

            let pivot = lu[[k, k]];
            for i in k + 1..n {
                let factor = lu[[i, k]] / pivot;
                lu[[i, k]] = factor;
                for j in k + 1..n {
                    let delta = factor * lu[[k, j]];
                    lu[[i, j]] -= delta;
                }
            }
        }

        Ok(BasisFactorization { lu, perm })
    }

    pub fn size(&self) -> usize {
        self.perm.len()
    }

    /// Solves `B x = v`.
    pub fn solve(&self, v: &Vector<f64>) -> Vector<f64> {
        let n = self.size();
        debug_assert_eq!(v.size(), n);

        // L y = P v
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = v[self.perm[i]];
            for j in 0..i {
                sum -= self.lu[[i, j]] * y[j];
            }
            y[i] = sum;
        }

        // U x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in i + 1..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }

        Vector::new(x)
    }

    /// Solves `B^T x = v`, which is how the simplex multipliers
    /// `c_B B^-1` are obtained.
    pub fn transpose_solve(&self, v: &Vector<f64>) -> Vector<f64> {
        let n = self.size();
        debug_assert_eq!(v.size(), n);

        // U^T z = v, U^T is lower triangular
        let mut z = vec![0.0; n];
        for i in 0..n {
            let mut sum = v[i];
            for j in 0..i {
                sum -= self.lu[[j, i]] * z[j];
            }
            z[i] = sum / self.lu[[i, i]];
        }

        // L^T w = z, L^T is unit upper triangular
        let mut w = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = z[i];
            for j in i + 1..n {
                sum -= self.lu[[j, i]] * w[j];
            }
            w[i] = sum;
        }

        // P x = w
        let mut x = vec![0.0; n];
        for i in 0..n {
            x[self.perm[i]] = w[i];
        }

        Vector::new(x)
    }
}

#[cfg(test)]
fn sample_basis() -> Matrix<f64> {
    // Needs row exchanges: the leading entry is zero.
    Matrix::new(3, 3, vec![
        0.0, 2.0, 1.0,
        4.0, 1.0, -1.0,
        2.0, 3.0, 5.0,
    ])
}

#[test]
fn solve_matches_product() {
    let basis = sample_basis();
    let factorization = BasisFactorization::decompose(&basis)
        .expect("Sample basis is non-singular");
    let v = Vector::new(vec![3.0, -2.0, 7.0]);
    let x = factorization.solve(&v);
    assert_vector_close(&(&basis * &x), &v, 1e-10);
}

#[test]
fn transpose_solve_matches_transposed_product() {
    let basis = sample_basis();
    let factorization = BasisFactorization::decompose(&basis)
        .expect("Sample basis is non-singular");
    let v = Vector::new(vec![1.0, 0.5, -4.0]);
    let x = factorization.transpose_solve(&v);
    assert_vector_close(&(basis.transpose() * &x), &v, 1e-10);
}

#[test]
fn identity_is_trivial() {
    let factorization = BasisFactorization::decompose(&Matrix::identity(4))
        .expect("Identity is non-singular");
    let v = Vector::new(vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(factorization.solve(&v).data(), v.data());
    assert_eq!(factorization.transpose_solve(&v).data(), v.data());
}

#[test]
fn singular_basis_is_rejected() {
    let basis = Matrix::new(2, 2, vec![
        1.0, 2.0,
        2.0, 4.0,
    ]);
    match BasisFactorization::decompose(&basis) {
        Err(Error::SingularBasis { column }) => assert_eq!(column, 1),
        other => panic!("Expected singular basis, got {:?}", other),
    }
}

#[test]
fn non_square_is_rejected() {
    let basis = Matrix::new(1, 2, vec![1.0, 0.0]);
    assert!(BasisFactorization::decompose(&basis).is_err());
}

#[test]
fn tiny_columns_are_not_singular() {
    let basis = Matrix::new(2, 2, vec![
        1e-9, 0.0,
        2e-9, 3.0,
    ]);
    let factorization = BasisFactorization::decompose(&basis)
        .expect("Basis is non-singular at its own scale");
    let v = Vector::new(vec![1e-9, 3.0 + 2e-9]);
    let x = factorization.solve(&v);
    assert_vector_close(&x, &Vector::new(vec![1.0, 1.0]), 1e-9);
}
