use std::fmt;

use rulinalg::matrix::{BaseMatrix, Matrix};
use rulinalg::vector::Vector;

use crate::error::Error;

// Starting points handed in from outside (or carried over from phase 1)
// have accumulated rounding error, so they are checked against a looser
// bound than the pivoting decisions use.
const START_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct LinearProgram {
    // Standard form linear program:
    // Minimize c^Tx
    // subject to Ax = b
    // and x >= 0
    // together with a basic feasible starting point x0 whose basic columns
    // are listed in basis, basis[i] being the column that occupies row i.
    c: Vector<f64>,
    a: Matrix<f64>,
    b: Vector<f64>,
    x0: Vector<f64>,
    basis: Vec<usize>,
}

impl LinearProgram {
    pub fn new(
        c: Vector<f64>,
        a: Matrix<f64>,
        b: Vector<f64>,
        x0: Vector<f64>,
        basis: Vec<usize>,
    ) -> Result<LinearProgram, Error> {
        if a.rows() == 0 || a.cols() == 0 {
            return Err(Error::MalformedProblem(
                "constraint matrix must have at least one row and one column".to_string()));
        }
        if c.size() != a.cols() {
            return Err(Error::MalformedProblem(format!(
                "objective has {} coefficients but the matrix has {} columns",
                c.size(), a.cols())));
        }
        if b.size() != a.rows() {
            return Err(Error::MalformedProblem(format!(
                "right-hand side has {} entries but the matrix has {} rows",
                b.size(), a.rows())));
        }
        if x0.size() != a.cols() {
            return Err(Error::MalformedProblem(format!(
                "initial solution has {} entries but the matrix has {} columns",
                x0.size(), a.cols())));
        }
        if basis.len() != a.rows() {
            return Err(Error::MalformedProblem(format!(
                "basis has {} columns but the matrix has {} rows",
                basis.len(), a.rows())));
        }

        let mut is_basic = vec![false; a.cols()];
        for &column in basis.iter() {
            if column >= a.cols() {
                return Err(Error::MalformedProblem(format!(
                    "basis column {} is out of range", column)));
            }
            if is_basic[column] {
                return Err(Error::MalformedProblem(format!(
                    "basis column {} appears twice", column)));
            }
            is_basic[column] = true;
        }

        for (j, &v) in x0.iter().enumerate() {
            if v < -START_TOLERANCE {
                return Err(Error::MalformedProblem(format!(
                    "initial solution is negative in column {}", j)));
            }
            if !is_basic[j] && v.abs() > START_TOLERANCE {
                return Err(Error::MalformedProblem(format!(
                    "initial solution is non-zero in non-basic column {}", j)));
            }
        }

        let residual = &a * &x0 - &b;
        for (i, r) in residual.iter().enumerate() {
            if r.abs() > START_TOLERANCE * (1.0 + b[i].abs()) {
                return Err(Error::MalformedProblem(format!(
                    "initial solution violates row {} by {}", i, r)));
            }
        }

        Ok(LinearProgram { c, a, b, x0, basis })
    }

    /// Builds a program whose initial basis is given as a membership flag
    /// per column. Basic columns are assigned to rows in increasing column
    /// order.
    pub fn from_membership(
        c: Vector<f64>,
        a: Matrix<f64>,
        b: Vector<f64>,
        x0: Vector<f64>,
        membership: &[bool],
    ) -> Result<LinearProgram, Error> {
        if membership.len() != a.cols() {
            return Err(Error::MalformedProblem(format!(
                "basis membership has {} flags but the matrix has {} columns",
                membership.len(), a.cols())));
        }
        let basis = membership
            .iter()
            .enumerate()
            .filter(|&(_, &basic)| basic)
            .map(|(j, _)| j)
            .collect();
        LinearProgram::new(c, a, b, x0, basis)
    }

    /// Same constraints and starting point, different objective.
    pub fn with_objective(&self, c: Vector<f64>) -> Result<LinearProgram, Error> {
        LinearProgram::new(c, self.a.clone(), self.b.clone(), self.x0.clone(), self.basis.clone())
    }

    /// Same constraints, different objective and starting point.
    pub fn with_start(
        &self,
        c: Vector<f64>,
        x0: Vector<f64>,
        basis: Vec<usize>,
    ) -> Result<LinearProgram, Error> {
        LinearProgram::new(c, self.a.clone(), self.b.clone(), x0, basis)
    }

    pub fn c(&self) -> &Vector<f64> {
        &self.c
    }

    pub fn a(&self) -> &Matrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &Vector<f64> {
        &self.b
    }

    pub fn x0(&self) -> &Vector<f64> {
        &self.x0
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn rows(&self) -> usize {
        self.a.rows()
    }

    pub fn cols(&self) -> usize {
        self.a.cols()
    }

    pub fn column(&self, j: usize) -> Vector<f64> {
        Vector::new((0..self.a.rows()).map(|i| self.a[[i, j]]).collect::<Vec<_>>())
    }

    pub fn objective_value(&self, x: &Vector<f64>) -> f64 {
        self.c.dot(x)
    }
}

pub fn matrix_from_rows(rows: &[Vec<f64>], cols: usize) -> Result<Matrix<f64>, Error> {
    let mut data = Vec::with_capacity(rows.len() * cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(Error::MalformedProblem(format!(
                "row {} has {} entries, expected {}", i, row.len(), cols)));
        }
        data.extend_from_slice(row);
    }
    Ok(Matrix::new(rows.len(), cols, data))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionKind {
    SingleOptimal,
    InfiniteOptimalSet,
    Unbounded,
    Infeasible,
}

impl fmt::Display for SolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SolutionKind::SingleOptimal => "SingleOptimal",
            SolutionKind::InfiniteOptimalSet => "InfiniteOptimalSet",
            SolutionKind::Unbounded => "Unbounded",
            SolutionKind::Infeasible => "Infeasible",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    pub objective: f64,
    pub x: Vector<f64>,
    // Final basis, in the indexing of the standard form program that was
    // solved. basis_matrix column i is column basis[i] of A.
    pub basis_matrix: Matrix<f64>,
    pub basis: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimplexSolution {
    SingleOptimal(Optimum),
    // Optimal, but some non-basic reduced cost is zero so other optimal
    // vertices exist.
    InfiniteOptimalSet(Optimum),
    Unbounded,
    Infeasible,
}

impl SimplexSolution {
    pub fn kind(&self) -> SolutionKind {
        match self {
            SimplexSolution::SingleOptimal(_) => SolutionKind::SingleOptimal,
            SimplexSolution::InfiniteOptimalSet(_) => SolutionKind::InfiniteOptimalSet,
            SimplexSolution::Unbounded => SolutionKind::Unbounded,
            SimplexSolution::Infeasible => SolutionKind::Infeasible,
        }
    }

    pub fn optimum(&self) -> Option<&Optimum> {
        match self {
            SimplexSolution::SingleOptimal(optimum) => Some(optimum),
            SimplexSolution::InfiniteOptimalSet(optimum) => Some(optimum),
            SimplexSolution::Unbounded | SimplexSolution::Infeasible => None,
        }
    }

    pub fn objective(&self) -> Option<f64> {
        self.optimum().map(|optimum| optimum.objective)
    }

    pub fn solution(&self) -> Option<&Vector<f64>> {
        self.optimum().map(|optimum| &optimum.x)
    }

    pub fn map_optimum<F>(self, f: F) -> SimplexSolution
        where F: FnOnce(Optimum) -> Optimum
    {
        match self {
            SimplexSolution::SingleOptimal(optimum) => SimplexSolution::SingleOptimal(f(optimum)),
            SimplexSolution::InfiniteOptimalSet(optimum) => {
                SimplexSolution::InfiniteOptimalSet(f(optimum))
            },
            other => other,
        }
    }
}

#[test]
fn membership_basis_is_ordered_by_column() {
    let program = LinearProgram::from_membership(
        Vector::new(vec![-2.0, -3.0, -4.0, 0.0, 0.0]),
        Matrix::new(2, 5, vec![
            3.0, 2.0, 1.0, 1.0, 0.0,
            2.0, 5.0, 3.0, 0.0, 1.0,
        ]),
        Vector::new(vec![10.0, 15.0]),
        Vector::new(vec![0.0, 0.0, 0.0, 10.0, 15.0]),
        &[false, false, false, true, true],
    ).expect("This program is well formed");
    assert_eq!(program.basis(), &[3, 4]);
    assert_eq!(program.column(1).data(), &vec![2.0, 5.0]);
}

#[test]
fn rejects_dimension_mismatch() {
    let result = LinearProgram::new(
        Vector::new(vec![1.0, 1.0]),
        Matrix::new(1, 3, vec![1.0, 1.0, 1.0]),
        Vector::new(vec![1.0]),
        Vector::new(vec![0.0, 0.0, 1.0]),
        vec![2],
    );
    match result {
        Err(Error::MalformedProblem(_)) => {},
        other => panic!("Expected malformed problem, got {:?}", other),
    }
}

#[test]
fn rejects_infeasible_start() {
    let result = LinearProgram::new(
        Vector::new(vec![1.0, 0.0]),
        Matrix::new(1, 2, vec![1.0, 1.0]),
        Vector::new(vec![4.0]),
        Vector::new(vec![0.0, 3.0]),
        vec![1],
    );
    assert!(result.is_err());

    let repeated = LinearProgram::new(
        Vector::new(vec![1.0, 0.0]),
        Matrix::new(2, 2, vec![1.0, 0.0, 0.0, 1.0]),
        Vector::new(vec![0.0, 0.0]),
        Vector::new(vec![0.0, 0.0]),
        vec![1, 1],
    );
    assert!(repeated.is_err());
}
