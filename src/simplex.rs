use log::{debug, trace, warn};
use rulinalg::matrix::{BaseMatrix, Matrix};
use rulinalg::vector::Vector;

use crate::config::SolverConfig;
use crate::error::Error;
use crate::factorization::BasisFactorization;
use crate::problem::{LinearProgram, Optimum, SimplexSolution};
use crate::tolerance::{almost_equal, almost_greater_than, almost_zero, magnitude, negligible};
#[cfg(test)]
use crate::test_util::{assert_close, assert_feasible, expect_optimum};

// One vertex of the simplex path. A pivot consumes the state and hands back
// a fresh one, so the basis, its factorization and y0 always change together.
#[derive(Debug, Clone)]
struct SimplexState {
    basis: Vec<usize>,
    basis_matrix: Matrix<f64>,
    factorization: BasisFactorization,
    // Values of the basic variables, y0[i] belongs to column basis[i].
    y0: Vector<f64>,
}

#[derive(Debug, Clone)]
enum PivotResult {
    Done(SimplexSolution),
    Pivoted(SimplexState),
}

impl SimplexState {
    fn from_basis(program: &LinearProgram, basis: Vec<usize>) -> Result<SimplexState, Error> {
        let basis_matrix = program.a().select_cols(basis.iter());
        SimplexState::factored(program, basis, basis_matrix)
    }

    fn factored(program: &LinearProgram, basis: Vec<usize>, basis_matrix: Matrix<f64>)
        -> Result<SimplexState, Error> {
        let factorization = BasisFactorization::decompose(&basis_matrix)?;
        let y0 = factorization.solve(program.b());
        Ok(SimplexState { basis, basis_matrix, factorization, y0 })
    }

    // Puts column `entering` of A in place of the column at position `row`.
    fn exchange(self, program: &LinearProgram, row: usize, entering: usize)
        -> Result<SimplexState, Error> {
        let mut basis = self.basis;
        let mut basis_matrix = self.basis_matrix;
        basis[row] = entering;
        for i in 0..basis_matrix.rows() {
            basis_matrix[[i, row]] = program.a()[[i, entering]];
        }
        SimplexState::factored(program, basis, basis_matrix)
    }

    fn is_basic(&self, cols: usize) -> Vec<bool> {
        let mut is_basic = vec![false; cols];
        for &j in self.basis.iter() {
            is_basic[j] = true;
        }
        is_basic
    }

    // Full length solution, zero on the non-basic columns.
    fn solution(&self, cols: usize) -> Vector<f64> {
        let mut x = vec![0.0; cols];
        for (i, &j) in self.basis.iter().enumerate() {
            x[j] = self.y0[i];
        }
        Vector::new(x)
    }

    fn optimum(&self, program: &LinearProgram) -> Optimum {
        let x = self.solution(program.cols());
        Optimum {
            objective: program.objective_value(&x),
            x,
            basis_matrix: self.basis_matrix.clone(),
            basis: self.basis.clone(),
        }
    }
}

/// Revised simplex over a standard form program, starting from the
/// program's initial basis.
#[derive(Debug, Clone)]
pub struct RevisedSimplex<'a> {
    program: &'a LinearProgram,
    // Columns that may never enter the basis.
    barred: Vec<bool>,
    max_iterations: usize,
}

impl<'a> RevisedSimplex<'a> {
    pub fn new(program: &'a LinearProgram, config: &SolverConfig) -> RevisedSimplex<'a> {
        RevisedSimplex {
            program,
            barred: vec![false; program.cols()],
            max_iterations: config.max_iterations,
        }
    }

    /// Excludes the flagged columns from pricing. They can still leave the
    /// basis, but never enter it, and their reduced costs do not count
    /// towards the optimality test.
    pub fn barring(mut self, barred: &[bool]) -> RevisedSimplex<'a> {
        for (flag, &b) in self.barred.iter_mut().zip(barred) {
            *flag = b;
        }
        self
    }

    pub fn solve(&self) -> Result<SimplexSolution, Error> {
        let mut state = SimplexState::from_basis(self.program, self.program.basis().to_vec())?;
        for iteration in 0..self.max_iterations {
            match self.pivot(state)? {
                PivotResult::Done(solution) => {
                    debug!("terminated after {} pivots: {}", iteration, solution.kind());
                    return Ok(solution);
                },
                PivotResult::Pivoted(next) => {
                    state = next;
                },
            }
        }
        warn!("giving up after {} pivots", self.max_iterations);
        Err(Error::NonTermination { iterations: self.max_iterations })
    }

    // r_j = c_j - (c_B B^-1) A_j for every column allowed to enter, in
    // increasing column order.
    fn reduced_costs(&self, state: &SimplexState) -> Vec<(usize, f64)> {
        let program = self.program;
        let a = program.a();
        let c_b = program.c().select(&state.basis);
        let lambda = state.factorization.transpose_solve(&c_b);
        let is_basic = state.is_basic(program.cols());

        let reduced: Vec<(usize, f64)> = (0..program.cols())
            .filter(|&j| !is_basic[j] && !self.barred[j])
            .map(|j| {
                let price: f64 = (0..a.rows()).map(|i| lambda[i] * a[[i, j]]).sum();
                (j, program.c()[j] - price)
            })
            .collect();
        trace!("reduced costs: {:?}", reduced);
        reduced
    }

    fn pivot(&self, state: SimplexState) -> Result<PivotResult, Error> {
        let program = self.program;

        // Most negative reduced cost; the first one found wins ties.
        let mut entering: Option<(usize, f64)> = None;
        for (j, r) in self.reduced_costs(&state) {
            match entering {
                Some((_, best)) if best <= r => {},
                _ => entering = Some((j, r)),
            }
        }

        let (q, r_q) = match entering {
            None => {
                return Ok(PivotResult::Done(
                    SimplexSolution::SingleOptimal(state.optimum(program))));
            },
            Some(e) => e,
        };
        if almost_greater_than(r_q, 0.0) {
            return Ok(PivotResult::Done(
                SimplexSolution::SingleOptimal(state.optimum(program))));
        }
        if almost_equal(r_q, 0.0) {
            return Ok(PivotResult::Done(
                SimplexSolution::InfiniteOptimalSet(state.optimum(program))));
        }

        let column = program.column(q);
        let scale = magnitude(column.iter());
        let y_in = state.factorization.solve(&column);

        // Positive relative to the entering column, which may be tiny.
        let mut leaving: Option<(usize, f64)> = None;
        for i in 0..state.basis.len() {
            if y_in[i] > 0.0 && !negligible(y_in[i], scale) {
                // Round-off can leave a degenerate basic value a hair below zero.
                let ratio = state.y0[i].max(0.0) / y_in[i];
                match leaving {
                    Some((_, best)) if best <= ratio => {},
                    _ => leaving = Some((i, ratio)),
                }
            }
        }

        let (row, ratio) = match leaving {
            None => return Ok(PivotResult::Done(SimplexSolution::Unbounded)),
            Some(l) => l,
        };
        debug!("column {} enters (reduced cost {}), column {} leaves row {} at ratio {}",
               q, r_q, state.basis[row], row, ratio);

        Ok(PivotResult::Pivoted(state.exchange(program, row, q)?))
    }
}

/// Pivots basic artificial columns out of the basis of a feasible phase 1
/// solution. Each one is replaced by the first non-artificial, non-basic
/// column with a non-zero entry in its row of `B^-1 A`. Since the artificial
/// is at zero the pivot is degenerate and the solution does not move. An
/// artificial whose row has no such entry sits on a redundant row and is left
/// in place.
///
/// Returns the new basis and the full solution vector.
pub fn drive_out_artificials(
    program: &LinearProgram,
    basis: &[usize],
    artificial: &[bool],
) -> Result<(Vec<usize>, Vector<f64>), Error> {
    let mut state = SimplexState::from_basis(program, basis.to_vec())?;
    let m = program.rows();

    for row in 0..m {
        if !artificial[state.basis[row]] {
            continue;
        }
        // Row `row` of B^-1 is the solution of B^T rho = e_row.
        let mut unit = vec![0.0; m];
        unit[row] = 1.0;
        let rho = state.factorization.transpose_solve(&Vector::new(unit));

        let is_basic = state.is_basic(program.cols());
        let replacement = (0..program.cols())
            .filter(|&j| !is_basic[j] && !artificial[j])
            .find(|&j| !almost_zero(rho.dot(&program.column(j))));

        match replacement {
            Some(j) => {
                debug!("artificial column {} leaves row {} for column {}",
                       state.basis[row], row, j);
                state = state.exchange(program, row, j)?;
            },
            None => {
                warn!("row {} is redundant, artificial column {} stays basic at zero",
                      row, state.basis[row]);
            },
        }
    }

    let x = state.solution(program.cols());
    Ok((state.basis, x))
}

#[cfg(test)]
fn textbook_program() -> LinearProgram {
    LinearProgram::new(
        Vector::new(vec![-2.0, -3.0, -4.0, 0.0, 0.0]),
        Matrix::new(2, 5, vec![
            3.0, 2.0, 1.0, 1.0, 0.0,
            2.0, 5.0, 3.0, 0.0, 1.0,
        ]),
        Vector::new(vec![10.0, 15.0]),
        Vector::new(vec![0.0, 0.0, 0.0, 10.0, 15.0]),
        vec![3, 4],
    ).expect("This program is well formed")
}

#[test]
fn test_simplex() {
    let program = textbook_program();
    let state = SimplexState::from_basis(&program, vec![3, 4])
        .expect("This basis is valid");
    assert_eq!(state.y0.data(), &vec![10.0, 15.0]);

    let simplex_result = RevisedSimplex::new(&program, &SolverConfig::default())
        .solve()
        .expect("Optimize should not fail");
    let expected_result = [0.0, 0.0, 5.0, 5.0, 0.0];

    match simplex_result {
        SimplexSolution::SingleOptimal(optimum) => {
            assert_close(optimum.objective, -20.0, 1e-9);
            for (i, v) in optimum.x.iter().enumerate() {
                assert_close(*v, expected_result[i], 1e-9);
            }
            let mut basis = optimum.basis.clone();
            basis.sort();
            assert_eq!(basis, vec![2, 3]);
            assert_eq!(optimum.basis_matrix.rows(), 2);
        },
        other => panic!("Expected single optimum, got {:?}", other),
    }
}

#[test]
fn single_variable_less_equal() {
    // min -x subject to x + s = 2
    let program = LinearProgram::new(
        Vector::new(vec![-1.0, 0.0]),
        Matrix::new(1, 2, vec![1.0, 1.0]),
        Vector::new(vec![2.0]),
        Vector::new(vec![0.0, 2.0]),
        vec![1],
    ).expect("This program is well formed");
    let solution = RevisedSimplex::new(&program, &SolverConfig::default())
        .solve()
        .expect("Optimize should not fail");
    assert!(matches!(solution, SimplexSolution::SingleOptimal(_)));
    let (objective, x) = expect_optimum(&solution);
    assert_close(objective, -2.0, 1e-9);
    assert_eq!(x.data(), &vec![2.0, 0.0]);
}

#[test]
fn unbounded_ray() {
    // min -x1 - x2 subject to x1 - 2 x2 + s = 5
    let program = LinearProgram::new(
        Vector::new(vec![-1.0, -1.0, 0.0]),
        Matrix::new(1, 3, vec![1.0, -2.0, 1.0]),
        Vector::new(vec![5.0]),
        Vector::new(vec![0.0, 0.0, 5.0]),
        vec![2],
    ).expect("This program is well formed");
    let solution = RevisedSimplex::new(&program, &SolverConfig::default())
        .solve()
        .expect("Optimize should not fail");
    assert_eq!(solution, SimplexSolution::Unbounded);
}

#[test]
fn parallel_objective_has_infinite_optimal_set() {
    // min -x1 - x2 subject to x1 + x2 <= 4 and 2 x1 + 2 x2 <= 8
    let program = LinearProgram::new(
        Vector::new(vec![-1.0, -1.0, 0.0, 0.0]),
        Matrix::new(2, 4, vec![
            1.0, 1.0, 1.0, 0.0,
            2.0, 2.0, 0.0, 1.0,
        ]),
        Vector::new(vec![4.0, 8.0]),
        Vector::new(vec![0.0, 0.0, 4.0, 8.0]),
        vec![2, 3],
    ).expect("This program is well formed");
    let solution = RevisedSimplex::new(&program, &SolverConfig::default())
        .solve()
        .expect("Optimize should not fail");
    match solution {
        SimplexSolution::InfiniteOptimalSet(optimum) => {
            assert_close(optimum.objective, -4.0, 1e-9);
            assert_feasible(&program, &optimum.x);
        },
        other => panic!("Expected infinite optimal set, got {:?}", other),
    }
}

#[test]
fn iteration_cap_is_reported() {
    let program = textbook_program();
    let config = SolverConfig::default().with_max_iterations(1);
    match RevisedSimplex::new(&program, &config).solve() {
        Err(Error::NonTermination { iterations }) => assert_eq!(iterations, 1),
        other => panic!("Expected non-termination, got {:?}", other),
    }
}

#[test]
fn barred_columns_never_enter() {
    let program = textbook_program();
    let barred = [false, false, true, false, false];
    let solution = RevisedSimplex::new(&program, &SolverConfig::default())
        .barring(&barred)
        .solve()
        .expect("Optimize should not fail");
    let (_, x) = expect_optimum(&solution);
    assert_eq!(x[2], 0.0);
}

#[test]
fn path_stays_feasible_and_monotone() {
    let program = textbook_program();
    let engine = RevisedSimplex::new(&program, &SolverConfig::default());
    let mut state = SimplexState::from_basis(&program, vec![3, 4])
        .expect("This basis is valid");
    let mut objective = program.objective_value(&state.solution(program.cols()));
    loop {
        let x = state.solution(program.cols());
        assert_feasible(&program, &x);
        match engine.pivot(state.clone()).expect("Pivot should not fail") {
            PivotResult::Done(_) => {
                // Optimality certificate
                for (j, r) in engine.reduced_costs(&state) {
                    assert!(r >= -1e-8, "column {} has reduced cost {}", j, r);
                }
                break;
            },
            PivotResult::Pivoted(next) => {
                let next_objective = program.objective_value(&next.solution(program.cols()));
                assert!(next_objective <= objective + 1e-9);
                objective = next_objective;
                state = next;
            },
        }
    }
}

#[test]
fn artificial_on_redundant_row_stays() {
    // Rows 0 and 1 are identical; columns 2 and 3 are artificials.
    let program = LinearProgram::new(
        Vector::new(vec![1.0, 1.0, 0.0, 0.0]),
        Matrix::new(2, 4, vec![
            1.0, 1.0, 1.0, 0.0,
            1.0, 1.0, 0.0, 1.0,
        ]),
        Vector::new(vec![4.0, 4.0]),
        Vector::new(vec![4.0, 0.0, 0.0, 0.0]),
        vec![0, 3],
    ).expect("This program is well formed");
    let artificial = [false, false, true, true];
    let (basis, x) = drive_out_artificials(&program, &[0, 3], &artificial)
        .expect("Driving out should not fail");
    assert_eq!(basis, vec![0, 3]);
    assert_feasible(&program, &x);
}

#[test]
fn degenerate_artificial_is_replaced() {
    // x1 + a1 = 2, x1 + x2 + a2 = 2 with x1 basic in row 0 and a2 basic
    // at zero in row 1.
    let program = LinearProgram::new(
        Vector::new(vec![0.0, 0.0, 1.0, 1.0]),
        Matrix::new(2, 4, vec![
            1.0, 0.0, 1.0, 0.0,
            1.0, 1.0, 0.0, 1.0,
        ]),
        Vector::new(vec![2.0, 2.0]),
        Vector::new(vec![2.0, 0.0, 0.0, 0.0]),
        vec![0, 3],
    ).expect("This program is well formed");
    let artificial = [false, false, true, true];
    let (basis, x) = drive_out_artificials(&program, &[0, 3], &artificial)
        .expect("Driving out should not fail");
    assert_eq!(basis, vec![0, 1]);
    assert_feasible(&program, &x);
    assert_close(x[0], 2.0, 1e-9);
    assert_close(x[1], 0.0, 1e-9);
}

#[test]
fn tiny_coefficients_still_bound_the_ray() {
    // min -x subject to 1e-9 x + s = 1e-9, optimum at x = 1
    let program = LinearProgram::new(
        Vector::new(vec![-1.0, 0.0]),
        Matrix::new(1, 2, vec![1e-9, 1.0]),
        Vector::new(vec![1e-9]),
        Vector::new(vec![0.0, 1e-9]),
        vec![1],
    ).expect("This program is well formed");
    let solution = RevisedSimplex::new(&program, &SolverConfig::default())
        .solve()
        .expect("Optimize should not fail");
    match solution {
        SimplexSolution::SingleOptimal(optimum) => {
            assert_close(optimum.objective, -1.0, 1e-9);
            assert_close(optimum.x[0], 1.0, 1e-9);
        },
        other => panic!("Expected single optimum, got {:?}", other),
    }
}
