use log::info;

use crate::config::SolverConfig;
use crate::error::Error;
use crate::problem::{LinearProgram, SimplexSolution};
use crate::simplex::{drive_out_artificials, RevisedSimplex};
use crate::standard_form::{transform, GeneralProblem, PreprocessingContext};
use crate::tolerance::almost_equal;
#[cfg(test)]
use crate::standard_form::{ConstraintSign, VariableType};
#[cfg(test)]
use crate::test_util::{assert_close, expect_optimum};

/// Solves a general form problem. The returned solution vector holds the
/// caller's original variables; the basis fields stay in standard form
/// indexing.
pub fn solve(problem: &GeneralProblem, config: &SolverConfig) -> Result<SimplexSolution, Error> {
    let standard_form = transform(problem)?;
    let solution = solve_standard_form(&standard_form.program, &standard_form.context, config)?;
    info!("solved {} variables, {} constraints: {}",
          problem.num_variables(), problem.num_constraints(), solution.kind());
    Ok(standard_form.context.restore(solution))
}

pub fn solve_standard_form(
    program: &LinearProgram,
    context: &PreprocessingContext,
    config: &SolverConfig,
) -> Result<SimplexSolution, Error> {
    if !context.two_phase() {
        info!("initial basis is feasible, skipping phase 1");
        return RevisedSimplex::new(program, config).solve();
    }

    info!("phase 1 with {} artificial columns", context.artificial_count());
    let phase_one = program.with_objective(context.phase_one_objective().clone())?;
    let phase_one_optimum = match RevisedSimplex::new(&phase_one, config).solve()? {
        SimplexSolution::SingleOptimal(optimum) | SimplexSolution::InfiniteOptimalSet(optimum) => {
            optimum
        },
        SimplexSolution::Unbounded | SimplexSolution::Infeasible => {
            info!("phase 1 did not reach an optimum, problem is infeasible");
            return Ok(SimplexSolution::Infeasible);
        },
    };
    if !almost_equal(phase_one_optimum.objective, 0.0) {
        info!("phase 1 optimum is {}, problem is infeasible", phase_one_optimum.objective);
        return Ok(SimplexSolution::Infeasible);
    }

    let (basis, x) = drive_out_artificials(program, &phase_one_optimum.basis, context.artificial())?;
    info!("phase 2");
    let phase_two = program.with_start(program.c().clone(), x, basis)?;
    RevisedSimplex::new(&phase_two, config)
        .barring(context.artificial())
        .solve()
}

#[cfg(test)]
fn general(
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    signs: Vec<ConstraintSign>,
) -> GeneralProblem {
    let n = objective.len();
    GeneralProblem::new(objective, constraints, rhs, signs, vec![VariableType::NonNegative; n])
        .expect("Problem is well formed")
}

#[test]
fn test_solve() {
    // max 2x + 3y + 4z st 3x + 2y + z <= 10, 2x + 5y + 3z <= 15
    let problem = general(
        vec![-2.0, -3.0, -4.0],
        vec![vec![3.0, 2.0, 1.0], vec![2.0, 5.0, 3.0]],
        vec![10.0, 15.0],
        vec![ConstraintSign::LessEqual, ConstraintSign::LessEqual],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    let (objective, x) = expect_optimum(&result);
    assert_close(objective, -20.0, 1e-9);
    assert_eq!(x.size(), 3);
    let expected_result = [0.0, 0.0, 5.0];
    for (i, v) in x.iter().enumerate() {
        assert_close(*v, expected_result[i], 1e-9);
    }
}

#[test]
fn equality_takes_two_phases() {
    // min x + y st x + y = 4
    let problem = general(
        vec![1.0, 1.0],
        vec![vec![1.0, 1.0]],
        vec![4.0],
        vec![ConstraintSign::Equal],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    match result {
        SimplexSolution::InfiniteOptimalSet(ref optimum) => {
            assert_close(optimum.objective, 4.0, 1e-9);
            assert_close(optimum.x[0] + optimum.x[1], 4.0, 1e-9);
        },
        other => panic!("Expected infinite optimal set, got {:?}", other),
    }
}

#[test]
fn maximize_without_upper_bound_is_unbounded() {
    // max x st x >= 0, encoded as min -x
    let problem = general(
        vec![-1.0],
        vec![vec![1.0]],
        vec![0.0],
        vec![ConstraintSign::GreaterEqual],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    assert_eq!(result, SimplexSolution::Unbounded);
}

#[test]
fn test_solve_infeasible() {
    // x + y = 5, -y + z = 10, x + z = 12 has no non-negative solution
    let problem = general(
        vec![-1.0, -1.0, -1.0],
        vec![vec![1.0, 1.0, 0.0], vec![0.0, -1.0, 1.0], vec![1.0, 0.0, 1.0]],
        vec![5.0, 10.0, 12.0],
        vec![ConstraintSign::Equal, ConstraintSign::Equal, ConstraintSign::Equal],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    assert_eq!(result, SimplexSolution::Infeasible);
}

#[test]
fn contradictory_bounds_are_infeasible() {
    let problem = general(
        vec![1.0],
        vec![vec![1.0], vec![1.0]],
        vec![2.0, 5.0],
        vec![ConstraintSign::LessEqual, ConstraintSign::GreaterEqual],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    assert_eq!(result, SimplexSolution::Infeasible);
}

#[test]
fn redundant_equality_keeps_artificial() {
    // min x + 2y st x + y = 3 twice
    let problem = general(
        vec![1.0, 2.0],
        vec![vec![1.0, 1.0], vec![1.0, 1.0]],
        vec![3.0, 3.0],
        vec![ConstraintSign::Equal, ConstraintSign::Equal],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    let (objective, x) = expect_optimum(&result);
    assert_close(objective, 3.0, 1e-9);
    assert_close(x[0], 3.0, 1e-9);
    assert_close(x[1], 0.0, 1e-9);
}

#[test]
fn free_variable_goes_negative() {
    // min x st x >= -3 with x free
    let problem = GeneralProblem::new(
        vec![1.0],
        vec![vec![1.0]],
        vec![-3.0],
        vec![ConstraintSign::GreaterEqual],
        vec![VariableType::Free],
    ).expect("Problem is well formed");
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    let (objective, x) = expect_optimum(&result);
    assert_close(objective, -3.0, 1e-9);
    assert_eq!(x.size(), 1);
    assert_close(x[0], -3.0, 1e-9);
}

#[test]
fn greater_equal_rows_reach_optimum() {
    // min 2x + 3y st x + y >= 4, x + 3y >= 6
    let problem = general(
        vec![2.0, 3.0],
        vec![vec![1.0, 1.0], vec![1.0, 3.0]],
        vec![4.0, 6.0],
        vec![ConstraintSign::GreaterEqual, ConstraintSign::GreaterEqual],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    assert!(matches!(result, SimplexSolution::SingleOptimal(_)));
    let (objective, x) = expect_optimum(&result);
    assert_close(objective, 9.0, 1e-9);
    assert_close(x[0], 3.0, 1e-9);
    assert_close(x[1], 1.0, 1e-9);
}

#[test]
fn tiny_coefficients_are_not_unbounded() {
    // min -x st 1e-9 x <= 1e-9
    let problem = general(
        vec![-1.0],
        vec![vec![1e-9]],
        vec![1e-9],
        vec![ConstraintSign::LessEqual],
    );
    let result = solve(&problem, &SolverConfig::default())
        .expect("Solve should not fail");
    assert!(matches!(result, SimplexSolution::SingleOptimal(_)));
    let (objective, x) = expect_optimum(&result);
    assert_close(objective, -1.0, 1e-9);
    assert_close(x[0], 1.0, 1e-9);
}
