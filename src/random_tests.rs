#![cfg(test)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rulinalg::matrix::BaseMatrix;
use rulinalg::vector::Vector;

use crate::config::SolverConfig;
use crate::factorization::BasisFactorization;
use crate::generate::random_problem;
use crate::problem::{matrix_from_rows, SimplexSolution};
use crate::standard_form::{transform, ConstraintSign, GeneralProblem, VariableType};
use crate::two_phase;

fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if n < k {
        return Vec::new();
    }
    let mut result = subsets(n - 1, k);
    for mut subset in subsets(n - 1, k - 1) {
        subset.push(n - 1);
        result.push(subset);
    }
    result
}

// Minimum of the objective over all basic feasible solutions of the
// standard form without artificial columns, or None if there are none.
fn best_vertex(problem: &GeneralProblem) -> Option<f64> {
    let (rows, b, c) = transform(problem).expect("Transform should not fail").without_artificials();
    let cols = c.len();
    let a = matrix_from_rows(&rows, cols).expect("Rows have equal length");
    let b = Vector::new(b);
    let c = Vector::new(c);
    let mut best: Option<f64> = None;
    for columns in subsets(cols, a.rows()) {
        let basis = a.select_cols(columns.iter());
        let factorization = match BasisFactorization::decompose(&basis) {
            Ok(f) => f,
            Err(_) => continue,
        };
        let x_b = factorization.solve(&b);
        if x_b.iter().any(|&v| v < -1e-9) {
            continue;
        }
        let objective = c.select(&columns).dot(&x_b);
        best = match best {
            Some(b) if b <= objective => Some(b),
            _ => Some(objective),
        };
    }
    best
}

fn assert_satisfies(problem: &GeneralProblem, x: &Vector<f64>) {
    for (i, row) in problem.constraints().iter().enumerate() {
        let lhs: f64 = row.iter().zip(x.iter()).map(|(a, v)| a * v).sum();
        let rhs = problem.rhs()[i];
        match problem.signs()[i] {
            ConstraintSign::LessEqual => assert!(lhs <= rhs + 1e-6, "row {}: {} > {}", i, lhs, rhs),
            ConstraintSign::Equal => assert!((lhs - rhs).abs() < 1e-6, "row {}: {} != {}", i, lhs, rhs),
            ConstraintSign::GreaterEqual => assert!(lhs >= rhs - 1e-6, "row {}: {} < {}", i, lhs, rhs),
        }
    }
    for (j, &kind) in problem.variables().iter().enumerate() {
        if kind == VariableType::NonNegative {
            assert!(x[j] > -1e-6, "variable {} is negative: {}", j, x[j]);
        }
    }
}

// The same problem with -bound <= x_j <= bound added for every variable.
fn boxed(problem: &GeneralProblem, bound: f64) -> GeneralProblem {
    let n = problem.num_variables();
    let mut constraints = problem.constraints().to_vec();
    let mut rhs = problem.rhs().to_vec();
    let mut signs = problem.signs().to_vec();
    for j in 0..n {
        let mut row = vec![0.0; n];
        row[j] = 1.0;
        constraints.push(row.clone());
        rhs.push(bound);
        signs.push(ConstraintSign::LessEqual);
        constraints.push(row);
        rhs.push(-bound);
        signs.push(ConstraintSign::GreaterEqual);
    }
    GeneralProblem::new(
        problem.objective().to_vec(), constraints, rhs, signs, problem.variables().to_vec())
        .expect("Boxed problem is well formed")
}

// Checks the solver's answer against vertex enumeration.
fn check_against_vertices(problem: &GeneralProblem, config: &SolverConfig) -> SimplexSolution {
    let best = best_vertex(problem);
    let solution = two_phase::solve(problem, config).expect("Solve should not fail");
    match solution {
        SimplexSolution::SingleOptimal(ref optimum)
        | SimplexSolution::InfiniteOptimalSet(ref optimum) => {
            let best = best.expect("A problem with an optimum has a vertex");
            assert!((optimum.objective - best).abs() < 1e-6,
                    "simplex found {}, best vertex is {}", optimum.objective, best);
            assert_eq!(optimum.x.size(), problem.num_variables());
            assert_satisfies(problem, &optimum.x);
            let objective: f64 = problem.objective().iter()
                .zip(optimum.x.iter())
                .map(|(c, v)| c * v)
                .sum();
            assert!((objective - optimum.objective).abs() < 1e-6);
        },
        SimplexSolution::Unbounded => {
            let best = best.expect("An unbounded problem has a vertex");
            let bounded = two_phase::solve(&boxed(problem, 1e6), config)
                .expect("Solve should not fail");
            let objective = bounded.objective()
                .expect("Boxed problem has an optimum");
            assert!(objective < best - 1e-6,
                    "unbounded problem cannot beat its best vertex {}", best);
        },
        SimplexSolution::Infeasible => {
            assert!(best.is_none(), "Infeasible problem has a vertex with objective {:?}", best);
        },
    }
    solution
}

#[test]
fn random_less_equal_problems_match_vertex_enumeration() {
    let mut rng = StdRng::seed_from_u64(13375823);
    let config = SolverConfig::default();
    for _ in 0..200 {
        let problem = random_problem(&mut rng)
            .to_general_form()
            .expect("Generated problems are well formed");
        assert!(best_vertex(&problem).is_some(), "x = 0 is always a vertex of generated problems");
        check_against_vertices(&problem, &config);
    }
}

#[test]
fn random_mixed_problems_match_vertex_enumeration() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = SolverConfig::default();
    let mut optima = 0;
    let mut others = 0;
    for _ in 0..200 {
        let mut document = random_problem(&mut rng);
        for sign in document.vector_sign.iter_mut() {
            *sign = rng.gen_range(-1..=1);
        }
        for b in document.vector_m.iter_mut() {
            if rng.gen_bool(0.3) {
                *b = -*b;
            }
        }
        if let Some(ref mut kinds) = document.binary_vector_n {
            for kind in kinds.iter_mut() {
                *kind = if rng.gen_bool(0.2) { 0 } else { 1 };
            }
        }
        let problem = document.to_general_form().expect("Generated problems are well formed");
        match check_against_vertices(&problem, &config).optimum() {
            Some(_) => optima += 1,
            None => others += 1,
        }
    }
    assert!(optima > 0);
    assert!(others > 0);
}

#[test]
fn subsets_are_complete() {
    assert_eq!(subsets(4, 2).len(), 6);
    assert_eq!(subsets(3, 0), vec![Vec::<usize>::new()]);
    assert!(subsets(2, 3).is_empty());
}
