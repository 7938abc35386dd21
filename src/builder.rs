use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::vec::Vec;

use crate::config::SolverConfig;
use crate::error::Error;
use crate::problem::SimplexSolution;
use crate::standard_form::{ConstraintSign, GeneralProblem, VariableType};
use crate::two_phase;
#[cfg(test)]
use crate::test_util::{assert_close, expect_optimum};

#[derive(Debug, Clone)]
pub struct Constraint {
    coefficients: HashMap<usize, f64>,
    sign: ConstraintSign,
    value: f64,
}

impl Constraint {
    pub fn new() -> Constraint {
        Constraint {
            coefficients: HashMap::new(),
            sign: ConstraintSign::Equal,
            value: 0.0,
        }
    }

    pub fn add(mut self, var_index: usize, coeff: f64) -> Constraint {
        match self.coefficients.entry(var_index) {
            Entry::Occupied(ent) => {
                *ent.into_mut() += coeff;
            },
            Entry::Vacant(ent) => {
                ent.insert(coeff);
            },
        }
        self
    }

    pub fn value(mut self, sign: ConstraintSign, val: f64) -> Constraint {
        self.sign = sign;
        self.value = val;
        self
    }
}

impl Default for Constraint {
    fn default() -> Constraint {
        Constraint::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveDirection {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone)]
pub struct Objective {
    coefficients: HashMap<usize, f64>,
    direction: ObjectiveDirection,
}

impl Objective {
    pub fn new() -> Objective {
        Objective {
            coefficients: HashMap::new(),
            direction: ObjectiveDirection::Maximize,
        }
    }

    pub fn add(mut self, var_index: usize, coeff: f64) -> Objective {
        match self.coefficients.entry(var_index) {
            Entry::Occupied(ent) => {
                *ent.into_mut() += coeff;
            },
            Entry::Vacant(ent) => {
                ent.insert(coeff);
            },
        }
        self
    }

    pub fn direction(mut self, dir: ObjectiveDirection) -> Objective {
        self.direction = dir;
        self
    }
}

impl Default for Objective {
    fn default() -> Objective {
        Objective::new()
    }
}

#[derive(Debug, Clone)]
pub struct Problem {
    variables: Vec<VariableType>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Problem {
    pub fn new() -> Problem {
        Problem {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Objective::new(),
        }
    }

    pub fn new_variable(&mut self, var_type: VariableType) -> usize {
        let result = self.variables.len();
        self.variables.push(var_type);
        result
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    // Dense minimization problem; a maximization objective is negated.
    pub fn general_form(&self) -> Result<GeneralProblem, Error> {
        let num_vars = self.variables.len();

        let mut rows = Vec::new();
        let mut rhs = Vec::new();
        let mut signs = Vec::new();
        for (i, constraint) in self.constraints.iter().enumerate() {
            let mut row = vec![0.0; num_vars];
            for (&var, &coeff) in &constraint.coefficients {
                if var >= num_vars {
                    return Err(Error::MalformedProblem(format!(
                        "constraint {} uses undeclared variable {}", i, var)));
                }
                row[var] = coeff;
            }
            rows.push(row);
            rhs.push(constraint.value);
            signs.push(constraint.sign);
        }

        let sign = match self.objective.direction {
            ObjectiveDirection::Maximize => -1.0,
            ObjectiveDirection::Minimize => 1.0,
        };
        let mut c = vec![0.0; num_vars];
        for (&var, &coeff) in &self.objective.coefficients {
            if var >= num_vars {
                return Err(Error::MalformedProblem(format!(
                    "objective uses undeclared variable {}", var)));
            }
            c[var] = sign * coeff;
        }

        GeneralProblem::new(c, rows, rhs, signs, self.variables.clone())
    }

    /// Solves the problem. The objective value is reported in the
    /// problem's own direction.
    pub fn solve(&self, config: &SolverConfig) -> Result<SimplexSolution, Error> {
        let solution = two_phase::solve(&self.general_form()?, config)?;
        Ok(match self.objective.direction {
            ObjectiveDirection::Minimize => solution,
            ObjectiveDirection::Maximize => solution.map_optimum(|mut optimum| {
                optimum.objective = -optimum.objective;
                optimum
            }),
        })
    }
}

impl Default for Problem {
    fn default() -> Problem {
        Problem::new()
    }
}

#[cfg(test)]
fn sample_problem() -> Problem {
    let mut problem = Problem::new();
    let var1 = problem.new_variable(VariableType::NonNegative);
    let var2 = problem.new_variable(VariableType::Free);
    let constraint1 = Constraint::new()
        .add(var1, 1.0)
        .add(var2, 2.0)
        .value(ConstraintSign::LessEqual, 5.0);
    problem.add_constraint(constraint1);
    let constraint2 = Constraint::new()
        .add(var1, 5.0)
        .add(var2, 3.0)
        .value(ConstraintSign::LessEqual, 10.0);
    problem.add_constraint(constraint2);
    let constraint3 = Constraint::new()
        .add(var2, 1.0)
        .value(ConstraintSign::GreaterEqual, 2.0);
    problem.add_constraint(constraint3);
    let objective = Objective::new()
        .add(var1, 1.0)
        .add(var2, 1.0)
        .direction(ObjectiveDirection::Maximize);
    problem.set_objective(objective);
    problem
}

#[test]
fn build_constraint() {
    let constraint = Constraint::new()
        .add(0, 1.0)
        .add(1, 2.0)
        .add(0, -3.0)
        .value(ConstraintSign::LessEqual, 5.0);
    assert_eq!(constraint.coefficients.len(), 2);
    assert_eq!(constraint.coefficients[&0], -2.0);
    assert_eq!(constraint.coefficients[&1], 2.0);
    assert_eq!(constraint.sign, ConstraintSign::LessEqual);
    assert_eq!(constraint.value, 5.0);
}

#[test]
fn build_problem() {
    let problem = sample_problem();
    assert_eq!(problem.variables.len(), 2);
    assert_eq!(problem.constraints.len(), 3);
}

#[test]
fn general_form() {
    let general = sample_problem().general_form()
        .expect("Problem is well formed");
    assert_eq!(general.constraints(),
               &[vec![1.0, 2.0], vec![5.0, 3.0], vec![0.0, 1.0]]);
    assert_eq!(general.rhs(), &[5.0, 10.0, 2.0]);
    assert_eq!(general.objective(), &[-1.0, -1.0]);
    assert_eq!(general.signs(), &[
        ConstraintSign::LessEqual,
        ConstraintSign::LessEqual,
        ConstraintSign::GreaterEqual,
    ]);
    assert_eq!(general.variables(), &[VariableType::NonNegative, VariableType::Free]);
}

#[test]
fn solve_reports_maximum() {
    // x1 + 2 x2 <= 5 binds with 5 x1 + 3 x2 <= 10: x1 = 5/7, x2 = 15/7
    let result = sample_problem().solve(&SolverConfig::default())
        .expect("Solve should not fail");
    let (objective, x) = expect_optimum(&result);
    assert_close(x[0], 5.0 / 7.0, 1e-9);
    assert_close(x[1], 15.0 / 7.0, 1e-9);
    assert_close(objective, 20.0 / 7.0, 1e-9);
}

#[test]
fn undeclared_variable_is_malformed() {
    let mut problem = Problem::new();
    problem.new_variable(VariableType::NonNegative);
    problem.add_constraint(Constraint::new().add(3, 1.0).value(ConstraintSign::Equal, 1.0));
    assert!(problem.general_form().is_err());
}
