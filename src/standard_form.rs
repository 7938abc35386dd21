use log::debug;
use rulinalg::vector::Vector;

use crate::error::Error;
use crate::problem::{matrix_from_rows, LinearProgram, SimplexSolution};
#[cfg(test)]
use rulinalg::matrix::BaseMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSign {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl ConstraintSign {
    // 1 is <=, 0 is =, -1 is >=
    pub fn from_code(code: i64) -> Option<ConstraintSign> {
        match code {
            1 => Some(ConstraintSign::LessEqual),
            0 => Some(ConstraintSign::Equal),
            -1 => Some(ConstraintSign::GreaterEqual),
            _ => None,
        }
    }

    // The relation that holds after multiplying both sides by -1.
    pub fn flipped(self) -> ConstraintSign {
        match self {
            ConstraintSign::LessEqual => ConstraintSign::GreaterEqual,
            ConstraintSign::Equal => ConstraintSign::Equal,
            ConstraintSign::GreaterEqual => ConstraintSign::LessEqual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    Free,
    NonNegative,
}

impl VariableType {
    // 1 is non-negative, 0 is free
    pub fn from_code(code: i64) -> Option<VariableType> {
        match code {
            1 => Some(VariableType::NonNegative),
            0 => Some(VariableType::Free),
            _ => None,
        }
    }
}

/// Minimize `objective · x` subject to one relation per constraint row and
/// a sign restriction per variable.
#[derive(Debug, Clone)]
pub struct GeneralProblem {
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    signs: Vec<ConstraintSign>,
    variables: Vec<VariableType>,
}

impl GeneralProblem {
    pub fn new(
        objective: Vec<f64>,
        constraints: Vec<Vec<f64>>,
        rhs: Vec<f64>,
        signs: Vec<ConstraintSign>,
        variables: Vec<VariableType>,
    ) -> Result<GeneralProblem, Error> {
        let n = objective.len();
        let m = constraints.len();
        if n == 0 {
            return Err(Error::MalformedProblem("problem has no variables".to_string()));
        }
        if m == 0 {
            return Err(Error::MalformedProblem("problem has no constraints".to_string()));
        }
        for (i, row) in constraints.iter().enumerate() {
            if row.len() != n {
                return Err(Error::MalformedProblem(format!(
                    "constraint {} has {} coefficients, expected {}", i, row.len(), n)));
            }
        }
        if rhs.len() != m {
            return Err(Error::MalformedProblem(format!(
                "{} right-hand sides for {} constraints", rhs.len(), m)));
        }
        if signs.len() != m {
            return Err(Error::MalformedProblem(format!(
                "{} constraint signs for {} constraints", signs.len(), m)));
        }
        if variables.len() != n {
            return Err(Error::MalformedProblem(format!(
                "{} variable types for {} variables", variables.len(), n)));
        }
        Ok(GeneralProblem { objective, constraints, rhs, signs, variables })
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Vec<f64>] {
        &self.constraints
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn signs(&self) -> &[ConstraintSign] {
        &self.signs
    }

    pub fn variables(&self) -> &[VariableType] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

// Mapping from an original variable to standard form columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableMapping {
    Direct(usize),
    Difference(usize, usize),
}

#[derive(Debug, Clone)]
pub struct PreprocessingContext {
    mapping: Vec<VariableMapping>,
    artificial: Vec<bool>,
    phase_one_objective: Vector<f64>,
    flipped_rows: Vec<bool>,
}

impl PreprocessingContext {
    pub fn mapping(&self) -> &[VariableMapping] {
        &self.mapping
    }

    pub fn artificial(&self) -> &[bool] {
        &self.artificial
    }

    pub fn phase_one_objective(&self) -> &Vector<f64> {
        &self.phase_one_objective
    }

    pub fn flipped_rows(&self) -> &[bool] {
        &self.flipped_rows
    }

    pub fn artificial_count(&self) -> usize {
        self.artificial.iter().filter(|&&a| a).count()
    }

    // Phase 1 can be skipped when every row got a slack column.
    pub fn two_phase(&self) -> bool {
        self.artificial.iter().any(|&a| a)
    }

    /// Maps a standard form vector back to the original variables.
    pub fn original_values(&self, x: &Vector<f64>) -> Vector<f64> {
        let values: Vec<f64> = self.mapping
            .iter()
            .map(|mapping| match *mapping {
                VariableMapping::Direct(column) => x[column],
                VariableMapping::Difference(pos, neg) => x[pos] - x[neg],
            })
            .collect();
        Vector::new(values)
    }

    // The objective is unchanged by the transformation, so only the
    // solution vector needs translating.
    pub fn restore(&self, solution: SimplexSolution) -> SimplexSolution {
        solution.map_optimum(|mut optimum| {
            optimum.x = self.original_values(&optimum.x);
            optimum
        })
    }
}

#[derive(Debug, Clone)]
pub struct StandardForm {
    pub program: LinearProgram,
    pub context: PreprocessingContext,
}

impl StandardForm {
    /// The standard form program without its artificial columns:
    /// `(A, b, c)` of the equality-constrained problem that is equivalent
    /// to the original one.
    pub fn without_artificials(&self) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
        let program = &self.program;
        let kept: Vec<usize> = (0..program.cols())
            .filter(|&j| !self.context.artificial[j])
            .collect();
        let a = (0..program.rows())
            .map(|i| kept.iter().map(|&j| program.a()[[i, j]]).collect())
            .collect();
        let b = program.b().iter().cloned().collect();
        let c = kept.iter().map(|&j| program.c()[j]).collect();
        (a, b, c)
    }
}

pub fn transform(problem: &GeneralProblem) -> Result<StandardForm, Error> {
    let m = problem.num_constraints();

    // Non-negative variables keep their relative order; each free variable
    // x is replaced by a pair x' - x'' appended after them.
    let mut var_count = 0;
    let mut mapping = vec![VariableMapping::Direct(0); problem.num_variables()];
    for (i, &var_type) in problem.variables.iter().enumerate() {
        if var_type == VariableType::NonNegative {
            mapping[i] = VariableMapping::Direct(var_count);
            var_count += 1;
        }
    }
    for (i, &var_type) in problem.variables.iter().enumerate() {
        if var_type == VariableType::Free {
            mapping[i] = VariableMapping::Difference(var_count, var_count + 1);
            var_count += 2;
        }
    }

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(m);
    for constraint in problem.constraints.iter() {
        let mut row = vec![0.0; var_count];
        for (i, &coeff) in constraint.iter().enumerate() {
            match mapping[i] {
                VariableMapping::Direct(column) => row[column] = coeff,
                VariableMapping::Difference(pos, neg) => {
                    row[pos] = coeff;
                    row[neg] = -coeff;
                },
            }
        }
        rows.push(row);
    }
    let mut c = vec![0.0; var_count];
    for (i, &coeff) in problem.objective.iter().enumerate() {
        match mapping[i] {
            VariableMapping::Direct(column) => c[column] = coeff,
            VariableMapping::Difference(pos, neg) => {
                c[pos] = coeff;
                c[neg] = -coeff;
            },
        }
    }

    let mut b = problem.rhs.clone();
    let mut signs = problem.signs.clone();
    let mut flipped_rows = vec![false; m];
    for i in 0..m {
        if b[i] < 0.0 {
            b[i] = -b[i];
            signs[i] = signs[i].flipped();
            for v in rows[i].iter_mut() {
                *v = -*v;
            }
            flipped_rows[i] = true;
        }
    }

    let mut artificial = vec![false; var_count];
    let mut phase_one_objective = vec![0.0; var_count];
    let mut basis = vec![0; m];
    for i in 0..m {
        match signs[i] {
            ConstraintSign::LessEqual => {
                basis[i] = append_column(&mut rows, i, 1.0);
                artificial.push(false);
                phase_one_objective.push(0.0);
            },
            ConstraintSign::Equal => {
                basis[i] = append_column(&mut rows, i, 1.0);
                artificial.push(true);
                phase_one_objective.push(1.0);
            },
            ConstraintSign::GreaterEqual => {
                append_column(&mut rows, i, -1.0);
                artificial.push(false);
                phase_one_objective.push(0.0);
                basis[i] = append_column(&mut rows, i, 1.0);
                artificial.push(true);
                phase_one_objective.push(1.0);
            },
        }
    }

    let cols = artificial.len();
    c.resize(cols, 0.0);
    let mut x0 = vec![0.0; cols];
    for (i, &column) in basis.iter().enumerate() {
        x0[column] = b[i];
    }

    let context = PreprocessingContext {
        mapping,
        artificial,
        phase_one_objective: Vector::new(phase_one_objective),
        flipped_rows,
    };
    debug!("standard form has {} rows, {} columns, {} artificial",
           m, cols, context.artificial_count());

    let program = LinearProgram::new(
        Vector::new(c),
        matrix_from_rows(&rows, cols)?,
        Vector::new(b),
        Vector::new(x0),
        basis,
    )?;

    Ok(StandardForm { program, context })
}

// Appends a column that is zero except for `value` in `row` and returns its
// index.
fn append_column(rows: &mut [Vec<f64>], row: usize, value: f64) -> usize {
    let mut index = 0;
    for (i, r) in rows.iter_mut().enumerate() {
        index = r.len();
        r.push(if i == row { value } else { 0.0 });
    }
    index
}

#[test]
fn less_equal_rows_need_one_phase() {
    let problem = GeneralProblem::new(
        vec![-1.0],
        vec![vec![1.0]],
        vec![2.0],
        vec![ConstraintSign::LessEqual],
        vec![VariableType::NonNegative],
    ).expect("Problem is well formed");
    let standard_form = transform(&problem).expect("Transform should not fail");
    let program = &standard_form.program;
    assert_eq!(program.a().data(), &vec![1.0, 1.0]);
    assert_eq!(program.c().data(), &vec![-1.0, 0.0]);
    assert_eq!(program.basis(), &[1]);
    assert_eq!(program.x0().data(), &vec![0.0, 2.0]);
    assert!(!standard_form.context.two_phase());
}

#[test]
fn negative_rhs_flips_greater_equal_row() {
    // x1 - 2 x2 >= -4 becomes -x1 + 2 x2 <= 4 and gets a plain slack
    let problem = GeneralProblem::new(
        vec![1.0, 1.0],
        vec![vec![1.0, -2.0], vec![1.0, 1.0]],
        vec![-4.0, 3.0],
        vec![ConstraintSign::GreaterEqual, ConstraintSign::GreaterEqual],
        vec![VariableType::NonNegative, VariableType::NonNegative],
    ).expect("Problem is well formed");
    let standard_form = transform(&problem).expect("Transform should not fail");
    let program = &standard_form.program;
    assert_eq!(program.a().rows(), 2);
    assert_eq!(program.a().cols(), 5);
    assert_eq!(program.a().data(),
               &vec![-1.0, 2.0, 1.0, 0.0, 0.0,
                     1.0, 1.0, 0.0, -1.0, 1.0]);
    assert_eq!(program.b().data(), &vec![4.0, 3.0]);
    assert_eq!(program.basis(), &[2, 4]);
    assert_eq!(standard_form.context.flipped_rows(), &[true, false]);
    assert_eq!(standard_form.context.artificial(),
               &[false, false, false, false, true]);
    assert_eq!(standard_form.context.phase_one_objective().data(),
               &vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    assert!(standard_form.context.two_phase());
}

#[test]
fn free_variables_are_split() {
    let problem = GeneralProblem::new(
        vec![1.0, 2.0, 3.0],
        vec![vec![1.0, 2.0, 3.0]],
        vec![5.0],
        vec![ConstraintSign::Equal],
        vec![VariableType::Free, VariableType::NonNegative, VariableType::Free],
    ).expect("Problem is well formed");
    let standard_form = transform(&problem).expect("Transform should not fail");
    let context = &standard_form.context;
    assert_eq!(context.mapping(), &[
        VariableMapping::Difference(1, 2),
        VariableMapping::Direct(0),
        VariableMapping::Difference(3, 4),
    ]);
    assert_eq!(standard_form.program.a().data(),
               &vec![2.0, 1.0, -1.0, 3.0, -3.0, 1.0]);
    assert_eq!(standard_form.program.c().data(),
               &vec![2.0, 1.0, -1.0, 3.0, -3.0, 0.0]);

    let x = Vector::new(vec![0.5, 0.0, 2.0, 1.5, 0.0, 0.0]);
    let original = context.original_values(&x);
    assert_eq!(original.data(), &vec![-2.0, 0.5, 1.5]);
}

#[test]
fn artificials_are_dropped_for_reference() {
    let problem = GeneralProblem::new(
        vec![1.0, 1.0],
        vec![vec![1.0, 1.0]],
        vec![4.0],
        vec![ConstraintSign::GreaterEqual],
        vec![VariableType::NonNegative, VariableType::NonNegative],
    ).expect("Problem is well formed");
    let standard_form = transform(&problem).expect("Transform should not fail");
    let (a, b, c) = standard_form.without_artificials();
    assert_eq!(a, vec![vec![1.0, 1.0, -1.0]]);
    assert_eq!(b, vec![4.0]);
    assert_eq!(c, vec![1.0, 1.0, 0.0]);
}

#[test]
fn mismatched_dimensions_are_malformed() {
    let result = GeneralProblem::new(
        vec![1.0, 1.0],
        vec![vec![1.0]],
        vec![4.0],
        vec![ConstraintSign::Equal],
        vec![VariableType::NonNegative, VariableType::NonNegative],
    );
    match result {
        Err(Error::MalformedProblem(_)) => {},
        other => panic!("Expected malformed problem, got {:?}", other),
    }
}
