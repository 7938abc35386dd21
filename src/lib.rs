pub mod error;
pub mod tolerance;
pub mod config;
pub mod problem;
pub mod factorization;
pub mod standard_form;
pub mod builder;
pub mod simplex;
pub mod two_phase;
pub mod io;
pub mod oracle;
pub mod generate;

mod test_util;
mod random_tests;

pub use config::SolverConfig;
pub use error::Error;
pub use problem::{LinearProgram, Optimum, SimplexSolution, SolutionKind};
pub use standard_form::{ConstraintSign, GeneralProblem, VariableType};
pub use two_phase::solve;
