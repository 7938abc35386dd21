#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on the pivots of a single simplex run (each phase counts
    /// separately). Hitting it is reported as `Error::NonTermination`.
    pub max_iterations: usize,
}

impl SolverConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

    pub fn with_max_iterations(mut self, max_iterations: usize) -> SolverConfig {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            max_iterations: SolverConfig::DEFAULT_MAX_ITERATIONS,
        }
    }
}
