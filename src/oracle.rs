// Cross-validation against an external reference solver. The solver is a
// separate process reading {"a": [[..]], "b": [..], "c": [..]} on stdin,
// meaning minimize c^Tx subject to Ax = b and x >= 0, and printing
// "<objective or None> <elapsed seconds>".

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use log::{info, warn};
use serde::Serialize;

use crate::config::SolverConfig;
use crate::error::Error;
use crate::io::ProblemDocument;
use crate::standard_form::{transform, StandardForm};
use crate::two_phase;

pub const OBJECTIVE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
struct ReferencePayload {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleAnswer {
    pub objective: Option<f64>,
    pub seconds: f64,
}

pub fn parse_answer(text: &str) -> Result<OracleAnswer, Error> {
    let mut fields = text.split_whitespace();
    let (objective, seconds) = match (fields.next(), fields.next()) {
        (Some(objective), Some(seconds)) => (objective, seconds),
        _ => return Err(Error::Oracle(format!("unexpected output {:?}", text.trim()))),
    };
    let objective = if objective == "None" {
        None
    } else {
        Some(objective.parse::<f64>().map_err(|e| {
            Error::Oracle(format!("bad objective {:?}: {}", objective, e))
        })?)
    };
    let seconds = seconds.parse::<f64>().map_err(|e| {
        Error::Oracle(format!("bad elapsed time {:?}: {}", seconds, e))
    })?;
    Ok(OracleAnswer { objective, seconds })
}

#[derive(Debug, Clone)]
pub struct ReferenceOracle {
    program: String,
    script: PathBuf,
}

impl ReferenceOracle {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(program: S, script: P) -> ReferenceOracle {
        ReferenceOracle {
            program: program.into(),
            script: script.into(),
        }
    }

    pub fn solve(&self, standard_form: &StandardForm) -> Result<OracleAnswer, Error> {
        let (a, b, c) = standard_form.without_artificials();
        let payload = serde_json::to_vec(&ReferencePayload { a, b, c })?;

        let mut child = Command::new(&self.program)
            .arg(&self.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let mut stdin = child.stdin.take()
                .ok_or_else(|| Error::Oracle("stdin was not captured".to_string()))?;
            stdin.write_all(&payload)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Oracle(format!(
                "{} exited with {}: {}",
                self.program, output.status, String::from_utf8_lossy(&output.stderr).trim())));
        }
        parse_answer(&String::from_utf8_lossy(&output.stdout))
    }
}

pub fn objectives_agree(local: Option<f64>, reference: Option<f64>) -> bool {
    match (local, reference) {
        (None, None) => true,
        (Some(l), Some(r)) => (l - r).abs() <= OBJECTIVE_TOLERANCE,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub matches: usize,
    pub mismatches: usize,
    pub skipped: usize,
}

/// Solves every problem locally and with the oracle and counts how often
/// the objective values agree. Oracle failures skip the problem.
pub fn compare_batch(
    documents: &[ProblemDocument],
    oracle: &ReferenceOracle,
    config: &SolverConfig,
) -> Result<BatchReport, Error> {
    let mut report = BatchReport::default();
    for (index, document) in documents.iter().enumerate() {
        let problem = document.to_general_form()?;
        let standard_form = transform(&problem)?;

        let answer = match oracle.solve(&standard_form) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("problem {}: skipped, {}", index, e);
                report.skipped += 1;
                continue;
            },
        };

        let start = Instant::now();
        let local = two_phase::solve(&problem, config)?;
        let elapsed = start.elapsed();
        info!("problem {}: reference {:.6}s, local {:.6}s",
              index, answer.seconds, elapsed.as_secs_f64());

        if objectives_agree(local.objective(), answer.objective) {
            report.matches += 1;
        } else {
            warn!("problem {}: results differ, local {:?} ({}), reference {:?}",
                  index, local.objective(), local.kind(), answer.objective);
            report.mismatches += 1;
        }
    }
    Ok(report)
}

#[test]
fn parses_objective_and_time() {
    let answer = parse_answer("-2.5 0.0031\n").expect("Answer is valid");
    assert_eq!(answer.objective, Some(-2.5));
    assert_eq!(answer.seconds, 0.0031);
}

#[test]
fn parses_missing_objective() {
    let answer = parse_answer("None 0.1").expect("Answer is valid");
    assert_eq!(answer.objective, None);
}

#[test]
fn rejects_garbage() {
    assert!(parse_answer("").is_err());
    assert!(parse_answer("Traceback (most recent call last):").is_err());
    assert!(parse_answer("1.0 soon").is_err());
}

#[test]
fn agreement_uses_tolerance() {
    assert!(objectives_agree(None, None));
    assert!(objectives_agree(Some(1.0), Some(1.0 + 1e-7)));
    assert!(!objectives_agree(Some(1.0), Some(1.001)));
    assert!(!objectives_agree(Some(1.0), None));
}

#[test]
fn missing_oracle_skips_problem() {
    let oracle = ReferenceOracle::new("/nonexistent/reference-solver", "solve.py");
    let document = ProblemDocument {
        vector_n: vec![-1.0],
        matrix: vec![vec![1.0]],
        vector_m: vec![2.0],
        vector_sign: vec![1],
        binary_vector_n: None,
    };
    let report = compare_batch(&[document], &oracle, &SolverConfig::default())
        .expect("Oracle failures are not errors");
    assert_eq!(report, BatchReport { matches: 0, mismatches: 0, skipped: 1 });
}
