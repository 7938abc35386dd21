use simplex_lp::io::{read_batch, read_problem, write_report, SolutionReport};
use simplex_lp::{solve, Error, SolutionKind, SolverConfig};

fn solve_text(text: &str) -> SolutionReport {
    let document = read_problem(text.as_bytes()).expect("Document is valid");
    let problem = document.to_general_form().expect("Problem is well formed");
    let solution = solve(&problem, &SolverConfig::default()).expect("Solve should not fail");
    SolutionReport::from(&solution)
}

#[test]
fn single_less_equal_constraint() {
    let report = solve_text(r#"{
        "vectorN": [-1],
        "matrix": [[1]],
        "vectorM": [2],
        "vectorSign": [1],
        "binaryVectorN": [1]
    }"#);
    assert_eq!(report.classification, SolutionKind::SingleOptimal.to_string());
    assert!((report.objective.expect("Has objective") + 2.0).abs() < 1e-9);
    assert_eq!(report.solution, Some(vec![2.0]));
}

#[test]
fn equality_line_has_many_optima() {
    let report = solve_text(r#"{
        "vectorN": [1, 1],
        "matrix": [[1, 1]],
        "vectorM": [4],
        "vectorSign": [0]
    }"#);
    assert_eq!(report.classification, "InfiniteOptimalSet");
    assert!((report.objective.expect("Has objective") - 4.0).abs() < 1e-9);
}

#[test]
fn maximizing_without_bound_is_unbounded() {
    let report = solve_text(r#"{
        "vectorN": [-1],
        "matrix": [[1]],
        "vectorM": [0],
        "vectorSign": [-1],
        "binaryVectorN": [1]
    }"#);
    assert_eq!(report.classification, "Unbounded");
    assert_eq!(report.objective, None);
    assert_eq!(report.solution, None);
}

#[test]
fn infeasible_report() {
    let report = solve_text(r#"{
        "vectorN": [1],
        "matrix": [[1], [1]],
        "vectorM": [1, 3],
        "vectorSign": [1, -1]
    }"#);
    assert_eq!(report.classification, "Infeasible");
    assert_eq!(report.objective, None);

    let mut buffer = Vec::new();
    write_report(&mut buffer, &report).expect("Writing should not fail");
    let text = String::from_utf8(buffer).expect("Output is utf-8");
    assert!(text.contains("\"objective\": null"));
}

#[test]
fn free_variable_with_negative_rhs() {
    // min x + y st x - y >= -2, y <= 3 with x free: x = -2, y = 0
    let report = solve_text(r#"{
        "vectorN": [1, 1],
        "matrix": [[1, -1], [0, 1]],
        "vectorM": [-2, 3],
        "vectorSign": [-1, 1],
        "binaryVectorN": [0, 1]
    }"#);
    assert!((report.objective.expect("Has objective") + 2.0).abs() < 1e-9);
    let x = report.solution.expect("Has solution");
    assert!((x[0] - x[1] + 2.0).abs() < 1e-9);
}

#[test]
fn mismatched_dimensions_are_rejected() {
    let document = read_problem(r#"{
        "vectorN": [1, 1],
        "matrix": [[1]],
        "vectorM": [4],
        "vectorSign": [0]
    }"#.as_bytes()).expect("Document parses");
    match document.to_general_form() {
        Err(Error::MalformedProblem(_)) => {},
        other => panic!("Expected malformed problem, got {:?}", other),
    }
}

#[test]
fn batch_documents() {
    let batch = read_batch(r#"[
        {"vectorN": [-1], "matrix": [[1]], "vectorM": [2], "vectorSign": [1]},
        {"VECTORN": [1], "MATRIX": [[1]], "VECTORM": [3], "VECTORSIGN": [0]}
    ]"#.as_bytes()).expect("Batch is valid");
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[1].vector_m, vec![3.0]);
}
