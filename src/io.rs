use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::problem::SimplexSolution;
use crate::standard_form::{ConstraintSign, GeneralProblem, VariableType};

// Keys are matched case-insensitively, so documents are deserialized after
// all object keys have been lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDocument {
    #[serde(rename(serialize = "vectorN", deserialize = "vectorn"))]
    pub vector_n: Vec<f64>,
    pub matrix: Vec<Vec<f64>>,
    #[serde(rename(serialize = "vectorM", deserialize = "vectorm"))]
    pub vector_m: Vec<f64>,
    #[serde(rename(serialize = "vectorSign", deserialize = "vectorsign"))]
    pub vector_sign: Vec<i64>,
    #[serde(rename(serialize = "binaryVectorN", deserialize = "binaryvectorn"),
            default, skip_serializing_if = "Option::is_none")]
    pub binary_vector_n: Option<Vec<i64>>,
}

impl ProblemDocument {
    pub fn to_general_form(&self) -> Result<GeneralProblem, Error> {
        let signs = self.vector_sign
            .iter()
            .map(|&code| ConstraintSign::from_code(code).ok_or_else(|| {
                Error::MalformedProblem(format!("unknown constraint sign {}", code))
            }))
            .collect::<Result<Vec<_>, Error>>()?;
        let variables = match self.binary_vector_n {
            Some(ref codes) => codes
                .iter()
                .map(|&code| VariableType::from_code(code).ok_or_else(|| {
                    Error::MalformedProblem(format!("unknown variable type {}", code))
                }))
                .collect::<Result<Vec<_>, Error>>()?,
            None => vec![VariableType::NonNegative; self.vector_n.len()],
        };
        GeneralProblem::new(
            self.vector_n.clone(),
            self.matrix.clone(),
            self.vector_m.clone(),
            signs,
            variables,
        )
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut lowered = Map::new();
            for (key, v) in map {
                lowered.insert(key.to_lowercase(), lowercase_keys(v));
            }
            Value::Object(lowered)
        },
        Value::Array(values) => Value::Array(values.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

// Syntax errors stay json errors, a well-formed document with missing or
// mistyped fields is a malformed problem.
fn document_from_value<T>(value: Value) -> Result<T, Error>
    where T: for<'de> Deserialize<'de>
{
    serde_json::from_value(lowercase_keys(value))
        .map_err(|e| Error::MalformedProblem(e.to_string()))
}

pub fn read_problem<R: Read>(reader: R) -> Result<ProblemDocument, Error> {
    let value: Value = serde_json::from_reader(reader)?;
    document_from_value(value)
}

pub fn read_batch<R: Read>(reader: R) -> Result<Vec<ProblemDocument>, Error> {
    let value: Value = serde_json::from_reader(reader)?;
    document_from_value(value)
}

pub fn load_problem<P: AsRef<Path>>(path: P) -> Result<ProblemDocument, Error> {
    read_problem(BufReader::new(File::open(path)?))
}

pub fn load_batch<P: AsRef<Path>>(path: P) -> Result<Vec<ProblemDocument>, Error> {
    read_batch(BufReader::new(File::open(path)?))
}

pub fn write_batch<W: Write>(writer: W, documents: &[ProblemDocument]) -> Result<(), Error> {
    serde_json::to_writer_pretty(writer, documents)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    pub classification: String,
    pub objective: Option<f64>,
    pub solution: Option<Vec<f64>>,
}

impl<'a> From<&'a SimplexSolution> for SolutionReport {
    fn from(solution: &'a SimplexSolution) -> SolutionReport {
        SolutionReport {
            classification: solution.kind().to_string(),
            objective: solution.objective(),
            solution: solution.solution().map(|x| x.iter().cloned().collect()),
        }
    }
}

pub fn write_report<W: Write>(mut writer: W, report: &SolutionReport) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

#[test]
fn keys_are_case_insensitive() {
    let text = r#"{
        "VECTORN": [-1],
        "Matrix": [[1]],
        "vectorm": [2],
        "VectorSign": [1],
        "binaryVectorN": [1]
    }"#;
    let document = read_problem(text.as_bytes()).expect("Document is valid");
    assert_eq!(document.vector_n, vec![-1.0]);
    assert_eq!(document.matrix, vec![vec![1.0]]);
    assert_eq!(document.binary_vector_n, Some(vec![1]));
}

#[test]
fn missing_field_is_malformed() {
    let text = r#"{"vectorN": [1], "matrix": [[1]], "vectorSign": [1]}"#;
    match read_problem(text.as_bytes()) {
        Err(Error::MalformedProblem(_)) => {},
        other => panic!("Expected malformed problem, got {:?}", other),
    }
}

#[test]
fn syntax_error_is_json_error() {
    match read_problem("{ not json".as_bytes()) {
        Err(Error::Json(_)) => {},
        other => panic!("Expected json error, got {:?}", other),
    }
}

#[test]
fn unknown_sign_code_is_malformed() {
    let document = ProblemDocument {
        vector_n: vec![1.0],
        matrix: vec![vec![1.0]],
        vector_m: vec![1.0],
        vector_sign: vec![2],
        binary_vector_n: None,
    };
    assert!(document.to_general_form().is_err());
}

#[test]
fn variable_types_default_to_non_negative() {
    let document = ProblemDocument {
        vector_n: vec![1.0, 2.0],
        matrix: vec![vec![1.0, 1.0]],
        vector_m: vec![1.0],
        vector_sign: vec![0],
        binary_vector_n: None,
    };
    let general = document.to_general_form().expect("Document is valid");
    assert_eq!(general.variables(), &[VariableType::NonNegative, VariableType::NonNegative]);
    assert_eq!(general.signs(), &[ConstraintSign::Equal]);
}

#[test]
fn serialized_documents_read_back() {
    let document = ProblemDocument {
        vector_n: vec![1.0, -1.0],
        matrix: vec![vec![1.0, 2.0]],
        vector_m: vec![3.0],
        vector_sign: vec![-1],
        binary_vector_n: Some(vec![1, 0]),
    };
    let mut buffer = Vec::new();
    write_batch(&mut buffer, &[document.clone()]).expect("Writing should not fail");
    let text = String::from_utf8(buffer).expect("Output is utf-8");
    assert!(text.contains("\"binaryVectorN\""));
    let batch = read_batch(text.as_bytes()).expect("Batch is valid");
    assert_eq!(batch, vec![document]);
}

#[test]
fn unbounded_report_has_no_objective() {
    let report = SolutionReport::from(&SimplexSolution::Unbounded);
    assert_eq!(report.classification, "Unbounded");
    assert_eq!(report.objective, None);
    assert_eq!(report.solution, None);
}
