use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    // Dimension mismatch or missing/invalid field in the problem data.
    MalformedProblem(String),
    // A factorization pivot was numerically zero. The basis bookkeeping is
    // broken when this happens; it is never retried.
    SingularBasis { column: usize },
    // The iteration cap of a single simplex run was hit.
    NonTermination { iterations: usize },
    Io(io::Error),
    Json(serde_json::Error),
    // The reference solver process failed or printed something unreadable.
    Oracle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedProblem(reason) => write!(f, "malformed problem: {}", reason),
            Error::SingularBasis { column } => {
                write!(f, "singular basis: zero pivot in basis column {}", column)
            },
            Error::NonTermination { iterations } => {
                write!(f, "no terminal state reached after {} iterations", iterations)
            },
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::Oracle(reason) => write!(f, "reference solver failed: {}", reason),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}
