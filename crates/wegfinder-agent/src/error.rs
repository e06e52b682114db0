use std::fmt;

use thiserror::Error;
use wegfinder_core::AdvisoryError;

/// Which advisory operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ProposeAction,
    ScoreOutcome,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ProposeAction => f.write_str("propose_action"),
            Operation::ScoreOutcome => f.write_str("score_outcome"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("Advisory {operation} failed after {attempts} attempt(s): {source}")]
    AdvisoryExhausted {
        operation: Operation,
        attempts: u32,
        #[source]
        source: AdvisoryError,
    },
    #[error("Navigation was aborted by an earlier advisory failure")]
    Aborted,
}

pub type Result<T> = std::result::Result<T, NavigatorError>;
