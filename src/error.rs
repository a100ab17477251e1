use thiserror::Error;

use crate::analysis::align::Analysis;

/// Operation-level failures surfaced to the caller as values.
///
/// Row-level problems never show up here: they become a
/// [`Skip`](crate::query::series::Skip) and the row is dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("no catalog loaded")]
    NoDataset,

    #[error("parameter text is empty")]
    EmptyParameter,

    #[error("unrecognized parameter: {0}")]
    UnrecognizedParameter(String),

    #[error("object not found: {0}")]
    IdentityNotFound(String),

    #[error(
        "not enough data for {analysis}: X has {x_count} values, Y has {y_count}, \
         {joint} in common (minimum {required})"
    )]
    InsufficientData {
        analysis: Analysis,
        x_count: usize,
        y_count: usize,
        joint: usize,
        required: usize,
    },

    #[error("not enough data for {analysis}: {count} values (minimum {required})")]
    TooFewValues {
        analysis: Analysis,
        count: usize,
        required: usize,
    },

    #[error("{object} has no value for {parameter}")]
    NoValueForObject { object: String, parameter: String },

    #[error("invalid range [{low}, {high}]")]
    InvalidRange { low: f64, high: f64 },

    #[error("bin count must be positive")]
    InvalidBinCount,
}

pub type Result<T> = std::result::Result<T, QueryError>;
