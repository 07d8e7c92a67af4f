use std::fmt;

use trellis_query::{FilterParseError, SortParseError};

#[derive(Debug)]
pub enum GridError {
    InvalidParameter(String),
    UnknownField(String),
    Parse(String),
    Source(String),
    Delete(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            GridError::UnknownField(field) => write!(f, "unknown field: {field}"),
            GridError::Parse(msg) => write!(f, "parse error: {msg}"),
            GridError::Source(msg) => write!(f, "source error: {msg}"),
            GridError::Delete(msg) => write!(f, "delete error: {msg}"),
        }
    }
}

impl std::error::Error for GridError {}

impl From<SortParseError> for GridError {
    fn from(e: SortParseError) -> Self {
        GridError::Parse(e.to_string())
    }
}

impl From<FilterParseError> for GridError {
    fn from(e: FilterParseError) -> Self {
        GridError::Parse(e.to_string())
    }
}
