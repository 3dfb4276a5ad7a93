use std::fmt::{self, Display};
use std::io;

use crate::people::{DiseaseStatus, PersonId};

/// Provides `EpiError` and maps other errors to
/// convert to an `EpiError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// An invalid parameter. Fatal at initialization; the engine is never built.
    ConfigError(String),
    /// A sampling step asked for more distinct identities than the pool holds.
    CapacityError {
        requested: usize,
        available: usize,
    },
    /// A person was handed to the outcome schedule a second time.
    AlreadyScheduled(PersonId),
    InvalidTransition {
        person: PersonId,
        from: DiseaseStatus,
        to: DiseaseStatus,
    },
    ReportError(String),
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl From<csv::Error> for EpiError {
    fn from(error: csv::Error) -> Self {
        EpiError::CsvError(error)
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::IoError(error) => Some(error),
            EpiError::JsonError(error) => Some(error),
            EpiError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::ConfigError(message) => write!(f, "invalid parameters: {message}"),
            EpiError::CapacityError {
                requested,
                available,
            } => write!(
                f,
                "cannot draw {requested} distinct people from a pool of {available}"
            ),
            EpiError::AlreadyScheduled(person) => {
                write!(f, "{person:?} already has a scheduled outcome")
            }
            EpiError::InvalidTransition { person, from, to } => {
                write!(f, "{person:?} cannot move from {from:?} to {to:?}")
            }
            EpiError::ReportError(message) => write!(f, "report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
