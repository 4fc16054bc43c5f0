//! Error taxonomy for monitor operations.
//!
//! Display strings are user-facing: the presentation layer shows them
//! verbatim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input.
    #[error("{message}")]
    Validation {
        /// Name of the offending input field.
        field: &'static str,
        message: String,
    },

    #[error("A spell is already active for {city}.")]
    AlreadyActive { city: String },

    #[error("No active spell found for {city}.")]
    NoActiveSpell { city: String },

    #[error(
        "Cannot stop the spell for {city} while rainfall is still being recorded at: {}. Set rainfall to 0 mm first.",
        .points.join(", ")
    )]
    RainfallStillActive { city: String, points: Vec<String> },

    #[error("Clearance time is required for \"{point}\" because its ponding was cleared.")]
    ClearanceRequired { point: String },

    #[error("Ponding point {id} not found.")]
    PointNotFound { id: String },

    #[error("A pending request for {email} already exists.")]
    DuplicateRequest { email: String },

    /// Store unreachable, misconfigured, or failed mid-write.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for business-rule rejections and bad input, false for
    /// infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}
