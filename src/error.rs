//! Error type for the award pipeline.
//!
//! Malformed log text, unresolvable callsigns and unknown condition types
//! are absorbed where they occur. The variants below are the failures a
//! caller can actually observe: broken award definitions, unknown award
//! codes and the configuration/file boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwardError {
    #[error("condition `{kind}` is missing required parameter `{param}`")]
    MissingParameter { kind: String, param: String },

    #[error("condition `{kind}` has an invalid parameter: {reason}")]
    InvalidParameter { kind: String, reason: String },

    #[error("award not found: {0}")]
    UnknownAward(String),

    #[error("reference tables are already initialized")]
    AlreadyInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AwardError>;
