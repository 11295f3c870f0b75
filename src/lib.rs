// HamAward Library
// ADIF log parsing, callsign resolution and award evaluation

pub mod adif;
pub mod awards;
pub mod config;
pub mod error;
pub mod reference;
pub mod report;

pub use adif::{detect_variant, parse_adif, AdifFile, AdifHeader, AdifRecord, FieldValue};
pub use awards::{AwardCatalog, AwardChecker, EvaluationResult};
pub use config::Settings;
pub use error::{AwardError, Result};
pub use reference::{CallsignLookup, CallsignResolver, PrefixTable};
pub use report::{analyze_log, LogReport};
