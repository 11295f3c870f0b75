// ADIF (Amateur Data Interchange Format) reading
// Reference: https://adif.org/

pub mod datetime;
pub mod parser;
pub mod variant;

pub use parser::{parse_adif, AdifFile, AdifHeader, AdifRecord, FieldValue};
pub use variant::{detect_variant, UNKNOWN_VARIANT};
