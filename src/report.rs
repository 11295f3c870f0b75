// Log report - one pass over a log: parse, detect exporter, evaluate awards

use std::collections::BTreeMap;

use serde::Serialize;

use crate::adif::{detect_variant, parse_adif, AdifHeader, AdifRecord};
use crate::awards::{AwardChecker, EvaluationResult};

/// Everything a consumer of the pipeline gets for one log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogReport {
    /// Exporting software label, informational only
    pub variant: &'static str,
    pub header: AdifHeader,
    pub records: Vec<AdifRecord>,
    /// Award code → evaluation result
    pub results: BTreeMap<String, EvaluationResult>,
}

/// Parse `text` and evaluate every award in the checker's catalog
pub fn analyze_log(text: &str, checker: &AwardChecker<'_>) -> LogReport {
    let file = parse_adif(text);
    let variant = detect_variant(text, &file.header);
    log::info!("Parsed {} records (exporter: {})", file.records.len(), variant);

    let results = checker.check_all_awards(&file.records);
    LogReport {
        variant,
        header: file.header,
        records: file.records,
        results,
    }
}
