//! Record enhancement
//!
//! Fills `country`, `continent`, `dxcc` and `state` from the record's
//! callsign when they are missing or blank. Values already present are
//! never touched, so enhancing twice gives the same record as enhancing
//! once.

use crate::adif::AdifRecord;
use crate::reference::dxcc::{special_region_for_entity, CHINA_COUNTRY};
use crate::reference::CallsignResolver;

/// Enhance a single record
pub fn enhance_record(resolver: &CallsignResolver, record: &AdifRecord) -> AdifRecord {
    let mut enhanced = record.clone();
    let Some(call) = record.call().map(str::to_string) else {
        return enhanced;
    };

    let info = resolver.resolve(&call);
    let fills = [
        ("country", info.country.as_deref()),
        ("continent", info.continent.as_deref()),
        ("dxcc", info.dxcc.as_deref()),
    ];
    for (field, value) in fills {
        if let Some(value) = value {
            if enhanced.get_nonempty(field).is_none() {
                enhanced.set(field, value);
            }
        }
    }

    if enhanced.state().is_none() {
        let special = enhanced
            .dxcc()
            .and_then(|d| d.parse::<u16>().ok())
            .and_then(special_region_for_entity);
        let region = special.or_else(|| {
            let is_mainland = info
                .country
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(CHINA_COUNTRY));
            if is_mainland {
                resolver.resolve_china_region(&call)
            } else {
                None
            }
        });
        if let Some(region) = region {
            enhanced.set("state", region);
        }
    }

    enhanced
}

/// Enhance every record, preserving order
pub fn enhance_records(resolver: &CallsignResolver, records: &[AdifRecord]) -> Vec<AdifRecord> {
    records.iter().map(|r| enhance_record(resolver, r)).collect()
}
