// Chinese administrative regions (WAPC) by callsign block
//
// Mainland callsigns are B + station class letter + district digit +
// suffix. Each province owns a range of suffix first letters within a
// district, for every station class. Blocks are matched by plain string
// comparison against closed intervals such as BA1AA..BA1XZ. That only
// works while the compared segments are fixed width; a six-character call
// past the last two-letter bound (e.g. BA1XZZ) falls outside every block.

use std::sync::OnceLock;

/// Station class letters used in mainland blocks
const STATION_CLASSES: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L'];

/// Region code, district digit, first and last suffix letter
const MAINLAND_BLOCKS: &[(&str, char, char, char)] = &[
    ("BJ", '1', 'A', 'X'),
    ("HL", '2', 'A', 'H'),
    ("JL", '2', 'I', 'P'),
    ("LN", '2', 'Q', 'X'),
    ("TJ", '3', 'A', 'F'),
    ("NM", '3', 'G', 'L'),
    ("HE", '3', 'M', 'R'),
    ("SX", '3', 'S', 'X'),
    ("SH", '4', 'A', 'H'),
    ("SD", '4', 'I', 'P'),
    ("JS", '4', 'Q', 'X'),
    ("ZJ", '5', 'A', 'H'),
    ("JX", '5', 'I', 'P'),
    ("FJ", '5', 'Q', 'X'),
    ("AH", '6', 'A', 'H'),
    ("HA", '6', 'I', 'P'),
    ("HB", '6', 'Q', 'X'),
    ("HN", '7', 'A', 'H'),
    ("GD", '7', 'I', 'P'),
    ("GX", '7', 'Q', 'X'),
    ("HI", '7', 'Y', 'Z'),
    ("SC", '8', 'A', 'F'),
    ("CQ", '8', 'G', 'L'),
    ("GZ", '8', 'M', 'R'),
    ("YN", '8', 'S', 'X'),
    ("SN", '9', 'A', 'F'),
    ("GS", '9', 'G', 'L'),
    ("NX", '9', 'M', 'R'),
    ("QH", '9', 'S', 'X'),
    ("XJ", '0', 'A', 'F'),
    ("XZ", '0', 'G', 'L'),
];

/// Territory prefix families, answered before the mainland intervals
const TERRITORY_PREFIXES: &[(&str, &str)] = &[
    ("VR2", "HK"),
    ("VS2", "HK"),
    ("VT2", "HK"),
    ("BV", "TW"),
    ("BX", "TW"),
    ("BM", "TW"),
    ("XX9", "MO"),
];

/// Region code → display name
pub const REGION_NAMES: &[(&str, &str)] = &[
    ("BJ", "Beijing"),
    ("TJ", "Tianjin"),
    ("HE", "Hebei"),
    ("SX", "Shanxi"),
    ("NM", "Inner Mongolia"),
    ("LN", "Liaoning"),
    ("JL", "Jilin"),
    ("HL", "Heilongjiang"),
    ("SH", "Shanghai"),
    ("JS", "Jiangsu"),
    ("ZJ", "Zhejiang"),
    ("AH", "Anhui"),
    ("FJ", "Fujian"),
    ("JX", "Jiangxi"),
    ("SD", "Shandong"),
    ("HA", "Henan"),
    ("HB", "Hubei"),
    ("HN", "Hunan"),
    ("GD", "Guangdong"),
    ("GX", "Guangxi"),
    ("HI", "Hainan"),
    ("CQ", "Chongqing"),
    ("SC", "Sichuan"),
    ("GZ", "Guizhou"),
    ("YN", "Yunnan"),
    ("XZ", "Tibet"),
    ("SN", "Shaanxi"),
    ("GS", "Gansu"),
    ("QH", "Qinghai"),
    ("NX", "Ningxia"),
    ("XJ", "Xinjiang"),
    ("TW", "Taiwan"),
    ("HK", "Hong Kong"),
    ("MO", "Macao"),
];

/// A region and the closed callsign intervals it owns
#[derive(Debug, Clone)]
pub struct RegionBlocks {
    pub code: &'static str,
    pub intervals: Vec<(String, String)>,
}

static REGION_TABLE: OnceLock<Vec<RegionBlocks>> = OnceLock::new();

/// Mainland region intervals, in lookup order
pub fn region_table() -> &'static [RegionBlocks] {
    REGION_TABLE.get_or_init(|| {
        MAINLAND_BLOCKS
            .iter()
            .map(|&(code, district, first, last)| {
                let intervals = STATION_CLASSES
                    .iter()
                    .map(|class| {
                        (
                            format!("B{}{}{}A", class, district, first),
                            format!("B{}{}{}Z", class, district, last),
                        )
                    })
                    .collect();
                RegionBlocks { code, intervals }
            })
            .collect()
    })
}

/// Whether a two-letter code is one of the 34 regions
pub fn is_region_code(code: &str) -> bool {
    REGION_NAMES.iter().any(|(c, _)| c.eq_ignore_ascii_case(code))
}

/// Display name of a region code
pub fn region_name(code: &str) -> Option<&'static str> {
    REGION_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Region code for a callsign, or `None`
///
/// Territory prefix families answer directly. Other calls starting with
/// `B` are located in the mainland interval table.
pub fn resolve_china_region(callsign: &str) -> Option<&'static str> {
    let call = callsign.trim().to_uppercase();
    if call.is_empty() {
        return None;
    }

    if let Some((_, code)) = TERRITORY_PREFIXES.iter().find(|(p, _)| call.starts_with(p)) {
        return Some(code);
    }
    if !call.starts_with('B') {
        return None;
    }

    region_table()
        .iter()
        .find(|region| {
            region
                .intervals
                .iter()
                .any(|(lo, hi)| lo.as_str() <= call.as_str() && call.as_str() <= hi.as_str())
        })
        .map(|region| region.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainland_blocks() {
        assert_eq!(resolve_china_region("BA1AA"), Some("BJ"));
        assert_eq!(resolve_china_region("bg2ab"), Some("HL"));
        assert_eq!(resolve_china_region("BH2QAA"), Some("LN"));
        assert_eq!(resolve_china_region("BD7YZ"), Some("HI"));
        assert_eq!(resolve_china_region("BG0GA"), Some("XZ"));
        assert_eq!(resolve_china_region("BH4IX"), Some("SD"));
    }

    #[test]
    fn test_territory_prefixes() {
        assert_eq!(resolve_china_region("VR2XMT"), Some("HK"));
        assert_eq!(resolve_china_region("BV1EK"), Some("TW"));
        assert_eq!(resolve_china_region("BX5AA"), Some("TW"));
        assert_eq!(resolve_china_region("XX9TXN"), Some("MO"));
    }

    #[test]
    fn test_outside_every_block() {
        // BY is not a block station class
        assert_eq!(resolve_china_region("BY1AA"), None);
        // past the last two-letter bound
        assert_eq!(resolve_china_region("BA1XZZ"), None);
        assert_eq!(resolve_china_region("JA1AA"), None);
        assert_eq!(resolve_china_region(""), None);
    }

    #[test]
    fn test_region_table_shape() {
        let table = region_table();
        assert_eq!(table.len(), 31);
        assert!(table.iter().all(|r| !["TW", "HK", "MO"].contains(&r.code)));
        assert_eq!(table[0].code, "BJ");
        assert_eq!(table[0].intervals[0], ("BA1AA".to_string(), "BA1XZ".to_string()));
        assert_eq!(table[0].intervals.len(), 11);
    }

    #[test]
    fn test_region_names() {
        assert_eq!(REGION_NAMES.len(), 34);
        assert!(is_region_code("gd"));
        assert!(!is_region_code("CA"));
        assert_eq!(region_name("XJ"), Some("Xinjiang"));
    }
}
