// Reference data module - prefix table, country table and China regions
//
// Resolution order for a callsign:
// 1. Longest expanded prefix (5 characters down to 1)
// 2. Optional condensed-line stem scan (lossy, diagnostic)
// 3. Country → continent / DXCC entity via the small country table
//
// ASSUMPTION: no prefix that matters is longer than 5 characters. Six
// character tokens are stored but only the condensed scan can reach them.

pub mod china;
pub mod cty;
pub mod dxcc;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{AwardError, Result};
pub use china::{is_region_code, region_name, resolve_china_region};
pub use cty::PrefixTable;

/// Longest prefix tried during lookup
pub const MAX_LOOKUP_LEN: usize = 5;

/// Which path produced a country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Exact hit in the expanded prefix table
    Prefix,
    /// Stem scan over the condensed lines
    Condensed,
}

/// Complete callsign lookup result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallsignLookup {
    pub country: Option<String>,
    pub continent: Option<String>,
    /// DXCC entity number as a decimal string
    pub dxcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<MatchSource>,
}

impl CallsignLookup {
    pub fn dxcc_as_u16(&self) -> Option<u16> {
        self.dxcc.as_deref().and_then(|d| d.parse().ok())
    }
}

/// Callsign → country/continent/entity resolver over a prefix table
#[derive(Debug, Clone)]
pub struct CallsignResolver {
    table: PrefixTable,
    condensed_fallback: bool,
}

impl CallsignResolver {
    pub fn new(table: PrefixTable) -> Self {
        Self {
            table,
            condensed_fallback: true,
        }
    }

    /// Enable or disable the condensed-line stem scan
    pub fn with_condensed_fallback(mut self, enabled: bool) -> Self {
        self.condensed_fallback = enabled;
        self
    }

    pub fn table(&self) -> &PrefixTable {
        &self.table
    }

    /// Longest-prefix match in the expanded table: (prefix, country)
    pub fn find_country<'a>(&'a self, callsign: &str) -> Option<(String, &'a str)> {
        let call = callsign.trim().to_uppercase();
        if call.is_empty() {
            return None;
        }
        for len in (1..=MAX_LOOKUP_LEN.min(call.len())).rev() {
            let Some(prefix) = call.get(..len) else {
                continue;
            };
            if let Some(country) = self.table.get(prefix) {
                return Some((prefix.to_string(), country));
            }
        }
        None
    }

    /// First condensed line with a token whose stem starts the callsign
    fn scan_condensed(&self, call: &str) -> Option<String> {
        for line in self.table.condensed_lines() {
            let Some((tokens, country)) = line.rsplit_once(": ") else {
                continue;
            };
            let hit = tokens
                .split(',')
                .map(|t| t.trim().split('-').next().unwrap_or(""))
                .any(|stem| !stem.is_empty() && call.starts_with(stem));
            if hit {
                log::debug!("Condensed-line fallback matched {} to {}", call, country);
                return Some(country.trim().to_string());
            }
        }
        None
    }

    /// Resolve a callsign. Unmatched callsigns give an all-`None` lookup.
    pub fn resolve(&self, callsign: &str) -> CallsignLookup {
        let call: String = callsign
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        if call.is_empty() {
            return CallsignLookup::default();
        }

        let (country, source) = match self.find_country(&call) {
            Some((_, country)) => (country.to_string(), MatchSource::Prefix),
            None if self.condensed_fallback => match self.scan_condensed(&call) {
                Some(country) => (country, MatchSource::Condensed),
                None => return CallsignLookup::default(),
            },
            None => return CallsignLookup::default(),
        };

        CallsignLookup {
            continent: dxcc::continent_for(&country).map(str::to_string),
            dxcc: dxcc::entity_for(&country).map(|e| e.to_string()),
            country: Some(country),
            source: Some(source),
        }
    }

    /// Region code (WAPC) for a callsign
    pub fn resolve_china_region(&self, callsign: &str) -> Option<&'static str> {
        china::resolve_china_region(callsign)
    }
}

impl Default for CallsignResolver {
    fn default() -> Self {
        Self::new(PrefixTable::empty())
    }
}

/// Process-wide resolver, installed once at startup
static GLOBAL_RESOLVER: OnceLock<CallsignResolver> = OnceLock::new();

/// Install the process-wide resolver. Fails if one is already installed.
pub fn install(resolver: CallsignResolver) -> Result<&'static CallsignResolver> {
    GLOBAL_RESOLVER
        .set(resolver)
        .map_err(|_| AwardError::AlreadyInitialized)?;
    Ok(global())
}

/// The process-wide resolver (empty table if nothing was installed)
pub fn global() -> &'static CallsignResolver {
    GLOBAL_RESOLVER.get_or_init(CallsignResolver::default)
}
