//! Award evaluation
//!
//! Applies an award's conditions to an enhanced record set and reports a
//! structured result per award.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::conditions::{AwardCatalog, AwardDefinition, AwardSummary, Condition, CountingRule, DxccGoal};
use super::enhance::enhance_records;
use crate::adif::AdifRecord;
use crate::error::{AwardError, Result};
use crate::reference::dxcc::CHINA_DXCC;
use crate::reference::{is_region_code, CallsignResolver};

static ZONE_RE: OnceLock<Regex> = OnceLock::new();

/// First digit after the `B` of a mainland callsign
fn zone_re() -> &'static Regex {
    ZONE_RE.get_or_init(|| Regex::new(r"B[^\d]*(\d)").expect("valid zone regex"))
}

/// Condition-specific extras, flattened into the condition result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConditionDetail {
    States {
        connected_states: Vec<String>,
        missing_states: Vec<String>,
        states: Vec<String>,
    },
    Phased {
        met_targets: Vec<usize>,
        current_phase: String,
        max_met_target: usize,
    },
    Zones {
        connected_zones: Vec<String>,
        missing_zones: Vec<String>,
    },
}

/// Outcome of one condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub met: bool,
    pub current: usize,
    /// Target to reach; for phased goals the next unmet one
    pub target: usize,
    pub message: String,
    #[serde(flatten)]
    pub detail: Option<ConditionDetail>,
}

/// Outcome of one award over one record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub code: String,
    pub award: String,
    pub eligible: bool,
    pub conditions: Vec<ConditionResult>,
    pub records_analyzed: usize,
    /// Distinct (call, qso_date) pairs in the raw records
    pub unique_contacts: usize,
    pub enhanced_records_count: usize,
    pub basic_records_count: usize,
}

/// Evaluates awards from a catalog using a resolver for enhancement
#[derive(Debug, Clone, Copy)]
pub struct AwardChecker<'a> {
    catalog: &'a AwardCatalog,
    resolver: &'a CallsignResolver,
}

impl<'a> AwardChecker<'a> {
    pub fn new(catalog: &'a AwardCatalog, resolver: &'a CallsignResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn catalog(&self) -> &'a AwardCatalog {
        self.catalog
    }

    pub fn available_awards(&self) -> Vec<AwardSummary> {
        self.catalog.available_awards()
    }

    /// Evaluate one award by code
    pub fn check_single_award(&self, code: &str, records: &[AdifRecord]) -> Result<EvaluationResult> {
        let award = self
            .catalog
            .get(code)
            .ok_or_else(|| AwardError::UnknownAward(code.trim().to_uppercase()))?;
        Ok(self.evaluate(award, records))
    }

    /// Evaluate every award in the catalog, keyed by award code
    pub fn check_all_awards(&self, records: &[AdifRecord]) -> BTreeMap<String, EvaluationResult> {
        let enhanced = enhance_records(self.resolver, records);
        self.catalog
            .iter()
            .map(|award| (award.code.clone(), self.evaluate_enhanced(award, records, &enhanced)))
            .collect()
    }

    /// Evaluate one award definition
    pub fn evaluate(&self, award: &AwardDefinition, records: &[AdifRecord]) -> EvaluationResult {
        let enhanced = enhance_records(self.resolver, records);
        self.evaluate_enhanced(award, records, &enhanced)
    }

    fn evaluate_enhanced(&self, award: &AwardDefinition, raw: &[AdifRecord], enhanced: &[AdifRecord]) -> EvaluationResult {
        let conditions: Vec<ConditionResult> = award
            .conditions
            .iter()
            .map(|c| self.check_condition(c, enhanced))
            .collect();
        let eligible = conditions.iter().all(|c| c.met);

        let enhanced_records_count = enhanced_count(award.counting, enhanced);
        let result = EvaluationResult {
            code: award.code.clone(),
            award: award.name.clone(),
            eligible,
            conditions,
            records_analyzed: raw.len(),
            unique_contacts: unique_contacts(raw),
            enhanced_records_count,
            basic_records_count: raw.len().saturating_sub(enhanced_records_count),
        };
        log::info!(
            "{}: eligible={} records={} enhanced={}",
            result.code,
            result.eligible,
            result.records_analyzed,
            result.enhanced_records_count
        );
        result
    }

    fn check_condition(&self, condition: &Condition, records: &[AdifRecord]) -> ConditionResult {
        match condition {
            Condition::StateCount { target, states } => check_state_count(*target, states, records),
            Condition::DxccCount(goal) => self.check_dxcc_count(goal, records),
            Condition::ChinaZoneCount { target } => check_china_zone_count(*target, records),
            Condition::Unrecognized { kind } => {
                log::warn!("Skipping unknown condition type {:?}", kind);
                ConditionResult {
                    kind: kind.clone(),
                    met: false,
                    current: 0,
                    target: 0,
                    message: format!("Unknown condition type: {}", kind),
                    detail: None,
                }
            }
        }
    }

    /// Distinct counterparty entities; records without one are resolved by callsign
    fn distinct_entities(&self, records: &[AdifRecord]) -> BTreeSet<u32> {
        records
            .iter()
            .filter_map(|r| match r.dxcc() {
                Some(code) => entity_code(code),
                None => r
                    .call()
                    .and_then(|call| self.resolver.resolve(call).dxcc)
                    .and_then(|code| entity_code(&code)),
            })
            .collect()
    }

    fn check_dxcc_count(&self, goal: &DxccGoal, records: &[AdifRecord]) -> ConditionResult {
        let current = self.distinct_entities(records).len();
        match goal {
            DxccGoal::Single { target } => ConditionResult {
                kind: "dxcc_count".to_string(),
                met: current >= *target,
                current,
                target: *target,
                message: format!("Worked {}/{} DXCC entities", current, target),
                detail: None,
            },
            DxccGoal::Phased { targets, phases } => {
                let met_targets: Vec<usize> = targets.iter().copied().filter(|t| current >= *t).collect();
                let max_met_target = met_targets.iter().copied().max().unwrap_or(0);
                let next_target = targets
                    .iter()
                    .copied()
                    .find(|t| current < *t)
                    .or_else(|| targets.iter().copied().max())
                    .unwrap_or(0);
                let current_phase = if met_targets.is_empty() {
                    String::new()
                } else {
                    targets
                        .iter()
                        .position(|t| *t == max_met_target)
                        .and_then(|i| phases.get(i))
                        .cloned()
                        .unwrap_or_default()
                };

                let mut message = format!("Worked {} DXCC entities", current);
                if !met_targets.is_empty() {
                    message.push_str(&format!(", completed {} ({} entities)", current_phase, max_met_target));
                }
                message.push_str(&format!(", next target: {} entities", next_target));

                ConditionResult {
                    kind: "dxcc_count".to_string(),
                    met: !met_targets.is_empty(),
                    current,
                    target: next_target,
                    message,
                    detail: Some(ConditionDetail::Phased {
                        met_targets,
                        current_phase,
                        max_met_target,
                    }),
                }
            }
        }
    }
}

/// Purely numeric, non-zero entity code
fn entity_code(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|n| *n != 0)
}

fn is_mainland(record: &AdifRecord) -> bool {
    record.dxcc().and_then(entity_code) == Some(u32::from(CHINA_DXCC))
}

fn check_state_count(target: usize, states: &[String], records: &[AdifRecord]) -> ConditionResult {
    let allowed: HashSet<&str> = states.iter().map(String::as_str).collect();
    let connected: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.state().or_else(|| r.get_nonempty("us_state")))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| allowed.contains(s.as_str()))
        .collect();

    let current = connected.len();
    let mut missing: Vec<String> = states.iter().filter(|s| !connected.contains(*s)).cloned().collect();
    missing.sort();
    missing.dedup();

    ConditionResult {
        kind: "state_count".to_string(),
        met: current >= target,
        current,
        target,
        message: format!("Worked {}/{} regions", current, target),
        detail: Some(ConditionDetail::States {
            connected_states: connected.into_iter().collect(),
            missing_states: missing,
            states: states.to_vec(),
        }),
    }
}

fn check_china_zone_count(target: usize, records: &[AdifRecord]) -> ConditionResult {
    let mut zones = BTreeSet::new();
    for record in records.iter().filter(|r| is_mainland(r)) {
        let Some(call) = record.call() else {
            continue;
        };
        let upper = call.to_uppercase();
        if let Some(digit) = zone_re().captures(&upper).and_then(|c| c.get(1)) {
            log::debug!("Zone {} from {}", digit.as_str(), call);
            zones.insert(digit.as_str().to_string());
        }
    }

    let current = zones.len();
    let missing_zones = (0..10)
        .map(|z| z.to_string())
        .filter(|z| !zones.contains(z))
        .collect();

    ConditionResult {
        kind: "china_zone_count".to_string(),
        met: current >= target,
        current,
        target,
        message: format!("Worked {}/{} mainland China zones (0-9)", current, target),
        detail: Some(ConditionDetail::Zones {
            connected_zones: zones.into_iter().collect(),
            missing_zones,
        }),
    }
}

fn enhanced_count(rule: CountingRule, records: &[AdifRecord]) -> usize {
    match rule {
        CountingRule::RegionRecords => records
            .iter()
            .filter(|r| r.state().is_some_and(|s| is_region_code(s.trim())))
            .count(),
        CountingRule::MainlandRecords => records.iter().filter(|r| is_mainland(r)).count(),
        CountingRule::DistinctEntities => records
            .iter()
            .filter_map(|r| r.dxcc().and_then(entity_code))
            .collect::<HashSet<_>>()
            .len(),
        CountingRule::Resolved => records
            .iter()
            .filter(|r| r.country().is_some() || r.continent().is_some() || r.dxcc().is_some())
            .count(),
    }
}

fn unique_contacts(records: &[AdifRecord]) -> usize {
    records
        .iter()
        .filter_map(|r| Some((r.call()?, r.qso_date()?)))
        .collect::<HashSet<_>>()
        .len()
}
