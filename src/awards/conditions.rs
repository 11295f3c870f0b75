//! Award definitions
//!
//! An award is a code, a display name, a description, an ordered list of
//! conditions and the rule used to report its "enhanced record" count.
//! Definitions are built once (built-in or from a JSON catalog) and only
//! read afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AwardError, Result};

/// Default target for the China zone condition (zones 0-9)
pub const DEFAULT_ZONE_TARGET: usize = 10;

/// All WAPC region codes
pub const WAPC_REGIONS: &[&str] = &[
    "BJ", "TJ", "HE", "SX", "NM", "LN", "JL", "HL", "SH", "JS", "ZJ", "AH", "FJ", "JX", "SD",
    "HA", "HB", "HN", "GD", "GX", "HI", "CQ", "SC", "GZ", "YN", "XZ", "SN", "GS", "QH", "NX",
    "XJ", "TW", "HK", "MO",
];

/// Target(s) of a `dxcc_count` condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DxccGoal {
    Single { target: usize },
    /// Ascending targets; `phases[i]` labels `targets[i]`
    Phased { targets: Vec<usize>, phases: Vec<String> },
}

/// One measurable award rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    StateCount { target: usize, states: Vec<String> },
    DxccCount(DxccGoal),
    ChinaZoneCount { target: usize },
    /// A condition type this evaluator does not know; always fails
    Unrecognized { kind: String },
}

impl Condition {
    /// The condition's type tag
    pub fn kind(&self) -> &str {
        match self {
            Condition::StateCount { .. } => "state_count",
            Condition::DxccCount(_) => "dxcc_count",
            Condition::ChinaZoneCount { .. } => "china_zone_count",
            Condition::Unrecognized { kind } => kind.as_str(),
        }
    }

    /// Build a condition from its JSON form, e.g. `{"type": "state_count", ...}`
    pub fn from_value(value: &Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("<untyped>", "type"))?;

        match kind {
            "state_count" => {
                let target = required_count(value, kind, "target")?;
                let states = value
                    .get("states")
                    .and_then(Value::as_array)
                    .ok_or_else(|| missing(kind, "states"))?
                    .iter()
                    .map(|s| {
                        s.as_str()
                            .map(|s| s.trim().to_uppercase())
                            .ok_or_else(|| invalid(kind, "`states` must hold strings"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Condition::StateCount { target, states })
            }
            "dxcc_count" => match value.get("targets") {
                Some(targets) => {
                    let targets = targets
                        .as_array()
                        .ok_or_else(|| invalid(kind, "`targets` must be an array"))?
                        .iter()
                        .map(|t| as_count(t).ok_or_else(|| invalid(kind, "`targets` must hold non-negative integers")))
                        .collect::<Result<Vec<_>>>()?;
                    if targets.is_empty() {
                        return Err(invalid(kind, "`targets` is empty"));
                    }
                    let labels = match value.get("phases") {
                        Some(p) => p
                            .as_array()
                            .ok_or_else(|| invalid(kind, "`phases` must be an array"))?
                            .iter()
                            .map(|s| {
                                s.as_str()
                                    .map(str::to_string)
                                    .ok_or_else(|| invalid(kind, "`phases` must hold strings"))
                            })
                            .collect::<Result<Vec<_>>>()?,
                        None => Vec::new(),
                    };

                    // Each target keeps its label; unlabelled targets get ""
                    let mut paired: Vec<(usize, String)> = targets
                        .into_iter()
                        .enumerate()
                        .map(|(i, t)| (t, labels.get(i).cloned().unwrap_or_default()))
                        .collect();
                    paired.sort_by_key(|(t, _)| *t);
                    let (targets, phases) = paired.into_iter().unzip();
                    Ok(Condition::DxccCount(DxccGoal::Phased { targets, phases }))
                }
                None => Ok(Condition::DxccCount(DxccGoal::Single {
                    target: required_count(value, kind, "target")?,
                })),
            },
            "china_zone_count" => {
                let target = match value.get("target") {
                    Some(t) => as_count(t).ok_or_else(|| invalid(kind, "`target` must be a non-negative integer"))?,
                    None => DEFAULT_ZONE_TARGET,
                };
                Ok(Condition::ChinaZoneCount { target })
            }
            other => Ok(Condition::Unrecognized {
                kind: other.to_string(),
            }),
        }
    }
}

fn missing(kind: &str, param: &str) -> AwardError {
    AwardError::MissingParameter {
        kind: kind.to_string(),
        param: param.to_string(),
    }
}

fn invalid(kind: &str, reason: &str) -> AwardError {
    AwardError::InvalidParameter {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

fn as_count(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn required_count(value: &Value, kind: &str, param: &str) -> Result<usize> {
    let raw = value.get(param).ok_or_else(|| missing(kind, param))?;
    as_count(raw).ok_or_else(|| invalid(kind, &format!("`{}` must be a non-negative integer", param)))
}

/// How an award reports its "enhanced record" count.
///
/// Each awarding body counts differently; the asymmetry is intentional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingRule {
    /// Every record carrying a known region code (no dedup)
    RegionRecords,
    /// Every record whose counterparty entity is mainland China
    MainlandRecords,
    /// Distinct non-zero numeric counterparty entity codes
    DistinctEntities,
    /// Records where country, continent or entity could be determined
    #[default]
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardDefinition {
    pub code: String,
    pub name: String,
    pub description: String,
    pub conditions: Vec<Condition>,
    pub counting: CountingRule,
}

/// Short listing entry for an award
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardSummary {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// JSON form of one catalog entry
#[derive(Debug, Deserialize)]
struct RawAward {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    counting: CountingRule,
    conditions: Vec<Value>,
}

/// The set of awards known to the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardCatalog {
    awards: Vec<AwardDefinition>,
}

impl AwardCatalog {
    pub fn new(awards: Vec<AwardDefinition>) -> Self {
        Self { awards }
    }

    /// DXCC, WAPC and WACZ
    pub fn builtin() -> Self {
        Self::new(vec![
            AwardDefinition {
                code: "DXCC".to_string(),
                name: "DX Century Club (DXCC)".to_string(),
                description: "Work a number of distinct DXCC entities".to_string(),
                conditions: vec![Condition::DxccCount(DxccGoal::Phased {
                    targets: vec![10, 50, 100],
                    phases: vec![
                        "Basic".to_string(),
                        "Intermediate".to_string(),
                        "Advanced".to_string(),
                    ],
                })],
                counting: CountingRule::DistinctEntities,
            },
            AwardDefinition {
                code: "WAPC".to_string(),
                name: "Worked All Chinese Provinces (WAPC)".to_string(),
                description: "Work every Chinese administrative region".to_string(),
                conditions: vec![Condition::StateCount {
                    target: WAPC_REGIONS.len(),
                    states: WAPC_REGIONS.iter().map(|s| s.to_string()).collect(),
                }],
                counting: CountingRule::RegionRecords,
            },
            AwardDefinition {
                code: "WACZ".to_string(),
                name: "Worked All China Zones (WACZ)".to_string(),
                description: "Work all ten mainland China call zones (0-9)".to_string(),
                conditions: vec![Condition::ChinaZoneCount {
                    target: DEFAULT_ZONE_TARGET,
                }],
                counting: CountingRule::MainlandRecords,
            },
        ])
    }

    /// Parse a JSON catalog: `{ "CODE": { "name", "description", "counting", "conditions" } }`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: serde_json::Map<String, Value> = serde_json::from_str(json)?;
        let mut awards = Vec::with_capacity(raw.len());
        for (code, entry) in raw {
            let entry: RawAward = serde_json::from_value(entry)?;
            let conditions = entry
                .conditions
                .iter()
                .map(Condition::from_value)
                .collect::<Result<Vec<_>>>()?;
            awards.push(AwardDefinition {
                code: code.to_uppercase(),
                name: entry.name,
                description: entry.description,
                conditions,
                counting: entry.counting,
            });
        }
        Ok(Self::new(awards))
    }

    /// Load a JSON catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let catalog = Self::from_json_str(&fs::read_to_string(path)?)?;
        log::info!("Loaded {} award definitions from {:?}", catalog.awards.len(), path);
        Ok(catalog)
    }

    /// Find an award by code (case-insensitive)
    pub fn get(&self, code: &str) -> Option<&AwardDefinition> {
        self.awards.iter().find(|a| a.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AwardDefinition> {
        self.awards.iter()
    }

    pub fn len(&self) -> usize {
        self.awards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.awards.is_empty()
    }

    /// Code, name and description of every award
    pub fn available_awards(&self) -> Vec<AwardSummary> {
        self.awards
            .iter()
            .map(|a| AwardSummary {
                code: a.code.clone(),
                name: a.name.clone(),
                description: a.description.clone(),
            })
            .collect()
    }
}

impl Default for AwardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_catalog() {
        let catalog = AwardCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("wapc").map(|a| a.counting), Some(CountingRule::RegionRecords));
        assert!(catalog.get("WAS").is_none());
        assert_eq!(WAPC_REGIONS.len(), 34);
    }

    #[test]
    fn test_condition_from_value() {
        let c = Condition::from_value(&json!({"type": "state_count", "target": 2, "states": ["bj", "SH"]})).unwrap();
        assert_eq!(
            c,
            Condition::StateCount {
                target: 2,
                states: vec!["BJ".to_string(), "SH".to_string()]
            }
        );

        let c = Condition::from_value(&json!({"type": "dxcc_count", "targets": [100, 10], "phases": ["a", "b"]})).unwrap();
        assert_eq!(
            c,
            Condition::DxccCount(DxccGoal::Phased {
                targets: vec![10, 100],
                phases: vec!["b".to_string(), "a".to_string()]
            })
        );

        let c = Condition::from_value(&json!({"type": "china_zone_count"})).unwrap();
        assert_eq!(c, Condition::ChinaZoneCount { target: 10 });
    }

    #[test]
    fn test_unsorted_targets_keep_their_labels() {
        let c = Condition::from_value(&json!({
            "type": "dxcc_count",
            "targets": [100, 10, 50, 200],
            "phases": ["Advanced", "Basic", "Intermediate"]
        }))
        .unwrap();
        assert_eq!(
            c,
            Condition::DxccCount(DxccGoal::Phased {
                targets: vec![10, 50, 100, 200],
                phases: vec![
                    "Basic".to_string(),
                    "Intermediate".to_string(),
                    "Advanced".to_string(),
                    String::new(),
                ]
            })
        );
    }

    #[test]
    fn test_non_string_phase_is_an_error() {
        let err = Condition::from_value(&json!({"type": "dxcc_count", "targets": [10], "phases": [1]})).unwrap_err();
        assert!(matches!(err, AwardError::InvalidParameter { ref reason, .. } if reason.contains("phases")));
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let c = Condition::from_value(&json!({"type": "bogus"})).unwrap();
        assert_eq!(c.kind(), "bogus");
    }

    #[test]
    fn test_missing_parameters_are_errors() {
        let err = Condition::from_value(&json!({"type": "dxcc_count"})).unwrap_err();
        assert!(matches!(err, AwardError::MissingParameter { ref param, .. } if param == "target"));

        let err = Condition::from_value(&json!({"type": "state_count", "target": 3})).unwrap_err();
        assert!(matches!(err, AwardError::MissingParameter { ref param, .. } if param == "states"));

        let err = Condition::from_value(&json!({"target": 3})).unwrap_err();
        assert!(matches!(err, AwardError::MissingParameter { ref param, .. } if param == "type"));

        let err = Condition::from_value(&json!({"type": "dxcc_count", "targets": []})).unwrap_err();
        assert!(matches!(err, AwardError::InvalidParameter { .. }));
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "was": {
                "name": "Worked All States",
                "conditions": [{"type": "state_count", "target": 2, "states": ["CA", "NY"]}]
            },
            "odd": {
                "name": "Odd",
                "counting": "distinct_entities",
                "conditions": [{"type": "bogus"}]
            }
        }"#;
        let catalog = AwardCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let was = catalog.get("WAS").unwrap();
        assert_eq!(was.counting, CountingRule::Resolved);
        assert_eq!(catalog.get("ODD").unwrap().counting, CountingRule::DistinctEntities);
    }
}
