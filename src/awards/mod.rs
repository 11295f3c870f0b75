// Award module - catalog, record enhancement and evaluation

pub mod checker;
pub mod conditions;
pub mod enhance;

pub use checker::{AwardChecker, ConditionDetail, ConditionResult, EvaluationResult};
pub use conditions::{AwardCatalog, AwardDefinition, AwardSummary, Condition, CountingRule, DxccGoal};
pub use enhance::{enhance_record, enhance_records};
