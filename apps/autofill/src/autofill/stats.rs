use serde::{Deserialize, Serialize};

use crate::autofill::classifier::FieldTag;
use crate::autofill::context::WidgetType;
use crate::autofill::enumerator::FieldId;

/// What happened to one processed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOutcome {
    AutoFilled,
    ReviewNeeded,
    ManualRequired,
    KnockoutHandled,
}

/// Monotonic per-engine counters. Every processed field lands in exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub auto_filled: u32,
    pub review_needed: u32,
    pub manual_required: u32,
    pub knockouts_handled: u32,
}

impl RunStats {
    pub fn record(&mut self, outcome: FillOutcome) {
        match outcome {
            FillOutcome::AutoFilled => self.auto_filled += 1,
            FillOutcome::ReviewNeeded => self.review_needed += 1,
            FillOutcome::ManualRequired => self.manual_required += 1,
            FillOutcome::KnockoutHandled => self.knockouts_handled += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.auto_filled + self.review_needed + self.manual_required + self.knockouts_handled
    }

    /// Counter-wise difference, used to report what one pass added.
    pub fn since(&self, earlier: &RunStats) -> RunStats {
        RunStats {
            auto_filled: self.auto_filled - earlier.auto_filled,
            review_needed: self.review_needed - earlier.review_needed,
            manual_required: self.manual_required - earlier.manual_required,
            knockouts_handled: self.knockouts_handled - earlier.knockouts_handled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field_id: FieldId,
    pub label: String,
    pub tag: FieldTag,
    pub widget: WidgetType,
    pub outcome: FillOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_increments_one_counter() {
        let mut stats = RunStats::default();
        stats.record(FillOutcome::AutoFilled);
        stats.record(FillOutcome::AutoFilled);
        stats.record(FillOutcome::KnockoutHandled);
        stats.record(FillOutcome::ManualRequired);
        assert_eq!(stats.auto_filled, 2);
        assert_eq!(stats.knockouts_handled, 1);
        assert_eq!(stats.manual_required, 1);
        assert_eq!(stats.review_needed, 0);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_since() {
        let before = RunStats {
            auto_filled: 3,
            ..Default::default()
        };
        let mut after = before;
        after.record(FillOutcome::ReviewNeeded);
        let delta = after.since(&before);
        assert_eq!(delta.review_needed, 1);
        assert_eq!(delta.total(), 1);
    }

    #[test]
    fn test_outcome_serde() {
        assert_eq!(
            serde_json::to_string(&FillOutcome::ManualRequired).unwrap(),
            "\"manual_required\""
        );
        let json = serde_json::to_value(RunStats::default()).unwrap();
        assert_eq!(json["knockouts_handled"], 0);
    }
}
