//! Funnel output types

use serde::{Deserialize, Serialize};

/// Whether a funnel step narrows the cohort (inclusion) or removes matches
/// from it (exclusion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Inclusion,
    Exclusion,
}

/// One step of the patient attrition funnel
///
/// Steps are emitted in criteria order and never mutated after creation.
/// `percentage` is always computed against the fixed base population captured
/// once per funnel run, never against a moving denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStep {
    /// Criterion id this step was produced from
    pub id: String,
    /// Display name (exclusion steps carry an "Exclude: " prefix)
    pub name: String,
    /// Step kind
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Cohort size after this step
    pub count: i64,
    /// `count` as a percentage of the base population
    pub percentage: f64,
    /// Patients removed by this step
    pub drop_count: i64,
    /// `drop_count` as a percentage of the cohort entering this step
    pub drop_pct: f64,
}

/// Complete what-if funnel result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelResult {
    /// Population size before any criterion is applied
    pub base_count: i64,
    /// Cohort size after all enabled criteria
    pub final_count: i64,
    /// Attrition steps in processing order
    pub steps: Vec<FunnelStep>,
}

impl FunnelResult {
    /// True if every step's count is no larger than the preceding cohort size
    ///
    /// Useful in assertions; the engine maintains this by construction.
    pub fn is_monotonic(&self) -> bool {
        let mut current = self.base_count;
        for step in &self.steps {
            if step.count > current {
                return false;
            }
            current = step.count;
        }
        true
    }
}

/// One row of the coarse attrition summary shown alongside a generated
/// cohort query (base population, fixed intermediate filters, final cohort)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStep {
    /// Step label (e.g. "Base Population", "Final Cohort")
    pub step: String,
    /// Patient count at this step
    pub count: i64,
    /// Percentage of the base population, rounded to 1 decimal
    pub pct: f64,
}
