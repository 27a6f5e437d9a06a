//! What-if funnel computation
//!
//! Applies enabled criteria in document order against a base population,
//! recomputing the remaining cohort after each step. Two degrade-gracefully
//! policies are deliberate and load-bearing:
//!
//! - a failed base-population query falls back to a fixed default so the
//!   funnel display never hard-fails on a transient error, and
//! - a criterion whose count query fails (or returns no rows) contributes no
//!   step and leaves the running count unchanged; the only trace is a
//!   warning log.

use crate::compiler::CriterionCompiler;
use rwd_cohort_store::SqlExecutor;
use rwd_cohort_types::{
    CriteriaDocument, Criterion, Domain, ExecutionMode, ExecutionResult, FunnelResult, FunnelStep,
    StepType, SummaryStep,
};
use std::sync::Arc;

/// Fallback population size when the base-count query fails
pub const DEFAULT_BASE_POPULATION: i64 = 500;

const BASE_COUNT_SQL: &str = "SELECT COUNT(*) AS cnt FROM patients";

/// Sequential funnel engine over a guarded executor
pub struct FunnelEngine {
    executor: Arc<SqlExecutor>,
    compiler: CriterionCompiler,
    fallback_population: i64,
}

impl FunnelEngine {
    /// Engine with the standard compiler
    pub fn new(executor: Arc<SqlExecutor>) -> Self {
        Self::with_compiler(executor, CriterionCompiler::standard())
    }

    /// Engine with a custom compiler
    pub fn with_compiler(executor: Arc<SqlExecutor>, compiler: CriterionCompiler) -> Self {
        Self {
            executor,
            compiler,
            fallback_population: DEFAULT_BASE_POPULATION,
        }
    }

    /// Override the fallback population size
    pub fn with_fallback_population(mut self, fallback: i64) -> Self {
        self.fallback_population = fallback;
        self
    }

    /// Compute the what-if funnel for the enabled criteria
    ///
    /// Criteria whose ids are not in the enabled lists are skipped entirely.
    /// `current_count` is monotonically non-increasing across emitted steps,
    /// and every percentage is relative to the base population captured at
    /// the start of the run.
    pub fn what_if(
        &self,
        criteria: &CriteriaDocument,
        enabled_inclusion: &[String],
        enabled_exclusion: &[String],
    ) -> FunnelResult {
        let base_count = self.base_population();
        let mut current_count = base_count;
        let mut steps = Vec::new();

        for criterion in &criteria.inclusion {
            if !enabled_inclusion.iter().any(|id| id == &criterion.id) {
                continue;
            }
            let sql = self.compiler.compile_inclusion(criterion, base_count);
            let Some(new_count) = self.count_query(criterion, &sql) else {
                continue;
            };
            let drop_count = current_count - new_count;
            steps.push(FunnelStep {
                id: criterion.id.clone(),
                name: criterion.display_name().to_string(),
                step_type: StepType::Inclusion,
                count: new_count,
                percentage: percentage_of(new_count, base_count),
                drop_count,
                drop_pct: percentage_of(drop_count, current_count),
            });
            current_count = new_count;
        }

        for criterion in &criteria.exclusion {
            if !enabled_exclusion.iter().any(|id| id == &criterion.id) {
                continue;
            }
            let sql = self.compiler.compile_exclusion(criterion, current_count);
            let Some(excluded_count) = self.count_query(criterion, &sql) else {
                continue;
            };
            // The exclusion query reports how many of the current cohort
            // match; the step records who remains.
            let new_count = current_count - excluded_count;
            steps.push(FunnelStep {
                id: criterion.id.clone(),
                name: format!("Exclude: {}", criterion.display_name()),
                step_type: StepType::Exclusion,
                count: new_count,
                percentage: percentage_of(new_count, base_count),
                drop_count: excluded_count,
                drop_pct: percentage_of(excluded_count, current_count),
            });
            current_count = new_count;
        }

        FunnelResult {
            base_count,
            final_count: current_count,
            steps,
        }
    }

    /// Coarse attrition summary for a generated cohort query's result:
    /// base population, the fixed intermediate filters present in the
    /// criteria, and the final cohort size
    pub fn attrition_summary(
        &self,
        criteria: &CriteriaDocument,
        final_cohort: &ExecutionResult,
    ) -> Vec<SummaryStep> {
        let base_count = self.base_population();
        let mut steps = vec![SummaryStep {
            step: "Base Population".to_string(),
            count: base_count,
            pct: 100.0,
        }];

        if criteria
            .inclusion
            .iter()
            .any(|c| c.domain == Domain::Demographic)
        {
            let result = self.executor.run(
                "SELECT COUNT(*) AS cnt FROM patients WHERE age BETWEEN 18 AND 75",
                ExecutionMode::Preview,
            );
            if let Some(count) = result.scalar_i64("cnt").filter(|_| result.ok) {
                steps.push(SummaryStep {
                    step: "Age Filter (18-75)".to_string(),
                    count,
                    pct: round1(percentage_of(count, base_count)),
                });
            }
        }

        if criteria
            .inclusion
            .iter()
            .any(|c| c.domain == Domain::Diagnosis)
        {
            let result = self.executor.run(
                "SELECT COUNT(DISTINCT patient_id) AS cnt FROM claims \
                 WHERE primary_diagnosis_code LIKE 'E11%'",
                ExecutionMode::Preview,
            );
            if let Some(count) = result.scalar_i64("cnt").filter(|_| result.ok) {
                steps.push(SummaryStep {
                    step: "Type 2 Diabetes".to_string(),
                    count,
                    pct: round1(percentage_of(count, base_count)),
                });
            }
        }

        let final_count = final_cohort.row_count() as i64;
        steps.push(SummaryStep {
            step: "Final Cohort".to_string(),
            count: final_count,
            pct: round1(percentage_of(final_count, base_count)),
        });

        steps
    }

    /// Base population, with the documented fallback on failure
    fn base_population(&self) -> i64 {
        let result = self.executor.run(BASE_COUNT_SQL, ExecutionMode::Preview);
        if result.ok {
            result
                .scalar_i64("cnt")
                .unwrap_or(self.fallback_population)
        } else {
            log::warn!(
                "base population query failed ({}); using fallback {}",
                result.error.as_deref().unwrap_or("no error detail"),
                self.fallback_population,
            );
            self.fallback_population
        }
    }

    /// Run a compiled count query; `None` means the step is omitted
    fn count_query(&self, criterion: &Criterion, sql: &str) -> Option<i64> {
        let result = self.executor.run(sql, ExecutionMode::Preview);
        let count = result.scalar_i64("cnt").filter(|_| result.ok);
        if count.is_none() {
            log::warn!(
                "criterion {} query produced no count ({}); step omitted",
                criterion.id,
                result.error.as_deref().unwrap_or("empty result"),
            );
        }
        count
    }
}

/// `part / whole * 100`, or 0 when the denominator is 0
fn percentage_of(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
