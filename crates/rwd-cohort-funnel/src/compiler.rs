//! Criterion compilation over rule tables

use crate::rules::{RuleContext, RuleTable};
use rwd_cohort_types::Criterion;

/// Compiles criteria into count SQL using an inclusion and an exclusion
/// rule table
pub struct CriterionCompiler {
    inclusion: RuleTable,
    exclusion: RuleTable,
}

impl Default for CriterionCompiler {
    fn default() -> Self {
        Self::standard()
    }
}

impl CriterionCompiler {
    /// Compiler with the standard rule tables
    pub fn standard() -> Self {
        Self {
            inclusion: RuleTable::standard_inclusion(),
            exclusion: RuleTable::standard_exclusion(),
        }
    }

    /// Compiler with custom rule tables
    pub fn new(inclusion: RuleTable, exclusion: RuleTable) -> Self {
        Self {
            inclusion,
            exclusion,
        }
    }

    /// SQL counting patients satisfying an inclusion criterion
    ///
    /// The default rule yields `SELECT <base_count> AS cnt`: an unrecognized
    /// criterion is treated as satisfied by the whole base population.
    pub fn compile_inclusion(&self, criterion: &Criterion, base_count: i64) -> String {
        let sql = self.inclusion.compile(&RuleContext {
            criterion,
            cohort_count: base_count,
        });
        log::debug!(
            "inclusion {} -> rule {:?}",
            criterion.id,
            self.inclusion.matching_rule(criterion).unwrap_or("default"),
        );
        sql
    }

    /// SQL counting how many of the current cohort match an exclusion
    /// criterion
    ///
    /// The default rule yields `SELECT 0 AS cnt`: an unrecognized exclusion
    /// excludes nobody.
    pub fn compile_exclusion(&self, criterion: &Criterion, current_count: i64) -> String {
        let sql = self.exclusion.compile(&RuleContext {
            criterion,
            cohort_count: current_count,
        });
        log::debug!(
            "exclusion {} -> rule {:?}",
            criterion.id,
            self.exclusion.matching_rule(criterion).unwrap_or("default"),
        );
        sql
    }
}
