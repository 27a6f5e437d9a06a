//! Criterion-to-SQL rule tables
//!
//! A rule table is an ordered list of (predicate, template) pairs evaluated
//! first-match-wins with an explicit default, so new clinical concepts are
//! added by appending a rule rather than growing a conditional cascade.
//! Templates produce COUNT queries with a `cnt` result column.

use rwd_cohort_types::{Criterion, Domain};
use std::sync::Arc;

/// Predicate deciding whether a rule applies to a criterion
pub type RulePredicate = Arc<dyn Fn(&Criterion) -> bool + Send + Sync>;

/// Template producing the count SQL for a matched criterion
pub type SqlTemplate = Arc<dyn Fn(&RuleContext<'_>) -> String + Send + Sync>;

/// Context available to SQL templates
pub struct RuleContext<'a> {
    /// Criterion being compiled
    pub criterion: &'a Criterion,
    /// Cohort size the template may reference: the base population for
    /// inclusion compilation, the current cohort for exclusion compilation
    pub cohort_count: i64,
}

/// One dispatch rule
pub struct SqlRule {
    name: &'static str,
    predicate: RulePredicate,
    template: SqlTemplate,
}

impl SqlRule {
    /// Create a rule
    pub fn new(name: &'static str, predicate: RulePredicate, template: SqlTemplate) -> Self {
        Self {
            name,
            predicate,
            template,
        }
    }

    /// Rule name, for logs and tests
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this rule applies to the criterion
    pub fn applies(&self, criterion: &Criterion) -> bool {
        (self.predicate)(criterion)
    }
}

/// Ordered rule table with an explicit default template
pub struct RuleTable {
    rules: Vec<SqlRule>,
    default_template: SqlTemplate,
}

impl RuleTable {
    /// Empty table with the given default
    pub fn new(default_template: SqlTemplate) -> Self {
        Self {
            rules: Vec::new(),
            default_template,
        }
    }

    /// Append a rule; later rules only fire when earlier ones do not
    pub fn with_rule(mut self, rule: SqlRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Number of non-default rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if only the default template is present
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Name of the first matching rule, if any
    pub fn matching_rule(&self, criterion: &Criterion) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.applies(criterion))
            .map(SqlRule::name)
    }

    /// Compile the first matching rule, or the default
    pub fn compile(&self, context: &RuleContext<'_>) -> String {
        for rule in &self.rules {
            if rule.applies(context.criterion) {
                return (rule.template)(context);
            }
        }
        (self.default_template)(context)
    }

    /// Standard inclusion rules: age demographics, type 2 diabetes,
    /// metformin exposure; everything else is treated as already satisfied
    /// by the whole cohort
    pub fn standard_inclusion() -> Self {
        Self::new(Arc::new(|ctx: &RuleContext<'_>| {
            format!("SELECT {} AS cnt", ctx.cohort_count)
        }))
        .with_rule(SqlRule::new(
            "age-demographic",
            Arc::new(|c: &Criterion| {
                c.domain == Domain::Demographic || c.concept_lower().contains("age")
            }),
            Arc::new(|_| {
                "SELECT COUNT(*) AS cnt FROM patients WHERE age BETWEEN 18 AND 75".to_string()
            }),
        ))
        .with_rule(SqlRule::new(
            "t2dm-diagnosis",
            Arc::new(|c: &Criterion| {
                let concept = c.concept_lower();
                c.domain == Domain::Diagnosis
                    || concept.contains("diabetes")
                    || concept.contains("type 2")
            }),
            Arc::new(|_| diagnosis_count_sql("E11%")),
        ))
        .with_rule(SqlRule::new(
            "metformin-drug",
            Arc::new(|c: &Criterion| {
                c.domain == Domain::Drug || c.concept_lower().contains("metformin")
            }),
            Arc::new(|_| {
                "SELECT COUNT(DISTINCT patient_id) AS cnt FROM claims \
                 WHERE drug_name LIKE '%Metformin%'"
                    .to_string()
            }),
        ))
    }

    /// Standard exclusion rules: heart failure and cancer; everything else
    /// excludes nobody
    pub fn standard_exclusion() -> Self {
        Self::new(Arc::new(|_: &RuleContext<'_>| "SELECT 0 AS cnt".to_string()))
            .with_rule(SqlRule::new(
                "heart-failure",
                Arc::new(|c: &Criterion| {
                    let concept = c.concept_lower();
                    concept.contains("heart failure") || concept.contains("heart")
                }),
                Arc::new(|_| diagnosis_count_sql("I50%")),
            ))
            .with_rule(SqlRule::new(
                "cancer",
                Arc::new(|c: &Criterion| c.concept_lower().contains("cancer")),
                Arc::new(|_| diagnosis_count_sql("C%")),
            ))
    }
}

/// Distinct-patient count over all three diagnosis columns for a code prefix
fn diagnosis_count_sql(pattern: &str) -> String {
    format!(
        "SELECT COUNT(DISTINCT patient_id) AS cnt FROM claims \
         WHERE primary_diagnosis_code LIKE '{pattern}' \
         OR secondary_diagnosis_code LIKE '{pattern}' \
         OR tertiary_diagnosis_code LIKE '{pattern}'"
    )
}
