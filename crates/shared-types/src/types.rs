/// A single compliance requirement as authored in a rule document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub clause: String, // e.g., "GB50016-6.1.1"
    pub parameter: String, // logical attribute key, e.g., "Wall_Height"
    pub condition: String, // raw expression, e.g., "Residential: >= 3"
    #[serde(default)]
    pub unit: String, // empty means dimensionless
    #[serde(default)]
    pub note: String,
}

impl Rule {
    pub fn new(clause: &str, parameter: &str, condition: &str) -> Self {
        Self {
            clause: clause.to_string(),
            parameter: parameter.to_string(),
            condition: condition.to_string(),
            unit: String::new(),
            note: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }
}

/// Top-level shape of a rule document: `{ "rules": [ ... ] }`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RuleDocument {
    pub rules: Vec<Rule>,
}

/// Result of checking one rule against one element.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Compliant,
    Violation {
        clause: String,
        element_id: String,
        category: String,
        parameter: String,
        raw_value: f64, // as stored on the element, before unit scaling
        display_unit: String,
        condition_text: String,
        note: String,
    },
    ConfigError {
        parameter: String,
    },
    MissingData {
        element_id: String,
        parameter: String,
    },
    EvalError {
        clause: String,
        detail: String,
    },
}

impl Outcome {
    pub fn is_compliant(&self) -> bool {
        matches!(self, Outcome::Compliant)
    }

    /// Every non-compliant kind counts as an issue, errors included
    pub fn is_issue(&self) -> bool {
        !self.is_compliant()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportSummary {
    pub pairs_evaluated: usize, // filtered-out pairs are not counted
    pub compliant: usize,
    pub violations: usize,
    pub config_errors: usize,
    pub missing_data: usize,
    pub eval_errors: usize,
}

impl ReportSummary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.pairs_evaluated += 1;
            match outcome {
                Outcome::Compliant => summary.compliant += 1,
                Outcome::Violation { .. } => summary.violations += 1,
                Outcome::ConfigError { .. } => summary.config_errors += 1,
                Outcome::MissingData { .. } => summary.missing_data += 1,
                Outcome::EvalError { .. } => summary.eval_errors += 1,
            }
        }
        summary
    }

    /// Headline count: all non-compliant outcomes
    pub fn issue_count(&self) -> usize {
        self.violations + self.config_errors + self.missing_data + self.eval_errors
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ComplianceReport {
    pub run_id: String,
    pub outcomes: Vec<Outcome>, // element order x rule order
    pub summary: ReportSummary,
    pub checked_at: String, // RFC 3339
}

impl ComplianceReport {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            summary: ReportSummary::from_outcomes(&outcomes),
            outcomes,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_issue())
    }

    pub fn has_issues(&self) -> bool {
        self.summary.issue_count() > 0
    }
}
