//! Console reporter for compliance reports

use anyhow::Result;
use std::fmt::Write;

use shared_types::{ComplianceReport, Outcome, ReportSummary};

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format the report as a headline, a tally and one bullet per issue
    pub fn format(report: &ComplianceReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        writeln!(output, "{}", headline(summary))?;
        writeln!(
            output,
            "Checked {} element/rule pairs: {} compliant, {} violations, {} config errors, {} missing data, {} evaluation errors",
            summary.pairs_evaluated,
            summary.compliant,
            summary.violations,
            summary.config_errors,
            summary.missing_data,
            summary.eval_errors
        )?;

        if !report.has_issues() {
            return Ok(output);
        }

        writeln!(output)?;
        for message in report.issues().filter_map(describe) {
            // continuation lines sit under the bullet text
            writeln!(output, "• {}", message.replace('\n', "\n   "))?;
        }

        Ok(output)
    }
}

fn headline(summary: &ReportSummary) -> String {
    match summary.issue_count() {
        0 => "No compliance issues found: all checks satisfy the rules".to_string(),
        1 => "Found 1 compliance issue".to_string(),
        n => format!("Found {} compliance issues", n),
    }
}

/// Human-readable message for one outcome, `None` for compliant pairs
pub fn describe(outcome: &Outcome) -> Option<String> {
    let message = match outcome {
        Outcome::Compliant => return None,
        Outcome::Violation {
            clause,
            element_id,
            category,
            parameter,
            raw_value,
            display_unit,
            condition_text,
            note,
        } => {
            let mut message = format!(
                "[{}] Element {} ({})\nParameter: {}\nCurrent value: {:.2}{}\nRequirement: {}",
                clause, element_id, category, parameter, raw_value, display_unit, condition_text
            );
            if !note.is_empty() {
                message.push_str(&format!("\nNote: {}", note));
            }
            message
        }
        Outcome::ConfigError { parameter } => {
            format!("[Config error] Parameter {} has no binding", parameter)
        }
        Outcome::MissingData {
            element_id,
            parameter,
        } => format!(
            "[Missing data] Element {} lacks parameter {}",
            element_id, parameter
        ),
        Outcome::EvalError { clause, detail } => {
            format!("[Evaluation error] Checking {} failed: {}", clause, detail)
        }
    };
    Some(message)
}
