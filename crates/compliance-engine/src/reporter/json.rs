//! JSON reporter for compliance reports

use anyhow::Result;
use shared_types::ComplianceReport;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format the report as JSON, pretty-printed when `pretty` is set
    pub fn format(report: &ComplianceReport, pretty: bool) -> Result<String> {
        let mut output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        output.push('\n');
        Ok(output)
    }
}
