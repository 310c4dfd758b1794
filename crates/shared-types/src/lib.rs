pub mod binding;
pub mod element;
pub mod types;

pub use binding::Binding;
pub use element::{AttributeValue, ElementDocument, ElementRecord};
pub use types::{ComplianceReport, Outcome, ReportSummary, Rule, RuleDocument};
