//! Rule-based compliance checking for building elements
//!
//! Rules such as fire-safety clauses are loaded from a JSON document, each
//! carrying a condition like `"Residential: >= 3"`. The engine reads the
//! named attribute off every element, scales it into the rule's unit and
//! records one [`Outcome`](shared_types::Outcome) per (element, rule) pair.
//!
//! ```no_run
//! use compliance_engine::{ComplianceEngine, RuleSet};
//! use compliance_engine::reporter::{OutputFormat, Reporter};
//! use shared_types::ElementDocument;
//!
//! # fn example(elements: ElementDocument) -> anyhow::Result<()> {
//! let rules = RuleSet::load("firewall_rules.json")?;
//! let report = ComplianceEngine::default().check(&elements.elements, &rules);
//! Reporter::new(OutputFormat::Console).report(&report)?;
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod reporter;
pub mod resolver;
pub mod rules;
pub mod units;

pub use condition::{parse_condition, Operator, ParsedCondition, DEFAULT_TOLERANCE};
pub use config::CheckerConfig;
pub use element::{Element, UNCLASSIFIED};
pub use engine::ComplianceEngine;
pub use error::{ConditionError, EvalFailure, ResolveError, RuleDefect, RuleStoreError};
pub use resolver::ParameterResolver;
pub use rules::{CompiledRule, RuleSet};
pub use units::UnitTable;
