//! Rule store
//!
//! Loads a rule document (`{ "rules": [...] }`) and validates every rule up
//! front. Loading is all-or-nothing: the first bad rule fails the whole
//! load, so evaluation never runs against a partial rule set.

use std::fs;
use std::io;
use std::path::Path;

use shared_types::{Rule, RuleDocument};
use tracing::{info, instrument, warn};

use crate::condition::{parse_condition, ParsedCondition};
use crate::error::{RuleDefect, RuleStoreError};
use crate::units::UnitTable;

/// A validated rule paired with its parsed condition
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    rule: Rule,
    condition: ParsedCondition,
}

impl CompiledRule {
    pub fn compile(rule: Rule) -> Result<Self, RuleDefect> {
        if rule.parameter.trim().is_empty() {
            return Err(RuleDefect::EmptyParameter);
        }
        let condition = parse_condition(&rule.condition)?;
        Ok(Self { rule, condition })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn condition(&self) -> &ParsedCondition {
        &self.condition
    }
}

/// An ordered, fully validated set of rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Load a rule document from a UTF-8 JSON file
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RuleStoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RuleStoreError::NotFound(path.to_path_buf()),
            _ => RuleStoreError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        let text = String::from_utf8(bytes).map_err(|err| {
            RuleStoreError::MalformedDocument(format!("rule file is not valid UTF-8: {}", err))
        })?;

        let rules = Self::from_json_str(&text)?;
        info!(rules = rules.len(), "Loaded rule set");
        Ok(rules)
    }

    /// Parse and validate a rule document held in memory
    pub fn from_json_str(text: &str) -> Result<Self, RuleStoreError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let document: RuleDocument = serde_json::from_str(text)
            .map_err(|err| RuleStoreError::MalformedDocument(err.to_string()))?;
        Self::from_rules(document.rules)
    }

    /// Validate already-deserialized rules, keeping their order
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, RuleStoreError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.into_iter().enumerate() {
            let clause = rule.clause.clone();
            let rule = CompiledRule::compile(rule).map_err(|reason| {
                warn!(index, clause = %clause, %reason, "Rejected rule");
                RuleStoreError::MalformedRule {
                    index,
                    clause,
                    reason,
                }
            })?;
            compiled.push(rule);
        }
        Ok(Self { rules: compiled })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose unit symbol is missing from `units` and will compare unscaled
    pub fn unknown_units<'a>(
        &'a self,
        units: &'a UnitTable,
    ) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.rules
            .iter()
            .filter(move |compiled| !units.is_known(&compiled.rule.unit))
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
