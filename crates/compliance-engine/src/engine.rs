//! Compliance evaluator
//!
//! Runs every rule against every element and records one [`Outcome`] per
//! pair. Pair-level failures become outcomes; nothing here aborts a run.

use std::borrow::Cow;

use shared_types::{ComplianceReport, Outcome, Rule};
use tracing::{debug, info, instrument, warn};

use crate::condition::{parse_condition, ParsedCondition, DEFAULT_TOLERANCE};
use crate::element::{Element, UNCLASSIFIED};
use crate::error::{ConditionError, EvalFailure};
use crate::resolver::ParameterResolver;
use crate::rules::{CompiledRule, RuleSet};
use crate::units::UnitTable;

/// Evaluates rule sets against host elements
#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    resolver: ParameterResolver,
    units: UnitTable,
    tolerance: f64,
    unclassified: String,
}

impl ComplianceEngine {
    pub fn new(resolver: ParameterResolver, units: UnitTable) -> Self {
        Self {
            resolver,
            units,
            tolerance: DEFAULT_TOLERANCE,
            unclassified: UNCLASSIFIED.to_string(),
        }
    }

    /// Absolute tolerance for equality conditions
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Category label for elements the host reports without one
    pub fn with_unclassified_category(mut self, label: &str) -> Self {
        self.unclassified = label.to_string();
        self
    }

    pub fn resolver(&self) -> &ParameterResolver {
        &self.resolver
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Evaluate all (element, rule) pairs.
    ///
    /// Outcomes are ordered by element, then by rule. Pairs removed by a
    /// category filter produce nothing.
    #[instrument(skip_all, fields(rules = rules.len()))]
    pub fn evaluate<'a, E, I>(&self, elements: I, rules: &RuleSet) -> Vec<Outcome>
    where
        I: IntoIterator<Item = &'a E>,
        E: Element + ?Sized + 'a,
    {
        for compiled in rules.unknown_units(&self.units) {
            warn!(
                clause = %compiled.rule().clause,
                unit = %compiled.rule().unit,
                "Unknown unit symbol, values will be compared unscaled"
            );
        }

        let mut outcomes = Vec::new();
        let mut elements_seen = 0usize;
        for element in elements {
            elements_seen += 1;
            for compiled in rules {
                if let Some(outcome) = self.evaluate_pair(element, compiled) {
                    outcomes.push(outcome);
                }
            }
        }

        info!(
            elements = elements_seen,
            outcomes = outcomes.len(),
            "Evaluation finished"
        );
        outcomes
    }

    /// Evaluate and wrap the outcomes in a timestamped report
    pub fn check<'a, E, I>(&self, elements: I, rules: &RuleSet) -> ComplianceReport
    where
        I: IntoIterator<Item = &'a E>,
        E: Element + ?Sized + 'a,
    {
        ComplianceReport::new(self.evaluate(elements, rules))
    }

    /// Evaluate one pair using the condition parsed at load time
    pub fn evaluate_pair<E: Element + ?Sized>(
        &self,
        element: &E,
        compiled: &CompiledRule,
    ) -> Option<Outcome> {
        self.run(element, compiled.rule(), || {
            Ok(Cow::Borrowed(compiled.condition()))
        })
    }

    /// Evaluate one pair, parsing the rule's condition on the spot.
    ///
    /// Gives the same result as [`evaluate_pair`](Self::evaluate_pair) for
    /// valid rules; an unparseable condition becomes an `EvalError`.
    pub fn evaluate_rule<E: Element + ?Sized>(&self, element: &E, rule: &Rule) -> Option<Outcome> {
        self.run(element, rule, || parse_condition(&rule.condition).map(Cow::Owned))
    }

    fn run<'r, E, F>(&self, element: &E, rule: &Rule, condition: F) -> Option<Outcome>
    where
        E: Element + ?Sized,
        F: FnOnce() -> Result<Cow<'r, ParsedCondition>, ConditionError>,
    {
        match self.check_pair(element, rule, condition) {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(
                    clause = %rule.clause,
                    element = element.id(),
                    %failure,
                    "Rule evaluation failed"
                );
                Some(Outcome::EvalError {
                    clause: rule.clause.clone(),
                    detail: failure.to_string(),
                })
            }
        }
    }

    fn check_pair<'r, E, F>(
        &self,
        element: &E,
        rule: &Rule,
        condition: F,
    ) -> Result<Option<Outcome>, EvalFailure>
    where
        E: Element + ?Sized,
        F: FnOnce() -> Result<Cow<'r, ParsedCondition>, ConditionError>,
    {
        let Ok(binding) = self.resolver.resolve(&rule.parameter) else {
            return Ok(Some(Outcome::ConfigError {
                parameter: rule.parameter.clone(),
            }));
        };

        let Some(raw) = element.attribute(binding) else {
            return Ok(Some(Outcome::MissingData {
                element_id: element.id().to_string(),
                parameter: rule.parameter.clone(),
            }));
        };

        let condition = condition()?;

        let category = element.category().unwrap_or(&self.unclassified);
        if !condition.applies_to(category) {
            debug!(
                clause = %rule.clause,
                element = element.id(),
                category,
                "Category filter does not match, skipping"
            );
            return Ok(None);
        }

        let value = raw.as_number().ok_or_else(|| EvalFailure::NonNumeric {
            parameter: rule.parameter.clone(),
            value: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(EvalFailure::NonFinite {
                parameter: rule.parameter.clone(),
            });
        }

        let factor = self.units.scale_factor(&rule.unit);
        let normalized = value / factor;
        if !normalized.is_finite() {
            return Err(EvalFailure::InvalidScale {
                unit: rule.unit.clone(),
                factor,
            });
        }

        let satisfied = condition.is_satisfied(normalized, self.tolerance);
        debug!(
            clause = %rule.clause,
            element = element.id(),
            value,
            normalized,
            satisfied,
            "Evaluated rule"
        );

        if satisfied {
            return Ok(Some(Outcome::Compliant));
        }

        Ok(Some(Outcome::Violation {
            clause: rule.clause.clone(),
            element_id: element.id().to_string(),
            category: category.to_string(),
            parameter: rule.parameter.clone(),
            raw_value: value,
            display_unit: rule.unit.clone(),
            condition_text: rule.condition.clone(),
            note: rule.note.clone(),
        }))
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(ParameterResolver::default(), UnitTable::default())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::ElementRecord;

    fn operator_symbol() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just(">="),
            Just("<="),
            Just(">"),
            Just("<"),
            Just("="),
            Just("=="),
        ]
    }

    proptest! {
        /// Property: a GE rule is compliant exactly when value / scale >= threshold
        #[test]
        fn ge_verdict_matches_scaled_comparison(
            value in -1.0e6f64..1.0e6,
            threshold in -1.0e3f64..1.0e3,
            unit in prop_oneof![Just("m"), Just("h"), Just(""), Just("xyz")],
        ) {
            let engine = ComplianceEngine::default();
            let rule_set = RuleSet::from_rules(vec![
                Rule::new("p", "Wall_Height", &format!(">= {}", threshold)).with_unit(unit),
            ]).unwrap();
            let element = ElementRecord::new("e").with_number("WALL_USER_HEIGHT_PARAM", value);

            let outcomes = engine.evaluate(&[element], &rule_set);
            let expected = value / engine.units().scale_factor(unit) >= threshold;
            prop_assert_eq!(outcomes.len(), 1);
            prop_assert_eq!(outcomes[0].is_compliant(), expected);
        }

        /// Property: cached and freshly parsed conditions give the same outcome
        #[test]
        fn cached_and_recomputed_agree(
            op in operator_symbol(),
            threshold in 0u32..10_000,
            value in 0.0f64..200.0,
            category in prop_oneof![Just(""), Just("Residential: "), Just("Office: ")],
            element_category in prop_oneof![Just("Residential-A"), Just("Office"), Just("Storage")],
        ) {
            let engine = ComplianceEngine::default();
            let condition = format!("{}{} {}", category, op, f64::from(threshold) / 100.0);
            let rule = Rule::new("c", "Wall_Height", &condition).with_unit("m");
            let compiled = CompiledRule::compile(rule.clone()).unwrap();
            let element = ElementRecord::new("e")
                .with_category(element_category)
                .with_number("WALL_USER_HEIGHT_PARAM", value);

            prop_assert_eq!(
                engine.evaluate_pair(&element, &compiled),
                engine.evaluate_rule(&element, &rule)
            );
        }

        /// Property: an unbound parameter yields ConfigError whatever the element holds
        #[test]
        fn unbound_parameter_always_config_error(
            name in "[A-Za-z_]{1,20}",
            value in proptest::option::of(-100.0f64..100.0),
            category in proptest::option::of("[A-Za-z]{1,10}"),
        ) {
            let resolver = ParameterResolver::empty();
            let engine = ComplianceEngine::new(resolver, UnitTable::default());
            let rule_set = RuleSet::from_rules(vec![Rule::new("u", &name, ">= 1")]).unwrap();

            let mut element = ElementRecord::new("e");
            if let Some(v) = value {
                element = element.with_number(&name, v);
            }
            if let Some(c) = &category {
                element = element.with_category(c);
            }

            prop_assert_eq!(
                engine.evaluate(&[element], &rule_set),
                vec![Outcome::ConfigError { parameter: name.clone() }]
            );
        }
    }
}
