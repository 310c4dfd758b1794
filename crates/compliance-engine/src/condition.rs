//! Condition expression parser
//!
//! A rule condition is a comparison against a numeric threshold, optionally
//! restricted to elements of a category:
//!
//! ```text
//! condition := [ category ":" ] predicate
//! predicate := operator? ws* number
//! operator  := ">=" | "<=" | ">" | "<" | "=" | <any other run of '<', '>', '='>
//! number    := [+-]? digits [ "." digits ]
//! ```
//!
//! The first colon splits the category from the predicate, so a category
//! cannot itself contain a colon. The operator token is the whole leading
//! run of comparison characters; only the exact symbols `>=`, `<=`, `>` and
//! `<` are ordering operators, everything else (including a missing
//! operator) is approximate equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConditionError;

/// Absolute tolerance for equality comparisons
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
}

impl Operator {
    fn from_token(token: &str) -> Self {
        match token {
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            _ => Operator::Eq,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Eq => "=",
        }
    }

    /// Compare `value` against `threshold`; `tolerance` only applies to `Eq`
    pub fn compare(&self, value: f64, threshold: f64, tolerance: f64) -> bool {
        match self {
            Operator::Ge => value >= threshold,
            Operator::Le => value <= threshold,
            Operator::Gt => value > threshold,
            Operator::Lt => value < threshold,
            Operator::Eq => (value - threshold).abs() < tolerance,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed rule condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCondition {
    pub category_filter: Option<String>,
    pub operator: Operator,
    pub threshold: f64,
}

impl ParsedCondition {
    /// Whether an element of `category` is subject to this condition.
    ///
    /// Matching is a case-sensitive substring test, so a "Residential"
    /// filter also applies to "Residential-A".
    pub fn applies_to(&self, category: &str) -> bool {
        match &self.category_filter {
            Some(filter) => category.contains(filter.as_str()),
            None => true,
        }
    }

    pub fn is_satisfied(&self, value: f64, tolerance: f64) -> bool {
        self.operator.compare(value, self.threshold, tolerance)
    }
}

impl fmt::Display for ParsedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(category) = &self.category_filter {
            write!(f, "{}: ", category)?;
        }
        write!(f, "{} {}", self.operator, self.threshold)
    }
}

impl FromStr for ParsedCondition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_condition(s)
    }
}

/// Parse a raw condition string such as `"Residential: >= 3"`
pub fn parse_condition(input: &str) -> Result<ParsedCondition, ConditionError> {
    if input.trim().is_empty() {
        return Err(ConditionError::Empty);
    }

    let (category_filter, predicate) = split_category(input)?;
    let (operator, threshold) = parse_predicate(predicate)?;

    Ok(ParsedCondition {
        category_filter,
        operator,
        threshold,
    })
}

fn split_category(input: &str) -> Result<(Option<String>, &str), ConditionError> {
    match input.split_once(':') {
        Some((category, predicate)) => {
            let category = category.trim();
            if category.is_empty() {
                return Err(ConditionError::EmptyCategory);
            }
            Ok((Some(category.to_string()), predicate))
        }
        None => Ok((None, input)),
    }
}

fn parse_predicate(predicate: &str) -> Result<(Operator, f64), ConditionError> {
    let predicate = predicate.trim();

    let op_end = predicate
        .find(|c: char| !matches!(c, '<' | '>' | '='))
        .unwrap_or(predicate.len());
    let (token, rest) = predicate.split_at(op_end);
    let operator = Operator::from_token(token);

    let literal = rest.trim_start();
    let number_end = scan_number(literal);
    if number_end == 0 {
        return Err(ConditionError::MissingThreshold(predicate.to_string()));
    }

    let (number, trailing) = literal.split_at(number_end);
    let trailing = trailing.trim();
    if !trailing.is_empty() {
        return Err(ConditionError::TrailingInput(trailing.to_string()));
    }

    let threshold = number
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| ConditionError::InvalidThreshold(number.to_string()))?;

    Ok((operator, threshold))
}

/// Byte length of the leading numeric literal, 0 if there is none
fn scan_number(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end == digits_start {
        0
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parsed(category: Option<&str>, operator: Operator, threshold: f64) -> ParsedCondition {
        ParsedCondition {
            category_filter: category.map(String::from),
            operator,
            threshold,
        }
    }

    #[test]
    fn test_parses_category_prefix() {
        assert_eq!(
            parse_condition("Residential: >= 3").unwrap(),
            parsed(Some("Residential"), Operator::Ge, 3.0)
        );
    }

    #[test]
    fn test_parses_bare_predicate() {
        assert_eq!(
            parse_condition(">= 3").unwrap(),
            parsed(None, Operator::Ge, 3.0)
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(parse_condition("<=6").unwrap().operator, Operator::Le);
        assert_eq!(parse_condition("< 6").unwrap().operator, Operator::Lt);
        assert_eq!(parse_condition(">=0.5").unwrap().operator, Operator::Ge);
        assert_eq!(parse_condition("> 0.5").unwrap().operator, Operator::Gt);
    }

    #[test]
    fn test_unrecognized_operators_fall_back_to_equality() {
        for condition in ["= 5", "== 5", "=> 5", "<> 5", "5"] {
            assert_eq!(
                parse_condition(condition).unwrap(),
                parsed(None, Operator::Eq, 5.0),
                "condition {:?}",
                condition
            );
        }
    }

    #[test]
    fn test_non_ascii_category() {
        assert_eq!(
            parse_condition("高层厂房:>=0.5").unwrap(),
            parsed(Some("高层厂房"), Operator::Ge, 0.5)
        );
    }

    #[test]
    fn test_first_colon_wins() {
        // "A:B" cannot be expressed as a category; the rest fails as a predicate
        assert_eq!(
            parse_condition("A:B: >= 1"),
            Err(ConditionError::MissingThreshold("B: >= 1".to_string()))
        );
    }

    #[test]
    fn test_rejects_malformed_conditions() {
        assert_eq!(parse_condition(""), Err(ConditionError::Empty));
        assert_eq!(parse_condition("   "), Err(ConditionError::Empty));
        assert_eq!(parse_condition(": >= 3"), Err(ConditionError::EmptyCategory));
        assert_eq!(
            parse_condition(">="),
            Err(ConditionError::MissingThreshold(">=".to_string()))
        );
        assert_eq!(
            parse_condition("Residential:"),
            Err(ConditionError::MissingThreshold(String::new()))
        );
        assert_eq!(
            parse_condition(">= abc"),
            Err(ConditionError::MissingThreshold(">= abc".to_string()))
        );
        assert_eq!(
            parse_condition(">= 1.2.3"),
            Err(ConditionError::InvalidThreshold("1.2.3".to_string()))
        );
        assert_eq!(
            parse_condition(">= 0.5m"),
            Err(ConditionError::TrailingInput("m".to_string()))
        );
    }

    #[test]
    fn test_overflowing_threshold_is_invalid() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(
            parse_condition(&format!("<= {}", huge)),
            Err(ConditionError::InvalidThreshold(huge))
        );
    }

    #[test]
    fn test_signed_and_fractional_thresholds() {
        assert_eq!(parse_condition("> -2").unwrap().threshold, -2.0);
        assert_eq!(parse_condition("< .5").unwrap().threshold, 0.5);
        assert_eq!(parse_condition("<= +10.25").unwrap().threshold, 10.25);
    }

    #[test]
    fn test_equality_tolerance() {
        let condition = parse_condition("== 5").unwrap();
        assert!(condition.is_satisfied(5.0009, DEFAULT_TOLERANCE));
        assert!(condition.is_satisfied(4.9991, DEFAULT_TOLERANCE));
        assert!(!condition.is_satisfied(5.002, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_ordering_operators_ignore_tolerance() {
        let condition = parse_condition(">= 5").unwrap();
        assert!(!condition.is_satisfied(4.9995, DEFAULT_TOLERANCE));
        assert!(condition.is_satisfied(5.0, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_category_filter_is_substring_match() {
        let condition = parse_condition("Residential: >= 3").unwrap();
        assert!(condition.applies_to("Residential-A"));
        assert!(condition.applies_to("Residential"));
        assert!(!condition.applies_to("Commercial"));
        assert!(!condition.applies_to("residential"));
        assert!(parse_condition(">= 3").unwrap().applies_to("anything"));
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let condition = parse_condition(" Warehouse :<=12.5").unwrap();
        assert_eq!(condition.to_string(), "Warehouse: <= 12.5");
        assert_eq!(condition.to_string().parse::<ParsedCondition>().unwrap(), condition);
    }
}
