//! Unit scale factors
//!
//! Element values are stored in the host's native unit (feet for lengths).
//! Dividing by a unit's factor expresses the value in the rule's unit.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    /// Factors used when no configuration overrides them
    static ref DEFAULT_FACTORS: BTreeMap<String, f64> = [
        ("m", 3.28084), // feet per metre
        ("h", 1.0),
        ("default", 1.0),
    ]
    .into_iter()
    .map(|(symbol, factor)| (symbol.to_string(), factor))
    .collect();
}

/// Symbol to scale factor mapping.
///
/// Unknown symbols scale by 1.0. That keeps a misspelled unit from blocking
/// a run, but it also means a typo silently disables conversion; callers
/// should check [`UnitTable::is_known`] and report unknown symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTable {
    factors: BTreeMap<String, f64>,
}

impl UnitTable {
    /// An empty table: every symbol scales by 1.0
    pub fn empty() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, symbol: &str, factor: f64) -> Self {
        self.insert(symbol, factor);
        self
    }

    pub fn insert(&mut self, symbol: &str, factor: f64) {
        self.factors.insert(symbol.trim().to_string(), factor);
    }

    /// Scale factor for `symbol`, 1.0 when it is empty or unknown
    pub fn scale_factor(&self, symbol: &str) -> f64 {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return 1.0;
        }
        self.factors.get(symbol).copied().unwrap_or(1.0)
    }

    /// True for configured symbols and for the empty (dimensionless) symbol
    pub fn is_known(&self, symbol: &str) -> bool {
        let symbol = symbol.trim();
        symbol.is_empty() || self.factors.contains_key(symbol)
    }

    /// Express a stored value in the unit named by `symbol`
    pub fn normalize(&self, value: f64, symbol: &str) -> f64 {
        value / self.scale_factor(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors.iter().map(|(s, f)| (s.as_str(), *f))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            factors: DEFAULT_FACTORS.clone(),
        }
    }
}
