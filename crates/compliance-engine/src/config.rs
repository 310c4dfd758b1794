//! Checker configuration
//!
//! Bindings, unit factors and evaluation settings are read from a TOML
//! file. Every section is optional; an omitted section falls back to the
//! built-in defaults, a present section replaces them entirely.
//!
//! ```toml
//! [bindings]
//! Wall_Height = { builtin = "WALL_USER_HEIGHT_PARAM" }
//! Distance = { shared = "0af14e6a-00a9-4236-849d-4800b3813c11" }
//!
//! [units]
//! m = 3.28084
//! h = 1.0
//!
//! [evaluation]
//! equality_tolerance = 0.001
//! unclassified_category = "unclassified"
//! ```

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use shared_types::Binding;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::condition::DEFAULT_TOLERANCE;
use crate::element::UNCLASSIFIED;
use crate::engine::ComplianceEngine;
use crate::resolver::ParameterResolver;
use crate::units::UnitTable;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Logical parameter name to binding
    #[serde(default = "default_bindings")]
    pub bindings: BTreeMap<String, Binding>,
    /// Unit symbol to scale factor
    #[serde(default)]
    pub units: UnitTable,
    /// Comparison settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl CheckerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - A unit factor or the tolerance is unusable
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every comparison meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        for (symbol, factor) in self.units.iter() {
            ensure!(
                factor.is_finite() && factor != 0.0,
                "Unit '{}' has unusable scale factor {}",
                symbol,
                factor
            );
        }
        let tolerance = self.evaluation.equality_tolerance;
        ensure!(
            tolerance.is_finite() && tolerance >= 0.0,
            "Equality tolerance must be a non-negative number, got {}",
            tolerance
        );
        Ok(())
    }

    /// Build an engine from this configuration
    pub fn engine(&self) -> ComplianceEngine {
        ComplianceEngine::new(
            ParameterResolver::new(self.bindings.clone()),
            self.units.clone(),
        )
        .with_tolerance(self.evaluation.equality_tolerance)
        .with_unclassified_category(&self.evaluation.unclassified_category)
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            bindings: default_bindings(),
            units: UnitTable::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

fn default_bindings() -> BTreeMap<String, Binding> {
    ParameterResolver::default()
        .bindings()
        .map(|(name, binding)| (name.to_string(), binding.clone()))
        .collect()
}

/// Comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Absolute tolerance for equality conditions (default: 0.001)
    #[serde(default = "default_tolerance")]
    pub equality_tolerance: f64,
    /// Category label for elements without one (default: "unclassified")
    #[serde(default = "default_unclassified")]
    pub unclassified_category: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            equality_tolerance: DEFAULT_TOLERANCE,
            unclassified_category: UNCLASSIFIED.to_string(),
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_unclassified() -> String {
    UNCLASSIFIED.to_string()
}
