//! Parameter bindings
//!
//! A binding tells the host how to read a logical attribute off an element:
//! either through a well-known built-in parameter name or through the GUID
//! of a shared parameter.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How a logical attribute name is read from an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// Well-known built-in parameter (e.g., "WALL_USER_HEIGHT_PARAM")
    #[serde(rename = "builtin")]
    BuiltIn(String),
    /// Shared parameter addressed by GUID
    Shared(Uuid),
}

impl Binding {
    pub fn builtin(name: &str) -> Self {
        Binding::BuiltIn(name.to_string())
    }

    /// Key under which element dumps store this attribute
    pub fn key(&self) -> String {
        match self {
            Binding::BuiltIn(name) => name.clone(),
            Binding::Shared(guid) => guid.hyphenated().to_string(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::BuiltIn(name) => write!(f, "builtin:{}", name),
            Binding::Shared(guid) => write!(f, "shared:{}", guid.hyphenated()),
        }
    }
}
