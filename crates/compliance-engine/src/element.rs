//! Host element seam
//!
//! The evaluator only sees elements through [`Element`]; how the host
//! enumerates them and reads parameters stays outside this crate.

use shared_types::{AttributeValue, Binding, ElementRecord};

/// Category label used when the host reports none
pub const UNCLASSIFIED: &str = "unclassified";

/// A building element as exposed by the modeling host
pub trait Element {
    /// Stable identifier used in report text
    fn id(&self) -> &str;

    /// Category label, `None` when the element is unclassified
    fn category(&self) -> Option<&str>;

    /// Value of the attribute addressed by `binding`, `None` when unset
    fn attribute(&self, binding: &Binding) -> Option<AttributeValue>;
}

impl Element for ElementRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    fn attribute(&self, binding: &Binding) -> Option<AttributeValue> {
        match binding {
            Binding::BuiltIn(name) => self.get(name),
            Binding::Shared(_) => self.get_ignore_case(&binding.key()),
        }
        .cloned()
    }
}
