//! Logical parameter name to binding resolution

use lazy_static::lazy_static;
use shared_types::{AttributeValue, Binding};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::element::Element;
use crate::error::ResolveError;

lazy_static! {
    /// Bindings used when no configuration overrides them
    static ref DEFAULT_BINDINGS: BTreeMap<String, Binding> = {
        let mut bindings = BTreeMap::new();
        bindings.insert("Wall_Height".to_string(), Binding::builtin("WALL_USER_HEIGHT_PARAM"));
        bindings.insert("FireRating".to_string(), Binding::builtin("FIRE_RATING"));
        bindings.insert(
            "Distance".to_string(),
            Binding::Shared(Uuid::from_u128(0x0af14e6a_00a9_4236_849d_4800b3813c11)),
        );
        bindings
    };
}

/// Fixed table of parameter bindings, built once per run
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterResolver {
    bindings: BTreeMap<String, Binding>,
}

impl ParameterResolver {
    pub fn new(bindings: BTreeMap<String, Binding>) -> Self {
        Self { bindings }
    }

    /// A resolver with no bindings; every parameter is unbound
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn with_binding(mut self, parameter: &str, binding: Binding) -> Self {
        self.bindings.insert(parameter.to_string(), binding);
        self
    }

    pub fn resolve(&self, parameter: &str) -> Result<&Binding, ResolveError> {
        self.bindings
            .get(parameter)
            .ok_or_else(|| ResolveError::Unbound(parameter.to_string()))
    }

    /// Resolve `parameter` and read it from `element`.
    ///
    /// `Err` means the parameter has no binding; `Ok(None)` means the
    /// element has no value for it.
    pub fn fetch<E: Element + ?Sized>(
        &self,
        element: &E,
        parameter: &str,
    ) -> Result<Option<AttributeValue>, ResolveError> {
        let binding = self.resolve(parameter)?;
        Ok(element.attribute(binding))
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, b)| (name.as_str(), b))
    }
}

impl Default for ParameterResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BINDINGS.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ElementRecord;

    #[test]
    fn test_default_bindings() {
        let resolver = ParameterResolver::default();
        assert_eq!(
            resolver.resolve("Wall_Height"),
            Ok(&Binding::builtin("WALL_USER_HEIGHT_PARAM"))
        );
        assert_eq!(resolver.resolve("FireRating"), Ok(&Binding::builtin("FIRE_RATING")));
        assert_eq!(
            resolver.resolve("Distance").map(Binding::key),
            Ok("0af14e6a-00a9-4236-849d-4800b3813c11".to_string())
        );
    }

    #[test]
    fn test_unbound_parameter() {
        let resolver = ParameterResolver::default();
        assert_eq!(
            resolver.resolve("Wall_Thickness"),
            Err(ResolveError::Unbound("Wall_Thickness".to_string()))
        );
    }

    #[test]
    fn test_fetch_distinguishes_unbound_from_unset() {
        let resolver = ParameterResolver::default();
        let element = ElementRecord::new("1").with_number("FIRE_RATING", 1.5);

        assert_eq!(
            resolver.fetch(&element, "FireRating"),
            Ok(Some(AttributeValue::Number(1.5)))
        );
        assert_eq!(resolver.fetch(&element, "Wall_Height"), Ok(None));
        assert!(resolver.fetch(&element, "Wall_Thickness").is_err());
    }
}
