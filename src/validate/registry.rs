//! Named validators for schemas authored as documents
//!
//! Documents cannot hold functions, so their `validate` lists carry
//! references (`"required"`, `{"min_length": 3}`) that a registry turns
//! into [`ValidatorSpec`]s.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{builtin, ValidatorSpec};
use crate::error::{FormError, FormResult};

/// Parameterised validator rules available to every registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorRule {
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
}

/// A validator reference inside a schema document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorRef {
    /// Registered by name
    Named(String),
    /// Built from parameters
    Rule(ValidatorRule),
}

impl fmt::Display for ValidatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorRef::Named(name) => write!(f, "{}", name),
            ValidatorRef::Rule(ValidatorRule::MinLength(n)) => write!(f, "min_length({})", n),
            ValidatorRef::Rule(ValidatorRule::MaxLength(n)) => write!(f, "max_length({})", n),
            ValidatorRef::Rule(ValidatorRule::Pattern(p)) => write!(f, "pattern({})", p),
        }
    }
}

/// Validators addressable by name
#[derive(Clone)]
pub struct ValidatorRegistry {
    named: HashMap<String, ValidatorSpec>,
}

impl ValidatorRegistry {
    /// Registry without any names
    pub fn empty() -> Self {
        Self { named: HashMap::new() }
    }

    /// Registry with `required`, `number` and `email`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("required", builtin::required());
        registry.register("number", builtin::number());
        registry.register("email", builtin::email());
        registry
    }

    /// Add or replace a named validator
    pub fn register(&mut self, name: impl Into<String>, spec: ValidatorSpec) -> &mut Self {
        self.named.insert(name.into(), spec);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Resolve a document reference
    pub fn resolve(&self, reference: &ValidatorRef) -> FormResult<ValidatorSpec> {
        match reference {
            ValidatorRef::Named(name) => self
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| FormError::UnknownValidator(name.clone())),
            ValidatorRef::Rule(ValidatorRule::MinLength(n)) => Ok(builtin::min_length(*n)),
            ValidatorRef::Rule(ValidatorRule::MaxLength(n)) => Ok(builtin::max_length(*n)),
            ValidatorRef::Rule(ValidatorRule::Pattern(p)) => builtin::pattern(p),
        }
    }

    /// Resolve a whole `validate` list, keeping its order
    pub fn resolve_all(&self, references: &[ValidatorRef]) -> FormResult<Vec<ValidatorSpec>> {
        references.iter().map(|r| self.resolve(r)).collect()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{resolve_validators, Validator};
    use crate::values::FormValues;
    use serde_json::json;

    #[test]
    fn test_reference_parsing() {
        let refs: Vec<ValidatorRef> =
            serde_json::from_value(json!(["required", {"min_length": 3}, {"pattern": "^a"}])).unwrap();

        assert_eq!(refs[0], ValidatorRef::Named("required".to_string()));
        assert_eq!(refs[1], ValidatorRef::Rule(ValidatorRule::MinLength(3)));
        assert_eq!(refs[2], ValidatorRef::Rule(ValidatorRule::Pattern("^a".to_string())));
    }

    #[test]
    fn test_resolve_builtins() {
        let registry = ValidatorRegistry::new();
        let refs = vec![ValidatorRef::Named("required".to_string()), ValidatorRef::Named("number".to_string())];
        let specs = registry.resolve_all(&refs).unwrap();
        let validator = resolve_validators("Timeout", &specs);

        assert_eq!(validator.validate(&json!(""), &FormValues::new()), Some("Timeout is required.".to_string()));
        assert_eq!(validator.validate(&json!("x"), &FormValues::new()), Some("Timeout must be a number.".to_string()));
    }

    #[test]
    fn test_unknown_validator() {
        let registry = ValidatorRegistry::empty();
        let err = registry.resolve(&ValidatorRef::Named("required".to_string())).err();
        assert!(matches!(err, Some(FormError::UnknownValidator(name)) if name == "required"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ValidatorRegistry::new();
        registry.register("even", ValidatorSpec::Bound(Validator::new(|v, _| {
            (v.as_i64().unwrap_or(1) % 2 != 0).then(|| "must be even".to_string())
        })));

        assert!(registry.contains("even"));
        let spec = registry.resolve(&ValidatorRef::Named("even".to_string())).unwrap();
        assert_eq!(spec.resolve("N").validate(&json!(4), &FormValues::new()), None);
        assert!(spec.resolve("N").validate(&json!(3), &FormValues::new()).is_some());
    }
}
