//! Field validators and their composition
//!
//! A schema lists validators in order. Each entry is either a bound
//! validator or a factory that receives the field's display name first
//! (so messages can read "Payment is required."). The resolved list is
//! combined into one validator where the first error wins.

pub mod builtin;
pub mod registry;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::values::FormValues;

pub use self::builtin as validators;
pub use registry::{ValidatorRef, ValidatorRegistry, ValidatorRule};

type ValidateFn = dyn Fn(&Value, &FormValues) -> Option<String> + Send + Sync;
type FactoryFn = dyn Fn(&str) -> Validator + Send + Sync;

/// A validator bound to its final signature: `(value, all_values) -> error?`
#[derive(Clone)]
pub struct Validator(Arc<ValidateFn>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Validator that never reports an error
    pub fn always_valid() -> Self {
        Self::new(|_, _| None)
    }

    /// Run the validator; `None` means the value is valid
    pub fn validate(&self, value: &Value, all_values: &FormValues) -> Option<String> {
        (self.0)(value, all_values)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

/// A validator that still needs the field's display name
#[derive(Clone)]
pub struct ValidatorFactory(Arc<FactoryFn>);

impl ValidatorFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Validator + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn bind(&self, name: &str) -> Validator {
        (self.0)(name)
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorFactory")
    }
}

/// One entry of a field's `validate` list
#[derive(Clone, Debug)]
pub enum ValidatorSpec {
    /// Used as-is
    Bound(Validator),
    /// Invoked with the field's display name to obtain the validator
    Factory(ValidatorFactory),
}

impl ValidatorSpec {
    /// Wrap a plain `(value, all_values)` validator
    pub fn bound<F>(f: F) -> Self
    where
        F: Fn(&Value, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        ValidatorSpec::Bound(Validator::new(f))
    }

    /// Wrap a name-aware factory
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&str) -> Validator + Send + Sync + 'static,
    {
        ValidatorSpec::Factory(ValidatorFactory::new(f))
    }

    /// Turn this entry into a validator for the field called `name`
    pub fn resolve(&self, name: &str) -> Validator {
        match self {
            ValidatorSpec::Bound(validator) => validator.clone(),
            ValidatorSpec::Factory(factory) => factory.bind(name),
        }
    }
}

impl From<Validator> for ValidatorSpec {
    fn from(validator: Validator) -> Self {
        ValidatorSpec::Bound(validator)
    }
}

impl From<ValidatorFactory> for ValidatorSpec {
    fn from(factory: ValidatorFactory) -> Self {
        ValidatorSpec::Factory(factory)
    }
}

/// Combine validators so they run in order and the first error wins.
///
/// Later validators are not called once one fails. Empty messages count as
/// valid.
pub fn combine(validators: Vec<Validator>) -> Validator {
    Validator::new(move |value, all_values| {
        validators
            .iter()
            .find_map(|validator| validator.validate(value, all_values).filter(|err| !err.is_empty()))
    })
}

/// Resolve a field's validator list against its display name and combine it.
pub fn resolve_validators(name: &str, specs: &[ValidatorSpec]) -> Validator {
    combine(specs.iter().map(|spec| spec.resolve(name)).collect())
}
