//! Conditional visibility
//!
//! A field can depend on a sibling: `visibleIf: "payment"` shows it while
//! `payment` is truthy, `visibleIf: "!payment"` while it is not. Hidden
//! fields skip validation so they never block a submit.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::validate::Validator;
use crate::values::{is_truthy, FormValues};

const NEGATION: char = '!';

/// A parsed `visibleIf` reference
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VisibilityCondition {
    key: String,
    negated: bool,
}

impl VisibilityCondition {
    /// Parse `"key"` or `"!key"`
    pub fn parse(reference: &str) -> Self {
        match reference.strip_prefix(NEGATION) {
            Some(key) => Self { key: key.to_string(), negated: true },
            None => Self { key: reference.to_string(), negated: false },
        }
    }

    /// The watched field
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Evaluate against the watched field's value; absent reads as `false`
    pub fn holds_for(&self, value: Option<&Value>) -> bool {
        let set = value.map(is_truthy).unwrap_or(false);
        set != self.negated
    }

    /// Evaluate against a form's values
    pub fn holds(&self, values: &FormValues) -> bool {
        self.holds_for(values.get(&self.key))
    }
}

impl FromStr for VisibilityCondition {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for VisibilityCondition {
    fn from(reference: &str) -> Self {
        Self::parse(reference)
    }
}

impl From<String> for VisibilityCondition {
    fn from(reference: String) -> Self {
        Self::parse(&reference)
    }
}

impl From<VisibilityCondition> for String {
    fn from(condition: VisibilityCondition) -> Self {
        condition.to_string()
    }
}

impl fmt::Display for VisibilityCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{}{}", NEGATION, self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

/// Run `validator` only while `condition` holds; otherwise the field is valid.
pub fn validate_if(validator: Validator, condition: VisibilityCondition) -> Validator {
    Validator::new(move |value, all_values| {
        if condition.holds(all_values) {
            validator.validate(value, all_values)
        } else {
            None
        }
    })
}
