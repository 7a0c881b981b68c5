//! Form schemas
//!
//! A [`Schema`] maps field keys to [`FieldDescriptor`]s in render order; a
//! [`WizardSchema`] maps page keys to schemas in page order. Both can be
//! built in code or loaded from JSON/YAML documents (see [`document`]).

pub mod document;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::store::Normalizer;
use crate::validate::ValidatorSpec;
use crate::values::FormValues;
use crate::visibility::VisibilityCondition;

pub use document::{FieldDocument, SchemaDocument, WizardDocument};

/// Binding options passed through to the store registration
#[derive(Clone, Default)]
pub struct FieldOptions {
    /// Rewrites each changed value before it is stored
    pub normalize: Option<Normalizer>,
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("normalize", &self.normalize.is_some())
            .finish()
    }
}

/// One field of a schema
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Component kit key
    pub field_type: String,
    /// Renderer props; `placeholder` defaults to the field's display name
    pub props: Map<String, Value>,
    /// Validators in the order they run
    pub validate: Vec<ValidatorSpec>,
    pub visible_if: Option<VisibilityCondition>,
    /// Sibling field whose value the renderer receives
    pub form_values: Option<String>,
    pub options: FieldOptions,
}

impl FieldDescriptor {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            props: Map::new(),
            validate: Vec::new(),
            visible_if: None,
            form_values: None,
            options: FieldOptions::default(),
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn placeholder(self, placeholder: impl Into<String>) -> Self {
        self.prop("placeholder", placeholder.into())
    }

    /// Append a validator
    pub fn validate(mut self, spec: impl Into<ValidatorSpec>) -> Self {
        self.validate.push(spec.into());
        self
    }

    /// Show the field only while `condition` (`"key"` or `"!key"`) holds
    pub fn visible_if(mut self, condition: impl Into<VisibilityCondition>) -> Self {
        self.visible_if = Some(condition.into());
        self
    }

    pub fn form_values(mut self, key: impl Into<String>) -> Self {
        self.form_values = Some(key.into());
        self
    }

    pub fn normalize<F>(mut self, normalize: F) -> Self
    where
        F: Fn(&Value, &FormValues) -> Value + Send + Sync + 'static,
    {
        self.options.normalize = Some(Arc::new(normalize));
        self
    }
}

/// Field key → descriptor, in render order
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Schema::insert`]
    pub fn field(mut self, key: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.insert(key, descriptor);
        self
    }

    /// Add a field; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, descriptor: FieldDescriptor) {
        self.fields.insert(key.into(), descriptor);
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(key, descriptor)| (key.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDescriptor)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, FieldDescriptor)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(key, descriptor)| (key.into(), descriptor)).collect(),
        }
    }
}

/// Page key → page schema, in page order
#[derive(Clone, Debug, Default)]
pub struct WizardSchema {
    pages: IndexMap<String, Schema>,
}

impl WizardSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.pages.insert(key.into(), schema);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, schema: Schema) {
        self.pages.insert(key.into(), schema);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.pages.iter().map(|(key, schema)| (key.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Schema)> for WizardSchema {
    fn from_iter<I: IntoIterator<Item = (K, Schema)>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().map(|(key, schema)| (key.into(), schema)).collect(),
        }
    }
}
