//! Field compiler
//!
//! Turns a [`Schema`] into bound [`FieldElement`]s: display name, resolved
//! validator, default props, base renderer from the kit and the ordered
//! decorator chain.

use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{FormError, FormResult};
use crate::kit::ComponentKit;
use crate::names::camel_to_title_case;
use crate::render::{decorate, Decorator, FieldProps, Node, Renderer};
use crate::schema::{FieldDescriptor, FieldOptions, Schema};
use crate::store::{FieldRegistration, FormStore};
use crate::validate::{resolve_validators, Validator};
use crate::values::is_truthy;
use crate::visibility::validate_if;

/// A compiled field bound to a form
#[derive(Clone)]
pub struct FieldElement {
    /// `{form_id}-{field_key}`, unique within the form
    pub key: String,
    /// Field key, the name the store binds the value to
    pub name: String,
    /// Display name derived from the key
    pub label: String,
    pub field_type: String,
    /// Base renderer with `decorators` applied
    pub renderer: Renderer,
    pub decorators: Vec<Decorator>,
    pub validator: Option<Validator>,
    /// Defaults merged under the descriptor's props
    pub props: Map<String, Value>,
    pub options: FieldOptions,
}

impl FieldElement {
    pub fn placeholder(&self) -> Option<&str> {
        self.props.get("placeholder").and_then(Value::as_str)
    }

    /// What the store keeps for this field while it is mounted
    pub fn registration(&self) -> FieldRegistration {
        FieldRegistration {
            validator: self.validator.clone(),
            normalize: self.options.normalize.clone(),
        }
    }

    /// Props for the renderer, read from the store's current state
    pub fn field_props(&self, store: &dyn FormStore, form_id: &str, disabled: bool) -> FieldProps {
        FieldProps {
            name: self.name.clone(),
            value: store.value(form_id, &self.name).unwrap_or(Value::Null),
            disabled,
            meta: store.field_meta(form_id, &self.name),
            props: self.props.clone(),
            values: Arc::new(store.values(form_id)),
            injected: Default::default(),
        }
    }

    pub fn render(&self, store: &dyn FormStore, form_id: &str, disabled: bool) -> Node {
        self.renderer
            .render(&self.field_props(store, form_id, disabled))
            .with_key(self.key.as_str())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldElement")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("decorators", &self.decorators)
            .field("validator", &self.validator.is_some())
            .field("props", &self.props)
            .finish()
    }
}

/// Compile every field of `schema`, in schema order
pub fn compile_fields(kit: &ComponentKit, form_id: &str, schema: &Schema) -> FormResult<Vec<FieldElement>> {
    let fields = schema
        .iter()
        .map(|(key, descriptor)| compile_field(kit, form_id, key, descriptor))
        .collect::<FormResult<Vec<_>>>()?;
    debug!(form = form_id, fields = fields.len(), "Compiled form fields");
    Ok(fields)
}

fn compile_field(
    kit: &ComponentKit,
    form_id: &str,
    key: &str,
    descriptor: &FieldDescriptor,
) -> FormResult<FieldElement> {
    let label = camel_to_title_case(key);

    let mut validator = if descriptor.validate.is_empty() {
        None
    } else {
        Some(resolve_validators(&label, &descriptor.validate))
    };

    let mut props = Map::new();
    props.insert("style".to_string(), json!({ "flex": 1 }));
    props.extend(descriptor.props.clone());
    if !props.get("placeholder").map(is_truthy).unwrap_or(false) {
        props.insert("placeholder".to_string(), Value::String(label.clone()));
    }

    let base = kit.get(&descriptor.field_type).ok_or_else(|| FormError::UnknownFieldType {
        field: key.to_string(),
        field_type: descriptor.field_type.clone(),
    })?;

    let mut decorators = Vec::new();
    if let Some(condition) = &descriptor.visible_if {
        decorators.push(Decorator::VisibleIf(condition.clone()));
        validator = validator.map(|v| validate_if(v, condition.clone()));
    }
    if let Some(watched) = &descriptor.form_values {
        decorators.push(Decorator::FormValue(watched.clone()));
    }

    Ok(FieldElement {
        key: format!("{}-{}", form_id, key),
        name: key.to_string(),
        label,
        field_type: descriptor.field_type.clone(),
        renderer: decorate(base, &decorators),
        decorators,
        validator,
        props,
        options: descriptor.options.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FormAction, MemoryStore};
    use crate::validate::validators;
    use crate::values::FormValues;
    use crate::visibility::VisibilityCondition;

    fn schema() -> Schema {
        Schema::new()
            .field(
                "payment",
                FieldDescriptor::new("number")
                    .placeholder("Payment (ETH)")
                    .validate(validators::required())
                    .validate(validators::number()),
            )
            .field(
                "timeout",
                FieldDescriptor::new("number")
                    .visible_if("payment")
                    .validate(validators::required()),
            )
            .field(
                "partyB",
                FieldDescriptor::new("text")
                    .visible_if("email")
                    .form_values("arbitratorExtraData"),
            )
            .field("email", FieldDescriptor::new("text").prop("style", json!({ "flex": 2 })))
    }

    #[test]
    fn test_compile_preserves_order_and_keys() {
        let fields = compile_fields(&ComponentKit::html(), "testForm", &schema()).unwrap();

        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["testForm-payment", "testForm-timeout", "testForm-partyB", "testForm-email"]);
        assert_eq!(fields[2].label, "Party B");
    }

    #[test]
    fn test_props_defaults() {
        let fields = compile_fields(&ComponentKit::html(), "f", &schema()).unwrap();

        assert_eq!(fields[0].placeholder(), Some("Payment (ETH)"));
        assert_eq!(fields[1].placeholder(), Some("Timeout"));
        assert_eq!(fields[0].props.get("style"), Some(&json!({ "flex": 1 })));
        assert_eq!(fields[3].props.get("style"), Some(&json!({ "flex": 2 })));
    }

    #[test]
    fn test_decorator_chain_order() {
        let fields = compile_fields(&ComponentKit::html(), "f", &schema()).unwrap();

        assert!(fields[0].decorators.is_empty());
        assert_eq!(
            fields[2].decorators,
            vec![
                Decorator::VisibleIf(VisibilityCondition::parse("email")),
                Decorator::FormValue("arbitratorExtraData".to_string()),
            ]
        );
        assert!(fields[2].validator.is_none());
    }

    #[test]
    fn test_hidden_field_validator_is_bypassed() {
        let fields = compile_fields(&ComponentKit::html(), "f", &schema()).unwrap();
        let timeout = fields[1].validator.as_ref().unwrap();

        assert_eq!(timeout.validate(&Value::Null, &FormValues::new()), None);

        let mut values = FormValues::new();
        values.insert("payment".to_string(), json!(10));
        assert_eq!(timeout.validate(&Value::Null, &values), Some("Timeout is required.".to_string()));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let schema = Schema::new().field("rating", FieldDescriptor::new("stars"));
        let err = compile_fields(&ComponentKit::html(), "f", &schema).err();

        assert!(matches!(
            err,
            Some(FormError::UnknownFieldType { field, field_type }) if field == "rating" && field_type == "stars"
        ));
    }

    #[test]
    fn test_render_reads_store() {
        let store = MemoryStore::new();
        let fields = compile_fields(&ComponentKit::html(), "f", &schema()).unwrap();

        assert!(fields[1].render(&store, "f", false).is_empty());

        store.dispatch(FormAction::change("f", "payment", json!(10)));
        let node = fields[1].render(&store, "f", false);
        assert_eq!(node.as_element().unwrap().key.as_deref(), Some("f-timeout"));

        let payment = fields[0].render(&store, "f", true);
        let input = payment.find_by_name("payment").unwrap();
        assert_eq!(input.get_attr("value"), Some("10"));
        assert!(input.has_attr("disabled"));
    }
}
