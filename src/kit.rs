//! Component kits: field type name → renderer

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::render::{Element, FieldComponent, FieldProps, Node, Renderer};
use crate::values::{display_value, is_truthy};

/// The renderers available to schemas, keyed by field `type`
#[derive(Clone, Default)]
pub struct ComponentKit {
    components: HashMap<String, Renderer>,
}

impl ComponentKit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ComponentKit::insert`]
    pub fn with<C>(mut self, field_type: impl Into<String>, component: C) -> Self
    where
        C: FieldComponent + 'static,
    {
        self.insert(field_type, component);
        self
    }

    pub fn insert<C>(&mut self, field_type: impl Into<String>, component: C)
    where
        C: FieldComponent + 'static,
    {
        self.components.insert(field_type.into(), Arc::new(component));
    }

    pub fn get(&self, field_type: &str) -> Option<Renderer> {
        self.components.get(field_type).cloned()
    }

    pub fn contains(&self, field_type: &str) -> bool {
        self.components.contains_key(field_type)
    }

    /// Registered type names, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.components.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Plain HTML controls: `text`, `number`, `email`, `password`,
    /// `textarea`, `checkbox`, `select`, `header` and `info`.
    pub fn html() -> Self {
        Self::new()
            .with("text", input("text"))
            .with("number", input("number"))
            .with("email", input("email"))
            .with("password", input("password"))
            .with("textarea", textarea)
            .with("checkbox", checkbox)
            .with("select", select)
            .with("header", header)
            .with("info", info)
    }
}

impl fmt::Debug for ComponentKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKit").field("types", &self.types()).finish()
    }
}

// ============================================================================
// HTML Controls
// ============================================================================

/// Wrap a control with its label and, once touched, its error
fn field_wrapper(props: &FieldProps, control: Element) -> Node {
    let label = props
        .prop_str("label")
        .map(str::to_string)
        .or_else(|| props.placeholder().map(str::to_string));

    Element::new("label")
        .attr("class", "schema-form-field")
        .attr_opt("style", props.style())
        .attr_opt("title", label)
        .child(control)
        .child(match props.meta.visible_error() {
            Some(error) => Element::new("span").attr("class", "schema-form-error").child(error).into(),
            None => Node::Empty,
        })
        .into()
}

fn input(input_type: &'static str) -> impl Fn(&FieldProps) -> Node + Send + Sync {
    move |props: &FieldProps| {
        let control = Element::new("input")
            .attr("type", input_type)
            .attr("name", props.name.as_str())
            .attr("value", display_value(&props.value))
            .attr_opt("placeholder", props.placeholder())
            .flag("disabled", props.disabled);
        field_wrapper(props, control)
    }
}

fn textarea(props: &FieldProps) -> Node {
    let control = Element::new("textarea")
        .attr("name", props.name.as_str())
        .attr_opt("placeholder", props.placeholder())
        .flag("disabled", props.disabled)
        .child(display_value(&props.value));
    field_wrapper(props, control)
}

fn checkbox(props: &FieldProps) -> Node {
    let control = Element::new("input")
        .attr("type", "checkbox")
        .attr("name", props.name.as_str())
        .flag("checked", is_truthy(&props.value))
        .flag("disabled", props.disabled);
    field_wrapper(props, control)
}

/// `props.options` is either a list of strings or of `{value, label}` objects
fn select(props: &FieldProps) -> Node {
    let current = display_value(&props.value);
    let options = props
        .prop("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .map(|option| {
                    let (value, label) = match option {
                        Value::Object(map) => {
                            let value = map.get("value").map(display_value).unwrap_or_default();
                            let label = map.get("label").map(display_value).unwrap_or_else(|| value.clone());
                            (value, label)
                        }
                        other => (display_value(other), display_value(other)),
                    };
                    Element::new("option")
                        .flag("selected", value == current)
                        .attr("value", value)
                        .child(label)
                        .into()
                })
                .collect::<Vec<Node>>()
        })
        .unwrap_or_default();

    let prompt = Element::new("option").attr("value", "").child(props.placeholder().unwrap_or_default());

    let control = Element::new("select")
        .attr("name", props.name.as_str())
        .flag("disabled", props.disabled)
        .child(prompt)
        .children(options);
    field_wrapper(props, control)
}

fn header(props: &FieldProps) -> Node {
    let text = props.prop_str("text").or_else(|| props.placeholder()).unwrap_or_default();
    Element::new("h3")
        .attr("class", "schema-form-header")
        .attr_opt("style", props.style())
        .child(text)
        .into()
}

fn info(props: &FieldProps) -> Node {
    let text = props.prop_str("text").or_else(|| props.placeholder()).unwrap_or_default();
    Element::new("p")
        .attr("class", "schema-form-info")
        .attr_opt("style", props.style())
        .child(text)
        .into()
}
