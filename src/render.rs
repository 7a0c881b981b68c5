//! Host-neutral render model
//!
//! Field renderers turn [`FieldProps`] into a small element tree that a
//! host (the Leptos binding, a server-side renderer, a test) can display.
//! Renderers are decorated by an explicit, ordered list of [`Decorator`]s.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::values::{display_value, FormValues};
use crate::visibility::VisibilityCondition;

// ============================================================================
// Element Tree
// ============================================================================

/// A rendered node
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    /// Renders nothing
    #[default]
    Empty,
    Text(String),
    Element(Element),
}

/// An element with attributes and children
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub tag: String,
    /// Stable identity among siblings
    pub key: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the attribute only when a value is given
    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Boolean attribute, present only when `on`
    pub fn flag(self, name: impl Into<String>, on: bool) -> Self {
        if on {
            self.attr(name, "")
        } else {
            self
        }
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Node {
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Set the key of an element node; other nodes are returned unchanged
    pub fn with_key(self, key: impl Into<String>) -> Self {
        match self {
            Node::Element(element) => Node::Element(element.key(key)),
            other => other,
        }
    }

    /// Depth-first search for the first element matching `pred`
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        let element = self.as_element()?;
        if pred(element) {
            return Some(element);
        }
        element.children.iter().find_map(|child| child.find(pred))
    }

    /// First element with the given key
    pub fn find_by_key(&self, key: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.key.as_deref() == Some(key))
    }

    /// First element whose `name` attribute equals `name`
    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.get_attr("name") == Some(name))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img"];

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => Ok(()),
            Node::Text(text) => write!(f, "{}", escape(text)),
            Node::Element(element) => {
                write!(f, "<{}", element.tag)?;
                for (name, value) in &element.attrs {
                    if value.is_empty() {
                        write!(f, " {}", name)?;
                    } else {
                        write!(f, " {}=\"{}\"", name, escape(value))?;
                    }
                }
                if VOID_TAGS.contains(&element.tag.as_str()) {
                    return write!(f, ">");
                }
                write!(f, ">")?;
                for child in &element.children {
                    write!(f, "{}", child)?;
                }
                write!(f, "</{}>", element.tag)
            }
        }
    }
}

/// Render a `style` prop object as CSS text: `{"flex": 1}` → `flex: 1`
pub fn style_to_css(style: &Value) -> Option<String> {
    match style {
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(prop, value)| format!("{}: {}", camel_to_kebab(prop), display_value(value)))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::String(css) if !css.is_empty() => Some(css.clone()),
        _ => None,
    }
}

fn camel_to_kebab(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len() + 2);
    for ch in prop.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// ============================================================================
// Field Props
// ============================================================================

/// Per-field state supplied by the store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMeta {
    pub error: Option<String>,
    pub touched: bool,
}

impl FieldMeta {
    /// The error to show: only once the field was touched
    pub fn visible_error(&self) -> Option<&str> {
        if self.touched {
            self.error.as_deref()
        } else {
            None
        }
    }
}

/// Everything a field renderer receives
#[derive(Clone, Debug, Default)]
pub struct FieldProps {
    /// State-binding name of the field
    pub name: String,
    /// Current value, `null` when unset
    pub value: Value,
    pub disabled: bool,
    pub meta: FieldMeta,
    /// Descriptor props merged over the defaults (placeholder, style, ...)
    pub props: Map<String, Value>,
    /// Snapshot of all form values at render time
    pub values: Arc<FormValues>,
    /// Sibling values injected by [`Decorator::FormValue`]
    pub injected: BTreeMap<String, Value>,
}

impl FieldProps {
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.prop_str("placeholder")
    }

    pub fn style(&self) -> Option<String> {
        self.props.get("style").and_then(style_to_css)
    }
}

// ============================================================================
// Renderers and Decorators
// ============================================================================

/// Something that renders a bound field
pub trait FieldComponent: Send + Sync {
    fn render(&self, props: &FieldProps) -> Node;
}

impl<F> FieldComponent for F
where
    F: Fn(&FieldProps) -> Node + Send + Sync,
{
    fn render(&self, props: &FieldProps) -> Node {
        self(props)
    }
}

/// Shared handle to a field component
pub type Renderer = Arc<dyn FieldComponent>;

/// A `Renderer -> Renderer` transform applied by the field compiler
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decorator {
    /// Render only while the condition holds over the form values
    VisibleIf(VisibilityCondition),
    /// Inject the named sibling's current value into `FieldProps::injected`
    FormValue(String),
}

impl Decorator {
    pub fn apply(&self, inner: Renderer) -> Renderer {
        match self {
            Decorator::VisibleIf(condition) => Arc::new(VisibleIf {
                condition: condition.clone(),
                inner,
            }),
            Decorator::FormValue(key) => Arc::new(WithFormValue { key: key.clone(), inner }),
        }
    }
}

/// Apply decorators left to right: the first listed wraps the base renderer
/// directly, the last listed is outermost.
pub fn decorate(base: Renderer, decorators: &[Decorator]) -> Renderer {
    decorators.iter().fold(base, |renderer, decorator| decorator.apply(renderer))
}

struct VisibleIf {
    condition: VisibilityCondition,
    inner: Renderer,
}

impl FieldComponent for VisibleIf {
    fn render(&self, props: &FieldProps) -> Node {
        if self.condition.holds(&props.values) {
            self.inner.render(props)
        } else {
            Node::Empty
        }
    }
}

struct WithFormValue {
    key: String,
    inner: Renderer,
}

impl FieldComponent for WithFormValue {
    fn render(&self, props: &FieldProps) -> Node {
        let mut props = props.clone();
        let value = props.values.get(&self.key).cloned().unwrap_or(Value::Null);
        props.injected.insert(self.key.clone(), value);
        self.inner.render(&props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn probe() -> Renderer {
        Arc::new(|props: &FieldProps| {
            let injected = props
                .injected
                .iter()
                .map(|(k, v)| format!("{}={}", k, display_value(v)))
                .collect::<Vec<_>>()
                .join(",");
            Node::from(Element::new("div").attr("data-injected", injected))
        })
    }

    fn props_with(values: FormValues) -> FieldProps {
        FieldProps {
            name: "field".to_string(),
            values: Arc::new(values),
            ..Default::default()
        }
    }

    #[test]
    fn test_visible_if_hides_and_shows() {
        let renderer = decorate(probe(), &[Decorator::VisibleIf(VisibilityCondition::parse("payment"))]);
        let inverse = decorate(probe(), &[Decorator::VisibleIf(VisibilityCondition::parse("!payment"))]);

        let hidden = props_with(FormValues::new());
        assert!(renderer.render(&hidden).is_empty());
        assert!(!inverse.render(&hidden).is_empty());

        let mut values = FormValues::new();
        values.insert("payment".to_string(), json!(10));
        let shown = props_with(values);
        assert!(!renderer.render(&shown).is_empty());
        assert!(inverse.render(&shown).is_empty());
    }

    #[test]
    fn test_form_value_injection() {
        let renderer = decorate(probe(), &[Decorator::FormValue("arbitratorExtraData".to_string())]);
        let mut values = FormValues::new();
        values.insert("arbitratorExtraData".to_string(), json!("0xabc"));

        let node = renderer.render(&props_with(values));
        assert_eq!(node.as_element().unwrap().get_attr("data-injected"), Some("arbitratorExtraData=0xabc"));

        let missing = renderer.render(&props_with(FormValues::new()));
        assert_eq!(missing.as_element().unwrap().get_attr("data-injected"), Some("arbitratorExtraData="));
    }

    #[test]
    fn test_decorators_compose_in_order() {
        let renderer = decorate(
            probe(),
            &[
                Decorator::VisibleIf(VisibilityCondition::parse("email")),
                Decorator::FormValue("other".to_string()),
            ],
        );
        let mut values = FormValues::new();
        values.insert("email".to_string(), json!("a@b.c"));
        values.insert("other".to_string(), json!(1));

        let node = renderer.render(&props_with(values));
        assert_eq!(node.as_element().unwrap().get_attr("data-injected"), Some("other=1"));
    }

    #[test]
    fn test_html_output() {
        let node: Node = Element::new("div")
            .attr("class", "a")
            .child(Element::new("input").attr("name", "x").flag("disabled", true))
            .child("1 < 2")
            .into();

        assert_eq!(node.to_string(), r#"<div class="a"><input disabled name="x">1 &lt; 2</div>"#);
        assert!(node.find_by_name("x").is_some());
    }

    #[test]
    fn test_style_to_css() {
        assert_eq!(style_to_css(&json!({"flex": 1})), Some("flex: 1".to_string()));
        assert_eq!(
            style_to_css(&json!({"flexFlow": "row wrap"})),
            Some("flex-flow: row wrap".to_string())
        );
        assert_eq!(style_to_css(&json!({})), None);
    }
}
