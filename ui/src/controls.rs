//! Bridging rendered controls and the DOM
//!
//! Field markup is rendered without live values so typing never rebuilds
//! an input; values are written into the existing controls instead, and
//! read back from input events by the control's `name`.

use leptos::web_sys;
use schemaform::values::{display_value, is_truthy};
use schemaform::Node;
use serde_json::Value;
use wasm_bindgen::JsCast;

/// Drop the attributes and text that carry a control's current value
pub fn strip_live_values(node: Node) -> Node {
    match node {
        Node::Element(mut element) => {
            match element.tag.as_str() {
                "input" => {
                    element.attrs.remove("value");
                    element.attrs.remove("checked");
                }
                "textarea" => element.children.clear(),
                "option" => {
                    element.attrs.remove("selected");
                }
                _ => {}
            }
            element.children = element.children.into_iter().map(strip_live_values).collect();
            Node::Element(element)
        }
        other => other,
    }
}

/// The `(name, value)` of the control an input event came from
pub fn read_control(ev: &web_sys::Event) -> Option<(String, Value)> {
    let target = ev.target()?;
    let element = target.dyn_ref::<web_sys::Element>()?;
    let name = element.get_attribute("name")?;

    let value = if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
        if input.type_() == "checkbox" {
            Value::Bool(input.checked())
        } else {
            Value::String(input.value())
        }
    } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
        Value::String(select.value())
    } else if let Some(textarea) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        Value::String(textarea.value())
    } else {
        return None;
    };
    Some((name, value))
}

/// The control name of the element that lost focus
pub fn control_name(ev: &web_sys::Event) -> Option<String> {
    let target = ev.target()?;
    target.dyn_ref::<web_sys::Element>()?.get_attribute("name")
}

/// Write `value` into the control called `name` below `root`, if it differs
pub fn sync_control(root: &web_sys::Element, name: &str, value: Option<&Value>) {
    let Ok(Some(element)) = root.query_selector(&format!("[name=\"{}\"]", name)) else {
        return;
    };
    let text = value.map(display_value).unwrap_or_default();

    if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
        if input.type_() == "checkbox" {
            input.set_checked(value.map(is_truthy).unwrap_or(false));
        } else if input.value() != text {
            input.set_value(&text);
        }
    } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
        if select.value() != text {
            select.set_value(&text);
        }
    } else if let Some(textarea) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        if textarea.value() != text {
            textarea.set_value(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaform::Element;

    #[test]
    fn test_strip_live_values() {
        let node: Node = Element::new("label")
            .child(Element::new("input").attr("name", "a").attr("value", "10").flag("checked", true))
            .child(Element::new("textarea").attr("name", "b").child("text"))
            .child(
                Element::new("select")
                    .attr("name", "c")
                    .child(Element::new("option").flag("selected", true).attr("value", "x")),
            )
            .into();

        let stripped = strip_live_values(node);
        let input = stripped.find_by_name("a").unwrap();
        assert!(!input.has_attr("value"));
        assert!(!input.has_attr("checked"));
        assert!(stripped.find_by_name("b").unwrap().children.is_empty());
        let option = &stripped.find_by_name("c").unwrap().children[0];
        assert!(!option.as_element().unwrap().has_attr("selected"));
        assert_eq!(option.as_element().unwrap().get_attr("value"), Some("x"));
    }
}
