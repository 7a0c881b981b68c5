mod common;

use common::{init_tracing, values};
use schemaform::{
    create_form_generator, ComponentKit, FormAction, FormOptions, FormProps, MemoryStore, Schema,
    ValidatorRegistry, ValidatorSpec, WizardProps, WizardSchema,
};
use serde_json::json;

const ESCROW_YAML: &str = r#"
details:
  title:
    type: header
    props:
      text: Escrow details
  payment:
    type: number
    props:
      placeholder: Payment (ETH)
    validate: [required, number, positive]
  timeout:
    type: number
    visibleIf: payment
    validate: [required]
parties:
  partyB:
    type: text
    validate:
      - required
      - pattern: "^0x[0-9a-fA-F]+$"
  email:
    type: email
    validate: [email]
"#;

fn registry() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new();
    registry.register(
        "positive",
        ValidatorSpec::factory(|name| {
            let message = format!("{} must be positive.", name);
            schemaform::Validator::new(move |value, _| {
                let n = value
                    .as_f64()
                    .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
                    .unwrap_or(0.0);
                (n <= 0.0).then(|| message.clone())
            })
        }),
    );
    registry
}

#[test]
fn test_yaml_wizard_document() -> anyhow::Result<()> {
    init_tracing();
    let schema = WizardSchema::from_yaml_str(ESCROW_YAML, &registry())?;
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["details", "parties"]);

    let store = MemoryStore::shared();
    let generator = create_form_generator(ComponentKit::html(), store.clone());
    let bundle = generator.wizard_form("escrow", &schema, FormOptions::default())?;
    let mounted = bundle.form.mount(WizardProps::new(|_| {}));

    let html = mounted.render().to_string();
    assert!(html.contains("<h3 class=\"schema-form-header\" style=\"flex: 1\">Escrow details</h3>"));

    store.dispatch(FormAction::change("escrow", "payment", json!(-1)));
    store.dispatch(FormAction::change("escrow", "timeout", json!(10)));
    store.dispatch(bundle.submit());
    assert_eq!(mounted.page(), 0);
    assert_eq!(
        store.field_meta("escrow", "payment").visible_error(),
        Some("Payment must be positive.")
    );

    store.dispatch(FormAction::change("escrow", "payment", json!(2)));
    store.dispatch(bundle.submit());
    assert_eq!(mounted.page(), 1);

    store.dispatch(FormAction::change("escrow", "partyB", json!("alice")));
    store.dispatch(bundle.submit());
    assert_eq!(
        store.field_meta("escrow", "partyB").visible_error(),
        Some("Party B is invalid.")
    );
    Ok(())
}

#[test]
fn test_json_form_document() -> anyhow::Result<()> {
    let source = r#"{
        "name": { "type": "text", "validate": ["required", { "min_length": 3 }] },
        "bio": { "type": "textarea", "validate": [{ "max_length": 5 }] },
        "subscribe": { "type": "checkbox" },
        "plan": { "type": "select", "visibleIf": "subscribe", "props": { "options": ["basic", "pro"] } }
    }"#;
    let schema = Schema::from_json_str(source, &ValidatorRegistry::new())?;

    let store = MemoryStore::shared();
    let generator = create_form_generator(ComponentKit::html(), store.clone());
    let bundle = generator.form("profile", &schema, FormOptions::default())?;
    let mounted = bundle
        .form
        .mount(FormProps::new().initial_values(values(&[("name", json!("Al")), ("bio", json!("too long"))])));

    let snapshot = store.snapshot("profile").expect("form state");
    assert_eq!(snapshot.errors.get("name").map(String::as_str), Some("Name must be at least 3 characters."));
    assert_eq!(snapshot.errors.get("bio").map(String::as_str), Some("Bio must be at most 5 characters."));

    assert!(mounted.render().find_by_name("plan").is_none());
    store.dispatch(FormAction::change("profile", "subscribe", json!(true)));
    let node = mounted.render();
    let plan = node.find_by_name("plan").expect("plan visible");
    assert_eq!(plan.tag, "select");
    Ok(())
}

#[test]
fn test_options_from_yaml() -> anyhow::Result<()> {
    let options = FormOptions::load(
        "force_unregister_on_unmount: true\ntransition:\n  name: fade\n",
        config::FileFormat::Yaml,
    )?;
    assert!(options.destroy_on_unmount);
    assert!(options.force_unregister_on_unmount);
    assert_eq!(options.transition.name, "fade");
    assert_eq!(options.transition.enter_timeout_ms, 800);
    Ok(())
}
