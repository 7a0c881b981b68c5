//! Demo application: an escrow contract wizard loaded from YAML

use leptos::prelude::*;
use schemaform::{
    create_form_generator, BackHandle, ComponentKit, FormBundle, FormOptions, MemoryStore, PageChange,
    ValidatorRegistry, WizardForm, WizardProps, WizardSchema,
};

use crate::components::WizardFormView;
use crate::store_version::StoreVersion;

const CONTRACT_WIZARD: &str = r#"
terms:
  title:
    type: header
    props:
      text: Contract terms
  payment:
    type: number
    props:
      placeholder: Payment (ETH)
    validate: [required, number]
  timeout:
    type: number
    visibleIf: payment
    validate: [required, number]
  arbitratorExtraData:
    type: text
    visibleIf: "!payment"
parties:
  email:
    type: email
    validate: [email]
  partyB:
    type: text
    visibleIf: email
    formValues: arbitratorExtraData
    validate:
      - required
      - pattern: "^0x[0-9a-fA-F]{40}$"
  description:
    type: textarea
    props:
      style:
        flex: 2
    validate:
      - max_length: 280
  arbitrator:
    type: select
    props:
      options:
        - { value: kleros, label: Kleros }
        - { value: manual, label: Manual }
  agree:
    type: checkbox
    validate: [required]
"#;

#[component]
pub fn App() -> impl IntoView {
    let generator = create_form_generator(ComponentKit::html(), MemoryStore::shared());
    let bundle = WizardSchema::from_yaml_str(CONTRACT_WIZARD, &ValidatorRegistry::new())
        .and_then(|schema| generator.wizard_form("contract", &schema, FormOptions::default()));

    match bundle {
        Ok(bundle) => view! { <ContractWizard bundle=bundle /> }.into_any(),
        Err(err) => {
            log::error!("failed to build contract wizard: {}", err);
            view! { <div class="error">{err.to_string()}</div> }.into_any()
        }
    }
}

#[component]
fn ContractWizard(bundle: FormBundle<WizardForm>) -> impl IntoView {
    let store = bundle.form.store().clone();
    let version = StoreVersion::subscribe(store.clone());
    let wizard = bundle.form.clone();
    let bundle = StoredValue::new(bundle);

    let (page, set_page) = signal(None::<PageChange>);
    let (submitted, set_submitted) = signal(None::<String>);
    let back = StoredValue::new(None::<BackHandle>);

    let props = WizardProps::new(move |values| {
        log::info!("contract submitted with {} values", values.len());
        set_submitted.set(serde_json::to_string_pretty(&values).ok());
    })
    .on_page_change(move |change, _| set_page.set(Some(*change)))
    .back_handler(move |handle| back.set_value(Some(handle)))
    .wizard_class_name("wizard")
    .class_name("contract");

    let invalid = {
        let store = store.clone();
        move || {
            version.track();
            bundle.with_value(|bundle| bundle.is_invalid(store.as_ref()))
        }
    };
    let on_next = move |_| bundle.with_value(|bundle| store.dispatch(bundle.submit()));
    let on_back = move |_| {
        back.with_value(|handle| {
            if let Some(handle) = handle {
                handle.back();
            }
        })
    };

    view! {
        <div class="demo">
            <p class="wizard-progress">
                {move || {
                    page.get()
                        .map(|c| format!("Step {} of {}", c.current_page + 1, c.total_pages))
                        .unwrap_or_default()
                }}
            </p>
            <WizardFormView wizard=wizard props=props />
            <div class="wizard-actions">
                <button
                    disabled=move || !page.get().map(|c| c.has_prev_page).unwrap_or(false)
                    on:click=on_back
                >
                    "Back"
                </button>
                <button disabled=invalid on:click=on_next>
                    {move || if page.get().map(|c| c.has_next_page).unwrap_or(true) { "Next" } else { "Submit" }}
                </button>
            </div>
            <pre class="wizard-result">{move || submitted.get().unwrap_or_default()}</pre>
        </div>
    }
}
