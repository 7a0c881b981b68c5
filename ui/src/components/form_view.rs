//! Single-page form component
//!
//! Renders a mounted `SchemaForm` reactively from its store and turns DOM
//! events into store actions.

use leptos::prelude::*;
use leptos::web_sys;
use schemaform::form::{FIELDSET_STYLE, FIELDS_STYLE};
use schemaform::{FormAction, FormProps, FormValues, SchemaForm, SubmitHandler};
use std::sync::Arc;

use crate::controls::{control_name, read_control, strip_live_values, sync_control};
use crate::store_version::StoreVersion;

// ============================================================================
// Mounting Component
// ============================================================================

/// Mounts `form` on its store for as long as the view lives
#[component]
pub fn SchemaFormView(
    /// Compiled form to mount
    form: SchemaForm,
    /// Base class; the fieldset and field row derive theirs from it
    #[prop(optional, into)]
    class_name: Option<String>,
    /// Disables the whole fieldset
    #[prop(into, default = Signal::stored(false))]
    disabled: Signal<bool>,
    /// Receives the values of a valid submit
    #[prop(optional)]
    on_submit: Option<SubmitHandler>,
    #[prop(optional)]
    initial_values: Option<FormValues>,
) -> impl IntoView {
    let version = StoreVersion::subscribe(form.store().clone());
    let mounted = Arc::new(form.mount(FormProps {
        class_name: class_name.clone(),
        disabled: disabled.get_untracked(),
        on_submit,
        initial_values,
    }));
    log::debug!("mounted form {}", form.form_id());

    on_cleanup(move || mounted.unmount());

    view! {
        <FormBody form=form class_name=class_name disabled=disabled version=version />
    }
}

// ============================================================================
// Form Body
// ============================================================================

/// The form container and its fields for a form that is already mounted
#[component]
pub fn FormBody(
    form: SchemaForm,
    class_name: Option<String>,
    #[prop(into)]
    disabled: Signal<bool>,
    version: StoreVersion,
) -> impl IntoView {
    let class_name = class_name.filter(|c| !c.is_empty());
    let fieldset_class = class_name.as_ref().map(|c| format!("{}-fieldset", c));
    let fields_class = class_name.as_ref().map(|c| format!("{}-fieldset-fields", c));

    let store = form.store().clone();
    let form_id = form.form_id().to_string();

    let on_input = {
        let store = store.clone();
        let form_id = form_id.clone();
        move |ev: web_sys::Event| {
            if let Some((name, value)) = read_control(&ev) {
                store.dispatch(FormAction::change(form_id.as_str(), name, value));
            }
        }
    };

    let on_blur = {
        let store = store.clone();
        let form_id = form_id.clone();
        move |ev: web_sys::FocusEvent| {
            if let Some(name) = control_name(&ev) {
                store.dispatch(FormAction::touch(form_id.as_str(), name));
            }
        }
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        store.dispatch(FormAction::submit(form_id.as_str()));
    };

    let fields = (0..form.fields().len())
        .map(|index| {
            view! { <FieldSlot form=form.clone() index=index disabled=disabled version=version /> }
        })
        .collect_view();

    view! {
        <form class=class_name on:input=on_input on:focusout=on_blur on:submit=on_submit>
            <fieldset class=fieldset_class style=FIELDSET_STYLE disabled=move || disabled.get()>
                <div class=fields_class style=FIELDS_STYLE>
                    {fields}
                </div>
            </fieldset>
        </form>
    }
}

// ============================================================================
// Field Slot
// ============================================================================

/// One field: markup follows the store, live values are synced in place
#[component]
fn FieldSlot(form: SchemaForm, index: usize, disabled: Signal<bool>, version: StoreVersion) -> impl IntoView {
    let name = form.fields()[index].name.clone();
    let slot = NodeRef::<leptos::html::Div>::new();

    let markup = Memo::new({
        let form = form.clone();
        move |_| {
            version.track();
            let node = form.render_field(index, disabled.get()).unwrap_or_default();
            strip_live_values(node).to_string()
        }
    });

    let value = Memo::new({
        let name = name.clone();
        move |_| {
            version.track();
            form.store().value(form.form_id(), &name)
        }
    });

    Effect::new(move |_| {
        let value = value.get();
        markup.track();
        if let Some(root) = slot.get() {
            sync_control(&root, &name, value.as_ref());
        }
    });

    view! {
        <div node_ref=slot style="display: contents" inner_html=move || markup.get()></div>
    }
}
