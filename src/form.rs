//! Form assembler
//!
//! [`SchemaForm`] wraps compiled fields in a form container bound to one
//! form identity. Mounting registers the fields and submit handler with
//! the store; unmounting releases them according to [`FormOptions`].

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::FormResult;
use crate::fields::{compile_fields, FieldElement};
use crate::kit::ComponentKit;
use crate::render::{Element, Node};
use crate::schema::Schema;
use crate::store::{FormAction, FormStore, FormToken, SubmitHandler};
use crate::values::FormValues;

/// Inline style of the fieldset wrapping a form's fields
pub const FIELDSET_STYLE: &str = "border: none; margin: 0 10px; padding: 0 30px";
/// Inline style of the row holding the fields
pub const FIELDS_STYLE: &str = "display: flex; flex-flow: row wrap";

// ============================================================================
// Options
// ============================================================================

/// Store binding options for a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Drop the form's state when it unmounts
    pub destroy_on_unmount: bool,
    /// Unregister the form's fields when it unmounts without being destroyed
    pub force_unregister_on_unmount: bool,
    /// Values seeded on first mount
    pub initial_values: FormValues,
    /// Page transition used by wizards
    pub transition: TransitionOptions,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            destroy_on_unmount: true,
            force_unregister_on_unmount: false,
            initial_values: FormValues::new(),
            transition: TransitionOptions::default(),
        }
    }
}

impl FormOptions {
    /// Load options from TOML, JSON or YAML text; missing keys keep their defaults
    pub fn load(source: &str, format: FileFormat) -> FormResult<Self> {
        let defaults = TransitionOptions::default();
        let settings = Config::builder()
            .set_default("destroy_on_unmount", true)?
            .set_default("force_unregister_on_unmount", false)?
            .set_default("transition.name", defaults.name)?
            .set_default("transition.enter_timeout_ms", defaults.enter_timeout_ms as i64)?
            .set_default("transition.leave", defaults.leave)?
            .add_source(File::from_str(source, format))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOptions {
    pub name: String,
    pub enter_timeout_ms: u64,
    /// Animate the outgoing page too
    pub leave: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            name: "carousel".to_string(),
            enter_timeout_ms: 800,
            leave: false,
        }
    }
}

impl TransitionOptions {
    /// Class every page wrapper carries
    pub fn page_class(&self) -> String {
        format!("{}-page", self.name)
    }

    /// Classes added to the incoming page until the enter timeout elapses
    pub fn enter_class(&self) -> String {
        format!("{0}-enter {0}-enter-active", self.name)
    }

    /// Classes of the outgoing page; only rendered when `leave` is set
    pub fn leave_class(&self) -> String {
        format!("{0}-leave {0}-leave-active", self.name)
    }

    pub fn enter_timeout(&self) -> Duration {
        Duration::from_millis(self.enter_timeout_ms)
    }
}

// ============================================================================
// Form
// ============================================================================

/// Props a host passes when mounting a form
#[derive(Clone, Default)]
pub struct FormProps {
    pub class_name: Option<String>,
    /// Disables the whole fieldset
    pub disabled: bool,
    pub on_submit: Option<SubmitHandler>,
    /// Merged over [`FormOptions::initial_values`]
    pub initial_values: Option<FormValues>,
}

impl FormProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_submit<F>(mut self, on_submit: F) -> Self
    where
        F: Fn(FormValues) + Send + Sync + 'static,
    {
        self.on_submit = Some(Arc::new(on_submit));
        self
    }

    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = Some(values);
        self
    }
}

impl fmt::Debug for FormProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormProps")
            .field("class_name", &self.class_name)
            .field("disabled", &self.disabled)
            .field("on_submit", &self.on_submit.is_some())
            .field("initial_values", &self.initial_values)
            .finish()
    }
}

/// A compiled single-page form
#[derive(Clone)]
pub struct SchemaForm {
    inner: Arc<FormInner>,
}

struct FormInner {
    form_id: String,
    fields: Vec<FieldElement>,
    options: FormOptions,
    store: Arc<dyn FormStore>,
}

impl SchemaForm {
    /// Compile `schema` into a form bound to `form_id`
    pub fn new(
        kit: &ComponentKit,
        store: Arc<dyn FormStore>,
        form_id: &str,
        schema: &Schema,
        options: FormOptions,
    ) -> FormResult<Self> {
        let fields = compile_fields(kit, form_id, schema)?;
        Ok(Self {
            inner: Arc::new(FormInner {
                form_id: form_id.to_string(),
                fields,
                options,
                store,
            }),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.inner.form_id
    }

    pub fn fields(&self) -> &[FieldElement] {
        &self.inner.fields
    }

    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    pub fn store(&self) -> &Arc<dyn FormStore> {
        &self.inner.store
    }

    /// Register with the store and start accepting submits
    pub fn mount(&self, props: FormProps) -> MountedForm {
        let FormInner {
            form_id,
            fields,
            options,
            store,
        } = self.inner.as_ref();

        let mut initial = options.initial_values.clone();
        if let Some(values) = &props.initial_values {
            initial.extend(values.clone());
        }
        if !initial.is_empty() {
            store.initialize(form_id, initial);
        }

        for field in fields {
            store.register_field(form_id, &field.name, field.registration());
        }
        store.set_submit_handler(form_id, props.on_submit.clone());
        debug!(form = form_id.as_str(), fields = fields.len(), "Mounted form");

        MountedForm {
            form: self.clone(),
            props,
            mounted: AtomicBool::new(true),
        }
    }

    /// The form container with every field rendered from the store
    pub fn render(&self, props: &FormProps) -> Node {
        let store = self.inner.store.as_ref();
        let fields = self
            .inner
            .fields
            .iter()
            .map(|field| field.render(store, &self.inner.form_id, props.disabled));
        container(props.class_name.as_deref(), props.disabled, fields)
    }

    /// Render one field by position
    pub fn render_field(&self, index: usize, disabled: bool) -> Option<Node> {
        let field = self.inner.fields.get(index)?;
        Some(field.render(self.inner.store.as_ref(), &self.inner.form_id, disabled))
    }
}

impl fmt::Debug for SchemaForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaForm")
            .field("form_id", &self.inner.form_id)
            .field("fields", &self.inner.fields)
            .field("options", &self.inner.options)
            .finish()
    }
}

/// `<form>` → disabled-as-a-unit `<fieldset>` → flex row of fields
pub fn container(class_name: Option<&str>, disabled: bool, fields: impl IntoIterator<Item = Node>) -> Node {
    let class_name = class_name.filter(|c| !c.is_empty());

    let row = Element::new("div")
        .attr_opt("class", class_name.map(|c| format!("{}-fieldset-fields", c)))
        .attr("style", FIELDS_STYLE)
        .children(fields);

    let fieldset = Element::new("fieldset")
        .attr_opt("class", class_name.map(|c| format!("{}-fieldset", c)))
        .attr("style", FIELDSET_STYLE)
        .flag("disabled", disabled)
        .child(row);

    Element::new("form").attr_opt("class", class_name).child(fieldset).into()
}

/// A form registered with its store
pub struct MountedForm {
    form: SchemaForm,
    props: FormProps,
    mounted: AtomicBool,
}

impl MountedForm {
    pub fn form(&self) -> &SchemaForm {
        &self.form
    }

    pub fn form_id(&self) -> &str {
        self.form.form_id()
    }

    pub fn props(&self) -> &FormProps {
        &self.props
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn render(&self) -> Node {
        self.form.render(&self.props)
    }

    /// Dispatch this form's submit action
    pub fn submit(&self) {
        self.form.store().dispatch(FormAction::submit(self.form_id()));
    }

    /// Release the store registrations; later calls do nothing
    pub fn unmount(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }

        let store = self.form.store();
        let form_id = self.form.form_id();
        let options = self.form.options();

        store.set_submit_handler(form_id, None);
        if options.destroy_on_unmount {
            store.dispatch(FormAction::destroy(form_id));
        } else if options.force_unregister_on_unmount {
            for field in self.form.fields() {
                store.unregister_field(form_id, &field.name);
            }
        }
        debug!(form = form_id, "Unmounted form");
    }
}

impl Drop for MountedForm {
    fn drop(&mut self) {
        self.unmount();
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// A generated form with its identity-scoped helpers
pub struct FormBundle<F> {
    pub form: F,
    token: FormToken,
}

impl<F> FormBundle<F> {
    pub fn new(form: F, token: FormToken) -> Self {
        Self { form, token }
    }

    pub fn form_id(&self) -> &str {
        self.token.form_id()
    }

    pub fn token(&self) -> &FormToken {
        &self.token
    }

    /// Whether the store currently holds any validation error for this form
    pub fn is_invalid(&self, store: &dyn FormStore) -> bool {
        store.is_invalid(self.form_id())
    }

    /// The store's submit action for this form, for the host to dispatch
    pub fn submit(&self) -> FormAction {
        FormAction::submit(self.form_id())
    }
}

impl<F: fmt::Debug> fmt::Debug for FormBundle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBundle")
            .field("form", &self.form)
            .field("token", &self.token)
            .finish()
    }
}

/// Claim `form_id` and compile `schema` into a single-page form bundle
pub fn assemble(
    kit: &ComponentKit,
    store: Arc<dyn FormStore>,
    form_id: &str,
    schema: &Schema,
    options: FormOptions,
) -> FormResult<FormBundle<SchemaForm>> {
    let form = SchemaForm::new(kit, store.clone(), form_id, schema, options)?;
    let token = FormToken::claim(store, form_id)?;
    Ok(FormBundle::new(form, token))
}
