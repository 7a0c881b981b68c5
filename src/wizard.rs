//! Wizard sequencer
//!
//! A [`WizardForm`] compiles each page of a [`WizardSchema`] into a
//! [`SchemaForm`] sharing one form identity. Mounted, it keeps the current
//! page index and swaps the page form on every transition:
//!
//! - `previous_page` decrements, stopping at the first page
//! - `next_page` increments, stopping at the last page
//! - `handle_submit` advances on every page but the last, where it calls
//!   the host's submit handler
//!
//! Every transition notifies `on_page_change`, including clamped ones.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use crate::error::{FormError, FormResult};
use crate::form::{FormBundle, FormOptions, FormProps, MountedForm, SchemaForm};
use crate::kit::ComponentKit;
use crate::render::{Element, Node};
use crate::schema::WizardSchema;
use crate::store::{FormAction, FormStore, FormToken, SubmitHandler};
use crate::values::FormValues;

/// Page availability sent with every page-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub current_page: usize,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub total_pages: usize,
}

impl PageChange {
    fn at(page: usize, total_pages: usize) -> Self {
        Self {
            current_page: page,
            has_prev_page: page != 0,
            has_next_page: page + 1 != total_pages,
            total_pages,
        }
    }
}

/// Receives the page change and the form data that caused it, if any
pub type PageChangeHandler = Arc<dyn Fn(&PageChange, Option<&FormValues>) + Send + Sync>;

/// Receives the wizard's back transition for use outside the form
pub type BackHandlerSlot = Arc<dyn Fn(BackHandle) + Send + Sync>;

/// Steps a mounted wizard back one page
#[derive(Clone)]
pub struct BackHandle {
    runtime: Weak<WizardRuntime>,
}

impl BackHandle {
    /// Go to the previous page; `false` once the wizard is gone
    pub fn back(&self) -> bool {
        match self.runtime.upgrade() {
            Some(runtime) => runtime.previous_page(),
            None => false,
        }
    }
}

impl fmt::Debug for BackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackHandle")
            .field("alive", &(self.runtime.strong_count() > 0))
            .finish()
    }
}

/// Props a host passes when mounting a wizard
#[derive(Clone)]
pub struct WizardProps {
    /// Called with the form values when the last page submits
    pub on_submit: SubmitHandler,
    pub on_page_change: Option<PageChangeHandler>,
    pub back_handler: Option<BackHandlerSlot>,
    pub wizard_class_name: Option<String>,
    /// Class of each page form
    pub class_name: Option<String>,
    pub disabled: bool,
    pub initial_values: Option<FormValues>,
}

impl WizardProps {
    pub fn new<F>(on_submit: F) -> Self
    where
        F: Fn(FormValues) + Send + Sync + 'static,
    {
        Self {
            on_submit: Arc::new(on_submit),
            on_page_change: None,
            back_handler: None,
            wizard_class_name: None,
            class_name: None,
            disabled: false,
            initial_values: None,
        }
    }

    pub fn on_page_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PageChange, Option<&FormValues>) + Send + Sync + 'static,
    {
        self.on_page_change = Some(Arc::new(handler));
        self
    }

    pub fn back_handler<F>(mut self, slot: F) -> Self
    where
        F: Fn(BackHandle) + Send + Sync + 'static,
    {
        self.back_handler = Some(Arc::new(slot));
        self
    }

    pub fn wizard_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.wizard_class_name = Some(class_name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = Some(values);
        self
    }
}

impl fmt::Debug for WizardProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardProps")
            .field("on_page_change", &self.on_page_change.is_some())
            .field("back_handler", &self.back_handler.is_some())
            .field("wizard_class_name", &self.wizard_class_name)
            .field("class_name", &self.class_name)
            .field("disabled", &self.disabled)
            .field("initial_values", &self.initial_values)
            .finish()
    }
}

// ============================================================================
// Wizard Form
// ============================================================================

/// A compiled multi-page form
#[derive(Clone)]
pub struct WizardForm {
    inner: Arc<WizardInner>,
}

struct WizardInner {
    form_id: String,
    page_keys: Vec<String>,
    pages: Vec<SchemaForm>,
    options: FormOptions,
    store: Arc<dyn FormStore>,
}

impl WizardForm {
    /// Compile every page of `schema` against the shared `form_id`
    pub fn new(
        kit: &ComponentKit,
        store: Arc<dyn FormStore>,
        form_id: &str,
        schema: &WizardSchema,
        options: FormOptions,
    ) -> FormResult<Self> {
        if schema.is_empty() {
            return Err(FormError::EmptyWizard(form_id.to_string()));
        }

        // Pages keep the shared values alive and only drop their own fields
        let page_options = FormOptions {
            destroy_on_unmount: false,
            force_unregister_on_unmount: true,
            ..options.clone()
        };
        let pages = schema
            .iter()
            .map(|(_, page)| SchemaForm::new(kit, store.clone(), form_id, page, page_options.clone()))
            .collect::<FormResult<Vec<_>>>()?;

        debug!(form = form_id, pages = pages.len(), "Compiled wizard form");
        Ok(Self {
            inner: Arc::new(WizardInner {
                form_id: form_id.to_string(),
                page_keys: schema.keys().map(str::to_string).collect(),
                pages,
                options,
                store,
            }),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.inner.form_id
    }

    pub fn pages(&self) -> &[SchemaForm] {
        &self.inner.pages
    }

    pub fn page_keys(&self) -> &[String] {
        &self.inner.page_keys
    }

    pub fn total_pages(&self) -> usize {
        self.inner.pages.len()
    }

    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    pub fn store(&self) -> &Arc<dyn FormStore> {
        &self.inner.store
    }

    /// Mount on the first page. Call [`MountedWizard::initialize`] once the
    /// host is ready to receive notifications.
    pub fn mount(&self, props: WizardProps) -> MountedWizard {
        let runtime = Arc::new(WizardRuntime {
            wizard: self.clone(),
            props,
            state: Mutex::new(WizardState {
                page: 0,
                initialized: false,
                mounted: true,
                current: None,
            }),
        });
        runtime.show_page(0);
        debug!(form = self.form_id(), "Mounted wizard form");
        MountedWizard { runtime }
    }
}

impl fmt::Debug for WizardForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardForm")
            .field("form_id", &self.inner.form_id)
            .field("page_keys", &self.inner.page_keys)
            .finish()
    }
}

/// Claim `form_id` and compile `schema` into a wizard bundle
pub fn assemble_wizard(
    kit: &ComponentKit,
    store: Arc<dyn FormStore>,
    form_id: &str,
    schema: &WizardSchema,
    options: FormOptions,
) -> FormResult<FormBundle<WizardForm>> {
    let wizard = WizardForm::new(kit, store.clone(), form_id, schema, options)?;
    let token = FormToken::claim(store, form_id)?;
    Ok(FormBundle::new(wizard, token))
}

// ============================================================================
// Mounted Wizard
// ============================================================================

struct WizardState {
    page: usize,
    initialized: bool,
    mounted: bool,
    current: Option<MountedForm>,
}

struct WizardRuntime {
    wizard: WizardForm,
    props: WizardProps,
    state: Mutex<WizardState>,
}

impl WizardRuntime {
    fn last_page(&self) -> usize {
        self.wizard.total_pages() - 1
    }

    fn page(&self) -> usize {
        self.state.lock().page
    }

    /// Replace the mounted page form. The wizard lock is not held while
    /// forms mount or unmount since both call into the store.
    fn show_page(self: &Arc<Self>, page: usize) {
        let previous = self.state.lock().current.take();
        if let Some(previous) = previous {
            previous.unmount();
        }

        let weak = Arc::downgrade(self);
        let on_submit: SubmitHandler = Arc::new(move |values| {
            if let Some(runtime) = weak.upgrade() {
                runtime.handle_submit(values);
            }
        });
        let props = FormProps {
            class_name: self.props.class_name.clone(),
            disabled: self.props.disabled,
            on_submit: Some(on_submit),
            initial_values: self.props.initial_values.clone(),
        };
        let form = self.wizard.inner.pages[page].mount(props);

        let mut state = self.state.lock();
        if state.mounted {
            state.current = Some(form);
        } else {
            drop(state);
            form.unmount();
        }
    }

    /// Move to `target`, remounting only when the index changes
    fn go_to(self: &Arc<Self>, target: impl FnOnce(usize) -> usize, data: Option<&FormValues>) -> bool {
        let (from, to) = {
            let mut state = self.state.lock();
            if !state.mounted {
                warn!(form = self.wizard.form_id(), "Page transition on an unmounted wizard");
                return false;
            }
            let from = state.page;
            state.page = target(from);
            (from, state.page)
        };

        if from != to {
            debug!(form = self.wizard.form_id(), from, to, "Wizard page change");
            self.show_page(to);
        }
        self.notify(data);
        true
    }

    fn previous_page(self: &Arc<Self>) -> bool {
        self.go_to(|page| page.saturating_sub(1), None)
    }

    fn next_page(self: &Arc<Self>, data: Option<&FormValues>) -> bool {
        let last = self.last_page();
        self.go_to(|page| (page + 1).min(last), data)
    }

    fn handle_submit(self: &Arc<Self>, values: FormValues) {
        if self.page() != self.last_page() {
            // Intermediate pages advance without forwarding their data
            self.next_page(None);
            return;
        }
        (self.props.on_submit)(values);
    }

    fn notify(&self, data: Option<&FormValues>) {
        if let Some(handler) = &self.props.on_page_change {
            let change = PageChange::at(self.page(), self.wizard.total_pages());
            handler(&change, data);
        }
    }

    fn unmount(&self) {
        let current = {
            let mut state = self.state.lock();
            if !state.mounted {
                return;
            }
            state.mounted = false;
            state.current.take()
        };

        if let Some(form) = current {
            form.unmount();
        }
        self.wizard
            .inner
            .store
            .dispatch(FormAction::destroy(self.wizard.form_id()));
        debug!(form = self.wizard.form_id(), "Unmounted wizard form");
    }
}

/// A wizard mounted on its store; unmounts when dropped
pub struct MountedWizard {
    runtime: Arc<WizardRuntime>,
}

impl MountedWizard {
    /// Hand the back transition to the host and announce the first page.
    /// Runs once; later calls do nothing.
    pub fn initialize(&self) {
        {
            let mut state = self.runtime.state.lock();
            if state.initialized || !state.mounted {
                return;
            }
            state.initialized = true;
        }

        if let Some(slot) = &self.runtime.props.back_handler {
            slot(self.back_handle());
        }
        self.runtime.notify(None);
    }

    pub fn form_id(&self) -> &str {
        self.runtime.wizard.form_id()
    }

    pub fn wizard(&self) -> &WizardForm {
        &self.runtime.wizard
    }

    pub fn page(&self) -> usize {
        self.runtime.page()
    }

    pub fn total_pages(&self) -> usize {
        self.runtime.wizard.total_pages()
    }

    pub fn page_change(&self) -> PageChange {
        PageChange::at(self.page(), self.total_pages())
    }

    pub fn is_mounted(&self) -> bool {
        self.runtime.state.lock().mounted
    }

    pub fn back_handle(&self) -> BackHandle {
        BackHandle {
            runtime: Arc::downgrade(&self.runtime),
        }
    }

    /// Returns `false` when the wizard is no longer mounted
    pub fn previous_page(&self) -> bool {
        self.runtime.previous_page()
    }

    pub fn next_page(&self, data: Option<FormValues>) -> bool {
        self.runtime.next_page(data.as_ref())
    }

    /// Submit routing for the current page's form data
    pub fn handle_submit(&self, values: FormValues) {
        self.runtime.handle_submit(values);
    }

    /// The page form currently mounted
    pub fn current_form(&self) -> Option<SchemaForm> {
        let state = self.runtime.state.lock();
        state.current.as_ref().map(|form| form.form().clone())
    }

    /// Props the current page form was mounted with
    pub fn current_props(&self) -> Option<FormProps> {
        let state = self.runtime.state.lock();
        state.current.as_ref().map(|form| form.props().clone())
    }

    /// Wizard wrapper → transition group → page keyed by index → page form
    pub fn render(&self) -> Node {
        let (page, form) = {
            let state = self.runtime.state.lock();
            let form = state.current.as_ref().map(|form| form.render()).unwrap_or_default();
            (state.page, form)
        };
        let transition = &self.runtime.wizard.inner.options.transition;

        let page = Element::new("div")
            .key(page.to_string())
            .attr("class", transition.page_class())
            .attr("style", "position: relative")
            .child(form);

        let group = Element::new("div")
            .attr("class", transition.name.as_str())
            .attr("data-transition", transition.name.as_str())
            .attr("data-enter-timeout", transition.enter_timeout_ms.to_string())
            .attr("data-transition-leave", transition.leave.to_string())
            .child(page);

        Element::new("div")
            .attr_opt(
                "class",
                self.runtime.props.wizard_class_name.as_deref().filter(|c| !c.is_empty()),
            )
            .child(group)
            .into()
    }

    /// Unmount the current page and destroy the shared form state
    pub fn unmount(&self) {
        self.runtime.unmount();
    }
}

impl fmt::Debug for MountedWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedWizard")
            .field("form_id", &self.form_id())
            .field("page", &self.page())
            .finish()
    }
}

impl Drop for MountedWizard {
    fn drop(&mut self) {
        self.runtime.unmount();
    }
}
