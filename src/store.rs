//! Form state store
//!
//! [`FormStore`] is the state-management layer forms bind to: field
//! registration, live values, per-field validation, submit and destroy
//! actions, and change subscriptions, all scoped by form identity.
//! [`MemoryStore`] is the in-process implementation.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::{FormError, FormResult};
use crate::render::FieldMeta;
use crate::validate::Validator;
use crate::values::FormValues;

/// Receives the form's values when a valid submit is dispatched
pub type SubmitHandler = Arc<dyn Fn(FormValues) + Send + Sync>;

/// Rewrites a changed value before it is stored: `(value, all_values) -> value`
pub type Normalizer = Arc<dyn Fn(&Value, &FormValues) -> Value + Send + Sync>;

/// Called after every dispatched action
pub type StoreListener = Arc<dyn Fn(&FormAction) + Send + Sync>;

/// Handle returned by [`FormStore::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What a field contributes to its form while registered
#[derive(Clone, Default)]
pub struct FieldRegistration {
    pub validator: Option<Validator>,
    pub normalize: Option<Normalizer>,
}

impl fmt::Debug for FieldRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistration")
            .field("validator", &self.validator.is_some())
            .field("normalize", &self.normalize.is_some())
            .finish()
    }
}

/// Actions dispatched to a store
#[derive(Clone, Debug, PartialEq)]
pub enum FormAction {
    Change { form: String, field: String, value: Value },
    Touch { form: String, field: String },
    Submit { form: String },
    Destroy { form: String },
}

impl FormAction {
    pub fn change(form: impl Into<String>, field: impl Into<String>, value: Value) -> Self {
        FormAction::Change {
            form: form.into(),
            field: field.into(),
            value,
        }
    }

    pub fn touch(form: impl Into<String>, field: impl Into<String>) -> Self {
        FormAction::Touch {
            form: form.into(),
            field: field.into(),
        }
    }

    pub fn submit(form: impl Into<String>) -> Self {
        FormAction::Submit { form: form.into() }
    }

    pub fn destroy(form: impl Into<String>) -> Self {
        FormAction::Destroy { form: form.into() }
    }

    /// The form this action targets
    pub fn form(&self) -> &str {
        match self {
            FormAction::Change { form, .. }
            | FormAction::Touch { form, .. }
            | FormAction::Submit { form }
            | FormAction::Destroy { form } => form,
        }
    }
}

/// Read-only view of one form's state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSnapshot {
    pub values: FormValues,
    /// Registered fields in registration order
    pub fields: Vec<String>,
    /// Current validation error per registered field
    pub errors: BTreeMap<String, String>,
    pub touched: Vec<String>,
    pub submit_count: u32,
    pub submit_failed: bool,
}

/// The state-management layer consumed by forms
pub trait FormStore: Send + Sync {
    /// Reserve a form identity; fails while another live claim holds it
    fn claim(&self, form: &str) -> FormResult<u64>;

    /// Give up the claim made with `serial`
    fn release(&self, form: &str, serial: u64);

    /// Seed values unless the form already has them
    fn initialize(&self, form: &str, values: FormValues);

    fn register_field(&self, form: &str, field: &str, registration: FieldRegistration);

    fn unregister_field(&self, form: &str, field: &str);

    /// Install (or clear) the handler a `Submit` action calls
    fn set_submit_handler(&self, form: &str, handler: Option<SubmitHandler>);

    fn value(&self, form: &str, field: &str) -> Option<Value>;

    fn values(&self, form: &str) -> FormValues;

    fn field_meta(&self, form: &str, field: &str) -> FieldMeta;

    /// Whether any registered field currently fails validation
    fn is_invalid(&self, form: &str) -> bool;

    fn snapshot(&self, form: &str) -> Option<FormSnapshot>;

    fn dispatch(&self, action: FormAction);

    fn subscribe(&self, listener: StoreListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

// ============================================================================
// Form Identity
// ============================================================================

/// A claimed form identity, released when the last clone drops
#[derive(Clone)]
pub struct FormToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    form: String,
    serial: u64,
    store: Arc<dyn FormStore>,
}

impl FormToken {
    /// Claim `form` in `store`
    pub fn claim(store: Arc<dyn FormStore>, form: &str) -> FormResult<Self> {
        let serial = store.claim(form)?;
        Ok(Self {
            inner: Arc::new(TokenInner {
                form: form.to_string(),
                serial,
                store,
            }),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.inner.form
    }

    pub fn store(&self) -> &Arc<dyn FormStore> {
        &self.inner.store
    }
}

impl fmt::Debug for FormToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormToken")
            .field("form", &self.inner.form)
            .field("serial", &self.inner.serial)
            .finish()
    }
}

impl Drop for TokenInner {
    fn drop(&mut self) {
        self.store.release(&self.form, self.serial);
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

#[derive(Default)]
struct FormState {
    values: FormValues,
    initialized: bool,
    fields: IndexMap<String, FieldRegistration>,
    touched: HashSet<String>,
    submit_handler: Option<SubmitHandler>,
    submit_count: u32,
    submit_failed: bool,
}

impl FormState {
    fn checks(&self) -> Checks {
        Checks {
            validators: self
                .fields
                .iter()
                .filter_map(|(field, registration)| Some((field.clone(), registration.validator.clone()?)))
                .collect(),
            values: self.values.clone(),
        }
    }
}

/// Validators and values copied out of a form, evaluated after the store
/// lock is released so validators may read the store
struct Checks {
    validators: Vec<(String, Validator)>,
    values: FormValues,
}

impl Checks {
    fn error_for(&self, field: &str) -> Option<String> {
        let (_, validator) = self.validators.iter().find(|(name, _)| name == field)?;
        self.run(field, validator)
    }

    fn run(&self, field: &str, validator: &Validator) -> Option<String> {
        let value = self.values.get(field).cloned().unwrap_or(Value::Null);
        validator.validate(&value, &self.values)
    }

    fn any_error(&self) -> bool {
        self.validators.iter().any(|(field, validator)| self.run(field, validator).is_some())
    }

    fn errors(&self) -> BTreeMap<String, String> {
        self.validators
            .iter()
            .filter_map(|(field, validator)| self.run(field, validator).map(|err| (field.clone(), err)))
            .collect()
    }
}

/// Store keeping every form's state in memory
pub struct MemoryStore {
    forms: Mutex<HashMap<String, FormState>>,
    claims: Mutex<HashMap<String, u64>>,
    listeners: Mutex<Vec<(SubscriptionId, StoreListener)>>,
    next_serial: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            claims: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
            next_serial: AtomicU64::new(1),
        }
    }

    /// A new store behind the shared trait object forms expect
    pub fn shared() -> Arc<dyn FormStore> {
        Arc::new(Self::new())
    }

    /// Identities of forms that currently hold state
    pub fn forms(&self) -> Vec<String> {
        let mut forms: Vec<String> = self.forms.lock().keys().cloned().collect();
        forms.sort();
        forms
    }

    fn notify(&self, action: &FormAction) {
        // Listeners may dispatch again, so call them without holding the lock
        let listeners: Vec<StoreListener> = self.listeners.lock().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(action);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore for MemoryStore {
    fn claim(&self, form: &str) -> FormResult<u64> {
        let mut claims = self.claims.lock();
        if claims.contains_key(form) {
            return Err(FormError::DuplicateForm(form.to_string()));
        }
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        claims.insert(form.to_string(), serial);
        debug!(form, serial, "Claimed form identity");
        Ok(serial)
    }

    fn release(&self, form: &str, serial: u64) {
        let mut claims = self.claims.lock();
        if claims.get(form) == Some(&serial) {
            claims.remove(form);
            debug!(form, serial, "Released form identity");
        }
    }

    fn initialize(&self, form: &str, values: FormValues) {
        let mut forms = self.forms.lock();
        let state = forms.entry(form.to_string()).or_default();
        if !state.initialized {
            state.values.extend(values);
            state.initialized = true;
        }
    }

    fn register_field(&self, form: &str, field: &str, registration: FieldRegistration) {
        trace!(form, field, "Registering field");
        let mut forms = self.forms.lock();
        forms
            .entry(form.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), registration);
    }

    fn unregister_field(&self, form: &str, field: &str) {
        trace!(form, field, "Unregistering field");
        if let Some(state) = self.forms.lock().get_mut(form) {
            state.fields.shift_remove(field);
        }
    }

    fn set_submit_handler(&self, form: &str, handler: Option<SubmitHandler>) {
        let mut forms = self.forms.lock();
        match handler {
            Some(handler) => forms.entry(form.to_string()).or_default().submit_handler = Some(handler),
            None => {
                if let Some(state) = forms.get_mut(form) {
                    state.submit_handler = None;
                }
            }
        }
    }

    fn value(&self, form: &str, field: &str) -> Option<Value> {
        self.forms.lock().get(form)?.values.get(field).cloned()
    }

    fn values(&self, form: &str) -> FormValues {
        self.forms
            .lock()
            .get(form)
            .map(|state| state.values.clone())
            .unwrap_or_default()
    }

    fn field_meta(&self, form: &str, field: &str) -> FieldMeta {
        let (checks, touched) = {
            let forms = self.forms.lock();
            match forms.get(form) {
                Some(state) => (state.checks(), state.touched.contains(field)),
                None => return FieldMeta::default(),
            }
        };
        FieldMeta {
            error: checks.error_for(field),
            touched,
        }
    }

    fn is_invalid(&self, form: &str) -> bool {
        let checks = self.forms.lock().get(form).map(FormState::checks);
        checks.map(|checks| checks.any_error()).unwrap_or(false)
    }

    fn snapshot(&self, form: &str) -> Option<FormSnapshot> {
        let (checks, mut snapshot) = {
            let forms = self.forms.lock();
            let state = forms.get(form)?;
            let snapshot = FormSnapshot {
                values: state.values.clone(),
                fields: state.fields.keys().cloned().collect(),
                errors: BTreeMap::new(),
                touched: state.touched.iter().cloned().collect(),
                submit_count: state.submit_count,
                submit_failed: state.submit_failed,
            };
            (state.checks(), snapshot)
        };
        snapshot.touched.sort();
        snapshot.errors = checks.errors();
        Some(snapshot)
    }

    fn dispatch(&self, action: FormAction) {
        trace!(?action, "Dispatching form action");

        let mut submit = None;
        match &action {
            FormAction::Change { form, field, value } => {
                let normalize = self.forms.lock().get(form).and_then(|state| {
                    let normalize = state.fields.get(field)?.normalize.clone()?;
                    Some((normalize, state.values.clone()))
                });
                let value = match normalize {
                    Some((normalize, values)) => normalize(value, &values),
                    None => value.clone(),
                };
                self.forms
                    .lock()
                    .entry(form.clone())
                    .or_default()
                    .values
                    .insert(field.clone(), value);
            }
            FormAction::Touch { form, field } => {
                self.forms.lock().entry(form.clone()).or_default().touched.insert(field.clone());
            }
            FormAction::Submit { form } => {
                let checks = self.forms.lock().get_mut(form).map(|state| {
                    let registered: Vec<String> = state.fields.keys().cloned().collect();
                    state.touched.extend(registered);
                    state.submit_count += 1;
                    state.checks()
                });
                match checks {
                    Some(checks) => {
                        let errors = checks.errors();
                        let handler = self.forms.lock().get_mut(form).and_then(|state| {
                            state.submit_failed = !errors.is_empty();
                            state.submit_handler.clone()
                        });
                        if errors.is_empty() {
                            submit = Some((handler, checks.values));
                        } else {
                            debug!(form = form.as_str(), errors = errors.len(), "Submit blocked by validation errors");
                        }
                    }
                    None => warn!(form = form.as_str(), "Submit dispatched for a form without state"),
                }
            }
            FormAction::Destroy { form } => {
                if self.forms.lock().remove(form).is_some() {
                    debug!(form = form.as_str(), "Destroyed form state");
                }
            }
        }

        self.notify(&action);

        if let Some((handler, values)) = submit {
            match handler {
                Some(handler) => handler(values),
                None => warn!(form = action.form(), "Valid submit but no submit handler is mounted"),
            }
        }
    }

    fn subscribe(&self, listener: StoreListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_serial.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> FieldRegistration {
        FieldRegistration {
            validator: Some(Validator::new(|v, _| v.is_null().then(|| "required".to_string()))),
            normalize: None,
        }
    }

    #[test]
    fn test_claims_detect_collisions() {
        let store = MemoryStore::shared();
        let token = FormToken::claim(store.clone(), "contract").unwrap();
        assert_eq!(token.form_id(), "contract");

        let err = FormToken::claim(store.clone(), "contract").err();
        assert!(matches!(err, Some(FormError::DuplicateForm(form)) if form == "contract"));

        let clone = token.clone();
        drop(token);
        assert!(FormToken::claim(store.clone(), "contract").is_err());

        drop(clone);
        assert!(FormToken::claim(store, "contract").is_ok());
    }

    #[test]
    fn test_initialize_only_once() {
        let store = MemoryStore::new();
        let mut first = FormValues::new();
        first.insert("payment".to_string(), json!(10));
        store.initialize("f", first);

        let mut second = FormValues::new();
        second.insert("payment".to_string(), json!(99));
        store.initialize("f", second);

        assert_eq!(store.value("f", "payment"), Some(json!(10)));
    }

    #[test]
    fn test_validation_tracks_registered_fields() {
        let store = MemoryStore::new();
        assert!(!store.is_invalid("f"));

        store.register_field("f", "payment", required());
        assert!(store.is_invalid("f"));
        assert_eq!(store.field_meta("f", "payment").error, Some("required".to_string()));

        store.dispatch(FormAction::change("f", "payment", json!(5)));
        assert!(!store.is_invalid("f"));

        store.dispatch(FormAction::change("f", "payment", Value::Null));
        store.unregister_field("f", "payment");
        assert!(!store.is_invalid("f"));
    }

    #[test]
    fn test_submit_calls_handler_only_when_valid() {
        let store = MemoryStore::new();
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = submitted.clone();
        store.register_field("f", "payment", required());
        store.set_submit_handler("f", Some(Arc::new(move |values| sink.lock().push(values))));

        store.dispatch(FormAction::submit("f"));
        assert!(submitted.lock().is_empty());
        let snapshot = store.snapshot("f").unwrap();
        assert!(snapshot.submit_failed);
        assert_eq!(snapshot.touched, vec!["payment".to_string()]);

        store.dispatch(FormAction::change("f", "payment", json!(1)));
        store.dispatch(FormAction::submit("f"));
        assert_eq!(submitted.lock().len(), 1);
        assert_eq!(submitted.lock()[0].get("payment"), Some(&json!(1)));
        assert_eq!(store.snapshot("f").unwrap().submit_count, 2);
    }

    #[test]
    fn test_handler_may_reenter_store() {
        let store = Arc::new(MemoryStore::new());
        let inner = store.clone();
        store.set_submit_handler(
            "f",
            Some(Arc::new(move |_| inner.dispatch(FormAction::destroy("f")))),
        );

        store.dispatch(FormAction::submit("f"));
        assert!(store.snapshot("f").is_none());
    }

    #[test]
    fn test_validators_and_normalizers_may_read_store() {
        let store = Arc::new(MemoryStore::new());

        let reader = Arc::downgrade(&store);
        let validator = Validator::new(move |_, _| {
            let other = reader.upgrade()?.value("f", "b")?;
            (other == json!("BLOCK")).then(|| "blocked by b".to_string())
        });
        store.register_field("f", "a", FieldRegistration { validator: Some(validator), normalize: None });

        let reader = Arc::downgrade(&store);
        let normalize: Normalizer = Arc::new(move |v: &Value, _: &FormValues| {
            let prefix = reader
                .upgrade()
                .and_then(|s| s.value("f", "prefix"))
                .map(|p| crate::values::display_value(&p))
                .unwrap_or_default();
            json!(format!("{}{}", prefix, crate::values::display_value(v).to_uppercase()))
        });
        store.register_field("f", "b", FieldRegistration { validator: None, normalize: Some(normalize) });

        store.dispatch(FormAction::change("f", "b", json!("block")));
        assert_eq!(store.value("f", "b"), Some(json!("BLOCK")));
        assert!(store.is_invalid("f"));
        assert_eq!(store.field_meta("f", "a").error.as_deref(), Some("blocked by b"));
        let snapshot = store.snapshot("f").unwrap();
        assert_eq!(snapshot.errors.get("a").map(String::as_str), Some("blocked by b"));

        store.dispatch(FormAction::submit("f"));
        assert!(store.snapshot("f").unwrap().submit_failed);
    }

    #[test]
    fn test_normalizer_applies_on_change() {
        let store = MemoryStore::new();
        store.register_field(
            "f",
            "code",
            FieldRegistration {
                validator: None,
                normalize: Some(Arc::new(|v, _| json!(crate::values::display_value(v).to_uppercase()))),
            },
        );

        store.dispatch(FormAction::change("f", "code", json!("abc")));
        assert_eq!(store.value("f", "code"), Some(json!("ABC")));
    }

    #[test]
    fn test_listeners_and_destroy() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = store.subscribe(Arc::new(move |action| sink.lock().push(action.clone())));

        store.dispatch(FormAction::change("f", "a", json!(1)));
        store.dispatch(FormAction::destroy("f"));
        assert_eq!(seen.lock().len(), 2);
        assert!(store.forms().is_empty());

        store.unsubscribe(id);
        store.dispatch(FormAction::touch("f", "a"));
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(store.forms(), vec!["f".to_string()]);
    }
}
