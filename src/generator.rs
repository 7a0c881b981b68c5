//! Entry point binding a component kit to a store

use std::fmt;
use std::sync::Arc;

use crate::error::FormResult;
use crate::form::{assemble, FormBundle, FormOptions, SchemaForm};
use crate::kit::ComponentKit;
use crate::schema::{Schema, WizardSchema};
use crate::store::FormStore;
use crate::wizard::{assemble_wizard, WizardForm};

/// Generates forms rendered with one kit and bound to one store
#[derive(Clone)]
pub struct FormGenerator {
    kit: ComponentKit,
    store: Arc<dyn FormStore>,
}

/// Create a generator for `kit` and `store`
pub fn create_form_generator(kit: ComponentKit, store: Arc<dyn FormStore>) -> FormGenerator {
    FormGenerator::new(kit, store)
}

impl FormGenerator {
    pub fn new(kit: ComponentKit, store: Arc<dyn FormStore>) -> Self {
        Self { kit, store }
    }

    pub fn kit(&self) -> &ComponentKit {
        &self.kit
    }

    pub fn store(&self) -> &Arc<dyn FormStore> {
        &self.store
    }

    /// A single-page form
    pub fn form(&self, form_id: &str, schema: &Schema, options: FormOptions) -> FormResult<FormBundle<SchemaForm>> {
        assemble(&self.kit, self.store.clone(), form_id, schema, options)
    }

    /// A multi-page form; page order follows `schema`
    pub fn wizard_form(
        &self,
        form_id: &str,
        schema: &WizardSchema,
        options: FormOptions,
    ) -> FormResult<FormBundle<WizardForm>> {
        assemble_wizard(&self.kit, self.store.clone(), form_id, schema, options)
    }
}

impl fmt::Debug for FormGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormGenerator").field("kit", &self.kit).finish()
    }
}
