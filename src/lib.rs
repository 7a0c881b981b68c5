//! # Schemaform - Schema-Driven Forms
//!
//! Schemaform generates data-entry forms, including multi-page wizards,
//! from declarative schemas. A schema maps field keys to descriptors
//! (component type, validators, visibility conditions); the generator
//! compiles it into fields bound to a form-state store and rendered by a
//! pluggable component kit.
//!
//! ## Features
//!
//! - **Field compilation**: display names, first-error-wins validators, default props
//! - **Conditional fields**: `visibleIf: "key"` / `"!key"` gates rendering and validation
//! - **Cross-field values**: `formValues: "key"` injects a sibling's value
//! - **Wizards**: page sequencing with page-change notifications and submit routing
//! - **Documents**: schemas in JSON or YAML with named validators
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaform::{
//!     create_form_generator, validators, ComponentKit, FieldDescriptor, FormOptions, FormProps,
//!     MemoryStore, Schema,
//! };
//!
//! # fn main() -> schemaform::FormResult<()> {
//! let generator = create_form_generator(ComponentKit::html(), MemoryStore::shared());
//! let schema = Schema::new()
//!     .field("payment", FieldDescriptor::new("number").validate(validators::required()))
//!     .field("timeout", FieldDescriptor::new("number").visible_if("payment"));
//!
//! let bundle = generator.form("contract", &schema, FormOptions::default())?;
//! let mounted = bundle.form.mount(FormProps::new().class_name("contract"));
//! assert!(bundle.is_invalid(generator.store().as_ref()));
//! println!("{}", mounted.render());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: names, values, validators, visibility
//! - **Compilation**: schema → fields → form / wizard
//! - **Ports**: `FormStore` (state) and `ComponentKit` (renderers)
//! - **Render model**: host-neutral `Node` tree, printable as HTML

pub mod error;
pub mod fields;
pub mod form;
pub mod generator;
pub mod kit;
pub mod names;
pub mod render;
pub mod schema;
pub mod store;
pub mod validate;
pub mod values;
pub mod visibility;
pub mod wizard;

pub use error::{FormError, FormResult};
pub use fields::{compile_fields, FieldElement};
pub use form::{assemble, FormBundle, FormOptions, FormProps, MountedForm, SchemaForm, TransitionOptions};
pub use generator::{create_form_generator, FormGenerator};
pub use kit::ComponentKit;
pub use names::camel_to_title_case;
pub use render::{Decorator, Element, FieldComponent, FieldMeta, FieldProps, Node, Renderer};
pub use schema::{FieldDescriptor, FieldOptions, Schema, WizardSchema};
pub use store::{FieldRegistration, FormAction, FormSnapshot, FormStore, FormToken, MemoryStore, SubmitHandler};
pub use validate::{resolve_validators, validators, Validator, ValidatorRegistry, ValidatorSpec};
pub use values::{is_truthy, FormValues};
pub use visibility::{validate_if, VisibilityCondition};
pub use wizard::{
    assemble_wizard, BackHandle, MountedWizard, PageChange, WizardForm, WizardProps,
};
