//! Leptos components for generated forms

pub mod form_view;
pub mod wizard_view;

pub use form_view::*;
pub use wizard_view::*;
