//! Leptos binding for schemaform
//!
//! [`SchemaFormView`] and [`WizardFormView`] mount compiled forms on their
//! store and render them reactively in the browser.

pub mod components;
pub mod controls;
mod demo;
mod store_version;

pub use components::*;
pub use demo::App;
pub use store_version::StoreVersion;

/// Route `log` output to the browser console and report panics there
pub fn init_console_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::warn!("console logger already installed");
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    init_console_logging();
    leptos::mount::mount_to_body(App);
}
