//! Wizard component
//!
//! Mounts a `WizardForm` and shows its current page inside the transition
//! group; the page form itself is mounted by the wizard.

use leptos::prelude::*;
use schemaform::{FormValues, PageChange, WizardForm, WizardProps};
use std::sync::Arc;

use super::form_view::FormBody;
use crate::store_version::StoreVersion;

#[component]
pub fn WizardFormView(
    /// Compiled wizard to mount
    wizard: WizardForm,
    /// Submit, page-change and back-handler callbacks plus modifiers
    props: WizardProps,
) -> impl IntoView {
    let version = StoreVersion::subscribe(wizard.store().clone());
    let transition = wizard.options().transition.clone();
    let timeout = transition.enter_timeout();
    let animate_leave = transition.leave;

    let page = RwSignal::new(0usize);
    let entering = RwSignal::new(false);
    let leaving = RwSignal::new(None::<usize>);
    // Bumped per transition so a stale timeout leaves a newer one alone
    let turn = RwSignal::new(0u64);

    // Track the page and start its transition before forwarding to the host
    let host_handler = props.on_page_change.clone();
    let props = WizardProps {
        on_page_change: Some(Arc::new(move |change: &PageChange, data: Option<&FormValues>| {
            let previous = page.get_untracked();
            if previous != change.current_page {
                let current = turn.get_untracked() + 1;
                turn.set(current);
                entering.set(true);
                if animate_leave {
                    leaving.set(Some(previous));
                }
                page.set(change.current_page);
                set_timeout(
                    move || {
                        if turn.try_get_untracked() == Some(current) {
                            entering.try_set(false);
                            leaving.try_set(None);
                        }
                    },
                    timeout,
                );
            }
            if let Some(handler) = &host_handler {
                handler(change, data);
            }
        })),
        ..props
    };
    let wizard_class = props.wizard_class_name.clone().filter(|c| !c.is_empty());
    let page_class_name = props.class_name.clone();
    let disabled = props.disabled;

    let mounted = Arc::new(wizard.mount(props));
    mounted.initialize();
    log::debug!("mounted wizard {} with {} pages", wizard.form_id(), wizard.total_pages());

    on_cleanup({
        let mounted = mounted.clone();
        move || mounted.unmount()
    });

    let incoming_class = Memo::new({
        let page_class = transition.page_class();
        let enter_class = transition.enter_class();
        move |_| {
            if entering.get() {
                format!("{} {}", page_class, enter_class)
            } else {
                page_class.clone()
            }
        }
    });

    let current_page = move || {
        let key = page.get();
        let form = mounted.current_form();
        let class_name = mounted.current_props().and_then(|props| props.class_name);
        match form {
            Some(form) => view! {
                <div data-page=key.to_string() class=move || incoming_class.get() style="position: relative">
                    <FormBody form=form class_name=class_name disabled=disabled version=version />
                </div>
            }
            .into_any(),
            None => ().into_any(),
        }
    };

    // The outgoing page is a disabled copy rendered from the shared values
    let pages = wizard.pages().to_vec();
    let outgoing_class = format!("{} {}", transition.page_class(), transition.leave_class());
    let outgoing_page = move || {
        let form = leaving.get().and_then(|index| pages.get(index).cloned())?;
        Some(view! {
            <div
                class=outgoing_class.clone()
                aria-hidden="true"
                style="position: absolute; top: 0; left: 0; right: 0"
            >
                <FormBody form=form class_name=page_class_name.clone() disabled=true version=version />
            </div>
        })
    };

    view! {
        <div class=wizard_class>
            <div
                class=transition.name.clone()
                style="position: relative"
                data-transition=transition.name.clone()
                data-enter-timeout=transition.enter_timeout_ms.to_string()
                data-transition-leave=transition.leave.to_string()
            >
                {outgoing_page}
                {current_page}
            </div>
        </div>
    }
}
