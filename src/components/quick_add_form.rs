//! Quick Add Form Component
//!
//! Single-line form for adding tasks, notepad entries and lists.

use leptos::prelude::*;

/// Calls `on_add` with the typed text and clears the input.
/// Blank input is ignored.
#[component]
pub fn QuickAddForm(
    #[prop(into)] placeholder: String,
    #[prop(into)] on_add: Callback<String>,
    #[prop(into, default = "Add".to_string())] button_label: String,
) -> impl IntoView {
    let (text, set_text) = signal(String::new());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let value = text.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        on_add.run(value);
        set_text.set(String::new());
    };

    view! {
        <form class="quick-add-form" on:submit=submit>
            <input
                type="text"
                placeholder=placeholder
                prop:value=move || text.get()
                on:input=move |ev| set_text.set(event_target_value(&ev))
            />
            <button type="submit">{button_label}</button>
        </form>
    }
}
