//! Notice Line Component

use leptos::prelude::*;

use crate::context::use_board;

/// Latest failure message; click to dismiss.
#[component]
pub fn NoticeLine() -> impl IntoView {
    let ctx = use_board();

    view! {
        {move || ctx.notice.get().map(|message| view! {
            <div class="notice" role="status" on:click=move |_| ctx.dismiss_notice()>
                {message}
            </div>
        })}
    }
}
