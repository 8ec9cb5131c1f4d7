//! Task Board App
//!
//! Main application component: notepad on the left, list columns to the right.

use leptos::prelude::*;
use leptos_dragdrop::{bind_global_handlers, create_dnd_signals, make_on_mouseleave, make_on_mouseover, DndEvent};

use crate::actions;
use crate::components::{ListColumn, NotepadColumn, NoticeLine, QuickAddForm};
use crate::config::BoardConfig;
use crate::container::{DragTarget, DRAG_ID_ATTR};
use crate::context::BoardContext;

#[component]
pub fn App() -> impl IntoView {
    let config = BoardConfig::from_page();
    let activation_distance = config.activation_distance_px;

    // Provide context to all children
    let ctx = BoardContext::new(config);
    provide_context(ctx);

    let on_drag = Callback::new(move |event: DndEvent<DragTarget>| ctx.on_dnd_event(event));
    let dnd = create_dnd_signals(activation_distance, on_drag);
    bind_global_handlers(dnd);
    provide_context(dnd);

    // Initial load
    ctx.reload();

    let list_ids = move || ctx.board.with(|b| b.list_order());
    let create_list = Callback::new(move |name: String| {
        let color = ctx.config().default_list_color;
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::create_list(&gateway, &ctx.board, &name, &color).await
        });
    });

    view! {
        <div class=move || if dnd.dragging_id_read.get().is_some() { "app-layout dragging" } else { "app-layout" }>
            <header class="app-header">
                <h1>"Task Board"</h1>
                <QuickAddForm placeholder="New list..." button_label="Add list" on_add=create_list />
                <button class="reload-btn" on:click=move |_| ctx.reload()>"Reload"</button>
            </header>

            <NoticeLine />

            <Show when=move || ctx.loading.get()>
                <p class="loading">"Loading..."</p>
            </Show>

            <main
                class="board"
                on:mouseover=make_on_mouseover(dnd, DRAG_ID_ATTR, DragTarget::parse)
                on:mouseleave=make_on_mouseleave(dnd)
            >
                <NotepadColumn />
                <For
                    each=list_ids
                    key=|id| *id
                    children=move |id| view! { <ListColumn list_id=id /> }
                />
            </main>
        </div>
    }
}
