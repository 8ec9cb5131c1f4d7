//! Notepad Column Component
//!
//! Staging area for loose notes. Entries can be dragged into any list;
//! nothing can be dragged in from a list.

use leptos::prelude::*;

use super::{QuickAddForm, TaskCard};
use crate::actions;
use crate::container::{DragTarget, NOTEPAD_CONTAINER_ID};
use crate::context::{use_board, use_dnd};
use crate::models::Container;

#[component]
pub fn NotepadColumn() -> impl IntoView {
    let ctx = use_board();
    let dnd = use_dnd();
    let body = DragTarget::Body(Container::Notepad);

    let class = move || {
        if dnd.dragging_id_read.get().is_some() && dnd.over_read.get() == Some(body) {
            "notepad-column drag-over"
        } else {
            "notepad-column"
        }
    };

    let entry_ids = move || ctx.board.with(|b| b.order(Container::Notepad));
    let add_entry = Callback::new(move |title: String| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::add_notepad_entry(&gateway, &ctx.board, &title).await
        });
    });
    let refresh = move |_: web_sys::MouseEvent| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::refresh_notepad(&gateway, &ctx.board).await
        });
    };

    view! {
        <aside
            class=class
            data-drag-id=NOTEPAD_CONTAINER_ID
        >
            <header class="notepad-header">
                <h2>"Notepad"</h2>
                <button class="refresh-btn" title="Reload notepad" on:click=refresh>"↻"</button>
            </header>
            <QuickAddForm placeholder="Jot something down..." on_add=add_entry />
            <div class="notepad-body">
                <For
                    each=entry_ids
                    key=|id| *id
                    children=move |id| view! { <TaskCard task_id=id /> }
                />
            </div>
        </aside>
    }
}
