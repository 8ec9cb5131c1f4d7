//! List Column Component
//!
//! A board column: draggable header, add form, and its task cards.

use leptos::prelude::*;
use leptos_dragdrop::make_on_mousedown;

use super::{DeleteConfirmButton, QuickAddForm, TaskCard};
use crate::actions;
use crate::container::{container_id_for_list, DragTarget};
use crate::context::{use_board, use_dnd};
use crate::models::{Container, ListId};

#[component]
pub fn ListColumn(list_id: ListId) -> impl IntoView {
    let ctx = use_board();
    let dnd = use_dnd();
    let column = DragTarget::Column(list_id);
    let body = DragTarget::Body(Container::List(list_id));

    let list = Memo::new(move |_| ctx.board.with(|b| b.list(list_id).cloned()));
    let name = move || list.with(|l| l.as_ref().map(|l| l.name.clone()).unwrap_or_default());
    let color = move || {
        list.with(|l| l.as_ref().and_then(|l| l.color.clone()))
            .unwrap_or_else(|| ctx.config().default_list_color)
    };
    let task_ids = move || ctx.board.with(|b| b.order(Container::List(list_id)));

    let class = move || {
        let mut c = "list-column".to_string();
        if dnd.dragging_id_read.get() == Some(column) { c.push_str(" dragging"); }
        if matches!(dnd.over_read.get(), Some(over) if over == body || over == column) {
            c.push_str(" drag-over");
        }
        c
    };

    let add_task = Callback::new(move |title: String| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::add_task(&gateway, &ctx.board, list_id, &title).await
        });
    });
    let rename = move |ev: web_sys::Event| {
        let name = event_target_value(&ev);
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::rename_list(&gateway, &ctx.board, list_id, &name).await
        });
    };
    let recolor = move |ev: web_sys::Event| {
        let color = event_target_value(&ev);
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::recolor_list(&gateway, &ctx.board, list_id, &color).await
        });
    };
    let delete = Callback::new(move |_: ()| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::delete_list(&gateway, &ctx.board, list_id).await
        });
    });

    view! {
        <section
            class=class
            data-drag-id=container_id_for_list(list_id)
            style=move || format!("background-color: {};", color())
        >
            <header
                class="list-header"
                data-drag-id=column.to_string()
                on:mousedown=make_on_mousedown(dnd, column)
            >
                <span class="drag-handle" title="Drag to reorder">"⠿"</span>
                <input class="list-name" type="text" prop:value=name on:change=rename />
                <input class="list-color" type="color" prop:value=color on:change=recolor />
                <DeleteConfirmButton
                    button_class="list-delete-btn"
                    prompt="Delete list and its tasks?"
                    on_confirm=delete
                />
            </header>

            <QuickAddForm placeholder="Add a task..." on_add=add_task />

            <div class="list-body">
                <For
                    each=task_ids
                    key=|id| *id
                    children=move |id| view! { <TaskCard task_id=id /> }
                />
                <Show when=move || task_ids().is_empty()>
                    <p class="list-empty">"Drop tasks here"</p>
                </Show>
            </div>
        </section>
    }
}
