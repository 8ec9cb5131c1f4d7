//! Task Card Component
//!
//! One draggable card, used by both list columns and the notepad.

use leptos::prelude::*;
use leptos_dragdrop::make_on_mousedown;

use super::DeleteConfirmButton;
use crate::actions;
use crate::container::DragTarget;
use crate::context::{use_board, use_dnd};
use crate::models::TaskId;

#[component]
pub fn TaskCard(task_id: TaskId) -> impl IntoView {
    let ctx = use_board();
    let dnd = use_dnd();
    let target = DragTarget::Task(task_id);

    let task = Memo::new(move |_| ctx.board.with(|b| b.task(task_id).cloned()));
    let class = move || {
        let mut c = "task-card".to_string();
        if task.with(|t| t.as_ref().is_some_and(|t| t.done)) { c.push_str(" done"); }
        if dnd.dragging_id_read.get() == Some(target) { c.push_str(" dragging"); }
        if dnd.over_read.get() == Some(target) { c.push_str(" drag-over"); }
        c
    };

    let toggle = move |_: web_sys::Event| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::toggle_done(&gateway, &ctx.board, task_id).await
        });
    };
    let rename = move |ev: web_sys::Event| {
        let title = event_target_value(&ev);
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::edit_task_title(&gateway, &ctx.board, task_id, &title).await
        });
    };
    let delete = Callback::new(move |_: ()| {
        ctx.spawn_action(async move {
            let gateway = ctx.gateway();
            actions::delete_task(&gateway, &ctx.board, task_id).await
        });
    });

    view! {
        <div
            class=class
            data-drag-id=target.to_string()
        >
            <span class="drag-handle" title="Drag to move" on:mousedown=make_on_mousedown(dnd, target)>"⠿"</span>
            <input
                type="checkbox"
                prop:checked=move || task.with(|t| t.as_ref().is_some_and(|t| t.done))
                on:change=toggle
            />
            <input
                class="task-title"
                type="text"
                prop:value=move || task.with(|t| t.as_ref().map(|t| t.title.clone()).unwrap_or_default())
                on:change=rename
            />
            <DeleteConfirmButton button_class="task-delete-btn" on_confirm=delete />
        </div>
    }
}
