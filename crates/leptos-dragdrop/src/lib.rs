//! Leptos DragDrop Utilities
//!
//! Pointer sensor for Leptos using mouse events. A press only becomes a
//! drag once the pointer travels past an activation distance, so plain
//! clicks still reach the element. The sensor knows nothing about what is
//! being dragged: ids are any small `Copy` type, and the lifecycle is
//! reported through a single [`DndEvent`] callback.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Drag lifecycle as seen by the consumer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DndEvent<T> {
    /// Pointer moved past the activation distance while pressing `T`
    Start(T),
    /// Pointer entered a new target; `at_ms` is `performance.now()`
    Over { target: T, at_ms: f64 },
    /// Button released; the target under the pointer, if any
    Drop(Option<T>),
    /// Escape pressed or the window lost focus
    Cancel,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals<T: Send + Sync + 'static> {
    pub dragging_id_read: ReadSignal<Option<T>>,
    dragging_id_write: WriteSignal<Option<T>>,
    pub over_read: ReadSignal<Option<T>>,
    over_write: WriteSignal<Option<T>>,
    /// True for a moment after a drop, so the trailing click can be ignored
    pub drag_just_ended_read: ReadSignal<bool>,
    drag_just_ended_write: WriteSignal<bool>,
    /// Pressed but not yet dragging
    pending_id: RwSignal<Option<T>>,
    start_pos: RwSignal<(i32, i32)>,
    activation_distance_px: f64,
    on_event: Callback<DndEvent<T>>,
}

/// Default pointer travel before a press becomes a drag
pub const DEFAULT_ACTIVATION_DISTANCE_PX: f64 = 8.0;

/// How long `drag_just_ended` stays set after a drop
const CLICK_SUPPRESS_MS: i32 = 100;

/// Euclidean travel check between press and current position
pub fn exceeds_activation(start: (i32, i32), now: (i32, i32), distance_px: f64) -> bool {
    let dx = f64::from(now.0 - start.0);
    let dy = f64::from(now.1 - start.1);
    (dx * dx + dy * dy).sqrt() >= distance_px
}

/// High-resolution timestamp for hover throttling
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn create_dnd_signals<T>(activation_distance_px: f64, on_event: Callback<DndEvent<T>>) -> DndSignals<T>
where
    T: Copy + PartialEq + Send + Sync + 'static,
{
    let (dragging_id_read, dragging_id_write) = signal(None::<T>);
    let (over_read, over_write) = signal(None::<T>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    DndSignals {
        dragging_id_read,
        dragging_id_write,
        over_read,
        over_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id: RwSignal::new(None),
        start_pos: RwSignal::new((0, 0)),
        activation_distance_px,
        on_event,
    }
}

impl<T> DndSignals<T>
where
    T: Copy + PartialEq + Send + Sync + 'static,
{
    pub fn is_dragging(&self) -> bool {
        self.dragging_id_read.get_untracked().is_some()
    }

    /// Clears all drag state. Emits `Drop` or `Cancel` only if a drag was active.
    fn finish(&self, event: impl FnOnce(Option<T>) -> DndEvent<T>) {
        let was_dragging = self.is_dragging();
        let over = self.over_read.get_untracked();
        self.pending_id.set(None);
        self.dragging_id_write.set(None);
        self.over_write.set(None);
        if !was_dragging {
            return;
        }

        self.drag_just_ended_write.set(true);
        if let Some(win) = web_sys::window() {
            let clear = self.drag_just_ended_write;
            let cb = Closure::<dyn FnMut()>::new(move || clear.set(false));
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                CLICK_SUPPRESS_MS,
            );
            cb.forget();
        }
        self.on_event.run(event(over));
    }
}

/// Create mousedown handler for draggable elements.
/// Records a pending drag with the start position.
pub fn make_on_mousedown<T>(dnd: DndSignals<T>, id: T) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    T: Copy + PartialEq + Send + Sync + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || dnd.is_dragging() {
            return;
        }
        // Ignore presses on controls
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        // Innermost draggable wins (a card inside a column)
        ev.stop_propagation();
        dnd.pending_id.set(Some(id));
        dnd.start_pos.set((ev.client_x(), ev.client_y()));
    }
}

/// Create a delegated mouseover handler for a whole drop area.
///
/// The hovered target is the closest element carrying `attr`, decoded with
/// `decode`. Elements without the attribute, or with a value `decode`
/// rejects, are ignored. Nesting decides priority: a card inside a list
/// body resolves to the card.
pub fn make_on_mouseover<T, F>(dnd: DndSignals<T>, attr: &'static str, decode: F) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    T: Copy + PartialEq + Send + Sync + 'static,
    F: Fn(&str) -> Option<T> + Copy + 'static,
{
    move |ev: web_sys::MouseEvent| {
        if !dnd.is_dragging() {
            return;
        }
        let Some(target) = hovered_target(&ev, attr, decode) else {
            return;
        };
        if dnd.over_read.get_untracked() == Some(target) {
            return;
        }
        dnd.over_write.set(Some(target));
        dnd.on_event.run(DndEvent::Over { target, at_ms: now_ms() });
    }
}

fn hovered_target<T>(ev: &web_sys::MouseEvent, attr: &str, decode: impl Fn(&str) -> Option<T>) -> Option<T> {
    let element = ev.target()?.dyn_into::<web_sys::Element>().ok()?;
    let holder = element.closest(&format!("[{}]", attr)).ok()??;
    decode(&holder.get_attribute(attr)?)
}

/// Create mouseleave handler for the outermost drop area
pub fn make_on_mouseleave<T>(dnd: DndSignals<T>) -> impl Fn(web_sys::MouseEvent) + Copy + 'static
where
    T: Copy + PartialEq + Send + Sync + 'static,
{
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.over_write.set(None);
        }
    }
}

/// Bind document/window listeners: activation on mousemove, drop on
/// mouseup, cancel on Escape and on window blur. Call once.
pub fn bind_global_handlers<T>(dnd: DndSignals<T>)
where
    T: Copy + PartialEq + Send + Sync + 'static,
{
    let Some(win) = web_sys::window() else {
        return;
    };
    let Some(doc) = win.document() else {
        return;
    };

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_id.get_untracked() else {
            return;
        };
        if dnd.is_dragging() {
            return;
        }
        let start = dnd.start_pos.get_untracked();
        if exceeds_activation(start, (ev.client_x(), ev.client_y()), dnd.activation_distance_px) {
            dnd.dragging_id_write.set(Some(pending));
            dnd.on_event.run(DndEvent::Start(pending));
        }
    });
    let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    on_mousemove.forget();

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        // Not dragging: the click fires naturally on the element
        dnd.finish(DndEvent::Drop);
    });
    let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    on_mouseup.forget();

    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && dnd.is_dragging() {
            ev.prevent_default();
            dnd.finish(|_| DndEvent::Cancel);
        }
    });
    let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
    on_keydown.forget();

    let on_blur = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        dnd.finish(|_| DndEvent::Cancel);
    });
    let _ = win.add_event_listener_with_callback("blur", on_blur.as_ref().unchecked_ref());
    on_blur.forget();
}
