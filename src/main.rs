//! Task Board Frontend Entry Point

mod actions;
mod api;
mod app;
mod board;
mod components;
mod config;
mod container;
mod context;
mod drag_session;
mod logging;
mod models;
mod reconcile;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    mount_to_body(App);
}
