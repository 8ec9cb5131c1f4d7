//! Application Context
//!
//! Board signal, drag tracker and notices, shared via Leptos Context API.

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{DndEvent, DndSignals};
use log::{info, warn};

use crate::actions::{self, ActionResult};
use crate::api::HttpGateway;
use crate::board::BoardState;
use crate::config::{page_origin, BoardConfig};
use crate::container::DragTarget;
use crate::drag_session::{Commit, DragTracker};
use crate::reconcile::{self, moved_title, BoardCell, CommitOutcome};

impl BoardCell for RwSignal<BoardState> {
    fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        self.with_untracked(f)
    }

    fn write(&self, f: impl FnOnce(&mut BoardState)) {
        self.update(f);
    }
}

/// App-wide state provided via context
#[derive(Clone, Copy)]
pub struct BoardContext {
    pub board: RwSignal<BoardState>,
    /// True until the first load finishes
    pub loading: RwSignal<bool>,
    pub notice: ReadSignal<Option<String>>,
    set_notice: WriteSignal<Option<String>>,
    notice_seq: StoredValue<u32>,
    tracker: StoredValue<DragTracker>,
    config: StoredValue<BoardConfig>,
    api_url: StoredValue<String>,
}

/// Pointer sensor state, keyed by board drag targets
pub type BoardDnd = DndSignals<DragTarget>;

pub fn use_board() -> BoardContext {
    expect_context::<BoardContext>()
}

pub fn use_dnd() -> BoardDnd {
    expect_context::<BoardDnd>()
}

impl BoardContext {
    pub fn new(config: BoardConfig) -> Self {
        let (notice, set_notice) = signal(None::<String>);
        let api_url = config.api_url(&page_origin());
        info!("board api at {}", api_url);
        Self {
            board: RwSignal::new(BoardState::default()),
            loading: RwSignal::new(true),
            notice,
            set_notice,
            notice_seq: StoredValue::new(0),
            tracker: StoredValue::new(DragTracker::new(config.throttle())),
            config: StoredValue::new(config),
            api_url: StoredValue::new(api_url),
        }
    }

    pub fn config(&self) -> BoardConfig {
        self.config.get_value()
    }

    pub fn gateway(&self) -> HttpGateway {
        HttpGateway::new(self.api_url.get_value())
    }

    /// Shows `message` until it times out or is replaced.
    pub fn notify(&self, message: impl Into<String>) {
        let seq = self.notice_seq.get_value().wrapping_add(1);
        self.notice_seq.set_value(seq);
        self.set_notice.set(Some(message.into()));

        let ctx = *self;
        let ttl = self.config.get_value().notice_ttl_ms;
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(ttl).await;
            if ctx.notice_seq.get_value() == seq {
                ctx.set_notice.set(None);
            }
        });
    }

    pub fn dismiss_notice(&self) {
        self.set_notice.set(None);
    }

    /// Runs a board action in the background; failures become notices.
    pub fn spawn_action<Fut, T>(&self, action: Fut)
    where
        Fut: Future<Output = ActionResult<T>> + 'static,
        T: 'static,
    {
        let ctx = *self;
        spawn_local(async move {
            if let Err(err) = action.await {
                warn!("action failed: {}", err);
                ctx.notify(err.to_string());
            }
        });
    }

    /// Replaces the board with a fresh load from the server.
    pub fn reload(&self) {
        let ctx = *self;
        spawn_local(async move {
            match actions::load_board(&ctx.gateway()).await {
                Ok(board) => ctx.board.set(board),
                Err(err) => {
                    warn!("loading board failed: {}", err);
                    ctx.notify(format!("Could not load the board ({})", err));
                }
            }
            ctx.loading.set(false);
        });
    }

    // ========================
    // Drag lifecycle
    // ========================

    pub fn on_dnd_event(&self, event: DndEvent<DragTarget>) {
        let mut tracker = self.tracker.get_value();
        match event {
            DndEvent::Start(active) => {
                self.board.with_untracked(|b| {
                    tracker.start(active, b);
                });
            }
            DndEvent::Over { target, at_ms } => {
                self.board.maybe_update(|b| tracker.hover(target, at_ms, b).is_some());
            }
            DndEvent::Drop(over) => {
                let mut commit = None;
                self.board.update(|b| commit = tracker.release(over, b));
                if let Some(commit) = commit {
                    self.persist(commit);
                }
            }
            DndEvent::Cancel => {
                self.board.maybe_update(|b| tracker.cancel(b));
            }
        }
        self.tracker.set_value(tracker);
    }

    fn persist(&self, commit: Commit) {
        let ctx = *self;
        let title = self.board.with_untracked(|b| moved_title(&commit, b));
        let settled = commit.clone();
        spawn_local(async move {
            let gateway = ctx.gateway();
            let outcome = reconcile::reconcile(&gateway, &ctx.board, commit).await;
            let mut tracker = ctx.tracker.get_value();
            tracker.settle(&settled);
            ctx.tracker.set_value(tracker);

            match outcome {
                Ok(CommitOutcome::Persisted) => {}
                Ok(CommitOutcome::OrderStale) => ctx.notify(match title {
                    Some(title) => format!("\"{}\" moved, but the new order may not be saved", title),
                    None => "Moved, but the new order may not be saved".to_string(),
                }),
                Err(err) => ctx.notify(err.to_string()),
            }
        });
    }
}
