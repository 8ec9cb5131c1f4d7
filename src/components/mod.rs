//! UI Components
//!
//! Leptos view layer over the board context.

mod delete_confirm_button;
mod list_column;
mod notepad_column;
mod notice_line;
mod quick_add_form;
mod task_card;

pub use delete_confirm_button::DeleteConfirmButton;
pub use list_column::ListColumn;
pub use notepad_column::NotepadColumn;
pub use notice_line::NoticeLine;
pub use quick_add_form::QuickAddForm;
pub use task_card::TaskCard;
