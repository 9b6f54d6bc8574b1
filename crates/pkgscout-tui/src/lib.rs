// Terminal UI implementation using ratatui
// Search view, favorites view, and the modals in between

pub mod app;
pub mod runner;
pub mod toast;
pub mod ui;

pub use app::{App, InputMode, Modal, View};
pub use runner::run_tui;
pub use toast::Toasts;
