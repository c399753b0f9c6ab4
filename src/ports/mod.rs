// src/ports/mod.rs
pub mod notify;
pub mod terminal;

pub use notify::{Notifier, Toast, ToastLevel};
pub use terminal::TerminalPresenter;
