// src/ports/notify.rs
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient, human-readable notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Collects the notifications a view raised until the presenter drains them.
#[derive(Debug, Default)]
pub struct Notifier {
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notify");
        self.toasts.push(Toast {
            level: ToastLevel::Success,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "notify");
        self.toasts.push(Toast {
            level: ToastLevel::Error,
            message,
        });
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_raised_toasts_when_draining_then_returns_in_order_and_empties() {
        let mut notifier = Notifier::new();
        notifier.success("Todo added successfully!");
        notifier.error("Failed to load todos");

        let drained = notifier.drain();

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, ToastLevel::Success);
        assert_eq!(drained[1].message, "Failed to load todos");
        assert!(notifier.toasts().is_empty());
    }
}
