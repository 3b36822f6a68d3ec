// Toast notifications
//
// Screens and the API client report outcomes through a `Notifier` so the
// console output can be swapped for a recorder in tests.

use colored::Colorize;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.notify(ToastLevel::Info, message);
    }
}

/// Prints toasts to stderr so they never mix with piped output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Success => eprintln!("{} {}", "✓".green().bold(), message),
            ToastLevel::Error => eprintln!("{} {}", "✗".red().bold(), message.red()),
            ToastLevel::Info => eprintln!("{} {}", "ℹ".cyan(), message),
        }
    }
}

/// Records toasts in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of error toasts, oldest first
    pub fn errors(&self) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter(|t| t.level == ToastLevel::Error)
            .map(|t| t.message)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: ToastLevel, message: &str) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Toast {
                level,
                message: message.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_levels() {
        let notifier = MemoryNotifier::default();
        notifier.success("Saved");
        notifier.error("Nope");
        notifier.info("Heads up");

        assert_eq!(notifier.toasts().len(), 3);
        assert_eq!(notifier.errors(), vec!["Nope".to_string()]);
    }
}
