use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// User-visible message channel. Every entry is mirrored to the `log`
/// facade and kept until the caller drains it.
pub struct MessageLog {
    entries: Mutex<Vec<UserMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn info(&self, text: impl Into<String>) {
        self.record(MessageLevel::Info, text.into());
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.record(MessageLevel::Warning, text.into());
    }

    pub fn error(&self, text: impl Into<String>) {
        self.record(MessageLevel::Error, text.into());
    }

    pub fn record(&self, level: MessageLevel, text: String) {
        match level {
            MessageLevel::Info => info!("{}", text),
            MessageLevel::Warning => warn!("{}", text),
            MessageLevel::Error => error!("{}", text),
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(UserMessage { level, text });
        }
    }

    /// Copies the pending messages without consuming them.
    pub fn snapshot(&self) -> Vec<UserMessage> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Takes every pending message, oldest first.
    pub fn drain(&self) -> Vec<UserMessage> {
        self.entries
            .lock()
            .map(|mut entries| std::mem::take(&mut *entries))
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.iter().any(|m| m.level == MessageLevel::Error))
            .unwrap_or(false)
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let log = MessageLog::new();
        log.info("loaded dipole");
        log.error("solver exited");
        assert!(log.has_errors());

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "loaded dipole");
        assert_eq!(drained[1].level, MessageLevel::Error);
        assert!(log.drain().is_empty());
        assert!(!log.has_errors());
    }
}
