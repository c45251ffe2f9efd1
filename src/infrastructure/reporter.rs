use crate::domain::models::{AppEvent, MessageSeverity, StatusMessage};
use tokio::sync::mpsc;

/// Sends user-facing status lines to whoever drains the event channel
#[derive(Debug, Clone)]
pub struct Reporter {
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl Reporter {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { event_sender }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send_log(message, MessageSeverity::Info);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send_log(message, MessageSeverity::Success);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send_log(message, MessageSeverity::Warning);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send_log(message, MessageSeverity::Error);
    }

    fn send_log(&self, message: impl Into<String>, severity: MessageSeverity) {
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage {
            message: message.into(),
            severity,
        }));
    }
}
