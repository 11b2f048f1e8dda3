//! Transcript message type.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// A single entry in a topic transcript.
///
/// Messages are immutable once appended and have no identity beyond their
/// position in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// The message body, verbatim.
    pub text: String,
    /// `true` when the user wrote the message.
    pub is_user: bool,
    /// `true` when the entry records a failed generation request.
    #[serde(default)]
    pub is_error: bool,
    /// Local wall-clock time the entry was added (`HH:MM`).
    pub time: String,
}

impl ChatMessage {
    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true, false)
    }

    /// A successful model reply.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, false, false)
    }

    /// An error entry carrying remediation text.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, false, true)
    }

    /// Compares author, kind and body, ignoring the display time.
    ///
    /// A panel stamps its echo independently of the stored copy, so the two
    /// can disagree on `time` across a minute boundary.
    pub fn same_content(&self, other: &ChatMessage) -> bool {
        self.text == other.text && self.is_user == other.is_user && self.is_error == other.is_error
    }

    fn new(text: impl Into<String>, is_user: bool, is_error: bool) -> Self {
        Self {
            text: text.into(),
            is_user,
            is_error,
            time: current_time(),
        }
    }
}

/// Formats the current local time the way transcripts display it.
pub(crate) fn current_time() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_flags() {
        let user = ChatMessage::user("hello");
        assert!(user.is_user);
        assert!(!user.is_error);

        let reply = ChatMessage::assistant("hi");
        assert!(!reply.is_user);
        assert!(!reply.is_error);

        let error = ChatMessage::error("Error: down");
        assert!(!error.is_user);
        assert!(error.is_error);
    }

    #[test]
    fn test_time_is_hours_and_minutes() {
        let message = ChatMessage::user("x");
        assert_eq!(message.time.len(), 5);
        assert_eq!(&message.time[2..3], ":");
    }

    #[test]
    fn test_same_content_ignores_time() {
        let mut echo = ChatMessage::user("hello");
        echo.time = "23:59".to_string();
        let mut stored = ChatMessage::user("hello");
        stored.time = "00:00".to_string();

        assert!(echo.same_content(&stored));
        assert!(!echo.same_content(&ChatMessage::assistant("hello")));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ChatMessage::error("boom")).unwrap();
        assert_eq!(json["isUser"], false);
        assert_eq!(json["isError"], true);
        assert_eq!(json["text"], "boom");
    }

    #[test]
    fn test_missing_is_error_defaults_to_false() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"text":"hi","isUser":false,"time":"10:00"}"#).unwrap();
        assert!(!message.is_error);
    }
}
