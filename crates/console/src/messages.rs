//! Hint and error messages shown to the operator.
//!
//! Both kinds travel through one channel so the front end sees them in the
//! order they were raised. A message without its own duration takes the
//! default for its kind.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::MessagesConfig;

/// Kind of a displayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
	Hint,
	Error,
}

impl MessageKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hint => "hint",
			Self::Error => "error",
		}
	}
}

/// Message text with an optional display duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	pub text: String,
	pub duration: Option<Duration>,
}

impl Message {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			duration: None,
		}
	}
}

impl From<&str> for Message {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}

impl From<String> for Message {
	fn from(text: String) -> Self {
		Self::new(text)
	}
}

/// Fully resolved display instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
	pub kind: MessageKind,
	pub text: String,
	pub duration: Duration,
}

impl fmt::Display for Notice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.kind.as_str(), self.text)
	}
}

/// Sending half, cloned into every screen.
#[derive(Debug, Clone)]
pub struct Messages {
	tx: mpsc::UnboundedSender<Notice>,
	hint_duration: Duration,
	error_duration: Duration,
}

impl Messages {
	pub fn channel(config: &MessagesConfig) -> (Self, mpsc::UnboundedReceiver<Notice>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let messages = Self {
			tx,
			hint_duration: Duration::from_millis(config.hint_ms),
			error_duration: Duration::from_millis(config.error_ms),
		};
		(messages, rx)
	}

	pub fn hint(&self, message: impl Into<Message>) {
		self.emit(MessageKind::Hint, message.into());
	}

	pub fn error(&self, message: impl Into<Message>) {
		self.emit(MessageKind::Error, message.into());
	}

	/// Shows `err` as an error message.
	pub fn report(&self, err: &dyn std::error::Error) {
		tracing::warn!(error = %err, "messages.report");
		self.error(err.to_string());
	}

	fn emit(&self, kind: MessageKind, message: Message) {
		let default = match kind {
			MessageKind::Hint => self.hint_duration,
			MessageKind::Error => self.error_duration,
		};
		let notice = Notice {
			kind,
			text: message.text,
			duration: message.duration.unwrap_or(default),
		};
		tracing::debug!(kind = kind.as_str(), text = %notice.text, "messages.emit");
		if self.tx.send(notice).is_err() {
			tracing::trace!("messages.closed");
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn defaults_depend_on_kind() {
		let (messages, mut rx) = Messages::channel(&MessagesConfig::default());
		messages.hint("saved");
		messages.error(String::from("boom"));

		assert_eq!(
			rx.try_recv().unwrap(),
			Notice {
				kind: MessageKind::Hint,
				text: "saved".into(),
				duration: Duration::from_millis(2500),
			}
		);
		assert_eq!(rx.try_recv().unwrap().duration, Duration::from_millis(5000));
	}

	#[test]
	fn explicit_duration_wins() {
		let (messages, mut rx) = Messages::channel(&MessagesConfig::default());
		messages.error(Message {
			text: "slow".into(),
			duration: Some(Duration::from_secs(1)),
		});
		assert_eq!(rx.try_recv().unwrap().duration, Duration::from_secs(1));
	}

	#[test]
	fn report_uses_error_text() {
		let (messages, mut rx) = Messages::channel(&MessagesConfig { hint_ms: 1, error_ms: 2 });
		let err = std::io::Error::other("disk full");
		messages.report(&err);
		let notice = rx.try_recv().unwrap();
		assert_eq!(notice.kind, MessageKind::Error);
		assert_eq!(notice.text, "disk full");
		assert_eq!(notice.to_string(), "[error] disk full");
	}
}
