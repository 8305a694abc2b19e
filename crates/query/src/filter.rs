use roster_directory::{DirectorySnapshot, UserRecord};

use crate::FilterError;

/// Result of evaluating one edit against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	/// Text exactly as typed.
	pub text: String,
	/// Records whose email starts with `text`, ignoring case, in directory order.
	pub matches: Vec<UserRecord>,
}

impl Query {
	/// Emails of the matching records, used as completion suggestions.
	pub fn emails(&self) -> impl Iterator<Item = &str> {
		self.matches.iter().map(|record| record.email.as_str())
	}

	/// Returns the single match when it is exactly the typed email, ignoring case.
	pub fn exact_unique_match(&self) -> Option<&UserRecord> {
		match self.matches.as_slice() {
			[only] if !self.text.is_empty() && only.email_key() == self.text.to_lowercase() => Some(only),
			_ => None,
		}
	}
}

/// Filters `snapshot` to the records whose email starts with `text`, case-insensitively.
///
/// Empty text matches the whole snapshot.
pub fn filter(snapshot: &DirectorySnapshot, text: &str) -> Result<Query, FilterError> {
	let needle = text.to_lowercase();
	let mut matches = Vec::new();
	for (index, record) in snapshot.iter().enumerate() {
		if record.email.trim().is_empty() {
			return Err(FilterError::MalformedRecord {
				index,
				reason: "empty email",
			});
		}
		if needle.is_empty() || record.email_key().starts_with(&needle) {
			matches.push(record.clone());
		}
	}
	Ok(Query {
		text: text.to_string(),
		matches,
	})
}
