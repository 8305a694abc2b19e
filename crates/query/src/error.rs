use roster_directory::FetchError;
use thiserror::Error;

/// A directory record could not be filtered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
	/// The record at `index` has no usable email.
	#[error("malformed directory record at index {index}: {reason}")]
	MalformedRecord { index: usize, reason: &'static str },
}

/// Failure to evaluate one edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
	#[error(transparent)]
	Fetch(#[from] FetchError),

	#[error(transparent)]
	Filter(#[from] FilterError),
}
