use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Failure to obtain a directory listing.
///
/// Cloneable so one shared in-flight outcome can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
	/// A single endpoint call failed.
	#[error("directory endpoint failed: {0}")]
	Endpoint(Arc<str>),

	/// Every attempt allowed by the retry policy failed.
	#[error("directory unavailable after {attempts} attempts: {last}")]
	Exhausted {
		/// Number of endpoint calls made.
		attempts: u32,
		/// Message of the last failure.
		last: Arc<str>,
	},
}

impl FetchError {
	/// Creates an endpoint error from any displayable transport error.
	pub fn endpoint<E: fmt::Display>(error: E) -> Self {
		Self::Endpoint(error.to_string().into())
	}
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, FetchError>;
