use thiserror::Error;

/// Rejected form operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
	/// A user edit targeted a disabled field.
	#[error("field '{0}' is disabled")]
	FieldDisabled(&'static str),

	/// A required field is empty at submission.
	#[error("field '{0}' is required")]
	Required(&'static str),

	/// A field name did not match any field of the form.
	#[error("unknown field: {0}")]
	UnknownField(String),
}

/// Result type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
