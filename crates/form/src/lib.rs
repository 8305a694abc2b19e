//! Form state for the admin screens.
//!
//! * [`FieldState`] pairs a value with an enabled flag. Disabling blocks user
//!   edits and submission but never touches the value.
//! * [`EnablementPolicy`] recomputes one governed field's [`Enablement`] from a
//!   discriminant value and pushes changes through an [`EnablementSink`]
//!   without producing value-change notifications.
//! * [`UserForm`] and [`TeamForm`] are the concrete stores behind the users
//!   and teams screens.

mod enablement;
mod error;
mod field;
mod team_form;
mod user_form;

pub use enablement::{Enablement, EnablementPolicy, EnablementSink};
pub use error::{FormError, Result};
pub use field::FieldState;
pub use team_form::{TeamDraft, TeamForm};
pub use user_form::{FieldChange, UserField, UserForm, UserSubmission};
