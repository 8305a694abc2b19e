use std::fmt;
use std::str::FromStr;

use roster_query::{PopulateInstruction, PopulateSink};

use crate::{EnablementSink, FieldState, FormError, Result};

/// Fields of the users screen form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
	Email,
	Password,
	Role,
	Team,
}

impl UserField {
	pub const ALL: [Self; 4] = [Self::Email, Self::Password, Self::Role, Self::Team];

	pub const fn name(self) -> &'static str {
		match self {
			Self::Email => "email",
			Self::Password => "password",
			Self::Role => "role",
			Self::Team => "team",
		}
	}
}

impl fmt::Display for UserField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for UserField {
	type Err = FormError;

	fn from_str(s: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|field| field.name() == s)
			.ok_or_else(|| FormError::UnknownField(s.to_string()))
	}
}

/// Value-change notification produced by a [`UserForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
	pub field: UserField,
	pub value: Option<String>,
}

/// Values sent to the backend on submit. Disabled fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSubmission {
	pub email: String,
	pub password: Option<String>,
	pub role: Option<String>,
	pub team: Option<String>,
}

/// Form store behind the users screen.
///
/// Value updates are recorded as [`FieldChange`]s for the screen to route
/// (role changes drive team enablement). Enablement changes are not.
#[derive(Debug, Clone)]
pub struct UserForm {
	email: FieldState<Option<String>>,
	password: FieldState<Option<String>>,
	role: FieldState<Option<String>>,
	team: FieldState<Option<String>>,
	changes: Vec<FieldChange>,
}

impl Default for UserForm {
	fn default() -> Self {
		Self::new()
	}
}

impl UserForm {
	/// Email and role start enabled; password and team start disabled.
	pub fn new() -> Self {
		Self {
			email: FieldState::enabled(None),
			password: FieldState::disabled(None),
			role: FieldState::enabled(None),
			team: FieldState::disabled(None),
			changes: Vec::new(),
		}
	}

	pub fn field(&self, field: UserField) -> &FieldState<Option<String>> {
		match field {
			UserField::Email => &self.email,
			UserField::Password => &self.password,
			UserField::Role => &self.role,
			UserField::Team => &self.team,
		}
	}

	fn field_mut(&mut self, field: UserField) -> &mut FieldState<Option<String>> {
		match field {
			UserField::Email => &mut self.email,
			UserField::Password => &mut self.password,
			UserField::Role => &mut self.role,
			UserField::Team => &mut self.team,
		}
	}

	pub fn value(&self, field: UserField) -> Option<&str> {
		self.field(field).value().as_deref()
	}

	pub fn is_enabled(&self, field: UserField) -> bool {
		self.field(field).is_enabled()
	}

	/// User edit. Empty text clears the field. Refused on disabled fields.
	pub fn edit(&mut self, field: UserField, value: impl Into<String>) -> Result<()> {
		let value = non_empty(value.into());
		if !self.field_mut(field).edit(value.clone()) {
			return Err(FormError::FieldDisabled(field.name()));
		}
		self.changes.push(FieldChange { field, value });
		Ok(())
	}

	/// Programmatic update, applied even to disabled fields.
	pub fn set(&mut self, field: UserField, value: Option<String>) {
		self.field_mut(field).set(value.clone());
		self.changes.push(FieldChange { field, value });
	}

	/// Flips editability of `field` and returns the new state.
	pub fn toggle(&mut self, field: UserField) -> bool {
		let enabled = self.field_mut(field).toggle();
		tracing::debug!(%field, enabled, "form.toggle");
		enabled
	}

	/// Takes the value changes recorded since the last call.
	pub fn drain_changes(&mut self) -> Vec<FieldChange> {
		std::mem::take(&mut self.changes)
	}

	/// Builds the submission from the enabled fields.
	pub fn submission(&self) -> Result<UserSubmission> {
		let email = self
			.email
			.submitted()
			.cloned()
			.flatten()
			.ok_or(FormError::Required(UserField::Email.name()))?;
		Ok(UserSubmission {
			email,
			password: self.password.submitted().cloned().flatten(),
			role: self.role.submitted().cloned().flatten(),
			team: self.team.submitted().cloned().flatten(),
		})
	}
}

impl PopulateSink for UserForm {
	fn populate(&mut self, instruction: &PopulateInstruction) {
		if let Some(role) = &instruction.role {
			self.set(UserField::Role, Some(role.clone()));
		}
		if let Some(team) = &instruction.team {
			self.set(UserField::Team, Some(team.clone()));
		}
	}
}

impl EnablementSink for UserForm {
	type Field = UserField;

	fn set_enabled_silently(&mut self, field: UserField, enabled: bool) {
		self.field_mut(field).set_enabled(enabled);
	}
}

fn non_empty(value: String) -> Option<String> {
	if value.is_empty() { None } else { Some(value) }
}
