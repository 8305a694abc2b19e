use crate::{FieldState, FormError, Result};

/// Validated values for creating or deleting a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
	pub name: String,
	/// Key of the team document and of its logo object.
	pub initials: String,
	pub logo: Option<Vec<u8>>,
}

/// Form store behind the teams screen. All fields are always editable.
#[derive(Debug, Clone)]
pub struct TeamForm {
	name: FieldState<Option<String>>,
	initials: FieldState<Option<String>>,
	logo: Option<Vec<u8>>,
}

impl Default for TeamForm {
	fn default() -> Self {
		Self::new()
	}
}

impl TeamForm {
	pub fn new() -> Self {
		Self {
			name: FieldState::enabled(None),
			initials: FieldState::enabled(None),
			logo: None,
		}
	}

	pub fn set_name(&mut self, name: impl Into<String>) {
		self.name.set(non_blank(name.into()));
	}

	pub fn set_initials(&mut self, initials: impl Into<String>) {
		self.initials.set(non_blank(initials.into()));
	}

	pub fn set_logo(&mut self, logo: Option<Vec<u8>>) {
		self.logo = logo;
	}

	pub fn name(&self) -> Option<&str> {
		self.name.value().as_deref()
	}

	pub fn initials(&self) -> Option<&str> {
		self.initials.value().as_deref()
	}

	/// Validates the form. Name and initials are required.
	pub fn draft(&self) -> Result<TeamDraft> {
		let name = self.name().ok_or(FormError::Required("name"))?;
		let initials = self.initials().ok_or(FormError::Required("initials"))?;
		Ok(TeamDraft {
			name: name.to_string(),
			initials: initials.to_string(),
			logo: self.logo.clone(),
		})
	}
}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn name_is_required() {
		let mut form = TeamForm::new();
		form.set_initials("RED");
		assert_eq!(form.draft(), Err(FormError::Required("name")));

		form.set_name("   ");
		assert_eq!(form.draft(), Err(FormError::Required("name")));
	}

	#[test]
	fn initials_are_required() {
		let mut form = TeamForm::new();
		form.set_name("Red Dragons");
		assert_eq!(form.draft(), Err(FormError::Required("initials")));
	}

	#[test]
	fn draft_trims_and_carries_logo() {
		let mut form = TeamForm::new();
		form.set_name(" Red Dragons ");
		form.set_initials("RED");
		form.set_logo(Some(vec![0x89, b'P', b'N', b'G']));
		assert_eq!(
			form.draft().unwrap(),
			TeamDraft {
				name: "Red Dragons".into(),
				initials: "RED".into(),
				logo: Some(vec![0x89, b'P', b'N', b'G']),
			}
		);
	}
}
