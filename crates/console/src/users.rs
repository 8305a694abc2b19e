//! Users screen: email lookup, auto-population and account submission.
//!
//! # Data flow
//!
//! 1. Email edits go through the form and are forwarded to the [`QueryEngine`].
//! 2. Each [`QueryEvent`] replaces the suggestion list and runs the
//!    [`AutoPopulationRule`]; populated role and team land in the form.
//! 3. Every role change, typed or populated, is fed to the team
//!    [`EnablementPolicy`].
//!
//! # Invariants
//!
//! * Value changes are routed right after the operation that produced them, so
//!   team enablement never lags behind the role value.
//! * Disabled fields keep their values but are left out of submissions.

use std::sync::Arc;

use roster_directory::{CacheState, CachedDirectory, DirectoryEndpoint};
use roster_form::{EnablementPolicy, FormError, UserField, UserForm};
use roster_query::{AutoPopulationRule, QueryEngine, QueryEvent, QueryResults};

use crate::backend::{UserClaims, UserFunctions};
use crate::loading::Loading;
use crate::messages::Messages;

pub const SUBMITTED_HINT: &str = "user updated or created";

pub struct UsersScreen<E> {
	directory: Arc<CachedDirectory<E>>,
	engine: QueryEngine,
	results: QueryResults,
	form: UserForm,
	team_policy: EnablementPolicy<UserField>,
	rule: AutoPopulationRule,
	suggestions: Vec<String>,
	functions: Arc<dyn UserFunctions>,
	messages: Messages,
	loading: Loading,
}

impl<E> UsersScreen<E>
where
	E: DirectoryEndpoint + 'static,
{
	/// Starts the lookup engine; its first event lists the whole directory.
	pub fn new(
		directory: Arc<CachedDirectory<E>>,
		functions: Arc<dyn UserFunctions>,
		messages: Messages,
		loading: Loading,
		team_role: &str,
	) -> Self {
		let (engine, results) = QueryEngine::spawn(Arc::clone(&directory));
		Self {
			directory,
			engine,
			results,
			form: UserForm::new(),
			team_policy: EnablementPolicy::equals(UserField::Team, team_role),
			rule: AutoPopulationRule,
			suggestions: Vec::new(),
			functions,
			messages,
			loading,
		}
	}

	pub fn form(&self) -> &UserForm {
		&self.form
	}

	/// Emails matching the last evaluated edit.
	pub fn suggestions(&self) -> &[String] {
		&self.suggestions
	}

	pub fn engine(&self) -> &QueryEngine {
		&self.engine
	}

	pub fn directory_state(&self) -> CacheState {
		self.directory.state()
	}

	/// Applies a user edit. Empty text clears the field.
	pub fn edit(&mut self, field: UserField, value: &str) -> Result<(), FormError> {
		self.form.edit(field, value)?;
		self.route_changes();
		Ok(())
	}

	/// Waits for the next lookup result.
	pub async fn next_event(&mut self) -> Option<QueryEvent> {
		self.results.recv().await
	}

	pub fn apply_event(&mut self, event: QueryEvent) {
		match event.outcome {
			Ok(query) => {
				self.suggestions = query.emails().map(str::to_string).collect();
				tracing::debug!(edit = event.edit, suggestions = self.suggestions.len(), "users.suggestions");
				if self.rule.apply(&query, &mut self.form) {
					self.route_changes();
				}
			}
			Err(err) => {
				self.suggestions.clear();
				self.messages.report(&err);
			}
		}
	}

	pub async fn generate_password(&mut self) {
		match self.functions.generate_password().await {
			Ok(password) => {
				self.form.set(UserField::Password, Some(password));
				self.route_changes();
			}
			Err(err) => self.messages.report(&err),
		}
	}

	/// Flips password editability and returns the new state.
	pub fn toggle_password(&mut self) -> bool {
		self.form.toggle(UserField::Password)
	}

	/// Sends the enabled field values to the backend. Returns true on success.
	pub async fn submit(&mut self) -> bool {
		let submission = match self.form.submission() {
			Ok(submission) => submission,
			Err(err) => {
				self.messages.report(&err);
				return false;
			}
		};
		let claims = UserClaims {
			role: submission.role,
			team: submission.team,
		};
		let call = self
			.functions
			.update_user(&submission.email, submission.password.as_deref(), &claims);
		match self.loading.run_on(call).await {
			Ok(()) => {
				tracing::info!(email = %submission.email, role = ?claims.role, team = ?claims.team, "users.submitted");
				self.messages.hint(SUBMITTED_HINT);
				true
			}
			Err(err) => {
				self.messages.report(&err);
				false
			}
		}
	}

	/// Drops the cached listing or failure and re-runs the current email.
	pub fn refresh_directory(&mut self) {
		self.directory.refresh();
		let text = self.form.value(UserField::Email).unwrap_or_default().to_string();
		if let Err(err) = self.engine.edit(text) {
			self.messages.report(&err);
		}
	}

	/// Stops the lookup engine after its pending edit.
	pub async fn shutdown(self) {
		self.engine.shutdown().await;
	}

	fn route_changes(&mut self) {
		for change in self.form.drain_changes() {
			match change.field {
				UserField::Email => {
					if let Err(err) = self.engine.edit(change.value.unwrap_or_default()) {
						self.messages.report(&err);
					}
				}
				UserField::Role => {
					self.team_policy.apply(change.value.as_deref(), &mut self.form);
				}
				UserField::Password | UserField::Team => {}
			}
		}
	}
}

#[cfg(test)]
mod tests;
