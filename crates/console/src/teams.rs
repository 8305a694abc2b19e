//! Teams screen: create and delete team documents with their logos.
//!
//! Creating uploads the logo first and then writes the document. When either
//! step fails the partial result is removed with a silent delete before the
//! error is shown.

use std::sync::Arc;

use roster_form::{TeamDraft, TeamForm};

use crate::backend::{self, BackendError, ObjectStore, TeamDocument, TeamStore, team_logo_path};
use crate::loading::Loading;
use crate::messages::Messages;

pub struct TeamsScreen {
	form: TeamForm,
	objects: Arc<dyn ObjectStore>,
	teams: Arc<dyn TeamStore>,
	messages: Messages,
	loading: Loading,
}

impl TeamsScreen {
	pub fn new(objects: Arc<dyn ObjectStore>, teams: Arc<dyn TeamStore>, messages: Messages, loading: Loading) -> Self {
		Self {
			form: TeamForm::new(),
			objects,
			teams,
			messages,
			loading,
		}
	}

	pub fn form_mut(&mut self) -> &mut TeamForm {
		&mut self.form
	}

	/// Creates the team described by the form. Returns true on success.
	pub async fn create(&mut self) -> bool {
		let Some(draft) = self.validated() else {
			return false;
		};
		match self.loading.run_on(self.create_with(&draft)).await {
			Ok(()) => {
				tracing::info!(initials = %draft.initials, "teams.created");
				self.messages.hint(format!("team {} created", draft.name));
				true
			}
			Err(err) => {
				tracing::warn!(initials = %draft.initials, error = %err, "teams.create.rollback");
				self.remove(&draft, false).await;
				self.messages.report(&err);
				false
			}
		}
	}

	/// Deletes the team named by the form.
	///
	/// With `show` the outcome is reported as a hint or error; without it the
	/// call is silent.
	pub async fn delete(&mut self, show: bool) -> bool {
		match self.form.draft() {
			Ok(draft) => self.remove(&draft, show).await,
			Err(err) => {
				if show {
					self.messages.report(&err);
				}
				false
			}
		}
	}

	fn validated(&self) -> Option<TeamDraft> {
		match self.form.draft() {
			Ok(draft) => Some(draft),
			Err(err) => {
				self.messages.report(&err);
				None
			}
		}
	}

	async fn create_with(&self, draft: &TeamDraft) -> backend::Result<()> {
		let logo_url = match &draft.logo {
			Some(bytes) => Some(self.objects.put(&team_logo_path(&draft.initials), bytes.clone()).await?),
			None => None,
		};
		let document = TeamDocument {
			name: draft.name.clone(),
			initials: draft.initials.clone(),
			logo_url,
		};
		self.teams.set(&draft.initials, document).await
	}

	/// Deletes the logo object and the document concurrently.
	async fn remove(&self, draft: &TeamDraft, show: bool) -> bool {
		let path = team_logo_path(&draft.initials);
		let (object, document) = self
			.loading
			.run_on(async { tokio::join!(self.objects.delete(&path), self.teams.delete(&draft.initials)) })
			.await;
		// A team created without a logo has no object to delete.
		let object = match object {
			Err(BackendError::NotFound(_)) => Ok(()),
			other => other,
		};
		match object.and(document) {
			Ok(()) => {
				tracing::info!(initials = %draft.initials, "teams.deleted");
				if show {
					self.messages.hint(format!("team {} deleted", draft.name));
				}
				true
			}
			Err(err) => {
				tracing::debug!(initials = %draft.initials, error = %err, show, "teams.delete.failed");
				if show {
					self.messages.report(&err);
				}
				false
			}
		}
	}
}
