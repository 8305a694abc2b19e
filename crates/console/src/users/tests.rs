use pretty_assertions::assert_eq;
use roster_directory::{FailureMode, RetryPolicy, UserRecord};
use tokio::sync::mpsc;

use super::*;
use crate::config::MessagesConfig;
use crate::fixture::FixtureBackend;
use crate::messages::{MessageKind, Notice};

fn backend() -> FixtureBackend {
	FixtureBackend::new(vec![
		UserRecord::new("a@x.com").with_role("dm").with_team("RED"),
		UserRecord::new("ab@x.com").with_role("player").with_team("BLUE"),
		UserRecord::new("b@y.com"),
	])
}

fn screen(backend: Arc<FixtureBackend>) -> (UsersScreen<Arc<FixtureBackend>>, mpsc::UnboundedReceiver<Notice>) {
	let directory = Arc::new(CachedDirectory::with_policy(
		Arc::clone(&backend),
		RetryPolicy::default(),
		FailureMode::Sticky,
	));
	let (messages, notices) = Messages::channel(&MessagesConfig::default());
	(UsersScreen::new(directory, backend, messages, Loading::new(), "dm"), notices)
}

/// Receives and applies one lookup result.
async fn pump(screen: &mut UsersScreen<Arc<FixtureBackend>>) -> u64 {
	let event = screen.next_event().await.expect("lookup event");
	let edit = event.edit;
	screen.apply_event(event);
	edit
}

#[tokio::test]
async fn initial_result_lists_every_user() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	assert_eq!(pump(&mut screen).await, 1);
	assert_eq!(screen.suggestions(), ["a@x.com", "ab@x.com", "b@y.com"]);
	assert!(matches!(screen.directory_state(), CacheState::Ready(_)));
}

#[tokio::test]
async fn exact_email_populates_role_and_enables_team() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	pump(&mut screen).await;

	screen.edit(UserField::Email, "A@X.COM").unwrap();
	pump(&mut screen).await;

	assert_eq!(screen.suggestions(), ["a@x.com"]);
	let form = screen.form();
	assert_eq!(form.value(UserField::Role), Some("dm"));
	assert_eq!(form.value(UserField::Team), Some("RED"));
	assert!(form.is_enabled(UserField::Team));
}

#[tokio::test]
async fn populated_non_team_role_disables_team_but_keeps_value() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	pump(&mut screen).await;
	screen.edit(UserField::Email, "a@x.com").unwrap();
	pump(&mut screen).await;

	screen.edit(UserField::Email, "ab@x.com").unwrap();
	pump(&mut screen).await;

	let form = screen.form();
	assert_eq!(form.value(UserField::Role), Some("player"));
	assert_eq!(form.value(UserField::Team), Some("BLUE"));
	assert!(!form.is_enabled(UserField::Team));
	assert_eq!(form.submission().unwrap().team, None);
}

#[tokio::test]
async fn ambiguous_prefix_leaves_form_untouched() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	pump(&mut screen).await;
	screen.edit(UserField::Role, "coach").unwrap();

	screen.edit(UserField::Email, "a").unwrap();
	pump(&mut screen).await;

	assert_eq!(screen.suggestions(), ["a@x.com", "ab@x.com"]);
	assert_eq!(screen.form().value(UserField::Role), Some("coach"));
	assert_eq!(screen.form().value(UserField::Team), None);
}

#[tokio::test]
async fn typed_role_drives_team_enablement() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	assert_eq!(screen.edit(UserField::Team, "RED"), Err(FormError::FieldDisabled("team")));

	screen.edit(UserField::Role, "dm").unwrap();
	screen.edit(UserField::Team, "RED").unwrap();

	screen.edit(UserField::Role, "player").unwrap();
	assert_eq!(screen.edit(UserField::Team, "BLUE"), Err(FormError::FieldDisabled("team")));
	assert_eq!(screen.form().value(UserField::Team), Some("RED"));
}

#[tokio::test]
async fn submit_sends_enabled_fields_and_hints() {
	let backend = Arc::new(backend());
	let (mut screen, mut notices) = screen(Arc::clone(&backend));
	screen.edit(UserField::Email, "new@x.com").unwrap();
	screen.edit(UserField::Role, "dm").unwrap();
	screen.edit(UserField::Team, "GREEN").unwrap();

	assert!(screen.submit().await);

	let notice = notices.recv().await.unwrap();
	assert_eq!(notice.kind, MessageKind::Hint);
	assert_eq!(notice.text, SUBMITTED_HINT);
	assert!(backend.users().contains(&UserRecord::new("new@x.com").with_role("dm").with_team("GREEN")));
}

#[tokio::test]
async fn submit_without_email_reports_error() {
	let backend = Arc::new(backend());
	let (mut screen, mut notices) = screen(Arc::clone(&backend));

	assert!(!screen.submit().await);
	let notice = notices.recv().await.unwrap();
	assert_eq!(notice.kind, MessageKind::Error);
	assert_eq!(notice.text, "field 'email' is required");
	assert_eq!(backend.users().len(), 3);
}

#[tokio::test]
async fn backend_rejection_is_reported() {
	let (mut screen, mut notices) = screen(Arc::new(backend()));
	screen.edit(UserField::Email, "no-at-sign").unwrap();

	assert!(!screen.submit().await);
	let notice = notices.recv().await.unwrap();
	assert_eq!(notice.kind, MessageKind::Error);
	assert!(notice.text.starts_with("update_user failed"), "{}", notice.text);
}

#[tokio::test]
async fn generated_password_is_submitted_only_when_enabled() {
	let (mut screen, _notices) = screen(Arc::new(backend()));
	screen.edit(UserField::Email, "a@x.com").unwrap();

	screen.generate_password().await;
	let password = screen.form().value(UserField::Password).map(str::to_string);
	assert!(password.is_some());
	assert_eq!(screen.form().submission().unwrap().password, None);

	assert!(screen.toggle_password());
	assert_eq!(screen.form().submission().unwrap().password, password);

	assert!(!screen.toggle_password());
	assert_eq!(screen.form().value(UserField::Password).map(str::to_string), password);
}

#[tokio::test(start_paused = true)]
async fn exhausted_directory_reports_error_until_refresh() {
	let backend = Arc::new(backend().failing_first(3));
	let (mut screen, mut notices) = screen(Arc::clone(&backend));

	pump(&mut screen).await;
	assert!(screen.suggestions().is_empty());
	let notice = notices.recv().await.unwrap();
	assert_eq!(notice.kind, MessageKind::Error);
	assert!(notice.text.contains("after 3 attempts"), "{}", notice.text);
	assert_eq!(backend.listings(), 3);

	// The failure is sticky: further edits do not hit the endpoint.
	screen.edit(UserField::Email, "a").unwrap();
	pump(&mut screen).await;
	assert_eq!(backend.listings(), 3);

	screen.refresh_directory();
	pump(&mut screen).await;
	assert_eq!(screen.suggestions(), ["a@x.com", "ab@x.com"]);
	assert_eq!(backend.listings(), 4);
}
