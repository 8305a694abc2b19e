//! Roster admin console.
//!
//! Drives the users and teams screens from stdin against a fixture backend.

mod backend;
mod cli;
mod config;
mod fixture;
mod loading;
mod messages;
mod repl;
mod teams;
mod users;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use config::ConsoleConfig;
use fixture::FixtureBackend;
use loading::Loading;
use messages::Messages;
use repl::Console;
use roster_directory::CachedDirectory;
use roster_worker::TaskClass;
use teams::TeamsScreen;
use tokio::io::BufReader;
use tracing::info;
use users::UsersScreen;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = ConsoleConfig::load(cli.config.as_deref())?;
	let backend = Arc::new(FixtureBackend::from_config(&config.backend, cli.fixture.as_deref())?);
	let directory = Arc::new(CachedDirectory::with_policy(
		Arc::clone(&backend),
		config.directory.retry_policy(),
		config.directory.failure_mode(),
	));
	info!(
		retries = config.directory.retries,
		retry_delay_ms = config.directory.retry_delay_ms,
		failure = ?config.directory.failure,
		"starting roster-console"
	);

	let (messages, notices) = Messages::channel(&config.messages);
	let loading = Loading::new();
	let mut busy = loading.subscribe();
	roster_worker::spawn(TaskClass::Background, async move {
		while busy.changed().await.is_ok() {
			tracing::trace!(in_flight = *busy.borrow_and_update(), "console.loading");
		}
	});

	let users = UsersScreen::new(
		directory,
		backend.clone(),
		messages.clone(),
		loading.clone(),
		&config.form.team_role,
	);
	let teams = TeamsScreen::new(backend.clone(), backend.clone(), messages, loading.clone());

	println!("{}", repl::HELP);
	let console = Console::new(users, teams, notices, loading, std::io::stdout());
	console.run(BufReader::new(tokio::io::stdin())).await?;

	info!(
		listings = backend.listings(),
		users = backend.users().len(),
		teams = backend.teams().len(),
		"roster-console exiting"
	);
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("roster=debug,info")
			} else {
				EnvFilter::new("info")
			}
		})
	};

	// ROSTER_LOG_DIR keeps stdout free for the console
	if let Some(log_dir) = std::env::var("ROSTER_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let pid = std::process::id();
		let log_path = log_dir.join(format!("roster-console.{}.log", pid));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter())
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "console tracing initialized");
			return;
		}
	}

	// Fallback to stderr-only logging
	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
