//! Line-oriented front end over the users and teams screens.
//!
//! One command per line. Lookup results and messages are printed as they
//! arrive, interleaved with command output.

use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use roster_directory::{CacheState, DirectoryEndpoint};
use roster_form::UserField;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::loading::Loading;
use crate::messages::Notice;
use crate::teams::TeamsScreen;
use crate::users::UsersScreen;

pub const HELP: &str = "\
commands:
  email|role|team|password [VALUE]     edit a user field (no value clears it)
  gen-password                         generate a password
  toggle-password                      enable or disable the password field
  submit                               create or update the user
  refresh                              refetch the user directory
  show                                 print form and lookup state
  team-create INITIALS NAME... [@LOGO] create a team, optionally with a logo file
  team-delete INITIALS [NAME...]       delete a team and its logo
  help                                 print this help
  quit                                 exit";

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Edit { field: UserField, value: String },
	GeneratePassword,
	TogglePassword,
	Submit,
	Refresh,
	Show,
	TeamCreate {
		initials: String,
		name: String,
		logo: Option<PathBuf>,
	},
	TeamDelete {
		initials: String,
		name: Option<String>,
	},
	Help,
	Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
	#[error("empty command")]
	Empty,

	#[error("unknown command '{0}' (try 'help')")]
	Unknown(String),

	#[error("{command}: missing {argument}")]
	MissingArgument {
		command: &'static str,
		argument: &'static str,
	},
}

impl FromStr for Command {
	type Err = CommandError;

	fn from_str(line: &str) -> Result<Self, CommandError> {
		let line = line.trim();
		let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
		let rest = rest.trim();
		let command = match head {
			"" => return Err(CommandError::Empty),
			"gen-password" => Self::GeneratePassword,
			"toggle-password" => Self::TogglePassword,
			"submit" => Self::Submit,
			"refresh" => Self::Refresh,
			"show" => Self::Show,
			"help" => Self::Help,
			"quit" | "exit" => Self::Quit,
			"team-create" => parse_team_create(rest)?,
			"team-delete" => {
				let (initials, name) = split_initials("team-delete", rest)?;
				Self::TeamDelete {
					initials,
					name: (!name.is_empty()).then_some(name),
				}
			}
			field => match field.parse::<UserField>() {
				Ok(field) => Self::Edit {
					field,
					value: rest.to_string(),
				},
				Err(_) => return Err(CommandError::Unknown(field.to_string())),
			},
		};
		Ok(command)
	}
}

fn split_initials(command: &'static str, rest: &str) -> Result<(String, String), CommandError> {
	let (initials, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
	if initials.is_empty() {
		return Err(CommandError::MissingArgument {
			command,
			argument: "INITIALS",
		});
	}
	Ok((initials.to_string(), name.trim().to_string()))
}

fn parse_team_create(rest: &str) -> Result<Command, CommandError> {
	let (initials, rest) = split_initials("team-create", rest)?;
	let (name, logo) = match rest.rsplit_once(char::is_whitespace) {
		Some((name, last)) if last.starts_with('@') => (name.trim(), Some(&last[1..])),
		_ if rest.starts_with('@') => ("", Some(&rest[1..])),
		_ => (rest.as_str(), None),
	};
	if name.is_empty() {
		return Err(CommandError::MissingArgument {
			command: "team-create",
			argument: "NAME",
		});
	}
	Ok(Command::TeamCreate {
		initials,
		name: name.to_string(),
		logo: logo.filter(|path| !path.is_empty()).map(PathBuf::from),
	})
}

/// Whether the loop should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

pub struct Console<E, W> {
	users: UsersScreen<E>,
	teams: TeamsScreen,
	notices: mpsc::UnboundedReceiver<Notice>,
	loading: Loading,
	out: W,
}

impl<E, W> Console<E, W>
where
	E: DirectoryEndpoint + 'static,
	W: Write,
{
	pub fn new(
		users: UsersScreen<E>,
		teams: TeamsScreen,
		notices: mpsc::UnboundedReceiver<Notice>,
		loading: Loading,
		out: W,
	) -> Self {
		Self {
			users,
			teams,
			notices,
			loading,
			out,
		}
	}

	/// Reads commands from `input` until `quit` or end of input.
	pub async fn run<R>(mut self, input: R) -> io::Result<W>
	where
		R: AsyncBufRead + Unpin,
	{
		let mut lines = input.lines();
		loop {
			tokio::select! {
				Some(notice) = self.notices.recv() => writeln!(self.out, "{notice}")?,
				event = self.users.next_event() => match event {
					Some(event) => {
						self.users.apply_event(event);
						self.print_suggestions()?;
					}
					None => break,
				},
				line = lines.next_line() => {
					let Some(line) = line? else { break };
					if line.trim().is_empty() {
						continue;
					}
					match line.parse::<Command>() {
						Ok(command) => {
							if self.execute(command).await? == Flow::Quit {
								break;
							}
						}
						Err(err) => writeln!(self.out, "error: {err}")?,
					}
				}
			}
		}

		let Self {
			users,
			mut notices,
			mut out,
			..
		} = self;
		users.shutdown().await;
		while let Ok(notice) = notices.try_recv() {
			writeln!(out, "{notice}")?;
		}
		out.flush()?;
		Ok(out)
	}

	pub async fn execute(&mut self, command: Command) -> io::Result<Flow> {
		tracing::debug!(?command, "console.command");
		match command {
			Command::Edit { field, value } => {
				if let Err(err) = self.users.edit(field, &value) {
					writeln!(self.out, "error: {err}")?;
				}
			}
			Command::GeneratePassword => self.users.generate_password().await,
			Command::TogglePassword => {
				let enabled = self.users.toggle_password();
				writeln!(self.out, "password {}", if enabled { "enabled" } else { "disabled" })?;
			}
			Command::Submit => {
				self.users.submit().await;
			}
			Command::Refresh => self.users.refresh_directory(),
			Command::Show => self.show()?,
			Command::TeamCreate { initials, name, logo } => {
				let logo = match logo {
					Some(path) => match tokio::fs::read(&path).await {
						Ok(bytes) => Some(bytes),
						Err(err) => {
							writeln!(self.out, "error: reading {}: {err}", path.display())?;
							return Ok(Flow::Continue);
						}
					},
					None => None,
				};
				let form = self.teams.form_mut();
				form.set_initials(initials);
				form.set_name(name);
				form.set_logo(logo);
				self.teams.create().await;
			}
			Command::TeamDelete { initials, name } => {
				let form = self.teams.form_mut();
				form.set_name(name.unwrap_or_else(|| initials.clone()));
				form.set_initials(initials);
				self.teams.delete(true).await;
			}
			Command::Help => writeln!(self.out, "{HELP}")?,
			Command::Quit => return Ok(Flow::Quit),
		}
		Ok(Flow::Continue)
	}

	fn print_suggestions(&mut self) -> io::Result<()> {
		let suggestions = self.users.suggestions();
		if suggestions.is_empty() {
			writeln!(self.out, "suggestions: (none)")
		} else {
			writeln!(self.out, "suggestions: {}", suggestions.join(", "))
		}
	}

	fn show(&mut self) -> io::Result<()> {
		let form = self.users.form();
		for field in UserField::ALL {
			let value = match (field, form.value(field)) {
				(UserField::Password, Some(_)) => "********",
				(_, Some(value)) => value,
				(_, None) => "-",
			};
			let state = if form.is_enabled(field) { "" } else { " (disabled)" };
			writeln!(self.out, "{field}: {value}{state}")?;
		}
		let directory = match self.users.directory_state() {
			CacheState::Empty => "empty".to_string(),
			CacheState::Pending => "loading".to_string(),
			CacheState::Ready(snapshot) => format!("{} users", snapshot.len()),
			CacheState::Failed(err) => format!("failed: {err}"),
		};
		let engine = self.users.engine();
		writeln!(
			self.out,
			"directory: {directory}; lookup: edit {}{}, {} dropped; {} calls in flight",
			engine.latest_edit(),
			if engine.is_busy() { " (busy)" } else { "" },
			engine.dropped_edits(),
			self.loading.in_flight()
		)?;
		self.print_suggestions()
	}
}
