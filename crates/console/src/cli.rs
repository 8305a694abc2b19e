use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "roster-console")]
#[command(about = "Admin console for the user directory and teams")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to <config dir>/roster/console.toml)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// JSON fixture backing the directory and stores (overrides the config)
	#[arg(short, long, value_name = "PATH")]
	pub fixture: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_flags() {
		let cli = Cli::parse_from(["roster-console", "--fixture", "users.json", "-v"]);
		assert_eq!(cli.fixture, Some(PathBuf::from("users.json")));
		assert!(cli.verbose);
		assert_eq!(cli.config, None);
	}
}
