use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::export::ExportFormat;
use crate::history::OutcomeFilter;

#[derive(Parser)]
#[command(name = "owtrack", author, version, about = "Competitive match history tracker", long_about = None)]
pub struct Cli {
	/// Write command output to FILE instead of stdout
	#[arg(short, long, value_name = "FILE", global = true)]
	pub output: Option<PathBuf>,

	/// Directory holding the per-player databases
	#[arg(short, long, value_name = "DIR", global = true)]
	pub dir: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Record the result of one match
	Match {
		player: String,
		role: String,
		#[arg(allow_negative_numbers = true)]
		rating: i32,
		map: String,
		comment: Option<String>,
		/// Create the player's database if it does not exist yet
		#[arg(short = 'n', long = "new")]
		new_player: bool,
	},
	/// Average rating of a role, optionally over wins or losses only
	Average {
		player: String,
		role: String,
		#[arg(value_enum)]
		outcome: Option<OutcomeFilter>,
		/// Also print how many matches were averaged
		#[arg(short, long)]
		count: bool,
	},
	/// Print the recorded matches of a role
	Display {
		player: String,
		role: String,
		#[arg(value_enum)]
		outcome: Option<OutcomeFilter>,
	},
	/// Dump recorded matches as CSV or as an SVG rating chart
	Export {
		player: String,
		/// Limit the export to ROLE (repeatable); every role by default
		#[arg(short, long = "role", value_name = "ROLE")]
		roles: Vec<String>,
		#[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
		format: ExportFormat,
	},
}
