mod cli;
mod config;
mod data;
mod db;
mod error;
mod export;
mod history;
mod record;
mod tracker;
mod validate;

use std::{
	fs::File,
	io::{self, Write},
	process::ExitCode,
};

use clap::{error::ErrorKind, Parser};
use cli::{Cli, Commands};
use config::Config;
use error::TrackerError;
use record::MatchRecord;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// EX_USAGE from sysexits.h
const USAGE_EXIT_CODE: u8 = 64;

fn main() -> ExitCode {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(err) => {
			let _ = err.print();
			return match err.kind() {
				ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
				_ => ExitCode::from(USAGE_EXIT_CODE),
			};
		}
	};

	init_tracing();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			debug!(error = ?err, "command failed");
			println!("{err}");
			ExitCode::from(err.exit_code())
		}
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_new(config::log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.init();
}

fn run(cli: Cli) -> Result<(), TrackerError> {
	let config = Config::resolve(cli.dir);

	// Output is held back until the command succeeds so a failure never
	// truncates an existing --output file.
	let mut buf: Vec<u8> = Vec::new();
	let out = &mut buf;

	match cli.command {
		Commands::Match {
			player,
			role,
			rating,
			map,
			comment,
			new_player,
		} => {
			let record = MatchRecord {
				player,
				role,
				rating,
				map,
				comment,
				new_player,
			};
			tracker::record_match(&config, record, out)?
		}
		Commands::Average {
			player,
			role,
			outcome,
			count,
		} => tracker::average(&config, &player, &role, outcome, count, out)?,
		Commands::Display {
			player,
			role,
			outcome,
		} => tracker::display(&config, &player, &role, outcome, out)?,
		Commands::Export {
			player,
			roles,
			format,
		} => tracker::export(&config, &player, &roles, format, out)?,
	}

	let mut sink = match cli.output.as_deref() {
		Some(path) => Box::new(File::create(path)?) as Box<dyn Write>,
		None => Box::new(io::stdout()) as Box<dyn Write>,
	};
	sink.write_all(&buf)?;
	sink.flush()?;
	Ok(())
}
