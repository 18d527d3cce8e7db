//! Runtime settings.
//!
//! Every value has a built-in default that an environment variable can
//! override; command-line flags take precedence over both.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Overrides the directory the per-player stores live in.
pub const DATA_DIR_ENV: &str = "OWTRACK_DATA_DIR";

/// `tracing` filter directives, e.g. `owtrack=debug`.
pub const LOG_ENV: &str = "OWTRACK_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

const STORE_EXTENSION: &str = "sqlite";

#[derive(Debug, Clone)]
pub struct Config {
	pub data_dir: PathBuf,
}

impl Config {
	/// Priority:
	/// 1. `--dir` if given
	/// 2. `OWTRACK_DATA_DIR` if set
	/// 3. the current working directory
	pub fn resolve(dir_flag: Option<PathBuf>) -> Self {
		Self::resolve_from(dir_flag, std::env::var_os(DATA_DIR_ENV))
	}

	fn resolve_from(dir_flag: Option<PathBuf>, env_dir: Option<OsString>) -> Self {
		let data_dir = dir_flag
			.or_else(|| env_dir.map(PathBuf::from))
			.unwrap_or_else(|| PathBuf::from("."));

		Self { data_dir }
	}

	#[cfg(test)]
	pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
		Self {
			data_dir: data_dir.into(),
		}
	}

	/// Location of the store file for `player`. The name must already have
	/// passed `validate::check_player_name`.
	pub fn store_path(&self, player: &str) -> PathBuf {
		store_path_in(&self.data_dir, player)
	}
}

pub fn store_path_in(dir: &Path, player: &str) -> PathBuf {
	dir.join(format!("{player}.{STORE_EXTENSION}"))
}

pub fn log_filter() -> String {
	log_filter_from(std::env::var(LOG_ENV).ok())
}

fn log_filter_from(env_filter: Option<String>) -> String {
	env_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}
