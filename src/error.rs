use rusqlite::ErrorCode;

use crate::data::VALID_MAPS;

/// A submitted record or command broke a domain rule. Nothing has been
/// written when one of these is returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("'{0}' is not a valid role. Valid roles are: tank, dps, support.")]
	UnknownRole(String),

	#[error("'{map}' is not a valid map. Valid maps are: {}.", VALID_MAPS.join(", "))]
	UnknownMap { map: String },

	#[error("Rating {0} is out of range. It must be between 0 and 6000.")]
	RatingOutOfRange(i32),

	#[error(
		"No match history database has been created for player '{0}'. \
		 Use the '-n' flag to create it instead of throwing an error."
	)]
	MissingStore(String),

	#[error("No match history has been recorded for player '{0}'.")]
	UnknownPlayer(String),

	#[error("'{0}' is not a usable player name.")]
	InvalidPlayerName(String),
}

/// Failures reported by the storage engine or while writing stored data out.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("constraint violated: {0}")]
	Constraint(String),

	#[error("table '{table}' has an unexpected layout: {reason}")]
	SchemaMismatch { table: String, reason: String },

	#[error("database file is damaged: {0}")]
	Corrupt(String),

	#[error("SQLite error: {0}")]
	Sqlite(rusqlite::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),

	#[error("chart rendering failed: {0}")]
	Plot(String),
}

impl StoreError {
	/// True when the store exists but no longer matches what this tool writes.
	pub fn is_outdated_or_corrupt(&self) -> bool {
		matches!(
			self,
			StoreError::Constraint(_) | StoreError::SchemaMismatch { .. } | StoreError::Corrupt(_)
		)
	}
}

impl From<rusqlite::Error> for StoreError {
	fn from(err: rusqlite::Error) -> Self {
		let code = match &err {
			rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
			_ => None,
		};

		match code {
			Some(ErrorCode::ConstraintViolation) => StoreError::Constraint(err.to_string()),
			Some(ErrorCode::DatabaseCorrupt) | Some(ErrorCode::NotADatabase) => {
				StoreError::Corrupt(err.to_string())
			}
			_ => StoreError::Sqlite(err),
		}
	}
}

/// Everything the workflow can fail with, as seen by `main`.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
	#[error("{0}")]
	Validation(#[from] ValidationError),

	#[error("{}", describe_store_error(.player, .source))]
	Store {
		player: String,
		#[source]
		source: StoreError,
	},

	#[error("could not write output: {0}")]
	Output(#[from] std::io::Error),
}

impl TrackerError {
	/// Builds a `map_err` adapter that tags storage failures with the player.
	pub fn store(player: &str) -> impl Fn(StoreError) -> TrackerError + '_ {
		move |source| TrackerError::Store {
			player: player.to_string(),
			source,
		}
	}

	pub fn exit_code(&self) -> u8 {
		match self {
			TrackerError::Validation(_) => 1,
			TrackerError::Store { .. } | TrackerError::Output(_) => 2,
		}
	}
}

fn describe_store_error(player: &str, source: &StoreError) -> String {
	if source.is_outdated_or_corrupt() {
		format!(
			"The match history database for player '{player}' is likely corrupt or outdated ({source})."
		)
	} else {
		format!("Failed to access the match history database for player '{player}': {source}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exit_codes_separate_user_and_storage_errors() {
		let validation = TrackerError::from(ValidationError::RatingOutOfRange(9999));
		assert_eq!(validation.exit_code(), 1);

		let storage = TrackerError::store("aaad")(StoreError::Corrupt("bad header".into()));
		assert_eq!(storage.exit_code(), 2);
	}

	#[test]
	fn storage_messages_flag_outdated_databases() {
		let err = TrackerError::store("aaad")(StoreError::SchemaMismatch {
			table: "support".into(),
			reason: "missing column".into(),
		});
		let message = err.to_string();
		assert!(message.contains("'aaad'"));
		assert!(message.contains("corrupt or outdated"));

		let err = TrackerError::store("aaad")(StoreError::Plot("no data".into()));
		assert!(!err.to_string().contains("corrupt"));
	}

	#[test]
	fn role_message_lists_accepted_roles() {
		let message = ValidationError::UnknownRole("healer".into()).to_string();
		assert!(message.contains("healer"));
		assert!(message.contains("tank, dps, support"));
	}
}
