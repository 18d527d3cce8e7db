use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::data::{Role, VALID_MAPS};
use crate::error::StoreError;
use crate::validate::{MAX_RATING, MIN_RATING};

/// Column layout every role table must have: name, declared type, not null.
const COLUMNS: [(&str, &str, bool); 4] = [
	("timestamp", "TEXT", true),
	("rating", "INTEGER", true),
	("map", "TEXT", true),
	("comment", "TEXT", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
	pub timestamp: NaiveDateTime,
	pub rating: i32,
	pub map: String,
	pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
	/// Create the directory and file if they are missing.
	Create,
	/// Fail instead of creating anything.
	Existing,
}

/// An open connection to one player's match history file.
pub struct Store {
	conn: Connection,
	path: PathBuf,
}

impl Store {
	pub fn open(path: &Path, mode: OpenMode) -> Result<Self, StoreError> {
		let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;

		if mode == OpenMode::Create {
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent)?;
			}
			flags |= OpenFlags::SQLITE_OPEN_CREATE;
		}

		debug!(path = %path.display(), ?mode, "opening store");
		let conn = Connection::open_with_flags(path, flags)?;

		Ok(Self {
			conn,
			path: path.to_path_buf(),
		})
	}

	pub fn has_role_table(&self, role: Role) -> Result<bool, StoreError> {
		let found = self
			.conn
			.query_row(
				"SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
				[role.as_str()],
				|row| row.get::<_, String>(0),
			)
			.optional()?;

		Ok(found.is_some())
	}

	/// Creates the table for `role` unless it already exists. An existing
	/// table is checked column by column, and for the rating and map CHECK
	/// constraints, and rejected if it differs.
	pub fn ensure_role_table(&mut self, role: Role) -> Result<(), StoreError> {
		if self.has_role_table(role)? {
			return self.check_role_table(role);
		}

		debug!(table = role.as_str(), "creating role table");
		let tx = self.conn.transaction()?;
		tx.execute(&create_table_sql(role), [])?;
		tx.commit()?;

		Ok(())
	}

	fn check_role_table(&self, role: Role) -> Result<(), StoreError> {
		let mut stmt = self
			.conn
			.prepare(&format!("PRAGMA table_info({});", role.as_str()))?;
		let columns = stmt
			.query_map([], |row| {
				Ok((
					row.get::<_, String>(1)?,
					row.get::<_, String>(2)?,
					row.get::<_, bool>(3)?,
				))
			})?
			.collect::<Result<Vec<_>, _>>()?;

		let matches = columns.len() == COLUMNS.len()
			&& columns
				.iter()
				.zip(COLUMNS)
				.all(|((name, ty, not_null), (want_name, want_ty, want_not_null))| {
					name == want_name && ty.eq_ignore_ascii_case(want_ty) && *not_null == want_not_null
				});

		if !matches {
			let found: Vec<&str> = columns.iter().map(|(name, ..)| name.as_str()).collect();
			return Err(StoreError::SchemaMismatch {
				table: role.as_str().to_string(),
				reason: format!(
					"expected columns (timestamp, rating, map, comment), found ({})",
					found.join(", ")
				),
			});
		}

		let sql: String = self.conn.query_row(
			"SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1;",
			[role.as_str()],
			|row| row.get(0),
		)?;
		let sql = squash(&sql);

		for (column, clause) in [("rating", rating_check()), ("map", map_check())] {
			if !sql.contains(&squash(&clause)) {
				return Err(StoreError::SchemaMismatch {
					table: role.as_str().to_string(),
					reason: format!("the {column} column lacks the expected CHECK constraint"),
				});
			}
		}

		Ok(())
	}

	/// Appends one match. The timestamp is taken by SQLite at insert time.
	pub fn insert_match(
		&mut self,
		role: Role,
		rating: i32,
		map: &str,
		comment: Option<&str>,
	) -> Result<(), StoreError> {
		let tx = self.conn.transaction()?;
		tx.execute(
			&format!(
				"INSERT INTO {} (timestamp, rating, map, comment)
				 VALUES (datetime('now'), ?1, ?2, ?3);",
				role.as_str()
			),
			params![rating, map, comment],
		)?;
		tx.commit()?;

		debug!(table = role.as_str(), rating, map, "inserted match");
		Ok(())
	}

	/// All rows for `role` in insertion order. A role that was never played
	/// has no table and yields no rows.
	pub fn load_matches(&self, role: Role) -> Result<Vec<MatchRow>, StoreError> {
		if !self.has_role_table(role)? {
			return Ok(Vec::new());
		}

		let mut stmt = self.conn.prepare(&format!(
			"SELECT timestamp, rating, map, comment FROM {} ORDER BY rowid;",
			role.as_str()
		))?;

		let mut result = stmt.query([])?;
		let mut rows = Vec::new();

		while let Some(row) = result.next()? {
			rows.push(MatchRow {
				timestamp: row.get(0)?,
				rating: row.get(1)?,
				map: row.get(2)?,
				comment: row.get(3)?,
			});
		}

		Ok(rows)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Releases the connection, reporting anything SQLite had to say about it.
	/// Dropping a `Store` also releases it, silently.
	pub fn close(self) -> Result<(), StoreError> {
		debug!(path = %self.path.display(), "closing store");
		self.conn.close().map_err(|(_, err)| StoreError::from(err))
	}
}

fn rating_check() -> String {
	format!("CHECK (rating >= {MIN_RATING} AND rating <= {MAX_RATING})")
}

fn map_check() -> String {
	let maps = VALID_MAPS
		.iter()
		.map(|map| format!("'{}'", map.replace('\'', "''")))
		.collect::<Vec<_>>()
		.join(", ");

	format!("CHECK (map IN ({maps}))")
}

fn create_table_sql(role: Role) -> String {
	format!(
		"CREATE TABLE {} (
			timestamp TEXT    NOT NULL,
			rating    INTEGER NOT NULL
			                  {},
			map       TEXT    NOT NULL
			                  {},
			comment   TEXT
		);",
		role.as_str(),
		rating_check(),
		map_check()
	)
}

// Whitespace and case are irrelevant when comparing stored table SQL.
fn squash(sql: &str) -> String {
	sql.chars()
		.filter(|c| !c.is_whitespace())
		.flat_map(char::to_lowercase)
		.collect()
}
