//! Command workflows.
//!
//! Each command threads its inputs through explicit steps: normalize,
//! validate, acquire the player's store, work, release. The store is only
//! ever held inside [`with_store`], which releases it exactly once whether
//! the work succeeded or not.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::data::Role;
use crate::db::{MatchRow, OpenMode, Store};
use crate::error::{StoreError, TrackerError, ValidationError};
use crate::export::{self, ExportFormat};
use crate::history::{self, OutcomeFilter};
use crate::record::MatchRecord;
use crate::validate::{check_player_name, parse_role, validate};

/// Validates and appends one match to the player's history.
pub fn record_match(
	config: &Config,
	record: MatchRecord,
	out: &mut dyn Write,
) -> Result<(), TrackerError> {
	let record = record.normalize();
	check_player_name(&record.player)?;

	let path = config.store_path(&record.player);
	let valid = validate(&record, path.exists())?;

	with_store(&path, OpenMode::Create, |store| {
		store.ensure_role_table(valid.role)?;
		store.insert_match(valid.role, valid.rating, &valid.map, valid.comment.as_deref())
	})
	.map_err(TrackerError::store(&record.player))?;

	info!(
		player = %record.player,
		role = %valid.role,
		rating = valid.rating,
		map = %valid.map,
		"recorded match"
	);
	writeln!(
		out,
		"Recorded {} match for {}: {} on {}.",
		valid.role, record.player, valid.rating, valid.map
	)?;

	Ok(())
}

pub fn average(
	config: &Config,
	player: &str,
	role: &str,
	outcome: Option<OutcomeFilter>,
	show_count: bool,
	out: &mut dyn Write,
) -> Result<(), TrackerError> {
	let role = parse_role(role)?;
	let entries = history::annotate(load_role(config, player, role)?);

	let Some(avg) = history::average(&entries, outcome) else {
		writeln!(out, "No {}{role} matches recorded for {player}.", outcome_label(outcome))?;
		return Ok(());
	};

	writeln!(out, "Average rating: {:.2}", avg.rating)?;
	if let Some(change) = avg.change {
		writeln!(out, "Average change: {change:+.2}")?;
	}
	if show_count {
		writeln!(out, "Matches: {}", avg.count)?;
	}

	Ok(())
}

pub fn display(
	config: &Config,
	player: &str,
	role: &str,
	outcome: Option<OutcomeFilter>,
	out: &mut dyn Write,
) -> Result<(), TrackerError> {
	let role = parse_role(role)?;
	let entries = history::filter(
		history::annotate(load_role(config, player, role)?),
		outcome,
	);

	if entries.is_empty() {
		writeln!(out, "No {}{role} matches recorded for {player}.", outcome_label(outcome))?;
		return Ok(());
	}

	writeln!(out, "# {player} {role} history")?;
	for entry in entries {
		let change = entry
			.change
			.map(|delta| format!("{delta:+}"))
			.unwrap_or_default();
		let line = format!(
			"{}  {:>4}  {:>5}  {:<21}  {}",
			entry.row.timestamp.format("%Y-%m-%d %H:%M:%S"),
			entry.row.rating,
			change,
			entry.row.map,
			entry.row.comment.as_deref().unwrap_or_default(),
		);
		writeln!(out, "{}", line.trim_end())?;
	}

	Ok(())
}

pub fn export(
	config: &Config,
	player: &str,
	roles: &[String],
	format: ExportFormat,
	out: &mut dyn Write,
) -> Result<(), TrackerError> {
	let roles = if roles.is_empty() {
		Role::ALL.to_vec()
	} else {
		roles
			.iter()
			.map(|role| parse_role(role))
			.collect::<Result<Vec<_>, _>>()?
	};
	let path = existing_store_path(config, player)?;

	let history = with_store(&path, OpenMode::Existing, |store| {
		roles
			.iter()
			.map(|&role| Ok((role, store.load_matches(role)?)))
			.collect::<Result<Vec<_>, StoreError>>()
	})
	.map_err(TrackerError::store(player))?;

	match format {
		ExportFormat::Csv => export::write_csv(&mut *out, &history),
		ExportFormat::Svg => export::render_svg(player, &history)
			.and_then(|svg| out.write_all(svg.as_bytes()).map_err(StoreError::from)),
	}
	.map_err(TrackerError::store(player))
}

/// Opens the store at `path`, runs `work` against it and releases it. On
/// success the close itself may still fail and is reported; on failure the
/// connection is dropped and the original error returned.
fn with_store<T>(
	path: &Path,
	mode: OpenMode,
	work: impl FnOnce(&mut Store) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
	let mut store = Store::open(path, mode)?;

	match work(&mut store) {
		Ok(value) => {
			store.close()?;
			Ok(value)
		}
		Err(err) => {
			warn!(path = %store.path().display(), error = %err, "store operation failed");
			drop(store);
			Err(err)
		}
	}
}

fn existing_store_path(config: &Config, player: &str) -> Result<PathBuf, TrackerError> {
	check_player_name(player)?;

	let path = config.store_path(player);
	if !path.exists() {
		return Err(ValidationError::UnknownPlayer(player.to_string()).into());
	}

	Ok(path)
}

fn load_role(config: &Config, player: &str, role: Role) -> Result<Vec<MatchRow>, TrackerError> {
	let path = existing_store_path(config, player)?;
	with_store(&path, OpenMode::Existing, |store| store.load_matches(role))
		.map_err(TrackerError::store(player))
}

fn outcome_label(outcome: Option<OutcomeFilter>) -> &'static str {
	match outcome {
		Some(OutcomeFilter::Win) => "winning ",
		Some(OutcomeFilter::Loss) => "losing ",
		None => "",
	}
}

#[cfg(test)]
mod tests {
	use std::io;

	use rusqlite::Connection;

	use super::*;

	fn record(player: &str, role: &str, rating: i32, map: &str, new_player: bool) -> MatchRecord {
		MatchRecord {
			player: player.into(),
			role: role.into(),
			rating,
			map: map.into(),
			comment: None,
			new_player,
		}
	}

	fn output(f: impl FnOnce(&mut dyn Write) -> Result<(), TrackerError>) -> String {
		let mut buf = Vec::<u8>::new();
		f(&mut buf).unwrap();
		String::from_utf8(buf).unwrap()
	}

	#[test]
	fn new_player_match_creates_store_table_and_row() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());

		let mut rec = record("aaad", "support", 2527, "hanamura", true);
		rec.comment = Some("unit test comment".into());
		let printed = output(|out| record_match(&config, rec, out));
		assert!(printed.contains("Recorded support match for aaad: 2527 on Hanamura."));

		let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
		assert_eq!(files.len(), 1);

		let conn = Connection::open(dir.path().join("aaad.sqlite")).unwrap();
		let tables: i64 = conn
			.query_row(
				"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table';",
				[],
				|row| row.get(0),
			)
			.unwrap();
		assert_eq!(tables, 1);

		let (timestamp, rating, map, comment): (String, i32, String, Option<String>) = conn
			.query_row("SELECT timestamp, rating, map, comment FROM support;", [], |row| {
				Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
			})
			.unwrap();
		assert!(!timestamp.is_empty());
		assert_eq!(rating, 2527);
		assert_eq!(map, "Hanamura");
		assert_eq!(comment.as_deref(), Some("unit test comment"));
	}

	#[test]
	fn missing_store_without_flag_creates_nothing() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());

		let err = record_match(
			&config,
			record("aaad", "support", 2527, "hanamura", false),
			&mut io::sink(),
		)
		.unwrap_err();

		assert!(matches!(
			err,
			TrackerError::Validation(ValidationError::MissingStore(_))
		));
		assert_eq!(err.exit_code(), 1);
		assert!(!dir.path().join("aaad.sqlite").exists());
	}

	#[test]
	fn out_of_range_rating_leaves_store_untouched() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());
		record_match(
			&config,
			record("aaad", "support", 2500, "kr", true),
			&mut io::sink(),
		)
		.unwrap();

		let err = record_match(
			&config,
			record("aaad", "support", 9999, "hanamura", false),
			&mut io::sink(),
		)
		.unwrap_err();
		assert!(err.to_string().contains("6000"));

		let avg = output(|out| average(&config, "aaad", "support", None, true, out));
		assert!(avg.contains("Matches: 1"));
	}

	#[test]
	fn existing_store_accepts_matches_without_flag() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());

		record_match(&config, record("aaad", "tank", 2400, "busan", true), &mut io::sink()).unwrap();
		record_match(&config, record("aaad", "TANK", 2425, "r66", false), &mut io::sink()).unwrap();
		record_match(&config, record("aaad", "dps", 2100, "bw", false), &mut io::sink()).unwrap();

		let shown = output(|out| display(&config, "aaad", "tank", None, out));
		let lines: Vec<&str> = shown.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0], "# aaad tank history");
		assert!(lines[1].contains("2400") && lines[1].contains("Busan"));
		assert!(lines[2].contains("+25") && lines[2].contains("Route 66"));
	}

	#[test]
	fn average_reports_filtered_means_and_counts() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());
		for (rating, new_player) in [(2500, true), (2520, false), (2490, false), (2530, false)] {
			record_match(
				&config,
				record("aaad", "support", rating, "ilios", new_player),
				&mut io::sink(),
			)
			.unwrap();
		}

		let all = output(|out| average(&config, "aaad", "support", None, false, out));
		assert_eq!(all, "Average rating: 2510.00\n");

		let wins = output(|out| {
			average(&config, "aaad", "support", Some(OutcomeFilter::Win), true, out)
		});
		assert_eq!(
			wins,
			"Average rating: 2525.00\nAverage change: +30.00\nMatches: 2\n"
		);

		let none = output(|out| average(&config, "aaad", "tank", None, false, out));
		assert_eq!(none, "No tank matches recorded for aaad.\n");
	}

	#[test]
	fn read_commands_never_create_stores() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());

		let err = display(&config, "ghost", "tank", None, &mut io::sink()).unwrap_err();
		assert!(matches!(
			err,
			TrackerError::Validation(ValidationError::UnknownPlayer(_))
		));
		let err = export(&config, "ghost", &[], ExportFormat::Csv, &mut io::sink()).unwrap_err();
		assert_eq!(err.exit_code(), 1);
		assert!(!dir.path().join("ghost.sqlite").exists());
	}

	#[test]
	fn export_writes_selected_roles() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());
		record_match(&config, record("aaad", "tank", 2400, "busan", true), &mut io::sink()).unwrap();
		record_match(&config, record("aaad", "support", 2527, "hana", false), &mut io::sink())
			.unwrap();

		let csv = output(|out| export(&config, "aaad", &[], ExportFormat::Csv, out));
		assert_eq!(csv.lines().count(), 3);

		let only_support = output(|out| {
			export(&config, "aaad", &["Support".to_string()], ExportFormat::Csv, out)
		});
		let lines: Vec<&str> = only_support.lines().collect();
		assert_eq!(lines.len(), 2);
		assert!(lines[1].starts_with("support,"));
		assert!(lines[1].contains(",2527,Hanamura,"));
	}

	#[test]
	fn outdated_table_layout_is_a_storage_error() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());
		Connection::open(dir.path().join("aaad.sqlite"))
			.unwrap()
			.execute_batch("CREATE TABLE support (timestamp TEXT NOT NULL, sr INT NOT NULL);")
			.unwrap();

		let err = record_match(
			&config,
			record("aaad", "support", 2500, "busan", false),
			&mut io::sink(),
		)
		.unwrap_err();
		assert_eq!(err.exit_code(), 2);
		assert!(err.to_string().contains("corrupt or outdated"));
	}

	#[test]
	fn invalid_player_name_is_rejected_before_touching_disk() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::with_data_dir(dir.path());
		let err = record_match(
			&config,
			record("../escape", "tank", 2500, "busan", true),
			&mut io::sink(),
		)
		.unwrap_err();
		assert!(matches!(
			err,
			TrackerError::Validation(ValidationError::InvalidPlayerName(_))
		));
		assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
	}
}
