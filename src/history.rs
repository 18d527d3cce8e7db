//! Win/loss derivation and averages over one role's match history.
//!
//! Only ratings are stored, so the outcome of a match is inferred from how
//! the rating moved relative to the match before it.

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::db::MatchRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Win,
	Loss,
	Draw,
}

/// Restricts history queries to wins or losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutcomeFilter {
	Win,
	Loss,
}

impl OutcomeFilter {
	fn admits(self, outcome: Option<Outcome>) -> bool {
		matches!(
			(self, outcome),
			(OutcomeFilter::Win, Some(Outcome::Win)) | (OutcomeFilter::Loss, Some(Outcome::Loss))
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	pub row: MatchRow,
	/// Rating difference to the previous match; `None` for the first one.
	pub change: Option<i32>,
	pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Average {
	pub rating: f64,
	/// Mean rating change, only computed for win/loss filtered averages.
	pub change: Option<f64>,
	pub count: usize,
}

pub fn annotate(rows: Vec<MatchRow>) -> Vec<HistoryEntry> {
	let mut previous: Option<i32> = None;

	rows.into_iter()
		.map(|row| {
			let change = previous.map(|prev| row.rating - prev);
			let outcome = change.map(|delta| match delta.cmp(&0) {
				Ordering::Greater => Outcome::Win,
				Ordering::Less => Outcome::Loss,
				Ordering::Equal => Outcome::Draw,
			});
			previous = Some(row.rating);

			HistoryEntry {
				row,
				change,
				outcome,
			}
		})
		.collect()
}

pub fn filter(entries: Vec<HistoryEntry>, by: Option<OutcomeFilter>) -> Vec<HistoryEntry> {
	match by {
		None => entries,
		Some(by) => entries
			.into_iter()
			.filter(|entry| by.admits(entry.outcome))
			.collect(),
	}
}

pub fn average(entries: &[HistoryEntry], by: Option<OutcomeFilter>) -> Option<Average> {
	let selected: Vec<&HistoryEntry> = entries
		.iter()
		.filter(|entry| by.map_or(true, |by| by.admits(entry.outcome)))
		.collect();

	if selected.is_empty() {
		return None;
	}

	let count = selected.len();
	let rating = selected.iter().map(|e| f64::from(e.row.rating)).sum::<f64>() / count as f64;
	let change = by.map(|_| {
		selected
			.iter()
			.filter_map(|e| e.change)
			.map(f64::from)
			.sum::<f64>()
			/ count as f64
	});

	Some(Average {
		rating,
		change,
		count,
	})
}
