use std::io::Write;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use plotters::prelude::*;
use serde::Serialize;

use crate::data::Role;
use crate::db::MatchRow;
use crate::error::StoreError;
use crate::validate::{MAX_RATING, MIN_RATING};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
	Csv,
	Svg,
}

#[derive(Serialize)]
struct ExportRow<'a> {
	role: &'static str,
	timestamp: NaiveDateTime,
	rating: i32,
	map: &'a str,
	comment: Option<&'a str>,
}

pub fn write_csv<W: Write>(out: W, history: &[(Role, Vec<MatchRow>)]) -> Result<(), StoreError> {
	// Headers are written by hand so an empty history still gets them.
	let mut writer = csv::WriterBuilder::new()
		.has_headers(false)
		.from_writer(out);
	writer.write_record(["role", "timestamp", "rating", "map", "comment"])?;

	for (role, rows) in history {
		for row in rows {
			writer.serialize(ExportRow {
				role: role.as_str(),
				timestamp: row.timestamp,
				rating: row.rating,
				map: &row.map,
				comment: row.comment.as_deref(),
			})?;
		}
	}

	writer.flush()?;
	Ok(())
}

pub fn render_svg(player: &str, history: &[(Role, Vec<MatchRow>)]) -> Result<String, StoreError> {
	let longest = history.iter().map(|(_, rows)| rows.len()).max().unwrap_or(0);
	if longest == 0 {
		return Err(StoreError::Plot(format!("no matches recorded for '{player}'")));
	}

	let ratings = history.iter().flat_map(|(_, rows)| rows.iter().map(|r| r.rating));
	let low = ratings.clone().min().unwrap_or(MIN_RATING);
	let high = ratings.max().unwrap_or(MAX_RATING);
	let y_range = (low - 100).max(MIN_RATING)..(high + 100).min(MAX_RATING);

	let mut svg = String::new();
	{
		let root = SVGBackend::with_string(&mut svg, (960, 540)).into_drawing_area();
		root.fill(&WHITE).map_err(plot_error)?;

		let mut chart = ChartBuilder::on(&root)
			.caption(format!("{player} rating history"), ("sans-serif", 24))
			.margin(16)
			.x_label_area_size(32)
			.y_label_area_size(48)
			.build_cartesian_2d(1..longest.max(2), y_range)
			.map_err(plot_error)?;

		chart
			.configure_mesh()
			.x_desc("match")
			.y_desc("rating")
			.draw()
			.map_err(plot_error)?;

		for (idx, (role, rows)) in history.iter().enumerate() {
			if rows.is_empty() {
				continue;
			}
			let style = Palette99::pick(idx).stroke_width(2);
			chart
				.draw_series(LineSeries::new(
					rows.iter().enumerate().map(|(n, row)| (n + 1, row.rating)),
					style,
				))
				.map_err(plot_error)?
				.label(role.as_str())
				.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
		}

		chart
			.configure_series_labels()
			.background_style(&WHITE.mix(0.8))
			.border_style(&BLACK)
			.draw()
			.map_err(plot_error)?;

		root.present().map_err(plot_error)?;
	}

	Ok(svg)
}

fn plot_error<E: std::fmt::Display>(err: E) -> StoreError {
	StoreError::Plot(err.to_string())
}
