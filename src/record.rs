use crate::data::{resolve_map_alias, Role};

/// One submitted match, as it came off the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
	pub player: String,
	pub role: String,
	pub rating: i32,
	pub map: String,
	pub comment: Option<String>,
	pub new_player: bool,
}

impl MatchRecord {
	/// Replaces the map with its canonical spelling when it is a known
	/// alias or a differently cased canonical name.
	pub fn normalize(mut self) -> Self {
		self.map = resolve_map_alias(&self.map);
		self
	}
}

/// A record that passed validation; what the store actually persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMatch {
	pub role: Role,
	pub rating: i32,
	pub map: String,
	pub comment: Option<String>,
}
