use crate::data::{is_valid_map, Role};
use crate::error::ValidationError;
use crate::record::{MatchRecord, ValidMatch};

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 6000;

/// Checks a normalized record against the reference tables and the state of
/// the player's store. Stops at the first violation, in this order: role,
/// map, rating, store existence.
pub fn validate(record: &MatchRecord, store_exists: bool) -> Result<ValidMatch, ValidationError> {
	let role = parse_role(&record.role)?;

	if !is_valid_map(&record.map) {
		return Err(ValidationError::UnknownMap {
			map: record.map.clone(),
		});
	}

	if !(MIN_RATING..=MAX_RATING).contains(&record.rating) {
		return Err(ValidationError::RatingOutOfRange(record.rating));
	}

	if !store_exists && !record.new_player {
		return Err(ValidationError::MissingStore(record.player.clone()));
	}

	Ok(ValidMatch {
		role,
		rating: record.rating,
		map: record.map.clone(),
		comment: record.comment.clone(),
	})
}

pub fn parse_role(role: &str) -> Result<Role, ValidationError> {
	Role::parse(role).ok_or_else(|| ValidationError::UnknownRole(role.to_string()))
}

/// Player names become file names, so anything that could escape the store
/// directory is refused. Surrounding whitespace is refused too, otherwise
/// `aaad` and `aaad ` would be two different stores.
pub fn check_player_name(player: &str) -> Result<(), ValidationError> {
	let usable = !player.is_empty()
		&& player.trim() == player
		&& !player.starts_with('.')
		&& !player.contains(['/', '\\', '\0']);

	if usable {
		Ok(())
	} else {
		Err(ValidationError::InvalidPlayerName(player.to_string()))
	}
}
