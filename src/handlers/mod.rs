// handlers/mod.rs - HTTP handlers split by authentication tier
//
// Public handlers accept anonymous callers. Protected handlers take an
// `AuthUser` and answer 401 before doing anything else.

pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Numeric path id; anything else cannot name a row, so it is a 404
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| not_found())
}

pub fn not_found() -> ApiError {
    ApiError::not_found("Not found.")
}
