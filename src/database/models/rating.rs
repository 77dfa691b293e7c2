use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Rating joined with the rater's username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RatingDetail {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub kitten_id: i64,
    pub score: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRating {
    pub kitten_id: i64,
    pub score: i16,
}
