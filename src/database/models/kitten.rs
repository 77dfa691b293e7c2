use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::permissions::Owned;

/// Row of the `kittens` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Kitten {
    pub id: i64,
    pub owner_id: i64,
    pub breed_id: i64,
    pub color: String,
    /// Age in whole months
    pub age: i32,
    pub description: String,
}

/// Kitten joined with its owner's username and its breed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct KittenDetail {
    pub id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub breed_id: i64,
    pub breed_name: String,
    pub color: String,
    pub age: i32,
    pub description: String,
}

impl Owned for KittenDetail {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKitten {
    pub breed_id: i64,
    pub color: String,
    pub age: i32,
    pub description: String,
}

/// Column updates; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KittenChanges {
    pub breed_id: Option<i64>,
    pub color: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
}

impl KittenChanges {
    /// Complete write payload, as required for creation and PUT
    pub fn into_new(self) -> Option<NewKitten> {
        Some(NewKitten {
            breed_id: self.breed_id?,
            color: self.color?,
            age: self.age?,
            description: self.description?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.breed_id.is_none() && self.color.is_none() && self.age.is_none() && self.description.is_none()
    }
}
