use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Breed, KittenChanges, KittenDetail, NewKitten, NewRating, NewUser, RatingDetail, User};
use crate::filter::{KittenFilter, PageWindow};

/// One window of a filtered listing plus the size of the whole result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[async_trait]
pub trait BreedRepository: Send + Sync {
    /// All breeds ordered by id
    async fn list_breeds(&self) -> Result<Vec<Breed>, DatabaseError>;

    async fn find_breed(&self, id: i64) -> Result<Option<Breed>, DatabaseError>;

    async fn create_breed(&self, name: &str) -> Result<Breed, DatabaseError>;

    /// Removes the breed together with its kittens and their ratings
    async fn delete_breed(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait KittenRepository: Send + Sync {
    async fn list_kittens(
        &self,
        filter: &KittenFilter,
        window: PageWindow,
    ) -> Result<Listing<KittenDetail>, DatabaseError>;

    async fn find_kitten(&self, id: i64) -> Result<Option<KittenDetail>, DatabaseError>;

    async fn create_kitten(&self, owner_id: i64, kitten: NewKitten) -> Result<KittenDetail, DatabaseError>;

    /// Fails with `NotFound` when the kitten vanished in the meantime
    async fn update_kitten(&self, id: i64, changes: KittenChanges) -> Result<KittenDetail, DatabaseError>;

    /// Removes the kitten together with its ratings
    async fn delete_kitten(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// All ratings ordered by id
    async fn list_ratings(&self) -> Result<Vec<RatingDetail>, DatabaseError>;

    async fn find_rating(&self, user_id: i64, kitten_id: i64) -> Result<Option<RatingDetail>, DatabaseError>;

    /// Fails with `UniqueViolation` when the user already rated the kitten
    async fn create_rating(&self, user_id: i64, rating: NewRating) -> Result<RatingDetail, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
}

/// Everything the HTTP layer needs from persistence
#[async_trait]
pub trait Store: BreedRepository + KittenRepository + RatingRepository + UserRepository {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Constraint names shared by the schema and the in-memory store
pub mod constraint {
    pub const USERNAME_UNIQUE: &str = "users_username_key";
    pub const BREED_NAME_UNIQUE: &str = "breeds_name_key";
    pub const RATING_PAIR_UNIQUE: &str = "ratings_user_id_kitten_id_key";

    pub const KITTEN_OWNER_FK: &str = "kittens_owner_id_fkey";
    pub const KITTEN_BREED_FK: &str = "kittens_breed_id_fkey";
    pub const RATING_USER_FK: &str = "ratings_user_id_fkey";
    pub const RATING_KITTEN_FK: &str = "ratings_kitten_id_fkey";

    pub const KITTEN_AGE_CHECK: &str = "kittens_age_check";
    pub const RATING_SCORE_CHECK: &str = "ratings_score_check";
}
