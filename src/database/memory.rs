use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Breed, Kitten, KittenChanges, KittenDetail, NewKitten, NewRating, NewUser, RatingDetail, User,
};
use crate::database::repository::{
    constraint, BreedRepository, KittenRepository, Listing, RatingRepository, Store, UserRepository,
};
use crate::filter::{KittenFilter, PageWindow};

#[derive(Debug, Clone)]
struct RatingRow {
    id: i64,
    user_id: i64,
    kitten_id: i64,
    score: i16,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    breeds: BTreeMap<i64, Breed>,
    kittens: BTreeMap<i64, Kitten>,
    ratings: BTreeMap<i64, RatingRow>,
    last_user_id: i64,
    last_breed_id: i64,
    last_kitten_id: i64,
    last_rating_id: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {
    fn kitten_detail(&self, kitten: &Kitten) -> Option<KittenDetail> {
        let owner = self.users.get(&kitten.owner_id)?;
        let breed = self.breeds.get(&kitten.breed_id)?;
        Some(KittenDetail {
            id: kitten.id,
            owner_id: kitten.owner_id,
            owner_username: owner.username.clone(),
            breed_id: kitten.breed_id,
            breed_name: breed.name.clone(),
            color: kitten.color.clone(),
            age: kitten.age,
            description: kitten.description.clone(),
        })
    }

    fn rating_detail(&self, row: &RatingRow) -> Option<RatingDetail> {
        let user = self.users.get(&row.user_id)?;
        Some(RatingDetail {
            id: row.id,
            user_id: row.user_id,
            username: user.username.clone(),
            kitten_id: row.kitten_id,
            score: row.score,
        })
    }

    fn remove_kitten(&mut self, id: i64) -> bool {
        let removed = self.kittens.remove(&id).is_some();
        if removed {
            self.ratings.retain(|_, r| r.kitten_id != id);
        }
        removed
    }
}

/// Process-local store with the same constraints as the SQL schema.
/// One lock guards all tables, so every check-then-write is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BreedRepository for MemoryStore {
    async fn list_breeds(&self) -> Result<Vec<Breed>, DatabaseError> {
        Ok(self.tables.read().await.breeds.values().cloned().collect())
    }

    async fn find_breed(&self, id: i64) -> Result<Option<Breed>, DatabaseError> {
        Ok(self.tables.read().await.breeds.get(&id).cloned())
    }

    async fn create_breed(&self, name: &str) -> Result<Breed, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.breeds.values().any(|b| b.name == name) {
            return Err(DatabaseError::unique(constraint::BREED_NAME_UNIQUE));
        }
        let breed = Breed {
            id: next_id(&mut tables.last_breed_id),
            name: name.to_string(),
        };
        tables.breeds.insert(breed.id, breed.clone());
        Ok(breed)
    }

    async fn delete_breed(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.breeds.remove(&id).is_none() {
            return Ok(false);
        }
        let orphans: Vec<i64> = tables
            .kittens
            .values()
            .filter(|k| k.breed_id == id)
            .map(|k| k.id)
            .collect();
        for kitten_id in orphans {
            tables.remove_kitten(kitten_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl KittenRepository for MemoryStore {
    async fn list_kittens(
        &self,
        filter: &KittenFilter,
        window: PageWindow,
    ) -> Result<Listing<KittenDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        let matching: Vec<KittenDetail> = tables
            .kittens
            .values()
            .filter_map(|k| tables.kitten_detail(k))
            .filter(|k| filter.matches_breed(&k.breed_name))
            .collect();

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(window.offset).unwrap_or(0))
            .take(usize::try_from(window.limit).unwrap_or(0))
            .collect();
        Ok(Listing { items, total })
    }

    async fn find_kitten(&self, id: i64) -> Result<Option<KittenDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.kittens.get(&id).and_then(|k| tables.kitten_detail(k)))
    }

    async fn create_kitten(&self, owner_id: i64, kitten: NewKitten) -> Result<KittenDetail, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(DatabaseError::foreign_key(constraint::KITTEN_OWNER_FK));
        }
        if !tables.breeds.contains_key(&kitten.breed_id) {
            return Err(DatabaseError::foreign_key(constraint::KITTEN_BREED_FK));
        }
        if kitten.age < 0 {
            return Err(DatabaseError::check(constraint::KITTEN_AGE_CHECK));
        }

        let row = Kitten {
            id: next_id(&mut tables.last_kitten_id),
            owner_id,
            breed_id: kitten.breed_id,
            color: kitten.color,
            age: kitten.age,
            description: kitten.description,
        };
        tables.kittens.insert(row.id, row.clone());
        tables
            .kitten_detail(&row)
            .ok_or_else(|| DatabaseError::NotFound(format!("kitten {}", row.id)))
    }

    async fn update_kitten(&self, id: i64, changes: KittenChanges) -> Result<KittenDetail, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(breed_id) = changes.breed_id {
            if !tables.breeds.contains_key(&breed_id) {
                return Err(DatabaseError::foreign_key(constraint::KITTEN_BREED_FK));
            }
        }
        if matches!(changes.age, Some(age) if age < 0) {
            return Err(DatabaseError::check(constraint::KITTEN_AGE_CHECK));
        }

        let row = tables
            .kittens
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("kitten {}", id)))?;
        if let Some(breed_id) = changes.breed_id {
            row.breed_id = breed_id;
        }
        if let Some(color) = changes.color {
            row.color = color;
        }
        if let Some(age) = changes.age {
            row.age = age;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }

        let row = row.clone();
        tables
            .kitten_detail(&row)
            .ok_or_else(|| DatabaseError::NotFound(format!("kitten {}", id)))
    }

    async fn delete_kitten(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.remove_kitten(id))
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn list_ratings(&self) -> Result<Vec<RatingDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.ratings.values().filter_map(|r| tables.rating_detail(r)).collect())
    }

    async fn find_rating(&self, user_id: i64, kitten_id: i64) -> Result<Option<RatingDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .find(|r| r.user_id == user_id && r.kitten_id == kitten_id)
            .and_then(|r| tables.rating_detail(r)))
    }

    async fn create_rating(&self, user_id: i64, rating: NewRating) -> Result<RatingDetail, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::foreign_key(constraint::RATING_USER_FK));
        }
        if !tables.kittens.contains_key(&rating.kitten_id) {
            return Err(DatabaseError::foreign_key(constraint::RATING_KITTEN_FK));
        }
        if rating.score < 0 {
            return Err(DatabaseError::check(constraint::RATING_SCORE_CHECK));
        }
        if tables
            .ratings
            .values()
            .any(|r| r.user_id == user_id && r.kitten_id == rating.kitten_id)
        {
            return Err(DatabaseError::unique(constraint::RATING_PAIR_UNIQUE));
        }

        let row = RatingRow {
            id: next_id(&mut tables.last_rating_id),
            user_id,
            kitten_id: rating.kitten_id,
            score: rating.score,
        };
        tables.ratings.insert(row.id, row.clone());
        tables
            .rating_detail(&row)
            .ok_or_else(|| DatabaseError::NotFound(format!("rating {}", row.id)))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::unique(constraint::USERNAME_UNIQUE));
        }
        let row = User {
            id: next_id(&mut tables.last_user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(NewUser {
                username: name.to_string(),
                email: String::new(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap()
    }

    fn kitten(breed_id: i64, color: &str) -> NewKitten {
        NewKitten {
            breed_id,
            color: color.to_string(),
            age: 3,
            description: "A cute kitten.".to_string(),
        }
    }

    fn all() -> PageWindow {
        PageWindow { limit: 100, offset: 0 }
    }

    #[tokio::test]
    async fn usernames_and_breed_names_are_unique() {
        let store = MemoryStore::new();
        user(&store, "alice").await;
        let dup = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: String::new(),
                password_hash: "y".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(DatabaseError::UniqueViolation { .. })));

        store.create_breed("Siamese").await.unwrap();
        assert!(matches!(
            store.create_breed("Siamese").await,
            Err(DatabaseError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn kitten_requires_existing_breed() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let err = store.create_kitten(alice.id, kitten(42, "Blue")).await.unwrap_err();
        match err {
            DatabaseError::ForeignKeyViolation { field } => assert_eq!(field, "breed_id"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn filters_and_windows_kittens() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let siamese = store.create_breed("Siamese").await.unwrap();
        let persian = store.create_breed("Persian").await.unwrap();
        for color in ["Blue", "White", "Grey"] {
            store.create_kitten(alice.id, kitten(siamese.id, color)).await.unwrap();
        }
        store.create_kitten(alice.id, kitten(persian.id, "Black")).await.unwrap();

        let named = store
            .list_kittens(&KittenFilter::BreedNamed("SIAMESE".to_string()), all())
            .await
            .unwrap();
        assert_eq!(named.total, 3);
        assert!(named.items.iter().all(|k| k.breed_id == siamese.id));

        let window = store
            .list_kittens(&KittenFilter::All, PageWindow { limit: 2, offset: 2 })
            .await
            .unwrap();
        assert_eq!(window.total, 4);
        let colors: Vec<_> = window.items.iter().map(|k| k.color.as_str()).collect();
        assert_eq!(colors, vec!["Grey", "Black"]);
    }

    #[tokio::test]
    async fn one_rating_per_user_and_kitten() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let breed = store.create_breed("Siamese").await.unwrap();
        let k = store.create_kitten(alice.id, kitten(breed.id, "Blue")).await.unwrap();

        let first = store
            .create_rating(alice.id, NewRating { kitten_id: k.id, score: 4 })
            .await
            .unwrap();
        assert_eq!(first.username, "alice");

        let second = store
            .create_rating(alice.id, NewRating { kitten_id: k.id, score: 5 })
            .await;
        assert!(matches!(second, Err(DatabaseError::UniqueViolation { .. })));
        assert_eq!(store.list_ratings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_breed_cascades() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let breed = store.create_breed("Siamese").await.unwrap();
        let k = store.create_kitten(alice.id, kitten(breed.id, "Blue")).await.unwrap();
        store
            .create_rating(alice.id, NewRating { kitten_id: k.id, score: 4 })
            .await
            .unwrap();

        assert!(store.delete_breed(breed.id).await.unwrap());
        assert!(store.find_kitten(k.id).await.unwrap().is_none());
        assert!(store.list_ratings().await.unwrap().is_empty());
        assert!(!store.delete_breed(breed.id).await.unwrap());
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_columns() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let breed = store.create_breed("Siamese").await.unwrap();
        let k = store.create_kitten(alice.id, kitten(breed.id, "Blue")).await.unwrap();

        let updated = store
            .update_kitten(
                k.id,
                KittenChanges {
                    age: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.age, 7);
        assert_eq!(updated.color, "Blue");

        let missing = store.update_kitten(999, KittenChanges::default()).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound(_))));
    }
}
