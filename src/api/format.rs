use serde::{Deserialize, Serialize};

use crate::database::models::{Breed, KittenDetail, RatingDetail, User};

/// `{id, name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedView {
    pub id: i64,
    pub name: String,
}

impl From<Breed> for BreedView {
    fn from(breed: Breed) -> Self {
        Self {
            id: breed.id,
            name: breed.name,
        }
    }
}

/// Breed nested inside a kitten
pub type KittenBreed = BreedView;

/// Public read model of a kitten. The owner is rendered by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KittenView {
    pub id: i64,
    pub owner: String,
    pub breed: KittenBreed,
    pub color: String,
    pub age: i32,
    pub description: String,
}

impl From<KittenDetail> for KittenView {
    fn from(kitten: KittenDetail) -> Self {
        Self {
            id: kitten.id,
            owner: kitten.owner_username,
            breed: KittenBreed {
                id: kitten.breed_id,
                name: kitten.breed_name,
            },
            color: kitten.color,
            age: kitten.age,
            description: kitten.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingView {
    pub id: i64,
    pub user: String,
    pub kitten: i64,
    pub score: i16,
}

impl From<RatingDetail> for RatingView {
    fn from(rating: RatingDetail) -> Self {
        Self {
            id: rating.id,
            user: rating.username,
            kitten: rating.kitten_id,
            score: rating.score,
        }
    }
}

/// Registration response; the password never leaves the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub username: String,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kitten_view_nests_breed_and_names_owner() {
        let view = KittenView::from(KittenDetail {
            id: 3,
            owner_id: 9,
            owner_username: "alice".to_string(),
            breed_id: 1,
            breed_name: "Siamese".to_string(),
            color: "Blue".to_string(),
            age: 3,
            description: "Fluffy".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": 3,
                "owner": "alice",
                "breed": {"id": 1, "name": "Siamese"},
                "color": "Blue",
                "age": 3,
                "description": "Fluffy"
            })
        );
    }

    #[test]
    fn registered_user_omits_password_hash() {
        let view = RegisteredUser::from(User {
            id: 1,
            username: "alice".to_string(),
            email: String::new(),
            password_hash: "$argon2id$secret".to_string(),
            date_joined: chrono::Utc::now(),
        });
        let body = serde_json::to_string(&view).unwrap();
        assert!(!body.contains("argon2id"));
        assert_eq!(serde_json::to_value(&view).unwrap(), json!({"username": "alice", "email": ""}));
    }
}
