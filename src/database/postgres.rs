use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{Breed, KittenChanges, KittenDetail, NewKitten, NewRating, NewUser, RatingDetail, User};
use crate::database::repository::{
    BreedRepository, KittenRepository, Listing, RatingRepository, Store, UserRepository,
};
use crate::filter::search::escape_like;
use crate::filter::{KittenFilter, PageWindow};

// Columns of `KittenDetail`, selected from a kitten relation aliased `k`
const KITTEN_DETAIL_COLUMNS: &str = "k.id, k.owner_id, u.username AS owner_username, \
     k.breed_id, b.name AS breed_name, k.color, k.age, k.description";

const KITTEN_JOINS: &str = "JOIN users u ON u.id = k.owner_id JOIN breeds b ON b.id = k.breed_id";

const RATING_DETAIL_SELECT: &str = "SELECT r.id, r.user_id, u.username, r.kitten_id, r.score \
     FROM ratings r JOIN users u ON u.id = r.user_id";

/// sqlx-backed store over the schema in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_kitten_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &KittenFilter) {
    match filter {
        KittenFilter::All => {}
        KittenFilter::BreedContains(terms) => {
            for (i, term) in terms.iter().enumerate() {
                qb.push(if i == 0 { " WHERE " } else { " AND " });
                qb.push("b.name ILIKE ");
                qb.push_bind(format!("%{}%", escape_like(term)));
            }
        }
        KittenFilter::BreedNamed(name) => {
            qb.push(" WHERE UPPER(b.name) = UPPER(");
            qb.push_bind(name.clone());
            qb.push(")");
        }
    }
}

#[async_trait]
impl BreedRepository for PgStore {
    async fn list_breeds(&self) -> Result<Vec<Breed>, DatabaseError> {
        let breeds = sqlx::query_as::<_, Breed>("SELECT id, name FROM breeds ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(breeds)
    }

    async fn find_breed(&self, id: i64) -> Result<Option<Breed>, DatabaseError> {
        let breed = sqlx::query_as::<_, Breed>("SELECT id, name FROM breeds WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(breed)
    }

    async fn create_breed(&self, name: &str) -> Result<Breed, DatabaseError> {
        let breed = sqlx::query_as::<_, Breed>("INSERT INTO breeds (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(breed)
    }

    async fn delete_breed(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM breeds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl KittenRepository for PgStore {
    async fn list_kittens(
        &self,
        filter: &KittenFilter,
        window: PageWindow,
    ) -> Result<Listing<KittenDetail>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM kittens k JOIN breeds b ON b.id = k.breed_id");
        push_kitten_filter(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM kittens k {}",
            KITTEN_DETAIL_COLUMNS, KITTEN_JOINS
        ));
        push_kitten_filter(&mut qb, filter);
        qb.push(" ORDER BY k.id LIMIT ");
        qb.push_bind(window.limit);
        qb.push(" OFFSET ");
        qb.push_bind(window.offset);

        let items = qb.build_query_as::<KittenDetail>().fetch_all(&self.pool).await?;
        Ok(Listing { items, total })
    }

    async fn find_kitten(&self, id: i64) -> Result<Option<KittenDetail>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM kittens k {} WHERE k.id = $1",
            KITTEN_DETAIL_COLUMNS, KITTEN_JOINS
        );
        let kitten = sqlx::query_as::<_, KittenDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(kitten)
    }

    async fn create_kitten(&self, owner_id: i64, kitten: NewKitten) -> Result<KittenDetail, DatabaseError> {
        let sql = format!(
            "WITH k AS (
                INSERT INTO kittens (owner_id, breed_id, color, age, description)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {} FROM k {}",
            KITTEN_DETAIL_COLUMNS, KITTEN_JOINS
        );
        let created = sqlx::query_as::<_, KittenDetail>(&sql)
            .bind(owner_id)
            .bind(kitten.breed_id)
            .bind(&kitten.color)
            .bind(kitten.age)
            .bind(&kitten.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_kitten(&self, id: i64, changes: KittenChanges) -> Result<KittenDetail, DatabaseError> {
        let sql = format!(
            "WITH k AS (
                UPDATE kittens SET
                    breed_id = COALESCE($2, breed_id),
                    color = COALESCE($3, color),
                    age = COALESCE($4, age),
                    description = COALESCE($5, description)
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM k {}",
            KITTEN_DETAIL_COLUMNS, KITTEN_JOINS
        );
        sqlx::query_as::<_, KittenDetail>(&sql)
            .bind(id)
            .bind(changes.breed_id)
            .bind(changes.color)
            .bind(changes.age)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("kitten {}", id)))
    }

    async fn delete_kitten(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM kittens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RatingRepository for PgStore {
    async fn list_ratings(&self) -> Result<Vec<RatingDetail>, DatabaseError> {
        let sql = format!("{} ORDER BY r.id", RATING_DETAIL_SELECT);
        let ratings = sqlx::query_as::<_, RatingDetail>(&sql).fetch_all(&self.pool).await?;
        Ok(ratings)
    }

    async fn find_rating(&self, user_id: i64, kitten_id: i64) -> Result<Option<RatingDetail>, DatabaseError> {
        let sql = format!("{} WHERE r.user_id = $1 AND r.kitten_id = $2", RATING_DETAIL_SELECT);
        let rating = sqlx::query_as::<_, RatingDetail>(&sql)
            .bind(user_id)
            .bind(kitten_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn create_rating(&self, user_id: i64, rating: NewRating) -> Result<RatingDetail, DatabaseError> {
        let created = sqlx::query_as::<_, RatingDetail>(
            "WITH r AS (
                INSERT INTO ratings (user_id, kitten_id, score)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT r.id, r.user_id, u.username, r.kitten_id, r.score
            FROM r JOIN users u ON u.id = r.user_id",
        )
        .bind(user_id)
        .bind(rating.kitten_id)
        .bind(rating.score)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, username, email, password_hash, date_joined",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
