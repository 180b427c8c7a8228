use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Worker account record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub surname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub position: String,
    pub gender: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_birth: OffsetDateTime,
    pub city: String,
    pub country: String,
    pub introduction: String,
    pub interests: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub surname: &'a str,
    pub password_hash: &'a str,
    pub position: &'a str,
    pub gender: &'a str,
    pub date_of_birth: OffsetDateTime,
    pub city: &'a str,
    pub country: &'a str,
    pub introduction: &'a str,
    pub interests: &'a str,
}

const USER_COLUMNS: &str = "id, username, surname, password_hash, position, gender, \
     date_of_birth, city, country, introduction, interests, created_at, last_active";

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (username, surname, password_hash, position, gender, date_of_birth,
                 city, country, introduction, interests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username)
        .bind(new.surname)
        .bind(new.password_hash)
        .bind(new.position)
        .bind(new.gender)
        .bind(new.date_of_birth)
        .bind(new.city)
        .bind(new.country)
        .bind(new.introduction)
        .bind(new.interests)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn touch_last_active(db: &PgPool, id: i32) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_active = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
