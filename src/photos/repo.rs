use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Stored profile photo. `object_key` is the image host's opaque
/// reference for the uploaded bytes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: i32,
    pub user_id: i32,
    pub url: String,
    pub object_key: String,
    pub is_main: bool,
}

pub async fn insert(
    db: &PgPool,
    user_id: i32,
    url: &str,
    object_key: &str,
    is_main: bool,
) -> anyhow::Result<Photo> {
    let photo = sqlx::query_as::<_, Photo>(
        r#"
        INSERT INTO photos (user_id, url, object_key, is_main)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, url, object_key, is_main
        "#,
    )
    .bind(user_id)
    .bind(url)
    .bind(object_key)
    .bind(is_main)
    .fetch_one(db)
    .await
    .context("insert photo")?;
    Ok(photo)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Photo>> {
    let rows = sqlx::query_as::<_, Photo>(
        "SELECT id, user_id, url, object_key, is_main FROM photos ORDER BY id",
    )
    .fetch_all(db)
    .await
    .context("list photos")?;
    Ok(rows)
}
