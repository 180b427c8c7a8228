use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use super::approval::{Approval, InstanceStore};

/// Shift/time entry awaiting approval. Owner's username, surname and
/// position are denormalized at creation time, as the original schema did.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instance {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub instance_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub instance_end: OffsetDateTime,
    pub type_of_instance: String,
    pub username: String,
    pub surname: String,
    pub position: String,
    pub approval: String,
    pub reason: String,
}

impl Instance {
    pub fn approval(&self) -> Approval {
        Approval::from_columns(&self.approval, &self.reason)
    }
}

pub struct NewInstance<'a> {
    pub user_id: i32,
    pub content: &'a str,
    pub instance_start: OffsetDateTime,
    pub instance_end: OffsetDateTime,
    pub type_of_instance: &'a str,
    pub username: &'a str,
    pub surname: &'a str,
    pub position: &'a str,
}

const INSTANCE_COLUMNS: &str = "id, user_id, content, instance_start, instance_end, \
     type_of_instance, username, surname, position, approval, reason";

/// New instances start pending with an empty reason.
pub async fn insert(db: &PgPool, new: NewInstance<'_>) -> anyhow::Result<Instance> {
    let (approval, reason) = Approval::Pending.columns();
    let instance = sqlx::query_as::<_, Instance>(&format!(
        r#"
        INSERT INTO instances
            (user_id, content, instance_start, instance_end, type_of_instance,
             username, surname, position, approval, reason)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {INSTANCE_COLUMNS}
        "#
    ))
    .bind(new.user_id)
    .bind(new.content)
    .bind(new.instance_start)
    .bind(new.instance_end)
    .bind(new.type_of_instance)
    .bind(new.username)
    .bind(new.surname)
    .bind(new.position)
    .bind(approval)
    .bind(reason)
    .fetch_one(db)
    .await?;
    Ok(instance)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Instance>> {
    let rows = sqlx::query_as::<_, Instance>(&format!(
        "SELECT {INSTANCE_COLUMNS} FROM instances ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_for_worker(db: &PgPool, user_id: i32) -> anyhow::Result<Vec<Instance>> {
    let rows = sqlx::query_as::<_, Instance>(&format!(
        "SELECT {INSTANCE_COLUMNS} FROM instances WHERE user_id = $1 ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Transactional record store backing the approval evaluator.
/// `instance_for_update` pins the target row with `FOR UPDATE` and then
/// takes a transaction-scoped advisory lock keyed on the instance's
/// position. Row locks alone are not enough: two accepts against two
/// different pending instances of the same position would lock disjoint
/// rows and count the same committed snapshot. The advisory lock makes
/// every same-position approval run its counts after the previous one
/// has committed.
pub struct PgInstanceStore<'a> {
    pub tx: Transaction<'a, Postgres>,
}

impl PgInstanceStore<'_> {
    pub async fn begin(db: &PgPool) -> anyhow::Result<PgInstanceStore<'static>> {
        Ok(PgInstanceStore {
            tx: db.begin().await?,
        })
    }

    pub async fn commit(self) -> anyhow::Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl InstanceStore for PgInstanceStore<'_> {
    async fn instance_for_update(&mut self, id: i32) -> anyhow::Result<Option<Instance>> {
        let row = sqlx::query_as::<_, Instance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM instances WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        // Serialize same-position approvals; released at commit/rollback.
        if let Some(instance) = &row {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
                .bind(&instance.position)
                .execute(&mut *self.tx)
                .await?;
        }

        Ok(row)
    }

    async fn users_with_position(&mut self, position: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE position = $1")
                .bind(position)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(count)
    }

    async fn approved_with_position(
        &mut self,
        position: &str,
        except: i32,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM instances WHERE position = $1 AND approval = 'true' AND id <> $2",
        )
        .bind(position)
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count)
    }

    async fn set_approval(&mut self, id: i32, approval: &Approval) -> anyhow::Result<()> {
        let (a, r) = approval.columns();
        sqlx::query("UPDATE instances SET approval = $1, reason = $2 WHERE id = $3")
            .bind(a)
            .bind(r)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
