use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub id: i32,
    pub name: String,
    pub salesman: String,
    pub buyer: String,
    pub service_name: String,
    pub price: f64,
    pub payment_method: String,
}

pub struct NewBill<'a> {
    pub name: &'a str,
    pub salesman: &'a str,
    pub buyer: &'a str,
    pub service_name: &'a str,
    pub price: f64,
    pub payment_method: &'a str,
}

pub async fn insert(db: &PgPool, new: NewBill<'_>) -> anyhow::Result<Bill> {
    let bill = sqlx::query_as::<_, Bill>(
        r#"
        INSERT INTO bills (name, salesman, buyer, service_name, price, payment_method)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, salesman, buyer, service_name, price, payment_method
        "#,
    )
    .bind(new.name)
    .bind(new.salesman)
    .bind(new.buyer)
    .bind(new.service_name)
    .bind(new.price)
    .bind(new.payment_method)
    .fetch_one(db)
    .await?;
    Ok(bill)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Bill>> {
    let rows = sqlx::query_as::<_, Bill>(
        "SELECT id, name, salesman, buyer, service_name, price, payment_method \
         FROM bills ORDER BY id",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
