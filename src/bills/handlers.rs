use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

use super::repo::{self, Bill, NewBill};

#[derive(Debug, Deserialize)]
pub struct AddBillRequest {
    pub name: String,
    pub salesman: String,
    pub buyer: String,
    pub service_name: String,
    pub price: f64,
    pub payment_method: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/addBill/:user_id", post(add_bill))
        .route("/users/getBills", get(get_bills))
}

#[instrument(skip(state, payload))]
pub async fn add_bill(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<AddBillRequest>,
) -> Result<(StatusCode, Json<Bill>), ApiError> {
    if caller != user_id {
        warn!(caller, user_id, "caller id does not match path user id");
        return Err(ApiError::Unauthorized);
    }

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    if payload.price < 0.0 {
        return Err(ApiError::Validation("price must not be negative".into()));
    }

    let bill = repo::insert(
        &state.db,
        NewBill {
            name: &payload.name,
            salesman: &payload.salesman,
            buyer: &payload.buyer,
            service_name: &payload.service_name,
            price: payload.price,
            payment_method: &payload.payment_method,
        },
    )
    .await?;

    info!(bill_id = bill.id, user_id, "bill created");
    Ok((StatusCode::CREATED, Json(bill)))
}

#[instrument(skip(state))]
pub async fn get_bills(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<Bill>>, ApiError> {
    let bills = repo::list_all(&state.db).await?;
    Ok(Json(bills))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_bill_request_deserializes() {
        let req: AddBillRequest = serde_json::from_str(
            r#"{
                "name": "april invoice",
                "salesman": "clinic",
                "buyer": "insurer",
                "service_name": "checkup",
                "price": 120.5,
                "payment_method": "card"
            }"#,
        )
        .unwrap();
        assert_eq!(req.service_name, "checkup");
        assert!((req.price - 120.5).abs() < f64::EPSILON);
    }
}
