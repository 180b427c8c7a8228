use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::User;

/// Registration payload. Password length bounds follow the original
/// HR policy: between 4 and 8 characters.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub surname: String,
    pub password: String,
    pub position: String,
    pub gender: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_birth: OffsetDateTime,
    pub city: String,
    pub country: String,
    pub introduction: String,
    pub interests: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub surname: String,
    pub position: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            surname: u.surname.clone(),
            position: u.position.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_expected_fields() {
        let json = serde_json::to_string(&PublicUser {
            id: 3,
            username: "ivan".into(),
            surname: "petrov".into(),
            position: "Nurse".into(),
        })
        .unwrap();
        assert!(json.contains("\"id\":3"));
        assert!(json.contains("ivan"));
        assert!(json.contains("Nurse"));
        assert!(!json.contains("password"));
    }
}
