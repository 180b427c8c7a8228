use serde::Serialize;
use time::OffsetDateTime;

use crate::auth::repo::User;
use crate::photos::repo::Photo;

/// User as returned by the listing endpoint: everything except the
/// password hash, plus the user's photos.
#[derive(Debug, Serialize)]
pub struct UserWithPhotos {
    pub id: i32,
    pub username: String,
    pub surname: String,
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
    pub photos: Vec<Photo>,
}

impl UserWithPhotos {
    pub fn from_user(u: User, photos: Vec<Photo>) -> Self {
        Self {
            id: u.id,
            username: u.username,
            surname: u.surname,
            position: u.position,
            gender: u.gender,
            date_of_birth: u.date_of_birth,
            city: u.city,
            country: u.country,
            introduction: u.introduction,
            interests: u.interests,
            created_at: u.created_at,
            last_active: u.last_active,
            photos,
        }
    }
}
