use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use super::repo::{self, Photo};
use crate::state::AppState;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Push the bytes to the image host, then record the photo row with the
/// returned URL and object key. Every upload is marked main, matching
/// the original behavior (main-photo uniqueness is not enforced).
pub async fn upload_profile_photo(
    st: &AppState,
    user_id: i32,
    item: UploadItem,
) -> anyhow::Result<Photo> {
    anyhow::ensure!(!item.body.is_empty(), "empty file");

    let ext = ext_from_mime(&item.content_type).unwrap_or("bin");
    let key = format!("users/{}/{}.{}", user_id, Uuid::new_v4(), ext);

    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let url = st.storage.object_url(&key);
    repo::insert(&st.db, user_id, &url, &key, true).await
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_known_and_unknown() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn fake_storage_builds_stable_urls() {
        let state = AppState::fake();
        let url = state.storage.object_url("users/1/abc.jpg");
        assert!(url.contains("users/1/abc.jpg"));
    }
}
