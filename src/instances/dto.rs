use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreateInstanceRequest {
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub instance_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub instance_end: OffsetDateTime,
    pub type_of_instance: String,
}

/// Body of `POST /users/acceptInstance/{userId}`.
#[derive(Debug, Deserialize)]
pub struct AcceptInstanceRequest {
    pub id: i32,
    pub approval: String,
}

/// Body of `POST /users/disapprovalInstance/{userId}`.
#[derive(Debug, Deserialize)]
pub struct DisapproveInstanceRequest {
    pub id: i32,
    pub approval: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_request_deserializes() {
        let req: AcceptInstanceRequest =
            serde_json::from_str(r#"{"id": 4, "approval": "true"}"#).unwrap();
        assert_eq!(req.id, 4);
        assert_eq!(req.approval, "true");
    }

    #[test]
    fn disapprove_request_deserializes() {
        let req: DisapproveInstanceRequest =
            serde_json::from_str(r#"{"id": 4, "approval": "false", "reason": "overlap"}"#)
                .unwrap();
        assert_eq!(req.reason, "overlap");
    }

    #[test]
    fn create_request_parses_rfc3339_timestamps() {
        let req: CreateInstanceRequest = serde_json::from_str(
            r#"{
                "content": "night shift",
                "instance_start": "2024-05-01T20:00:00Z",
                "instance_end": "2024-05-02T06:00:00Z",
                "type_of_instance": "shift"
            }"#,
        )
        .unwrap();
        assert_eq!(req.content, "night shift");
        assert!(req.instance_end > req.instance_start);
    }
}
