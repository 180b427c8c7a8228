use async_trait::async_trait;

use crate::error::ApiError;

use super::repo::Instance;

/// Closed approval state. The store keeps the legacy two-column encoding
/// (`approval` text + `reason` text, with "false"/"true" as the pending
/// and approved markers); this enum is the only shape the rest of the
/// code reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    Pending,
    Approved,
    Rejected { reason: String },
}

impl Approval {
    /// Decode the legacy columns. Any value other than "true"/"false" is
    /// a rejection; a reason-bearing "false" is a rejection as well.
    pub fn from_columns(approval: &str, reason: &str) -> Self {
        match approval {
            "true" => Approval::Approved,
            "false" if reason.is_empty() => Approval::Pending,
            "false" => Approval::Rejected {
                reason: reason.to_string(),
            },
            other => Approval::Rejected {
                reason: if reason.is_empty() {
                    other.to_string()
                } else {
                    reason.to_string()
                },
            },
        }
    }

    /// Parse an accept-request marker. Only the two legacy markers are
    /// valid here; rejections go through the disapprove operation, so
    /// anything else is the caller's error.
    pub fn from_marker(value: &str) -> Option<Self> {
        match value {
            "true" => Some(Approval::Approved),
            "false" => Some(Approval::Pending),
            _ => None,
        }
    }

    pub fn columns(&self) -> (&str, &str) {
        match self {
            Approval::Pending => ("false", ""),
            Approval::Approved => ("true", ""),
            Approval::Rejected { reason } => ("rejected", reason),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Approval::Approved)
    }
}

/// Record-store capability the evaluator runs against. The Postgres
/// implementation executes all four calls inside one transaction and
/// holds a position-keyed lock from `instance_for_update` until commit,
/// so concurrent accepts against a shared position serialize instead of
/// double-counting the quorum: each accept runs its counts only after
/// the previous same-position accept has committed.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Load the target instance and take the locks that serialize
    /// same-position approvals for the rest of the store's lifetime.
    async fn instance_for_update(&mut self, id: i32) -> anyhow::Result<Option<Instance>>;
    /// Number of users whose position matches.
    async fn users_with_position(&mut self, position: &str) -> anyhow::Result<i64>;
    /// Number of *other* instances with the same position already approved.
    async fn approved_with_position(&mut self, position: &str, except: i32)
        -> anyhow::Result<i64>;
    /// Overwrite approval and reason on the target instance.
    async fn set_approval(&mut self, id: i32, approval: &Approval) -> anyhow::Result<()>;
}

/// An instance may only be approved while strictly more than this many
/// same-position workers remain available (not already tied up by an
/// approved instance).
pub const MIN_AVAILABLE: i64 = 2;

pub fn available_workers(position_users: i64, other_approved: i64) -> i64 {
    position_users - other_approved
}

/// Accept operation: quorum-gated transition of a pending instance.
/// Clears the reason on success; leaves the store untouched on failure.
pub async fn accept(
    store: &mut dyn InstanceStore,
    instance_id: i32,
    requested: Approval,
) -> Result<(), ApiError> {
    let instance = store
        .instance_for_update(instance_id)
        .await?
        .ok_or(ApiError::NotFound("instance"))?;

    let position_users = store.users_with_position(&instance.position).await?;
    let other_approved = store
        .approved_with_position(&instance.position, instance.id)
        .await?;

    if available_workers(position_users, other_approved) <= MIN_AVAILABLE {
        return Err(ApiError::QuorumNotMet {
            position: instance.position,
        });
    }

    store.set_approval(instance_id, &requested).await?;
    Ok(())
}

/// Disapprove operation: unconditional overwrite of approval and reason.
/// No quorum gate and no terminal-state check, so an already-approved
/// instance can be pushed back to rejected.
pub async fn disapprove(
    store: &mut dyn InstanceStore,
    instance_id: i32,
    requested: Approval,
) -> Result<(), ApiError> {
    store
        .instance_for_update(instance_id)
        .await?
        .ok_or(ApiError::NotFound("instance"))?;

    store.set_approval(instance_id, &requested).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn instance(id: i32, user_id: i32, position: &str, approval: Approval) -> Instance {
        let (a, r) = approval.columns();
        Instance {
            id,
            user_id,
            content: "shift".into(),
            instance_start: OffsetDateTime::UNIX_EPOCH,
            instance_end: OffsetDateTime::UNIX_EPOCH,
            type_of_instance: "day".into(),
            username: format!("user{user_id}"),
            surname: "test".into(),
            position: position.into(),
            approval: a.to_string(),
            reason: r.to_string(),
        }
    }

    /// In-memory store: a position -> user-count map plus a table of
    /// instances. Mirrors what the Pg implementation reads and writes.
    struct FakeStore {
        users_by_position: Vec<(String, i64)>,
        instances: Vec<Instance>,
    }

    #[async_trait]
    impl InstanceStore for FakeStore {
        async fn instance_for_update(&mut self, id: i32) -> anyhow::Result<Option<Instance>> {
            Ok(self.instances.iter().find(|i| i.id == id).cloned())
        }

        async fn users_with_position(&mut self, position: &str) -> anyhow::Result<i64> {
            Ok(self
                .users_by_position
                .iter()
                .find(|(p, _)| p == position)
                .map(|(_, n)| *n)
                .unwrap_or(0))
        }

        async fn approved_with_position(
            &mut self,
            position: &str,
            except: i32,
        ) -> anyhow::Result<i64> {
            Ok(self
                .instances
                .iter()
                .filter(|i| i.id != except && i.position == position && i.approval().is_approved())
                .count() as i64)
        }

        async fn set_approval(&mut self, id: i32, approval: &Approval) -> anyhow::Result<()> {
            let (a, r) = approval.columns();
            let row = self
                .instances
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| anyhow::anyhow!("no such instance"))?;
            row.approval = a.to_string();
            row.reason = r.to_string();
            Ok(())
        }
    }

    /// 5 nurses, 2 other approved nurse instances: 5 - 2 = 3 > 2.
    fn nurse_store(other_approved: usize) -> FakeStore {
        let mut instances = vec![instance(1, 1, "Nurse", Approval::Pending)];
        for n in 0..other_approved {
            instances.push(instance(10 + n as i32, 2 + n as i32, "Nurse", Approval::Approved));
        }
        FakeStore {
            users_by_position: vec![("Nurse".into(), 5)],
            instances,
        }
    }

    #[tokio::test]
    async fn accept_passes_when_three_nurses_remain_available() {
        let mut store = nurse_store(2);
        accept(&mut store, 1, Approval::Approved)
            .await
            .expect("quorum of 3 should pass");
        assert_eq!(store.instances[0].approval(), Approval::Approved);
        assert_eq!(store.instances[0].reason, "");
    }

    #[tokio::test]
    async fn accept_rejected_when_only_two_nurses_remain() {
        let mut store = nurse_store(3);
        let err = accept(&mut store, 1, Approval::Approved).await.unwrap_err();
        assert!(matches!(err, ApiError::QuorumNotMet { ref position } if position == "Nurse"));
        // store untouched
        assert_eq!(store.instances[0].approval, "false");
        assert_eq!(store.instances[0].reason, "");
    }

    /// Two pending instances share a position. Same-position accepts
    /// hold a lock across count-and-write, so the second accept counts
    /// only after the first has committed; it must then see one more
    /// approved instance and fail the quorum.
    #[tokio::test]
    async fn second_same_position_accept_recounts_after_first_commits() {
        let mut store = nurse_store(2);
        store.instances.push(instance(2, 9, "Nurse", Approval::Pending));

        accept(&mut store, 1, Approval::Approved)
            .await
            .expect("first accept sees 5 - 2 = 3 available");

        let err = accept(&mut store, 2, Approval::Approved).await.unwrap_err();
        assert!(matches!(err, ApiError::QuorumNotMet { ref position } if position == "Nurse"));
        let second = store.instances.iter().find(|i| i.id == 2).unwrap();
        assert_eq!(second.approval(), Approval::Pending);
    }

    #[tokio::test]
    async fn accept_missing_instance_is_not_found() {
        let mut store = nurse_store(0);
        let err = accept(&mut store, 999, Approval::Approved).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("instance")));
    }

    #[tokio::test]
    async fn accept_clears_a_previous_reason() {
        let mut store = nurse_store(0);
        store.instances[0].approval = "rejected".into();
        store.instances[0].reason = "overlap with another shift".into();
        accept(&mut store, 1, Approval::Approved).await.expect("quorum passes");
        assert_eq!(store.instances[0].approval, "true");
        assert_eq!(store.instances[0].reason, "");
    }

    #[tokio::test]
    async fn disapprove_overwrites_regardless_of_prior_state() {
        let mut store = nurse_store(0);
        store.instances[0].approval = "true".into();
        disapprove(
            &mut store,
            1,
            Approval::Rejected {
                reason: "shift overlaps".into(),
            },
        )
        .await
        .expect("disapprove has no gate");
        assert_eq!(store.instances[0].approval, "rejected");
        assert_eq!(store.instances[0].reason, "shift overlaps");
    }

    #[tokio::test]
    async fn disapprove_missing_instance_is_not_found() {
        let mut store = nurse_store(0);
        let err = disapprove(
            &mut store,
            42,
            Approval::Rejected {
                reason: "n/a".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("instance")));
    }

    #[test]
    fn approval_column_mapping_is_total() {
        assert_eq!(Approval::from_columns("false", ""), Approval::Pending);
        assert_eq!(Approval::from_columns("true", ""), Approval::Approved);
        assert_eq!(
            Approval::from_columns("rejected", "late"),
            Approval::Rejected {
                reason: "late".into()
            }
        );
        // reason-bearing "false" and free-form values both decode to Rejected
        assert_eq!(
            Approval::from_columns("false", "late"),
            Approval::Rejected {
                reason: "late".into()
            }
        );
        assert_eq!(
            Approval::from_columns("maybe", ""),
            Approval::Rejected {
                reason: "maybe".into()
            }
        );
    }

    #[test]
    fn from_marker_accepts_only_legacy_markers() {
        assert_eq!(Approval::from_marker("true"), Some(Approval::Approved));
        assert_eq!(Approval::from_marker("false"), Some(Approval::Pending));
        assert_eq!(Approval::from_marker(""), None);
        assert_eq!(Approval::from_marker("maybe"), None);
        assert_eq!(Approval::from_marker("TRUE"), None);
    }

    #[test]
    fn approval_encodes_to_legacy_columns() {
        assert_eq!(Approval::Pending.columns(), ("false", ""));
        assert_eq!(Approval::Approved.columns(), ("true", ""));
        assert_eq!(
            Approval::Rejected {
                reason: "late".into()
            }
            .columns(),
            ("rejected", "late")
        );
    }

    #[test]
    fn available_workers_is_users_minus_other_approved() {
        assert_eq!(available_workers(5, 2), 3);
        assert_eq!(available_workers(5, 3), 2);
        assert_eq!(available_workers(0, 0), 0);
    }
}
