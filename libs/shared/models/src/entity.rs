use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ModelError;

/// Identity, audit timestamps and soft-delete state shared by every stored record.
///
/// Entities embed this struct rather than inheriting it. The `uuid` is the stable,
/// externally visible identity; `id` is the storage key and may be absent until the
/// record has been persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntity {
    pub id: Option<i64>,
    pub uuid: Option<Uuid>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl PersistedEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uuid(uuid: Uuid) -> Self {
        Self {
            uuid: Some(uuid),
            ..Self::default()
        }
    }

    /// Return the uuid, generating a random one first if none is set.
    pub fn ensure_uuid(&mut self) -> Uuid {
        *self.uuid.get_or_insert_with(Uuid::new_v4)
    }

    pub fn mark_changed(&mut self, at: DateTime<Utc>) {
        self.date_changed = Some(at);
    }

    pub fn void(&mut self, reason: &str, at: DateTime<Utc>) -> Result<(), ModelError> {
        if self.voided {
            return Err(ModelError::AlreadyVoided);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModelError::VoidReasonRequired);
        }

        debug!("Voiding record {:?}: {}", self.uuid, reason);
        self.voided = true;
        self.void_reason = Some(reason.to_string());
        self.date_voided = Some(at);
        self.date_changed = Some(at);
        Ok(())
    }

    pub fn unvoid(&mut self, at: DateTime<Utc>) -> Result<(), ModelError> {
        if !self.voided {
            return Err(ModelError::NotVoided);
        }

        debug!("Restoring voided record {:?}", self.uuid);
        self.voided = false;
        self.void_reason = None;
        self.date_voided = None;
        self.date_changed = Some(at);
        Ok(())
    }
}
