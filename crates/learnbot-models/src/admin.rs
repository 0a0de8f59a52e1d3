//! Admin roster entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user granted admin rights, with audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    /// The admin's user id (unique key).
    pub user_id: i64,

    /// Who granted the rights.
    pub added_by: i64,

    /// When the rights were granted.
    pub added_at: DateTime<Utc>,
}

impl AdminRecord {
    /// Creates a record stamped with the current time.
    pub fn new(user_id: i64, added_by: i64) -> Self {
        Self {
            user_id,
            added_by,
            added_at: Utc::now(),
        }
    }
}
