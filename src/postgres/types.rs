use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::test_decoding::Message;

/// One row of `pg_logical_slot_get_changes`, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    /// Position of the change in the WAL, in PostgreSQL's `X/Y` notation.
    pub lsn: String,
    pub xid: u32,
    pub data: String,
}

/// A decoded change forwarded downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub lsn: String,
    pub xid: u32,
    /// Wall-clock time the record was decoded, in milliseconds.
    pub ts_ms: i64,
    pub message: Message,
}

impl ChangeRecord {
    pub fn new(raw: &RawChange, message: Message) -> Self {
        Self {
            lsn: raw.lsn.clone(),
            xid: raw.xid,
            ts_ms: Utc::now().timestamp_millis(),
            message,
        }
    }
}
