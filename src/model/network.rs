use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One allowlisted admin IP. Insertion order (by id) is the order the set
/// is evaluated and displayed in.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdminIpRow {
    pub id: u64,
    pub ip: String,
    pub added_at: NaiveDateTime,
}
