use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::logic::attendance::ShiftConfig;

/// Single-row shift settings table (id is always 1); updates overwrite in
/// place, the row is never deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftSettingsRow {
    pub id: u64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub late_threshold_minutes: u32,
    pub early_checkout_threshold_minutes: u32,
    pub amount_per_hour: f64,
}

impl From<ShiftSettingsRow> for ShiftConfig {
    fn from(row: ShiftSettingsRow) -> Self {
        ShiftConfig {
            start_time: row.start_time,
            end_time: row.end_time,
            late_threshold_minutes: row.late_threshold_minutes,
            early_checkout_threshold_minutes: row.early_checkout_threshold_minutes,
            amount_per_hour: row.amount_per_hour,
        }
    }
}

/// Free-text company rules document shown next to the shift settings.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftRulesRow {
    pub id: u64,
    pub content: String,
}
