use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee-day attendance row. `check_out`, `worked_minutes` and
/// `status` stay NULL while the session is open; check-out finalizes them,
/// and after that the row only changes through an explicit admin
/// correction.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    pub worked_minutes: Option<i64>,
    #[schema(example = "present", nullable = true)]
    pub status: Option<String>,
}
