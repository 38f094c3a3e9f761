use chrono::{Duration, NaiveDateTime, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

/// Day-level attendance status. `Active` marks an open session (no
/// check-out yet) and is never a finalized classification; `Absent` is
/// derived by callers from the non-existence of a record on a working day,
/// never returned by [`classify`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
    Active,
}

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum ClassifyError {
    #[display(fmt = "check-out {} is not after check-in {}", check_out, check_in)]
    InvalidRange {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },
}

impl std::error::Error for ClassifyError {}

/// The single active shift window plus grace thresholds. Overwritten by
/// admins, never deleted; overnight windows (end <= start) are rejected at
/// the settings-update boundary, so end is always after start here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftConfig {
    #[schema(example = "09:00:00", value_type = String, format = "time")]
    pub start_time: NaiveTime,
    #[schema(example = "18:00:00", value_type = String, format = "time")]
    pub end_time: NaiveTime,
    #[schema(example = 15)]
    pub late_threshold_minutes: u32,
    #[schema(example = 60)]
    pub early_checkout_threshold_minutes: u32,
    #[schema(example = 100.0)]
    pub amount_per_hour: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        ShiftConfig {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            late_threshold_minutes: 15,
            early_checkout_threshold_minutes: 60,
            amount_per_hour: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Classification {
    pub worked_minutes: Option<i64>,
    pub status: AttendanceStatus,
}

/// Classify one day's attendance against the shift window.
///
/// An open session (no check-out) stays `Active` with no worked duration.
/// Otherwise the ordered rules apply, first match wins: check-in past
/// `start + late_threshold` is late; else check-out before
/// `end - early_checkout_threshold` is a half-day; else present.
///
/// Pure and stateless; comparisons are wall-clock in whatever single time
/// frame the caller stamps both timestamps with.
pub fn classify(
    check_in: NaiveDateTime,
    check_out: Option<NaiveDateTime>,
    shift: &ShiftConfig,
) -> Result<Classification, ClassifyError> {
    let Some(check_out) = check_out else {
        return Ok(Classification {
            worked_minutes: None,
            status: AttendanceStatus::Active,
        });
    };

    if check_out <= check_in {
        return Err(ClassifyError::InvalidRange {
            check_in,
            check_out,
        });
    }

    let worked_minutes = round_to_minutes(check_out - check_in);

    let grace_end = shift.start_time + Duration::minutes(shift.late_threshold_minutes as i64);
    let half_day_cutoff =
        shift.end_time - Duration::minutes(shift.early_checkout_threshold_minutes as i64);

    let status = if check_in.time() > grace_end {
        AttendanceStatus::Late
    } else if check_out.time() < half_day_cutoff {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Present
    };

    Ok(Classification {
        worked_minutes: Some(worked_minutes),
        status,
    })
}

/// Full shift span in minutes, the baseline for loss-of-pay shortfall.
pub fn required_minutes(shift: &ShiftConfig) -> i64 {
    (shift.end_time - shift.start_time).num_minutes()
}

/// Monetary deduction for the shortfall between required and worked
/// minutes. Derived, never stored; zero for present and open sessions.
pub fn loss_of_pay(
    status: AttendanceStatus,
    worked_minutes: Option<i64>,
    shift: &ShiftConfig,
) -> f64 {
    match status {
        AttendanceStatus::Late | AttendanceStatus::HalfDay | AttendanceStatus::Absent => {
            let shortfall = (required_minutes(shift) - worked_minutes.unwrap_or(0)).max(0);
            shortfall as f64 / 60.0 * shift.amount_per_hour
        }
        AttendanceStatus::Present | AttendanceStatus::Active => 0.0,
    }
}

fn round_to_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn shift() -> ShiftConfig {
        ShiftConfig::default() // 09:00-18:00, 15 min late, 60 min early, 100/hr
    }

    #[test]
    fn within_grace_and_full_day_is_present() {
        let result = classify(at(9, 10), Some(at(17, 30)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Present);
        assert_eq!(result.worked_minutes, Some(500));
    }

    #[test]
    fn check_in_past_grace_is_late() {
        let result = classify(at(9, 30), Some(at(17, 30)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Late);
        assert_eq!(result.worked_minutes, Some(480));
    }

    #[test]
    fn boundary_check_in_at_grace_end_is_not_late() {
        // 09:15 exactly meets the 15-minute threshold
        let result = classify(at(9, 15), Some(at(17, 30)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Present);
    }

    #[test]
    fn early_checkout_is_half_day() {
        let result = classify(at(9, 0), Some(at(16, 0)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::HalfDay);
        assert_eq!(result.worked_minutes, Some(420));
    }

    #[test]
    fn boundary_checkout_at_cutoff_is_not_half_day() {
        // 17:00 exactly meets the 60-minute early-checkout threshold
        let result = classify(at(9, 0), Some(at(17, 0)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Present);
    }

    #[test]
    fn late_wins_over_half_day() {
        // both rules apply; the ordered precedence picks late
        let result = classify(at(10, 0), Some(at(15, 0)), &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Late);
    }

    #[test]
    fn open_session_is_active_with_no_duration() {
        let result = classify(at(9, 5), None, &shift()).unwrap();
        assert_eq!(result.status, AttendanceStatus::Active);
        assert_eq!(result.worked_minutes, None);
    }

    #[test]
    fn checkout_not_after_checkin_is_invalid_range() {
        let err = classify(at(10, 0), Some(at(9, 0)), &shift()).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRange { .. }));

        let err = classify(at(10, 0), Some(at(10, 0)), &shift()).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidRange { .. }));
    }

    #[test]
    fn worked_minutes_round_on_seconds() {
        let check_in = at(9, 0);
        let check_out = at(9, 0) + Duration::seconds(90);
        let result = classify(check_in, Some(check_out), &shift()).unwrap();
        assert_eq!(result.worked_minutes, Some(2));
    }

    #[test]
    fn classify_is_idempotent() {
        let first = classify(at(9, 30), Some(at(17, 30)), &shift()).unwrap();
        let second = classify(at(9, 30), Some(at(17, 30)), &shift()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn loss_of_pay_zero_for_present_and_active() {
        assert_eq!(loss_of_pay(AttendanceStatus::Present, Some(400), &shift()), 0.0);
        assert_eq!(loss_of_pay(AttendanceStatus::Active, None, &shift()), 0.0);
    }

    #[test]
    fn loss_of_pay_charges_shortfall_per_hour() {
        // 540 required, 480 worked -> 1 hour short at 100/hr
        let lop = loss_of_pay(AttendanceStatus::Late, Some(480), &shift());
        assert_eq!(lop, 100.0);

        // absent day: full 9 hours
        let lop = loss_of_pay(AttendanceStatus::Absent, None, &shift());
        assert_eq!(lop, 900.0);
    }

    #[test]
    fn loss_of_pay_never_negative() {
        // overworked late day still owes nothing extra
        let lop = loss_of_pay(AttendanceStatus::Late, Some(600), &shift());
        assert_eq!(lop, 0.0);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half-day");
        assert_eq!(
            AttendanceStatus::from_str("half-day").unwrap(),
            AttendanceStatus::HalfDay
        );
        assert_eq!(AttendanceStatus::Present.to_string(), "present");
        assert_eq!(
            AttendanceStatus::from_str("active").unwrap(),
            AttendanceStatus::Active
        );
    }
}
