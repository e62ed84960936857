use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_type::LeaveTypeRef;
use crate::model::user::UserSummary;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Statuses that block another request over the same days.
    pub const BLOCKING: [LeaveStatus; 2] = [LeaveStatus::Pending, LeaveStatus::Approved];
}

/// The stored request, as the lifecycle checks need it.
#[derive(Debug, Clone)]
pub struct LeaveRequest {
    pub id: u64,
    pub applicant_id: u64,
    pub approver_id: Option<u64>,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub working_days: Option<u32>,
    pub status: LeaveStatus,
    pub approver_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
impl LeaveRequest {
    /// Inclusive range intersection.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub applicant_id: u64,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub working_days: u32,
}

/// A manager's decision on a pending request.
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: LeaveStatus,
    pub approver_id: u64,
    pub comment: Option<String>,
}

/// Leave request as returned to API callers, with its people and type resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "applicant": { "id": 7, "first_name": "Jane", "last_name": "Doe", "email": "jane.doe@company.com" },
    "approver": null,
    "leave_type": { "id": 1, "name": "Annual Leave" },
    "start_date": "2026-03-02",
    "end_date": "2026-03-06",
    "reason": "Family vacation",
    "working_days": 5,
    "status": "PENDING",
    "approver_comment": null,
    "created_at": "2026-02-20T09:30:00Z",
    "updated_at": "2026-02-20T09:30:00Z"
}))]
pub struct LeaveRequestView {
    pub id: u64,
    pub applicant: UserSummary,
    pub approver: Option<UserSummary>,
    pub leave_type: LeaveTypeRef,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    pub working_days: Option<u32>,
    pub status: LeaveStatus,
    pub approver_comment: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn request(start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        let now = Utc::now();
        LeaveRequest {
            id: 1,
            applicant_id: 1,
            approver_id: None,
            leave_type_id: 1,
            start_date: start,
            end_date: end,
            reason: "trip".into(),
            working_days: Some(1),
            status: LeaveStatus::Pending,
            approver_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn overlap_is_inclusive_at_both_ends() {
        let existing = request(d(2), d(6));
        assert!(existing.overlaps(d(6), d(10)));
        assert!(existing.overlaps(d(1), d(2)));
        assert!(existing.overlaps(d(3), d(4)));
        assert!(!existing.overlaps(d(7), d(9)));
        assert!(!existing.overlaps(d(1), d(1)));
    }

    #[test]
    fn status_round_trips_through_its_column_spelling() {
        assert_eq!(LeaveStatus::Approved.as_ref(), "APPROVED");
        assert_eq!(LeaveStatus::from_str("REJECTED").unwrap(), LeaveStatus::Rejected);
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Pending).unwrap(),
            "\"PENDING\""
        );
    }
}
