use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One user's allocation of a leave type for a year, by type name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaveBalance {
    pub leave_type: String,
    pub total_days: i32,
    pub used_days: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BalanceSummary {
    #[schema(example = "Annual Leave")]
    pub leave_type: String,
    #[schema(example = 21)]
    pub total_days: i32,
    #[schema(example = 4)]
    pub used_days: i32,
    #[schema(example = 17)]
    pub available_days: i32,
}

impl From<LeaveBalance> for BalanceSummary {
    fn from(b: LeaveBalance) -> Self {
        Self {
            available_days: b.total_days.saturating_sub(b.used_days),
            leave_type: b.leave_type,
            total_days: b.total_days,
            used_days: b.used_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_days_never_overflow() {
        let summary = BalanceSummary::from(LeaveBalance {
            leave_type: "Annual Leave".to_string(),
            total_days: i32::MIN,
            used_days: 5,
        });
        assert_eq!(summary.available_days, i32::MIN);

        let summary = BalanceSummary::from(LeaveBalance {
            leave_type: "Annual Leave".to_string(),
            total_days: 21,
            used_days: 25,
        });
        assert_eq!(summary.available_days, -4);
    }
}
