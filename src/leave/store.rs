use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

/// Persistence seam for the leave lifecycle.
#[async_trait]
pub trait LeaveStore: Send + Sync + 'static {
    async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>>;

    /// True if the applicant has a pending or approved request intersecting `start..=end`.
    async fn has_overlap(
        &self,
        applicant_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool>;

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool>;

    /// Inserts a pending request and returns its id.
    async fn insert(&self, request: NewLeaveRequest) -> Result<u64>;

    async fn find(&self, id: u64) -> Result<Option<LeaveRequest>>;

    async fn manager_of(&self, user_id: u64) -> Result<Option<u64>>;

    /// Applies the decision only while the request is still pending.
    /// Returns false if nothing was updated.
    async fn decide(&self, id: u64, decision: Decision) -> Result<bool>;

    /// Deletes the request only while it is still pending.
    async fn delete_pending(&self, id: u64) -> Result<bool>;

    async fn view(&self, id: u64) -> Result<Option<LeaveRequestView>>;

    /// Newest first.
    async fn list_for_applicant(
        &self,
        applicant_id: u64,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequestView>>;

    /// Pending requests of the manager's direct reports, oldest first.
    async fn list_pending_for_manager(&self, manager_id: u64) -> Result<Vec<LeaveRequestView>>;

    async fn leave_types(&self) -> Result<Vec<LeaveType>>;

    async fn balances(&self, user_id: u64, year: i32) -> Result<Vec<LeaveBalance>>;
}
