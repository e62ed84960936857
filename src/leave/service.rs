use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::leave::store::LeaveStore;
use crate::model::leave_balance::BalanceSummary;
use crate::model::leave_request::{Decision, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::leave_type::LeaveType;
use crate::utils::date_input::date_or_timestamp;
use crate::utils::working_days::count_working_days;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    /// `YYYY-MM-DD` or an ISO-8601 timestamp; only the calendar date is kept.
    #[serde(deserialize_with = "date_or_timestamp")]
    #[schema(example = "2026-03-02", value_type = String)]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "date_or_timestamp")]
    #[schema(example = "2026-03-06", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
}

fn validate(dto: &CreateLeave) -> ApiResult<()> {
    if dto.start_date > dto.end_date {
        return Err(ApiError::bad_request(
            "Start date must be before or equal to end date",
        ));
    }
    if dto.reason.trim().is_empty() {
        return Err(ApiError::bad_request("Reason is required"));
    }
    Ok(())
}

/// Blank comments are stored as no comment.
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Leave request lifecycle: submission, review and cancellation.
#[derive(Clone)]
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
}

impl LeaveService {
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        Self { store }
    }

    /// Business days in `start..=end`, skipping weekends and stored holidays.
    pub async fn working_days(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<u32> {
        let holidays: HashSet<NaiveDate> = self
            .store
            .holidays_between(start, end)
            .await?
            .into_iter()
            .collect();

        Ok(count_working_days(start, end, &holidays))
    }

    pub async fn has_overlap(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> ApiResult<bool> {
        Ok(self.store.has_overlap(user_id, start, end, exclude_id).await?)
    }

    pub async fn create(&self, user_id: u64, dto: CreateLeave) -> ApiResult<LeaveRequestView> {
        validate(&dto)?;

        if !self.store.leave_type_exists(dto.leave_type_id).await? {
            return Err(ApiError::bad_request("Unknown leave type"));
        }

        if self
            .has_overlap(user_id, dto.start_date, dto.end_date, None)
            .await?
        {
            debug!(user_id, start = %dto.start_date, end = %dto.end_date, "Overlapping leave rejected");
            return Err(ApiError::bad_request(
                "You have an overlapping leave request for this period",
            ));
        }

        let working_days = self.working_days(dto.start_date, dto.end_date).await?;
        if working_days == 0 {
            return Err(ApiError::bad_request(
                "Leave request must include at least one working day",
            ));
        }

        let id = self
            .store
            .insert(NewLeaveRequest {
                applicant_id: user_id,
                leave_type_id: dto.leave_type_id,
                start_date: dto.start_date,
                end_date: dto.end_date,
                reason: dto.reason.trim().to_string(),
                working_days,
            })
            .await?;

        info!(leave_id = id, user_id, working_days, "Leave request submitted");

        self.load_view(id).await
    }

    pub async fn approve(
        &self,
        id: u64,
        manager_id: u64,
        comment: Option<String>,
    ) -> ApiResult<LeaveRequestView> {
        self.decide(id, manager_id, LeaveStatus::Approved, comment)
            .await
    }

    pub async fn reject(
        &self,
        id: u64,
        manager_id: u64,
        comment: Option<String>,
    ) -> ApiResult<LeaveRequestView> {
        self.decide(id, manager_id, LeaveStatus::Rejected, comment)
            .await
    }

    async fn decide(
        &self,
        id: u64,
        manager_id: u64,
        status: LeaveStatus,
        comment: Option<String>,
    ) -> ApiResult<LeaveRequestView> {
        let request = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

        if request.status != LeaveStatus::Pending {
            return Err(ApiError::bad_request("Leave request is not pending"));
        }

        let applicant_manager = self.store.manager_of(request.applicant_id).await?;
        if applicant_manager != Some(manager_id) {
            debug!(leave_id = id, manager_id, "Reviewer is not the applicant's manager");
            return Err(ApiError::forbidden(
                "You are not authorized to review this leave request",
            ));
        }

        let decision = Decision {
            status,
            approver_id: manager_id,
            comment: normalize_comment(comment),
        };
        if !self.store.decide(id, decision).await? {
            // Someone else decided or cancelled it since we looked.
            return Err(ApiError::bad_request("Leave request is not pending"));
        }

        info!(leave_id = id, manager_id, status = %status, "Leave request reviewed");

        self.load_view(id).await
    }

    pub async fn cancel(&self, id: u64, user_id: u64) -> ApiResult<()> {
        let request = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

        if request.applicant_id != user_id {
            return Err(ApiError::forbidden(
                "You can only cancel your own leave requests",
            ));
        }

        if request.status != LeaveStatus::Pending {
            return Err(ApiError::bad_request(
                "You can only cancel pending leave requests",
            ));
        }

        if !self.store.delete_pending(id).await? {
            return Err(ApiError::bad_request(
                "You can only cancel pending leave requests",
            ));
        }

        info!(leave_id = id, user_id, "Leave request cancelled");
        Ok(())
    }

    pub async fn list_mine(
        &self,
        user_id: u64,
        status: Option<LeaveStatus>,
    ) -> ApiResult<Vec<LeaveRequestView>> {
        Ok(self.store.list_for_applicant(user_id, status).await?)
    }

    pub async fn list_pending_for_manager(
        &self,
        manager_id: u64,
    ) -> ApiResult<Vec<LeaveRequestView>> {
        Ok(self.store.list_pending_for_manager(manager_id).await?)
    }

    pub async fn leave_types(&self) -> ApiResult<Vec<LeaveType>> {
        Ok(self.store.leave_types().await?)
    }

    /// Balances for `year`, defaulting to the current year.
    pub async fn balance(&self, user_id: u64, year: Option<i32>) -> ApiResult<Vec<BalanceSummary>> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let balances = self.store.balances(user_id, year).await?;
        Ok(balances.into_iter().map(BalanceSummary::from).collect())
    }

    async fn load_view(&self, id: u64) -> ApiResult<LeaveRequestView> {
        self.store
            .view(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Leave request not found"))
    }
}
