use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::leave::store::LeaveStore;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{
    Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest,
};
use crate::model::leave_type::{LeaveType, LeaveTypeRef};
use crate::model::user::UserSummary;

struct StoredUser {
    summary: UserSummary,
    manager_id: Option<u64>,
}

#[derive(Default)]
struct State {
    users: HashMap<u64, StoredUser>,
    leave_types: BTreeMap<u64, LeaveType>,
    requests: BTreeMap<u64, LeaveRequest>,
    holidays: Vec<NaiveDate>,
    balances: Vec<(u64, i32, LeaveBalance)>,
    next_id: u64,
}

/// In-memory `LeaveStore` for tests. Each insert ticks a fake clock so
/// creation order is deterministic.
#[derive(Default)]
pub struct MemoryLeaveStore {
    state: Mutex<State>,
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
}

impl MemoryLeaveStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| anyhow!("memory store poisoned"))
    }

    pub fn add_user(&self, id: u64, first_name: &str, manager_id: Option<u64>) {
        let mut state = self.state.lock().unwrap();
        state.users.insert(
            id,
            StoredUser {
                summary: UserSummary {
                    id,
                    first_name: first_name.to_string(),
                    last_name: "Tester".to_string(),
                    email: format!("{}@company.test", first_name.to_lowercase()),
                },
                manager_id,
            },
        );
    }

    pub fn add_leave_type(&self, id: u64, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.leave_types.insert(
            id,
            LeaveType {
                id,
                name: name.to_string(),
                created_at: epoch(),
                updated_at: epoch(),
            },
        );
    }

    pub fn add_holiday(&self, date: NaiveDate) {
        self.state.lock().unwrap().holidays.push(date);
    }

    pub fn add_balance(&self, user_id: u64, leave_type_id: u64, year: i32, total: i32, used: i32) {
        let mut state = self.state.lock().unwrap();
        let leave_type = state.leave_types[&leave_type_id].name.clone();
        state.balances.push((
            user_id,
            year,
            LeaveBalance {
                leave_type,
                total_days: total,
                used_days: used,
            },
        ));
    }
}

impl State {
    fn summary(&self, id: u64) -> Result<UserSummary> {
        self.users
            .get(&id)
            .map(|u| u.summary.clone())
            .ok_or_else(|| anyhow!("user {id} missing"))
    }

    fn view_of(&self, request: &LeaveRequest) -> Result<LeaveRequestView> {
        let leave_type = self
            .leave_types
            .get(&request.leave_type_id)
            .ok_or_else(|| anyhow!("leave type {} missing", request.leave_type_id))?;

        Ok(LeaveRequestView {
            id: request.id,
            applicant: self.summary(request.applicant_id)?,
            approver: request.approver_id.map(|id| self.summary(id)).transpose()?,
            leave_type: LeaveTypeRef {
                id: leave_type.id,
                name: leave_type.name.clone(),
            },
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason.clone(),
            working_days: request.working_days,
            status: request.status,
            approver_comment: request.approver_comment.clone(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        let state = self.lock()?;
        Ok(state
            .holidays
            .iter()
            .copied()
            .filter(|d| *d >= start && *d <= end)
            .collect())
    }

    async fn has_overlap(
        &self,
        applicant_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.requests.values().any(|r| {
            r.applicant_id == applicant_id
                && Some(r.id) != exclude_id
                && LeaveStatus::BLOCKING.contains(&r.status)
                && r.overlaps(start, end)
        }))
    }

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool> {
        Ok(self.lock()?.leave_types.contains_key(&leave_type_id))
    }

    async fn insert(&self, request: NewLeaveRequest) -> Result<u64> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = state.next_id;
        let now = epoch() + Duration::seconds(id as i64);

        state.requests.insert(
            id,
            LeaveRequest {
                id,
                applicant_id: request.applicant_id,
                approver_id: None,
                leave_type_id: request.leave_type_id,
                start_date: request.start_date,
                end_date: request.end_date,
                reason: request.reason,
                working_days: Some(request.working_days),
                status: LeaveStatus::Pending,
                approver_comment: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find(&self, id: u64) -> Result<Option<LeaveRequest>> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    async fn manager_of(&self, user_id: u64) -> Result<Option<u64>> {
        Ok(self.lock()?.users.get(&user_id).and_then(|u| u.manager_id))
    }

    async fn decide(&self, id: u64, decision: Decision) -> Result<bool> {
        let mut state = self.lock()?;
        match state.requests.get_mut(&id) {
            Some(r) if r.status == LeaveStatus::Pending => {
                r.status = decision.status;
                r.approver_id = Some(decision.approver_id);
                r.approver_comment = decision.comment;
                r.updated_at += Duration::minutes(1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending(&self, id: u64) -> Result<bool> {
        let mut state = self.lock()?;
        let pending = matches!(state.requests.get(&id), Some(r) if r.status == LeaveStatus::Pending);
        if pending {
            state.requests.remove(&id);
        }
        Ok(pending)
    }

    async fn view(&self, id: u64) -> Result<Option<LeaveRequestView>> {
        let state = self.lock()?;
        state.requests.get(&id).map(|r| state.view_of(r)).transpose()
    }

    async fn list_for_applicant(
        &self,
        applicant_id: u64,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequestView>> {
        let state = self.lock()?;
        let mut matching: Vec<&LeaveRequest> = state
            .requests
            .values()
            .filter(|r| r.applicant_id == applicant_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.into_iter().map(|r| state.view_of(r)).collect()
    }

    async fn list_pending_for_manager(&self, manager_id: u64) -> Result<Vec<LeaveRequestView>> {
        let state = self.lock()?;
        let mut matching: Vec<&LeaveRequest> = state
            .requests
            .values()
            .filter(|r| r.status == LeaveStatus::Pending)
            .filter(|r| {
                state
                    .users
                    .get(&r.applicant_id)
                    .is_some_and(|u| u.manager_id == Some(manager_id))
            })
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        matching.into_iter().map(|r| state.view_of(r)).collect()
    }

    async fn leave_types(&self) -> Result<Vec<LeaveType>> {
        let mut types: Vec<LeaveType> = self.lock()?.leave_types.values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn balances(&self, user_id: u64, year: i32) -> Result<Vec<LeaveBalance>> {
        Ok(self
            .lock()?
            .balances
            .iter()
            .filter(|(owner, y, _)| *owner == user_id && *y == year)
            .map(|(_, _, b)| b.clone())
            .collect())
    }
}
