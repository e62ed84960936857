use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::leave::store::LeaveStore;
use crate::model::holiday::Holiday;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{
    Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest,
};
use crate::model::leave_type::{LeaveType, LeaveTypeRef};
use crate::model::user::UserSummary;

const VIEW_SELECT: &str = r#"
    SELECT
        lr.id, lr.start_date, lr.end_date, lr.reason, lr.working_days, lr.status,
        lr.approver_comment, lr.created_at, lr.updated_at,
        a.id AS applicant_id, a.first_name AS applicant_first_name,
        a.last_name AS applicant_last_name, a.email AS applicant_email,
        lt.id AS leave_type_id, lt.name AS leave_type_name,
        ap.id AS approver_id, ap.first_name AS approver_first_name,
        ap.last_name AS approver_last_name, ap.email AS approver_email
    FROM leave_requests lr
    JOIN users a ON a.id = lr.applicant_id
    JOIN leave_types lt ON lt.id = lr.leave_type_id
    LEFT JOIN users ap ON ap.id = lr.approver_id
"#;

#[derive(FromRow)]
struct LeaveRequestRow {
    id: u64,
    applicant_id: u64,
    approver_id: Option<u64>,
    leave_type_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    working_days: Option<u32>,
    status: String,
    approver_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = anyhow::Error;

    fn try_from(row: LeaveRequestRow) -> Result<Self> {
        Ok(Self {
            status: parse_status(&row.status)?,
            id: row.id,
            applicant_id: row.applicant_id,
            approver_id: row.approver_id,
            leave_type_id: row.leave_type_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            working_days: row.working_days,
            approver_comment: row.approver_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct LeaveViewRow {
    id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    working_days: Option<u32>,
    status: String,
    approver_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    applicant_id: u64,
    applicant_first_name: String,
    applicant_last_name: String,
    applicant_email: String,
    leave_type_id: u64,
    leave_type_name: String,
    approver_id: Option<u64>,
    approver_first_name: Option<String>,
    approver_last_name: Option<String>,
    approver_email: Option<String>,
}

impl TryFrom<LeaveViewRow> for LeaveRequestView {
    type Error = anyhow::Error;

    fn try_from(row: LeaveViewRow) -> Result<Self> {
        let approver = match row.approver_id {
            Some(id) => Some(UserSummary {
                id,
                first_name: row.approver_first_name.unwrap_or_default(),
                last_name: row.approver_last_name.unwrap_or_default(),
                email: row.approver_email.unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Self {
            status: parse_status(&row.status)?,
            id: row.id,
            applicant: UserSummary {
                id: row.applicant_id,
                first_name: row.applicant_first_name,
                last_name: row.applicant_last_name,
                email: row.applicant_email,
            },
            approver,
            leave_type: LeaveTypeRef {
                id: row.leave_type_id,
                name: row.leave_type_name,
            },
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            working_days: row.working_days,
            approver_comment: row.approver_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_status(raw: &str) -> Result<LeaveStatus> {
    LeaveStatus::from_str(raw).with_context(|| format!("unknown leave status {raw:?} in database"))
}

fn into_views(rows: Vec<LeaveViewRow>) -> Result<Vec<LeaveRequestView>> {
    rows.into_iter().map(LeaveRequestView::try_from).collect()
}

/// `LeaveStore` backed by the MySQL schema in `schema.sql`.
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        let holidays = sqlx::query_as::<_, Holiday>(
            "SELECT id, name, date FROM holidays WHERE date BETWEEN ? AND ?",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("loading holidays")?;

        Ok(holidays.into_iter().map(|h| h.date).collect())
    }

    async fn has_overlap(
        &self,
        applicant_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        let [first, second] = LeaveStatus::BLOCKING;

        let mut sql = String::from(
            r#"
            SELECT id FROM leave_requests
            WHERE applicant_id = ?
            AND status IN (?, ?)
            AND start_date <= ?
            AND end_date >= ?
            "#,
        );
        if exclude_id.is_some() {
            sql.push_str(" AND id <> ?");
        }
        sql.push_str(" LIMIT 1");

        let mut query = sqlx::query_as::<_, (u64,)>(&sql)
            .bind(applicant_id)
            .bind(first.as_ref())
            .bind(second.as_ref())
            .bind(end)
            .bind(start);
        if let Some(id) = exclude_id {
            query = query.bind(id);
        }

        let found = query
            .fetch_optional(&self.pool)
            .await
            .context("checking overlapping leave")?;

        Ok(found.is_some())
    }

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool> {
        let found = sqlx::query_as::<_, (u64,)>("SELECT id FROM leave_types WHERE id = ?")
            .bind(leave_type_id)
            .fetch_optional(&self.pool)
            .await
            .context("looking up leave type")?;

        Ok(found.is_some())
    }

    async fn insert(&self, request: NewLeaveRequest) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (applicant_id, leave_type_id, start_date, end_date, reason, working_days, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.applicant_id)
        .bind(request.leave_type_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.working_days)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await
        .context("inserting leave request")?;

        Ok(result.last_insert_id())
    }

    async fn find(&self, id: u64) -> Result<Option<LeaveRequest>> {
        let row = sqlx::query_as::<_, LeaveRequestRow>(
            r#"
            SELECT id, applicant_id, approver_id, leave_type_id, start_date, end_date,
                   reason, working_days, status, approver_comment, created_at, updated_at
            FROM leave_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching leave request")?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn manager_of(&self, user_id: u64) -> Result<Option<u64>> {
        let row = sqlx::query_as::<_, (Option<u64>,)>("SELECT manager_id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("looking up manager")?;

        Ok(row.and_then(|(manager_id,)| manager_id))
    }

    async fn decide(&self, id: u64, decision: Decision) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approver_id = ?, approver_comment = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(decision.status.as_ref())
        .bind(decision.approver_id)
        .bind(decision.comment)
        .bind(id)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await
        .context("updating leave status")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_pending(&self, id: u64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ? AND status = ?")
            .bind(id)
            .bind(LeaveStatus::Pending.as_ref())
            .execute(&self.pool)
            .await
            .context("deleting leave request")?;

        Ok(result.rows_affected() > 0)
    }

    async fn view(&self, id: u64) -> Result<Option<LeaveRequestView>> {
        let sql = format!("{VIEW_SELECT} WHERE lr.id = ?");
        let row = sqlx::query_as::<_, LeaveViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching leave request view")?;

        row.map(LeaveRequestView::try_from).transpose()
    }

    async fn list_for_applicant(
        &self,
        applicant_id: u64,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequestView>> {
        let mut sql = format!("{VIEW_SELECT} WHERE lr.applicant_id = ?");
        if status.is_some() {
            sql.push_str(" AND lr.status = ?");
        }
        sql.push_str(" ORDER BY lr.created_at DESC, lr.id DESC");

        let mut query = sqlx::query_as::<_, LeaveViewRow>(&sql).bind(applicant_id);
        if let Some(status) = &status {
            query = query.bind(status.as_ref());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("listing leave requests")?;

        into_views(rows)
    }

    async fn list_pending_for_manager(&self, manager_id: u64) -> Result<Vec<LeaveRequestView>> {
        let sql = format!(
            "{VIEW_SELECT} WHERE a.manager_id = ? AND lr.status = ? ORDER BY lr.created_at ASC, lr.id ASC"
        );
        let rows = sqlx::query_as::<_, LeaveViewRow>(&sql)
            .bind(manager_id)
            .bind(LeaveStatus::Pending.as_ref())
            .fetch_all(&self.pool)
            .await
            .context("listing pending approvals")?;

        into_views(rows)
    }

    async fn leave_types(&self) -> Result<Vec<LeaveType>> {
        sqlx::query_as::<_, LeaveType>(
            "SELECT id, name, created_at, updated_at FROM leave_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("listing leave types")
    }

    async fn balances(&self, user_id: u64, year: i32) -> Result<Vec<LeaveBalance>> {
        sqlx::query_as::<_, LeaveBalance>(
            r#"
            SELECT lt.name AS leave_type, lb.total_days, lb.used_days
            FROM leave_balances lb
            JOIN leave_types lt ON lt.id = lb.leave_type_id
            WHERE lb.user_id = ?
            AND lb.year = ?
            ORDER BY lt.name ASC
            "#,
        )
        .bind(user_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .context("loading leave balances")
    }
}
