use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiResult;
use crate::leave::service::{CreateLeave, LeaveService};
use crate::model::leave_balance::BalanceSummary;
use crate::model::leave_request::{LeaveRequestView, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::model::role::Capability;

#[derive(Deserialize, IntoParams)]
pub struct MyRequestsQuery {
    /// Only return requests in this status
    #[param(example = "PENDING")]
    pub status: Option<LeaveStatus>,
}

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Defaults to the current year
    #[param(example = 2026)]
    pub year: Option<i32>,
}

/// Review body. Send `{}` for no comment.
#[derive(Deserialize, ToSchema)]
pub struct ReviewLeave {
    #[serde(default)]
    #[schema(example = "Approved for this period")]
    pub comment: Option<String>,
}

/* =========================
Submit a leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave/request",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequestView),
        (status = 400, description = "Invalid dates, overlapping request or no working days", body = Object, example = json!({
            "error": "You have an overlapping leave request for this period"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> ApiResult<HttpResponse> {
    auth.require(Capability::RequestLeave)?;

    let view: LeaveRequestView = service.create(auth.user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(view))
}

#[utoipa::path(
    get,
    path = "/api/leave/my-requests",
    params(MyRequestsQuery),
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequestView]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    query: web::Query<MyRequestsQuery>,
) -> ApiResult<HttpResponse> {
    let requests = service.list_mine(auth.user_id, query.status).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Pending requests of the caller's direct reports (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/leave/pending-approvals",
    responses(
        (status = 200, description = "Pending requests, oldest first", body = [LeaveRequestView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_approvals(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> ApiResult<HttpResponse> {
    auth.require(Capability::ReviewLeave)?;

    let requests = service.list_pending_for_manager(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/* =========================
Approve / reject (Manager/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = ReviewLeave, description = "Optional reviewer comment"),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequestView),
        (status = 400, description = "Leave request is not pending", body = Object, example = json!({
            "error": "Leave request is not pending"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the applicant's manager"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<ReviewLeave>,
) -> ApiResult<HttpResponse> {
    auth.require(Capability::ReviewLeave)?;

    let comment = payload.into_inner().comment;
    let view: LeaveRequestView = service.approve(path.into_inner(), auth.user_id, comment).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = ReviewLeave, description = "Optional rejection reason"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequestView),
        (status = 400, description = "Leave request is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the applicant's manager"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<ReviewLeave>,
) -> ApiResult<HttpResponse> {
    auth.require(Capability::ReviewLeave)?;

    let comment = payload.into_inner().comment;
    let view: LeaveRequestView = service.reject(path.into_inner(), auth.user_id, comment).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Cancel one of your own pending requests
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave request cancelled", body = Object, example = json!({
            "message": "Leave request cancelled successfully"
        })),
        (status = 400, description = "Leave request is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the applicant"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    service.cancel(path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request cancelled successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/leave/types",
    responses(
        (status = 200, description = "All leave types, by name", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_types(
    _auth: AuthUser,
    service: web::Data<LeaveService>,
) -> ApiResult<HttpResponse> {
    let types: Vec<LeaveType> = service.leave_types().await?;
    Ok(HttpResponse::Ok().json(types))
}

#[utoipa::path(
    get,
    path = "/api/leave/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Caller's balance per leave type", body = [BalanceSummary]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    query: web::Query<BalanceQuery>,
) -> ApiResult<HttpResponse> {
    let balances: Vec<BalanceSummary> = service.balance(auth.user_id, query.year).await?;
    Ok(HttpResponse::Ok().json(balances))
}

/// Registers `/leave` routes. Static segments go before `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            .service(web::resource("/request").route(web::post().to(create_leave)))
            .service(web::resource("/my-requests").route(web::get().to(my_requests)))
            .service(web::resource("/pending-approvals").route(web::get().to(pending_approvals)))
            .service(web::resource("/types").route(web::get().to(leave_types)))
            .service(web::resource("/balance").route(web::get().to(leave_balance)))
            .service(web::resource("/{id}").route(web::delete().to(cancel_leave)))
            .service(web::resource("/{id}/approve").route(web::put().to(approve_leave)))
            .service(web::resource("/{id}/reject").route(web::put().to(reject_leave))),
    );
}
