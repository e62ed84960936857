use crate::api::leave::ReviewLeave;
use crate::leave::service::CreateLeave;
use crate::model::leave_balance::BalanceSummary;
use crate::model::leave_request::{LeaveRequestView, LeaveStatus};
use crate::model::leave_type::{LeaveType, LeaveTypeRef};
use crate::model::role::Role;
use crate::model::user::UserSummary;
use crate::models::{LoginReqDto, LoginResponse, LoginUser, TokenPair};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Portal API",
        version = "1.0.0",
        description = r#"
## Internal HR portal: leave management

- **Leave requests**: submit, list your own, cancel while pending
- **Approvals**: managers approve or reject requests of their direct reports
- **Reference data**: leave types and yearly balances

Working days exclude weekends and company holidays.

### 🔐 Security
Endpoints under `/api` require a **JWT Bearer** access token from `/auth/login`.
Approval endpoints are limited to **Manager** and **Admin** roles.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::create_leave,
        crate::api::leave::my_requests,
        crate::api::leave::pending_approvals,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::cancel_leave,
        crate::api::leave::leave_types,
        crate::api::leave::leave_balance,

        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::health::health
    ),
    components(
        schemas(
            CreateLeave,
            ReviewLeave,
            LeaveRequestView,
            LeaveStatus,
            LeaveType,
            LeaveTypeRef,
            UserSummary,
            BalanceSummary,
            Role,
            LoginReqDto,
            LoginResponse,
            LoginUser,
            TokenPair
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Auth", description = "Login and token rotation"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;
