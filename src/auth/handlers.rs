use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::{ApiError, ApiResult},
    model::{
        role::Role,
        user::{User, UserStatus},
    },
    models::{Claims, LoginReqDto, LoginResponse, LoginUser, TokenPair, TokenType},
};

const MIN_PASSWORD_LEN: usize = 6;

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn token_error(e: jsonwebtoken::errors::Error) -> ApiError {
    error!(error = %e, "Failed to sign token");
    ApiError::Internal
}

async fn store_refresh_token(pool: &MySqlPool, claims: &Claims) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(claims.user_id)
    .bind(&claims.jti)
    .bind(claims.exp as i64)
    .execute(pool)
    .await?;

    Ok(())
}

async fn is_active(pool: &MySqlPool, user_id: u64) -> ApiResult<bool> {
    let status = sqlx::query_as::<_, (String,)>("SELECT status FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(matches!(
        status.map(|(s,)| UserStatus::from_str(&s)),
        Some(Ok(UserStatus::Active))
    ))
}

/// Issues an access/refresh pair and persists the refresh token.
async fn issue_pair(
    pool: &MySqlPool,
    config: &Config,
    user_id: u64,
    email: &str,
    role: Role,
) -> ApiResult<TokenPair> {
    let access_token =
        generate_access_token(user_id, email, role, &config.jwt_secret, config.access_token_ttl)
            .map_err(token_error)?;

    let (refresh_token, refresh_claims) =
        generate_refresh_token(user_id, email, role, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(token_error)?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");
    store_refresh_token(pool, &refresh_claims).await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials or account deactivated"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    info!("Login request received");

    let email = user.email.trim().to_lowercase();
    if email.is_empty() || user.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Email and a password of at least 6 characters are required",
        ));
    }

    let db_user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, first_name, last_name, role, status
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| {
        info!("Invalid credentials: user not found");
        ApiError::unauthorized("Invalid credentials")
    })?;

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !matches!(UserStatus::from_str(&db_user.status), Ok(UserStatus::Active)) {
        info!(user_id = db_user.id, "Login refused: account deactivated");
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    let role = Role::from_str(&db_user.role).map_err(|_| {
        error!(user_id = db_user.id, role = %db_user.role, "User has unknown role");
        ApiError::Internal
    })?;

    let pair = issue_pair(pool.get_ref(), &config, db_user.id, &db_user.email, role).await?;

    info!(user_id = db_user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: LoginUser {
            id: db_user.id,
            email: db_user.email,
            first_name: db_user.first_name,
            last_name: db_user.last_name,
            role,
        },
    }))
}

/// Rotate a refresh token (sent as the bearer token)
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid, expired or revoked refresh token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let token = bearer(&req).ok_or_else(|| ApiError::unauthorized("No token"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::unauthorized("Refresh token required"));
    }

    let record = sqlx::query_as::<_, (u64, bool)>(
        r#"
        SELECT id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        AND expires_at > NOW()
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let record_id = match record {
        Some((id, false)) => id,
        _ => return Err(ApiError::unauthorized("Refresh token revoked or unknown")),
    };

    if !is_active(pool.get_ref(), claims.user_id).await? {
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;

    let pair = issue_pair(
        pool.get_ref(),
        &config,
        claims.user_id,
        &claims.sub,
        claims.role,
    )
    .await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// Revoke a refresh token (sent as the bearer token)
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logged out; also returned for unknown tokens")
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let claims = match bearer(&req).map(|t| verify_token(t, &config.jwt_secret)) {
        Some(Ok(c)) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    // idempotent
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
    }

    HttpResponse::NoContent().finish()
}
