use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        auth::bearer_token,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    models::{LoginReqDto, TokenPair, TokenType, UserReq},
    store::{token, user},
};

const INVALID_CREDENTIALS: &str = "Wrong username or password";

/// Issues an access/refresh pair and records the refresh token.
async fn issue_tokens(
    pool: &MySqlPool,
    config: &Config,
    user_id: u64,
    username: &str,
) -> Result<TokenPair, AppError> {
    let access_token = generate_access_token(
        user_id,
        username.to_string(),
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        username.to_string(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    )?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");
    token::insert_refresh_token(pool, user_id, &refresh_claims.jti, refresh_claims.exp).await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn refresh_token_from(req: &HttpRequest, secret: &str) -> Result<crate::models::Claims, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let token = bearer_token(header_value)?;

    let claims = verify_token(token, secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Refresh token required".to_string()));
    }
    Ok(claims)
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = UserReq,
    responses(
        (status = 201, description = "User created", body = Object, example = json!({
            "message": "User created"
        })),
        (status = 400, description = "Empty username or password"),
        (status = 409, description = "Username already exists")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(pool, payload), fields(username = %payload.username))]
pub async fn register(
    payload: web::Json<UserReq>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let username = payload.username.trim();

    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    if user::find_user_by_username(pool.get_ref(), username).await?.is_some() {
        info!("Registration rejected: username taken");
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let hashed = hash_password(&payload.password)?;
    // the unique index still catches a concurrent registration of the same name
    let user_id = user::insert_user(pool.get_ref(), username, &hashed).await?;

    info!(user_id, "User registered");
    Ok(HttpResponse::Created().json(json!({
        "message": "User created"
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Empty username or password"),
        (status = 401, description = "Wrong username or password")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, payload), fields(username = %payload.username))]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    let db_user = match user::find_user_by_username(pool.get_ref(), payload.username.trim()).await? {
        Some(u) => u,
        None => {
            info!("Invalid credentials: user not found");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if let Err(e) = verify_password(&payload.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = issue_tokens(pool.get_ref(), &config, db_user.id, &db_user.username).await?;
    user::touch_last_login(pool.get_ref(), db_user.id).await;

    info!(user_id = db_user.id, "Login successful");
    Ok(HttpResponse::Ok().json(tokens))
}

/// Rotates a refresh token: the presented one is revoked and a new pair issued.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
#[instrument(name = "auth_refresh", skip_all)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let claims = refresh_token_from(&req, &config.jwt_secret)?;

    if !token::revoke_refresh_token(pool.get_ref(), &claims.jti).await? {
        info!(user_id = claims.user_id, "Refresh rejected: token unknown or revoked");
        return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
    }

    let tokens = issue_tokens(pool.get_ref(), &config, claims.user_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Revokes the presented refresh token. Always 204, even for unknown tokens.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Logged out")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
#[instrument(name = "auth_logout", skip_all)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let claims = match refresh_token_from(&req, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return Ok(HttpResponse::NoContent().finish()),
    };

    let revoked = token::revoke_refresh_token(pool.get_ref(), &claims.jti).await?;
    info!(user_id = claims.user_id, revoked, "Logged out");

    Ok(HttpResponse::NoContent().finish())
}
