use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header, web::Data};
use futures::future::{Ready, ready};

use crate::{
    auth::jwt::verify_token,
    config::Config,
    error::AppError,
    models::TokenType,
};

/// Identity of the caller, resolved from the bearer access token for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
}

/// Extracts the token from an `Authorization: Bearer ...` header value.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
    let value = header_value
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;
    value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must start with Bearer".to_string())
    })
}

/// Validates an access token. Refresh tokens are refused here.
pub fn authenticate(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let claims = verify_token(token, secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized("Access token required".to_string()));
    }

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::Internal("Config missing".to_string()))),
        };

        let header_value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        ready(bearer_token(header_value).and_then(|token| authenticate(token, &config.jwt_secret)))
    }
}
