use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web::Data,
};
use tracing::debug;

use crate::{
    auth::auth::{authenticate, bearer_token},
    config::Config,
    error::AppError,
};

/// Rejects requests without a valid access token before any handler runs and
/// stores the resolved `AuthUser` in the request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|h| {
            h.to_str()
                .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))
        })
        .transpose();

    let auth_user = header_value
        .and_then(bearer_token)
        .and_then(|token| authenticate(token, &config.jwt_secret));

    match auth_user {
        Ok(user) => {
            debug!(user_id = user.user_id, username = %user.username, path = %req.path(), "Authenticated request");
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(e) => {
            debug!(error = %e, path = %req.path(), "Rejected unauthenticated request");
            let resp = e.error_response();
            Ok(req.into_response(resp))
        }
    }
}
