//! Bearer-token identity extractor.
//!
//! Handlers that require authentication take an [`Identity`] argument;
//! handlers where identity is optional (e.g. the upload fallback chain)
//! take `Option<Identity>`, which actix resolves to `None` on failure.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use jam_core::AppError;

use crate::error::ApiError;
use crate::handlers::AppState;

/// The authenticated caller, as named by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Identity, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError(AppError::Internal("app state missing".to_string())))?;
            let token = token.ok_or_else(|| {
                ApiError(AppError::Unauthorized("missing bearer token".to_string()))
            })?;
            match state.auth.authenticate(&token).await.map_err(ApiError::from)? {
                Some(user_id) => Ok(Identity { user_id }),
                None => Err(ApiError(AppError::Unauthorized(
                    "invalid bearer token".to_string(),
                ))),
            }
        })
    }
}
