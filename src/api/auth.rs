use crate::auth::Caller;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use super::{error::ApiError, handlers::AppState};

/// 認証済みの呼び出し元
///
/// `Authorization`ヘッダーのトークン（`Bearer `接頭辞は任意）を検証して得られる。
/// ヘッダーがなければ`MissingCredential`（401）、検証失敗は`InvalidCredential`（400）。
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller(pub Caller);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::MissingCredential)?;

        let raw = header
            .to_str()
            .map_err(|_| ApiError::InvalidCredential)?
            .trim();
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        if token.is_empty() {
            return Err(ApiError::MissingCredential);
        }

        let caller = state.token_issuer.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            ApiError::InvalidCredential
        })?;

        Ok(AuthenticatedCaller(caller))
    }
}
