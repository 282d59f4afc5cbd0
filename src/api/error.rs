use crate::application::{accounts::AccountError, catalog::CatalogError, lending::LendingError};
use crate::ports::StoreError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    /// `Authorization`ヘッダーがない
    MissingCredential,
    /// トークンの署名不正・期限切れ・形式不正
    InvalidCredential,
    /// JSONボディを読み取れない（Content-Type不正・構文エラー・型不一致）
    MalformedBody(String),
    Lending(LendingError),
    Catalog(CatalogError),
    Account(AccountError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError::Lending(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::Account(err)
    }
}

/// ストア障害は詳細をログに記録し、クライアントには一般的なメッセージのみを返す
fn store_failure(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg.clone()),
        StoreError::Conflict => (
            StatusCode::CONFLICT,
            "CONFLICT",
            "Concurrent update conflict, please retry".to_string(),
        ),
        StoreError::Unavailable(e) => {
            tracing::error!(error = %e, "store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Store unavailable, please retry".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 再試行可能な失敗（409/503）にはRetry-Afterを付ける
        let retry_after = matches!(&self, ApiError::Lending(err) if err.is_retryable());

        let (status, code, message) = match self {
            // 401 Unauthorized - 認証情報がない
            ApiError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIAL",
                "Access denied. No token provided.".to_string(),
            ),
            ApiError::InvalidCredential => (
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIAL",
                "Invalid token".to_string(),
            ),
            ApiError::MalformedBody(detail) => (StatusCode::BAD_REQUEST, "INVALID_BODY", detail),

            ApiError::Lending(err) => {
                let status = match &err {
                    // 403 Forbidden - 役割が違う
                    LendingError::PermissionDenied => StatusCode::FORBIDDEN,
                    // 409 Conflict - 再試行を使い切った
                    LendingError::Conflict => StatusCode::CONFLICT,
                    // 503 Service Unavailable - ストア障害・タイムアウト
                    LendingError::StoreUnavailable(e) => {
                        tracing::error!(error = %e, "lending store unavailable");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    // 400 Bad Request - 書籍ID・在庫・上限などビジネスルール違反
                    LendingError::NotFound { .. }
                    | LendingError::InvalidArgument(_)
                    | LendingError::Unavailable
                    | LendingError::LimitExceeded
                    | LendingError::NotBorrowed => StatusCode::BAD_REQUEST,
                };
                (status, err.code(), err.to_string())
            }

            ApiError::Catalog(err) => match err {
                CatalogError::PermissionDenied => {
                    (StatusCode::FORBIDDEN, "PERMISSION_DENIED", err.to_string())
                }
                CatalogError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg),
                CatalogError::AuthorNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                CatalogError::Conflict => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
                CatalogError::Store(ref e) => store_failure(e),
            },

            ApiError::Account(err) => match err {
                AccountError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg),
                AccountError::EmailTaken => (StatusCode::BAD_REQUEST, "EMAIL_TAKEN", err.to_string()),
                AccountError::EmailNotFound => {
                    (StatusCode::BAD_REQUEST, "EMAIL_NOT_FOUND", err.to_string())
                }
                AccountError::InvalidPassword => {
                    (StatusCode::BAD_REQUEST, "INVALID_PASSWORD", err.to_string())
                }
                AccountError::Credential(ref msg) => {
                    tracing::error!(error = %msg, "credential processing failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error".to_string(),
                    )
                }
                AccountError::Store(ref e) => store_failure(e),
            },
        };

        let body = Json(ErrorResponse::new(code, message));
        let mut response = (status, body).into_response();
        if retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
