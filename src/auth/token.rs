//! JWTアクセストークン
//!
//! トークンは利用者IDと役割を持つ。役割は最初の関門としてのみ信頼し、
//! 貸出サービスが利用者ストアの値で再確認する。

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserId};

/// 検証済みトークンから得た呼び出し元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

/// JWTのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 利用者ID
    pub sub: String,

    /// ログイン時点の役割
    pub role: Role,

    /// 発行時刻（Unixタイムスタンプ）
    pub iat: i64,

    /// 有効期限（Unixタイムスタンプ）
    pub exp: i64,
}

/// [`TokenIssuer`]のエラー
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// HS256アクセストークンの発行と検証
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    lifetime_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        TokenIssuer {
            secret,
            lifetime_secs,
        }
    }

    /// 利用者のアクセストークンを発行する
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// トークンを検証し、呼び出し元を返す
    pub fn validate(&self, token: &str) -> Result<Caller, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(Caller {
            user_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn should_round_trip_caller() {
        let issuer = TokenIssuer::new(TEST_SECRET.to_string(), 3600);
        let user_id = UserId::new();

        let token = issuer.issue(user_id, Role::Reader).unwrap();
        let caller = issuer.validate(&token).unwrap();

        assert_eq!(caller.user_id, user_id);
        assert_eq!(caller.role, Role::Reader);
    }

    #[test]
    fn should_reject_expired_token() {
        // 既定の猶予60秒を十分に超える
        let issuer = TokenIssuer::new(TEST_SECRET.to_string(), -3600);
        let token = issuer.issue(UserId::new(), Role::Author).unwrap();

        let err = issuer.validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn should_reject_wrong_secret() {
        let issuer = TokenIssuer::new(TEST_SECRET.to_string(), 3600);
        let token = issuer.issue(UserId::new(), Role::Reader).unwrap();

        let other = TokenIssuer::new("wrong-secret".to_string(), 3600);
        let err = other.validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[test]
    fn should_reject_malformed_token() {
        let issuer = TokenIssuer::new(TEST_SECRET.to_string(), 3600);
        let err = issuer.validate("not-a-jwt").unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[test]
    fn should_reject_non_uuid_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            role: Role::Reader,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let issuer = TokenIssuer::new(TEST_SECRET.to_string(), 3600);
        let err = issuer.validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }
}
