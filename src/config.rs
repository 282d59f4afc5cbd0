//! サービス設定
//!
//! 環境変数から読み込み、未設定の項目は既定値を使う。

use std::collections::HashMap;
use std::time::Duration;

use crate::domain::lending::ReturnPolicy;

/// `JWT_SECRET`未設定時の既定値（開発用）
pub const DEV_JWT_SECRET: &str = "secretKey";

/// 貸出サービスの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTPの待ち受けポート
    pub port: u16,

    /// PostgreSQL接続文字列。未設定ならインメモリストアを使う
    pub database_url: Option<String>,

    /// コネクションプールの最大接続数
    pub database_max_connections: u32,

    /// アクセストークンのHMAC秘密鍵
    pub jwt_secret: String,

    /// アクセストークンの有効期間（秒）
    pub token_ttl_secs: i64,

    /// ストア呼び出し1回あたりの上限時間
    pub store_timeout: Duration,

    /// 楽観的排他制御の最大試行回数
    pub max_commit_attempts: u32,

    /// 貸出中でない書籍の返却の扱い
    pub return_policy: ReturnPolicy,
}

impl AppConfig {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// 変数のマップから読み込む
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(String::as_str);

        let config = AppConfig {
            port: parse_or(get("PORT"), "PORT", 3000)?,

            database_url: get("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .map(str::to_string),

            database_max_connections: parse_or(
                get("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                5,
            )?,

            jwt_secret: get("JWT_SECRET").unwrap_or(DEV_JWT_SECRET).to_string(),

            // 15日
            token_ttl_secs: parse_or(get("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", 1_296_000)?,

            store_timeout: Duration::from_millis(parse_or(
                get("STORE_TIMEOUT_MS"),
                "STORE_TIMEOUT_MS",
                2000,
            )?),

            max_commit_attempts: parse_or(get("MAX_COMMIT_ATTEMPTS"), "MAX_COMMIT_ATTEMPTS", 5)?,

            return_policy: match get("RETURN_POLICY") {
                None | Some("lenient") => ReturnPolicy::Lenient,
                Some("strict") => ReturnPolicy::Strict,
                Some(_) => return Err(ConfigError::InvalidValue("RETURN_POLICY".to_string())),
            },
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }

        if config.max_commit_attempts == 0 {
            return Err(ConfigError::InvalidValue("MAX_COMMIT_ATTEMPTS".to_string()));
        }

        if config.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("STORE_TIMEOUT_MS".to_string()));
        }

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET is not set; using the development secret");
        }

        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<&str>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// 設定のエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
