use crate::config::AppConfig;
use crate::domain::lending::ReturnPolicy;
use crate::ports::*;
use std::sync::Arc;
use std::time::Duration;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各ユースケース関数に明示的に渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub identity_store: Arc<dyn IdentityStore>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub ledger: Arc<dyn LibraryLedger>,
    pub settings: LendingSettings,
}

/// 貸出処理の実行パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingSettings {
    /// ストア呼び出し1回あたりの上限時間
    pub store_timeout: Duration,
    /// 楽観的排他制御の最大試行回数
    pub max_commit_attempts: u32,
    pub return_policy: ReturnPolicy,
}

impl Default for LendingSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(2),
            max_commit_attempts: 5,
            return_policy: ReturnPolicy::Lenient,
        }
    }
}

impl From<&AppConfig> for LendingSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            store_timeout: config.store_timeout,
            max_commit_attempts: config.max_commit_attempts,
            return_policy: config.return_policy,
        }
    }
}
