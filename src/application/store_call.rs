use crate::ports::{Result, StoreError};
use std::future::Future;
use std::time::Duration;

/// ストア呼び出しに上限時間を設ける
///
/// 時間切れは`StoreError::Unavailable`として扱う（呼び出し元で再試行可能な失敗）。
/// 時間切れで破棄されたフューチャーは途中の変更を残さない。
/// 台帳への書き込みは1ステップで完結するため、全て反映されるか何も反映されないかのどちらか。
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(elapsed) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "store call timed out"
            );
            Err(StoreError::Unavailable(Box::new(elapsed)))
        }
    }
}
