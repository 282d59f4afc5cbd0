use crate::application::ServiceDependencies;
use crate::application::store_call::bounded;
use crate::auth::{TokenIssuer, hash_password, verify_password};
use crate::domain::{UserId, commands::RegisterUser, user};
use crate::ports::StoreError;

use super::errors::AccountError;

/// 利用者を登録する
///
/// パスワードはArgon2でハッシュ化して保存する。
/// 貸出リスト・著作リストは空で作成される。
pub async fn register(
    deps: &ServiceDependencies,
    cmd: RegisterUser,
) -> Result<UserId, AccountError> {
    let name = cmd.name.trim().to_string();
    let email = cmd.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(AccountError::Validation("Name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AccountError::Validation("A valid email is required".to_string()));
    }
    if cmd.password.is_empty() {
        return Err(AccountError::Validation("Password is required".to_string()));
    }

    let timeout = deps.settings.store_timeout;

    let existing = bounded(
        timeout,
        "identity.find_by_email",
        deps.identity_store.find_by_email(&email),
    )
    .await?;
    if existing.is_some() {
        return Err(AccountError::EmailTaken);
    }

    // Argon2は計算コストが高いため、非同期ランタイムのワーカーを塞がない
    let password = cmd.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountError::Credential(e.to_string()))?
        .map_err(|e| AccountError::Credential(e.to_string()))?;

    let new_user = user::register_user(name, email, password_hash, cmd.role, chrono::Utc::now());
    let user_id = new_user.id;

    match bounded(timeout, "identity.insert", deps.identity_store.insert(new_user)).await {
        Ok(()) => {}
        // 照会と登録の間に同じメールアドレスが登録された
        Err(StoreError::Validation(_)) => return Err(AccountError::EmailTaken),
        Err(err) => return Err(err.into()),
    }

    tracing::info!(%user_id, role = cmd.role.as_str(), "user registered");
    Ok(user_id)
}

/// メールアドレスとパスワードで認証し、アクセストークンを発行する
pub async fn login(
    deps: &ServiceDependencies,
    issuer: &TokenIssuer,
    email: &str,
    password: &str,
) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();

    let user = bounded(
        deps.settings.store_timeout,
        "identity.find_by_email",
        deps.identity_store.find_by_email(&email),
    )
    .await?
    .ok_or(AccountError::EmailNotFound)?;

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AccountError::Credential(e.to_string()))?;

    if !verified {
        tracing::debug!(user_id = %user.id, "password mismatch");
        return Err(AccountError::InvalidPassword);
    }

    let token = issuer
        .issue(user.id, user.role)
        .map_err(|e| AccountError::Credential(e.to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(token)
}
