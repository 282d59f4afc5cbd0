//! アクセス制御：トークンの発行・検証とパスワードのハッシュ化
//!
//! 貸出サービスが受け取るのは検証済みの[`Caller`]のみ。

pub mod password;
pub mod token;

pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Caller, Claims, TokenError, TokenIssuer};
