mod account_service;
mod errors;

pub use account_service::{login, register};
pub use errors::AccountError;
