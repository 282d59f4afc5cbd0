pub mod accounts;
pub mod catalog;
mod dependencies;
pub mod lending;
mod store_call;

pub use dependencies::{LendingSettings, ServiceDependencies};
