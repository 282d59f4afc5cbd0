pub mod catalog_store;
pub mod identity_store;
pub mod library_ledger;
pub mod store_error;

pub use catalog_store::*;
pub use identity_store::*;
pub use library_ledger::*;
pub use store_error::*;
