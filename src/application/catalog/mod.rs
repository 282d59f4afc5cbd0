mod catalog_service;
mod errors;

pub use catalog_service::{list_books, publish_book};
pub use errors::CatalogError;
