pub mod book;
pub mod commands;
pub mod errors;
pub mod events;
pub mod lending;
pub mod user;
pub mod value_objects;

pub use book::Book;
pub use errors::*;
pub use events::*;
pub use user::User;
pub use value_objects::*;
