//! Data models for the LocalLibrary server

pub mod author;
pub mod book;
pub mod copy;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookShort, Genre, Language};
pub use copy::{BookCopy, CopyDetails, CopyStatus};
pub use user::{AccountType, User, UserClaims};
