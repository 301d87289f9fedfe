//! Data models

pub mod audit;
pub mod book;
pub mod borrow;
pub mod notification;
pub mod user;

pub use audit::{AuditAction, AuditLog};
pub use book::Book;
pub use borrow::{BorrowRecord, BorrowRecordDetails};
pub use notification::Notification;
pub use user::{Role, User, UserClaims};
