pub mod department;
pub mod issue;
pub mod user;

pub use department::{Department, Rating};
pub use issue::{
    Category, Comment, Issue, IssueDraft, Location, ParseEnumError, Priority, Status,
};
pub use user::{Identity, Language, Role, Session, User};
