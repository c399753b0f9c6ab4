// src/domain/mod.rs
pub mod comment;
pub mod document;
pub mod error;
pub mod note;
pub mod query;
pub mod route;
pub mod todo;
pub mod user;

pub use comment::{Comment, NewComment};
pub use document::{Collection, Document};
pub use error::{BackendError, DomainError, ValidationErrors};
pub use note::{NewNote, Note, NoteKind};
pub use query::Query;
pub use route::Route;
pub use todo::{NewTodo, Priority, Todo, TodoFilter};
pub use user::User;
