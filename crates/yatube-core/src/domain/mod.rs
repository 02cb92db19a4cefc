//! Domain entities - the core business objects.

mod authored;
mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use authored::Authored;
pub use comment::{Comment, NewComment};
pub use follow::Follow;
pub use group::{Group, NewGroup};
pub use post::{NewPost, Post};
pub use user::{NewUser, User};
