use serde::{Deserialize, Serialize};

/// A directed subscription edge: `user_id` follows `author_id`.
///
/// The pair is unique. Nothing here forbids `user_id == author_id`; the
/// follow service refuses self-follows instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
