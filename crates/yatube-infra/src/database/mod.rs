//! Storage: PostgreSQL through SeaORM, or an in-process store when no
//! database is configured.

mod memory;

pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
    PostgresPostRepository, PostgresStore, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
