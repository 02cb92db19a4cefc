//! # Yatube Core
//!
//! The domain layer: entities, the ports infrastructure must implement,
//! pagination, form validation and the services behind every page.
//! No database, HTTP or filesystem code lives here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod views;

pub use error::{DomainError, RepoError};
pub use pagination::{Page, Paginator};
