//! # Yatube Shared
//!
//! Wire-level types: the payloads HTML forms submit and the few JSON bodies
//! the server emits. Both the web app and the domain layer bind to these.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, HealthResponse};
