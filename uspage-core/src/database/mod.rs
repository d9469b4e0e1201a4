//! Persistence layer: repository ports and the Postgres backend.
//!
//! Ports are object-safe traits so the services can be unit tested
//! against mocks; the Postgres implementations are thin query builders
//! with no business rules beyond surfacing constraint violations as
//! typed errors.

pub mod ports;
pub mod postgres;
pub mod repositories;

pub use postgres::Database;
