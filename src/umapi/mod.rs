//! User Management API integration.
//!
//! This module provides the [`Connection`] contract the action queue drains
//! into, and [`UmapiConnection`], its implementation over HTTP.

mod auth;
mod client;
mod connection;
#[cfg(test)]
pub mod testing;
mod transport;
pub mod types;

pub use auth::AccessToken;
pub use client::{UmapiConnection, REQUEST_FAILED};
#[cfg(test)]
pub use connection::MockConnection;
pub use connection::{ActionFailure, Connection, ExecutionOutcome};
pub use transport::{HttpTransport, Transport};
pub use types::{Group, User};
