//! umapi-cli - A command-line client for the Adobe User Management API
//!
//! This crate queues user and group mutations as actions, sends them to the
//! API in batches and collects per-action errors without aborting the run.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod umapi;

pub use actions::{Action, ActionQueue};
pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::{UmapiError, ValidationError};
pub use umapi::{Connection, UmapiConnection};
