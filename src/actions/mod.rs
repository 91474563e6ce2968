//! Action queue for user and group mutations.
//!
//! This module is the execution engine of the CLI:
//! - [`Action`] describes one create, update, delete or membership edit
//! - [`ActionQueue`] accumulates actions and drains them through a
//!   [`crate::umapi::Connection`], collecting per-action errors
//!
//! Construction failures are returned by the `queue_*` helpers before anything
//! is queued. Remote failures are only ever visible through
//! [`ActionQueue::errors`].

pub mod action;
pub mod queue;
pub mod request;

pub use action::{
    Action, ActionId, Change, CountryCode, Create, ExecutionError, GroupUpdate, IdentityType,
    Member, MembershipEdit, NewGroup, NewUser, Operation, Step, Target, TargetKind, Update,
    UserUpdate,
};
pub use queue::ActionQueue;
pub use request::{GroupUpdateRequest, UserCreateRequest, UserUpdateRequest};
