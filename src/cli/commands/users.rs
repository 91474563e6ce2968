use super::{at_record, bulk_result, single_result, write_output};
use crate::actions::{ActionQueue, Operation, UserCreateRequest, UserUpdateRequest};
use crate::cli::args::{BulkArgs, ReadAllArgs, UserCreateArgs, UserDeleteArgs, UserReadArgs, UserUpdateArgs};
use crate::error::UmapiError;
use crate::input::{self, UserCreateRecord, UserDeleteRecord, UserUpdateRecord};
use crate::logging::{TracingReporter, Verbosity};
use crate::output::{format_records, user_records};
use crate::umapi::{Connection, Transport, UmapiConnection};

/// Execute user-read command
///
/// # Errors
///
/// Returns `UmapiError::NotFound` if no user has that email, or an error if
/// the request or formatting fails.
pub fn user_read<T: Transport>(
    conn: &mut UmapiConnection<T>,
    args: &UserReadArgs,
) -> Result<String, UmapiError> {
    let user = conn
        .user(&args.email)?
        .ok_or_else(|| UmapiError::NotFound(format!("user '{}'", args.email)))?;
    format_records(&user_records(&[user])?, args.format)
}

/// Execute user-read-all command
///
/// # Errors
///
/// Returns an error if a page cannot be fetched or the output cannot be
/// written.
pub fn user_read_all<T: Transport>(
    conn: &mut UmapiConnection<T>,
    args: &ReadAllArgs,
) -> Result<String, UmapiError> {
    let users = conn.users()?;
    let output = format_records(&user_records(&users)?, args.format)?;
    write_output(output, args.out_file.as_deref())
}

/// Execute user-create command
///
/// # Errors
///
/// Returns `UmapiError::Validation` if the arguments do not describe a valid
/// user. Remote failures are part of the returned text.
pub fn user_create<C: Connection + ?Sized>(
    conn: &mut C,
    args: UserCreateArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_user_create(UserCreateRequest {
        identity_type: args.identity_type,
        email: args.email,
        country: args.country,
        firstname: args.firstname,
        lastname: args.lastname,
        username: args.username,
        domain: args.domain,
        groups: args.groups,
    })?;
    queue.execute();
    Ok(single_result(&queue, Operation::Create))
}

/// Execute user-create-bulk command
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
/// Nothing is sent in that case.
pub fn user_create_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<UserCreateRecord> = input::read_file(&args.in_file, args.format)?;
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.into_iter().enumerate() {
        queue
            .queue_user_create(record.into())
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}

/// Execute user-update command
///
/// # Errors
///
/// Returns `UmapiError::Validation` if nothing would change or the country
/// code is malformed.
pub fn user_update<C: Connection + ?Sized>(
    conn: &mut C,
    args: UserUpdateArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_user_update(
        &args.email,
        UserUpdateRequest {
            email_new: args.email_new,
            firstname: args.firstname,
            lastname: args.lastname,
            username: args.username,
            country: args.country,
            add_groups: args.groups_add,
            remove_groups: args.groups_remove,
        },
    )?;
    queue.execute();
    Ok(single_result(&queue, Operation::Update))
}

/// Execute user-update-bulk command
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
pub fn user_update_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<UserUpdateRecord> = input::read_file(&args.in_file, args.format)?;
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.into_iter().enumerate() {
        let (email, request) = record.into_request();
        queue
            .queue_user_update(&email, request)
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}

/// Execute user-delete command
///
/// # Errors
///
/// Returns `UmapiError::Validation` for an empty email.
pub fn user_delete<C: Connection + ?Sized>(
    conn: &mut C,
    args: &UserDeleteArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_user_delete(&args.email, args.hard)?;
    queue.execute();
    Ok(single_result(&queue, Operation::Delete))
}

/// Execute user-delete-bulk command
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
pub fn user_delete_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<UserDeleteRecord> = input::read_file(&args.in_file, args.format)?;
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.iter().enumerate() {
        let hard = record.is_hard().map_err(at_record(index))?;
        queue
            .queue_user_delete(&record.email, hard)
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}
