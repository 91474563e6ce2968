use super::{at_record, bulk_result, single_result, write_output};
use crate::actions::{ActionQueue, GroupUpdateRequest, Operation};
use crate::cli::args::{
    BulkArgs, GroupCreateArgs, GroupDeleteArgs, GroupReadArgs, GroupUpdateArgs, ReadAllArgs,
};
use crate::error::{UmapiError, ValidationError};
use crate::input::{self, GroupCreateRecord, GroupDeleteRecord, GroupUpdateRecord};
use crate::logging::{TracingReporter, Verbosity};
use crate::output::{format_records, group_records};
use crate::umapi::{Connection, Transport, UmapiConnection};

/// Execute group-read command
///
/// # Errors
///
/// Returns `UmapiError::NotFound` if no group matches, or an error if the
/// request or formatting fails.
pub fn group_read<T: Transport>(
    conn: &mut UmapiConnection<T>,
    args: &GroupReadArgs,
) -> Result<String, UmapiError> {
    let group = conn
        .group(&args.group)?
        .ok_or_else(|| UmapiError::NotFound(format!("group '{}'", args.group)))?;
    format_records(&group_records(&[group])?, args.format)
}

/// Execute group-read-all command
///
/// # Errors
///
/// Returns an error if a page cannot be fetched or the output cannot be
/// written.
pub fn group_read_all<T: Transport>(
    conn: &mut UmapiConnection<T>,
    args: &ReadAllArgs,
) -> Result<String, UmapiError> {
    let groups = conn.groups()?;
    let output = format_records(&group_records(&groups)?, args.format)?;
    write_output(output, args.out_file.as_deref())
}

/// Execute group-create command
///
/// # Errors
///
/// Returns `UmapiError::Validation` for an empty name.
pub fn group_create<C: Connection + ?Sized>(
    conn: &mut C,
    args: GroupCreateArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_group_create(&args.name, args.description)?;
    queue.execute();
    Ok(single_result(&queue, Operation::Create))
}

/// Execute group-create-bulk command
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
pub fn group_create_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<GroupCreateRecord> = input::read_file(&args.in_file, args.format)?;
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.into_iter().enumerate() {
        queue
            .queue_group_create(&record.name, record.description)
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}

/// Execute group-update command
///
/// # Errors
///
/// Returns `UmapiError::Validation` for an empty name or an update that
/// changes nothing.
pub fn group_update<C: Connection + ?Sized>(
    conn: &mut C,
    args: GroupUpdateArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_group_update(
        &args.name,
        GroupUpdateRequest {
            name_new: args.name_new,
            description: args.description,
            add_users: args.users_add,
            remove_users: args.users_remove,
            add_profiles: args.profiles_add,
            remove_profiles: args.profiles_remove,
        },
    )?;
    queue.execute();
    Ok(single_result(&queue, Operation::Update))
}

/// Execute group-update-bulk command
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
pub fn group_update_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<GroupUpdateRecord> = input::read_file(&args.in_file, args.format)?;
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.into_iter().enumerate() {
        let (name, request) = record.into_request();
        queue
            .queue_group_update(&name, request)
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}

/// Execute group-delete command
///
/// The group is deleted right away, in a request of its own.
///
/// # Errors
///
/// Returns `UmapiError::Validation` for an empty name.
pub fn group_delete<C: Connection + ?Sized>(
    conn: &mut C,
    args: &GroupDeleteArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    queue.queue_group_delete(&args.name)?;
    queue.execute();
    Ok(single_result(&queue, Operation::Delete))
}

/// Execute group-delete-bulk command
///
/// Every name is checked before the first delete goes out, since deletes are
/// sent as they are queued.
///
/// # Errors
///
/// Returns an error if the input file cannot be read or a record is invalid.
pub fn group_delete_bulk<C: Connection + ?Sized>(
    conn: &mut C,
    args: &BulkArgs,
    verbosity: Verbosity,
) -> Result<String, UmapiError> {
    let records: Vec<GroupDeleteRecord> = input::read_file(&args.in_file, args.format)?;
    if let Some(index) = records.iter().position(|r| r.name.trim().is_empty()) {
        return Err(at_record(index)(ValidationError::MissingField("name")));
    }

    let mut queue = ActionQueue::new(conn, TracingReporter::new(verbosity));
    for (index, record) in records.iter().enumerate() {
        queue
            .queue_group_delete(&record.name)
            .map_err(at_record(index))?;
    }
    let executed = queue.execute();
    Ok(bulk_result(&queue, executed))
}
