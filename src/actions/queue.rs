//! The action queue.
//!
//! Accumulates actions in submission order and drains them through a
//! [`Connection`] exactly once. Remote failures never abort execution; they
//! are written back onto the originating action and read with
//! [`ActionQueue::errors`].

use tracing::{debug, warn};

use super::action::{
    Action, ActionId, Change, CountryCode, Create, ExecutionError, GroupUpdate, IdentityType,
    Member, MembershipEdit, NewGroup, NewUser, Step, Target, Update, UserUpdate,
};
use super::request::{GroupUpdateRequest, UserCreateRequest, UserUpdateRequest};
use crate::error::ValidationError;
use crate::logging::Reporter;
use crate::umapi::{ActionFailure, Connection, ExecutionOutcome};

#[derive(Debug)]
struct Entry {
    id: ActionId,
    action: Action,
}

/// Ordered, single-use queue of pending actions bound to one connection.
pub struct ActionQueue<'a, C: Connection + ?Sized> {
    connection: &'a mut C,
    reporter: Box<dyn Reporter + 'a>,
    queued: Vec<Entry>,
    immediate: Vec<Entry>,
    next_id: u64,
    queued_completed: usize,
    immediate_completed: usize,
    executed: bool,
}

impl<'a, C: Connection + ?Sized> ActionQueue<'a, C> {
    /// Create an empty queue.
    pub fn new(connection: &'a mut C, reporter: impl Reporter + 'a) -> Self {
        Self {
            connection,
            reporter: Box::new(reporter),
            queued: Vec::new(),
            immediate: Vec::new(),
            next_id: 0,
            queued_completed: 0,
            immediate_completed: 0,
            executed: false,
        }
    }

    /// Number of actions waiting for [`execute`](Self::execute).
    #[must_use]
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Queued actions in execution order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.queued.iter().map(|entry| &entry.action)
    }

    /// Append an action. No validation beyond construction.
    pub fn push(&mut self, action: Action) {
        let id = self.allocate_id();
        debug!(%id, key = action.key(), operation = %action.operation(), "queued action");
        self.queued.push(Entry { id, action });
    }

    /// Drain the queue through the connection, in push order.
    ///
    /// Every queued action is offered once, then the connection is flushed.
    /// Returns the number of actions resolved (applied or rejected), including
    /// those executed immediately by [`queue_group_delete`](Self::queue_group_delete).
    /// Calling it again returns the same count without contacting the connection.
    pub fn execute(&mut self) -> usize {
        if self.executed {
            warn!("action queue already executed; ignoring repeated execute()");
            return self.completed();
        }
        self.executed = true;

        let total = self.queued.len() + self.immediate.len();
        self.reporter.queue_started(total);

        for index in 0..self.queued.len() {
            let entry = &self.queued[index];
            let outcome = self.connection.execute_single(entry.id, &entry.action);
            self.absorb_queued(outcome, total);
        }

        let outcome = self.connection.execute_queued();
        self.absorb_queued(outcome, total);
        self.reporter.progress(self.completed(), total);

        self.completed()
    }

    /// Actions resolved so far.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.queued_completed + self.immediate_completed
    }

    /// Actions that recorded at least one error, in submission order.
    #[must_use]
    pub fn failed_actions(&self) -> Vec<&Action> {
        let mut failed: Vec<&Entry> = self
            .immediate
            .iter()
            .chain(&self.queued)
            .filter(|entry| !entry.action.execution_errors().is_empty())
            .collect();
        failed.sort_by_key(|entry| entry.id);
        failed.into_iter().map(|entry| &entry.action).collect()
    }

    /// Error lists of every failed action, in submission order.
    ///
    /// Empty before execution unless a group delete already failed.
    #[must_use]
    pub fn errors(&self) -> Vec<&[ExecutionError]> {
        self.failed_actions()
            .into_iter()
            .map(Action::execution_errors)
            .collect()
    }

    /// Queue creation of a user.
    ///
    /// The username defaults to the email. Initial groups become a separate
    /// membership step when non-empty.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an unknown identity type, an empty email
    /// or a malformed country code. Nothing is queued in that case.
    pub fn queue_user_create(&mut self, request: UserCreateRequest) -> Result<(), ValidationError> {
        let identity_type: IdentityType = request.identity_type.parse()?;
        let email = required(request.email, "email")?;
        let country = CountryCode::parse(&request.country)?;
        let username = non_empty(request.username).unwrap_or_else(|| email.clone());

        let mut action = Action::new(
            Target::User {
                key: username,
                domain: non_empty(request.domain),
            },
            Step::Create(Create::User(NewUser {
                identity_type,
                email,
                country,
                firstname: request.firstname,
                lastname: request.lastname,
            })),
        );
        if !request.groups.is_empty() {
            action = action.with_step(membership(Change::Add, Member::Groups, request.groups));
        }

        self.push(action);
        Ok(())
    }

    /// Queue removal of a user, from the organization only or (`hard`) from
    /// the identity directory as well.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for an empty email.
    pub fn queue_user_delete(&mut self, email: &str, hard: bool) -> Result<(), ValidationError> {
        let email = required(email.to_string(), "email")?;
        self.push(Action::new(
            Target::User {
                key: email,
                domain: None,
            },
            Step::Delete { hard },
        ));
        Ok(())
    }

    /// Queue a sparse update of the user addressed by `email`.
    ///
    /// A username equal to the resulting email is dropped from the update.
    /// Group edits become separate membership steps when non-empty.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty email, a malformed country code,
    /// or a request that changes nothing.
    pub fn queue_user_update(
        &mut self,
        email: &str,
        request: UserUpdateRequest,
    ) -> Result<(), ValidationError> {
        let email = required(email.to_string(), "email")?;
        let email_new = non_empty(request.email_new);
        let mut username = non_empty(request.username);
        if username.as_deref() == Some(email_new.as_deref().unwrap_or(&email)) {
            username = None;
        }
        let country = request
            .country
            .as_deref()
            .map(CountryCode::parse)
            .transpose()?;

        let update = UserUpdate {
            email: email_new,
            username,
            firstname: request.firstname,
            lastname: request.lastname,
            country,
        };

        let mut steps = Vec::new();
        if !update.is_empty() {
            steps.push(Step::Update(Update::User(update)));
        }
        if !request.add_groups.is_empty() {
            steps.push(membership(Change::Add, Member::Groups, request.add_groups));
        }
        if !request.remove_groups.is_empty() {
            steps.push(membership(Change::Remove, Member::Groups, request.remove_groups));
        }

        let target = Target::User {
            key: email.clone(),
            domain: None,
        };
        let action = build(target, steps).ok_or(ValidationError::NoChanges(email))?;
        self.push(action);
        Ok(())
    }

    /// Queue creation of a group.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for an empty name.
    pub fn queue_group_create(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<(), ValidationError> {
        let name = required(name.to_string(), "name")?;
        self.push(Action::new(
            Target::Group { name: name.clone() },
            Step::Create(Create::Group(NewGroup { name, description })),
        ));
        Ok(())
    }

    /// Queue an update of the group addressed by `name`.
    ///
    /// The rename/description step is attached only when one of the two is
    /// present; each list edit only when non-empty.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty name or a request that changes
    /// nothing.
    pub fn queue_group_update(
        &mut self,
        name: &str,
        request: GroupUpdateRequest,
    ) -> Result<(), ValidationError> {
        let name = required(name.to_string(), "name")?;
        let update = GroupUpdate {
            name: non_empty(request.name_new),
            description: request.description,
        };

        let mut steps = Vec::new();
        if update.name.is_some() || update.description.is_some() {
            steps.push(Step::Update(Update::Group(update)));
        }
        let edits = [
            (Change::Add, Member::Users, request.add_users),
            (Change::Remove, Member::Users, request.remove_users),
            (Change::Add, Member::ProductProfiles, request.add_profiles),
            (Change::Remove, Member::ProductProfiles, request.remove_profiles),
        ];
        for (change, member, names) in edits {
            if !names.is_empty() {
                steps.push(membership(change, member, names));
            }
        }

        let action = build(Target::Group { name: name.clone() }, steps)
            .ok_or(ValidationError::NoChanges(name))?;
        self.push(action);
        Ok(())
    }

    /// Delete a group right away, in a request of its own.
    ///
    /// The API refuses more than one group delete per request, so this never
    /// touches the queue. Errors are still reported through
    /// [`errors`](Self::errors).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for an empty name.
    pub fn queue_group_delete(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = required(name.to_string(), "name")?;
        let action = Action::new(Target::Group { name }, Step::Delete { hard: false });
        let id = self.allocate_id();
        debug!(%id, key = action.key(), "deleting group immediately");

        let outcome = self.connection.execute_immediate(id, &action);
        self.immediate_completed += outcome.completed();
        self.reporter.executed_immediately(&action, self.immediate_completed);
        self.immediate.push(Entry { id, action });
        self.record_failures(outcome.failures);
        Ok(())
    }

    fn allocate_id(&mut self) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn absorb_queued(&mut self, outcome: ExecutionOutcome, total: usize) {
        let completed = outcome.completed();
        self.record_failures(outcome.failures);
        if completed > 0 {
            self.queued_completed += completed;
            self.reporter.progress(self.completed(), total);
        }
    }

    fn record_failures(&mut self, failures: Vec<ActionFailure>) {
        for failure in failures {
            let entries = if self.queued.binary_search_by_key(&failure.id, |e| e.id).is_ok() {
                &mut self.queued
            } else {
                &mut self.immediate
            };
            match entries.binary_search_by_key(&failure.id, |e| e.id) {
                Ok(index) => {
                    let entry = &mut entries[index];
                    self.reporter.action_failed(&entry.action, &failure.errors);
                    entry.action.record_errors(failure.errors);
                },
                Err(_) => warn!(id = %failure.id, "errors reported for an unknown action"),
            }
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn membership(change: Change, member: Member, names: Vec<String>) -> Step {
    Step::Membership(MembershipEdit {
        change,
        member,
        names,
    })
}

fn build(target: Target, steps: Vec<Step>) -> Option<Action> {
    let mut steps = steps.into_iter();
    let first = steps.next()?;
    Some(steps.fold(Action::new(target, first), Action::with_step))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use mockall::Sequence;

    use super::*;
    use crate::actions::Operation;
    use crate::logging::SilentReporter;
    use crate::umapi::MockConnection;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Single(ActionId, String),
        Queued,
        Immediate(ActionId, String),
    }

    /// Resolves each action on `execute_single`, failing the keys it is told to.
    #[derive(Default)]
    struct ScriptedConnection {
        calls: Vec<Call>,
        failing: HashSet<String>,
    }

    impl ScriptedConnection {
        fn failing(keys: &[&str]) -> Self {
            Self {
                calls: Vec::new(),
                failing: keys.iter().map(|k| (*k).to_string()).collect(),
            }
        }

        fn resolve(&self, id: ActionId, action: &Action) -> ExecutionOutcome {
            if self.failing.contains(action.key()) {
                ExecutionOutcome {
                    submitted: 1,
                    succeeded: 0,
                    failed: 1,
                    failures: vec![ActionFailure {
                        id,
                        errors: vec![ExecutionError::new(
                            "error.command.rejected",
                            format!("{} rejected", action.key()),
                        )],
                    }],
                }
            } else {
                ExecutionOutcome {
                    submitted: 1,
                    succeeded: 1,
                    failed: 0,
                    failures: vec![],
                }
            }
        }
    }

    impl Connection for ScriptedConnection {
        fn execute_single(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
            self.calls.push(Call::Single(id, action.key().to_string()));
            self.resolve(id, action)
        }

        fn execute_queued(&mut self) -> ExecutionOutcome {
            self.calls.push(Call::Queued);
            ExecutionOutcome::empty()
        }

        fn execute_immediate(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
            self.calls.push(Call::Immediate(id, action.key().to_string()));
            self.resolve(id, action)
        }
    }

    /// Buffers everything and reports all results on flush.
    #[derive(Default)]
    struct BufferingConnection {
        buffered: Vec<(ActionId, String)>,
        fail_key: Option<String>,
    }

    impl Connection for BufferingConnection {
        fn execute_single(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
            self.buffered.push((id, action.key().to_string()));
            ExecutionOutcome::empty()
        }

        fn execute_queued(&mut self) -> ExecutionOutcome {
            let mut outcome = ExecutionOutcome::empty();
            for (id, key) in self.buffered.drain(..) {
                outcome.submitted += 1;
                if self.fail_key.as_deref() == Some(key.as_str()) {
                    outcome.failed += 1;
                    outcome.failures.push(ActionFailure {
                        id,
                        errors: vec![ExecutionError::new("error.user.not_found", "no such user")],
                    });
                } else {
                    outcome.succeeded += 1;
                }
            }
            outcome
        }
    }

    #[derive(Clone, Default)]
    struct RecordingReporter {
        started: Rc<RefCell<Vec<usize>>>,
        progress: Rc<RefCell<Vec<(usize, usize)>>>,
        immediate: Rc<RefCell<Vec<(String, usize)>>>,
        failed: Rc<RefCell<Vec<String>>>,
    }

    impl Reporter for RecordingReporter {
        fn queue_started(&mut self, total: usize) {
            self.started.borrow_mut().push(total);
        }

        fn executed_immediately(&mut self, action: &Action, completed: usize) {
            self.immediate
                .borrow_mut()
                .push((action.key().to_string(), completed));
        }

        fn progress(&mut self, completed: usize, total: usize) {
            self.progress.borrow_mut().push((completed, total));
        }

        fn action_failed(&mut self, action: &Action, _errors: &[ExecutionError]) {
            self.failed.borrow_mut().push(action.key().to_string());
        }
    }

    fn create_request(email: &str) -> UserCreateRequest {
        UserCreateRequest {
            identity_type: "federatedID".to_string(),
            email: email.to_string(),
            country: "US".to_string(),
            ..UserCreateRequest::default()
        }
    }

    fn user(n: usize) -> String {
        format!("user{n:02}@example.com")
    }

    #[test]
    fn test_execute_offers_in_push_order_then_flushes() {
        let mut conn = ScriptedConnection::failing(&["b@example.com"]);
        {
            let mut queue = ActionQueue::new(&mut conn, SilentReporter);
            for email in ["a@example.com", "b@example.com", "c@example.com"] {
                queue.queue_user_delete(email, false).unwrap();
            }
            assert_eq!(queue.execute(), 3);
        }

        assert_eq!(
            conn.calls,
            vec![
                Call::Single(ActionId(0), "a@example.com".to_string()),
                Call::Single(ActionId(1), "b@example.com".to_string()),
                Call::Single(ActionId(2), "c@example.com".to_string()),
                Call::Queued,
            ]
        );
    }

    #[test]
    fn test_one_single_call_per_action_and_one_flush() {
        let mut conn = MockConnection::new();
        let mut seq = Sequence::new();
        conn.expect_execute_single()
            .times(4)
            .in_sequence(&mut seq)
            .returning(|_, _| ExecutionOutcome::empty());
        conn.expect_execute_queued()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| ExecutionOutcome {
                submitted: 4,
                succeeded: 4,
                failed: 0,
                failures: vec![],
            });

        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        for n in 0..4 {
            queue.queue_user_create(create_request(&user(n))).unwrap();
        }
        assert_eq!(queue.execute(), 4);
        assert!(queue.errors().is_empty());
    }

    #[test]
    fn test_twenty_five_creates_with_five_failures() {
        let failing: Vec<String> = (20..25).map(user).collect();
        let failing_refs: Vec<&str> = failing.iter().map(String::as_str).collect();
        let mut conn = ScriptedConnection::failing(&failing_refs);
        let reporter = RecordingReporter::default();

        let mut queue = ActionQueue::new(&mut conn, reporter.clone());
        for n in 0..25 {
            queue.queue_user_create(create_request(&user(n))).unwrap();
        }
        assert!(queue.errors().is_empty());

        let completed = queue.execute();
        assert_eq!(completed, 25);

        let errors = queue.errors();
        assert_eq!(errors.len(), 5);
        let keys: Vec<&str> = queue.failed_actions().into_iter().map(Action::key).collect();
        assert_eq!(keys, failing_refs);
        assert_eq!(errors[0][0].message, format!("{} rejected", user(20)));

        assert_eq!(reporter.failed.borrow().len(), 5);
        assert_eq!(reporter.progress.borrow().last(), Some(&(25, 25)));
    }

    #[test]
    fn test_errors_from_deferred_flush_land_on_right_action() {
        let mut conn = BufferingConnection {
            fail_key: Some("b@example.com".to_string()),
            ..BufferingConnection::default()
        };
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            queue.queue_user_delete(email, true).unwrap();
        }

        assert_eq!(queue.execute(), 3);
        let failed = queue.failed_actions();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].key(), "b@example.com");
        assert_eq!(failed[0].execution_errors()[0].kind, "error.user.not_found");
    }

    #[test]
    fn test_errors_idempotent_and_execute_single_shot() {
        let mut conn = ScriptedConnection::failing(&["a@example.com"]);
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue.queue_user_delete("a@example.com", false).unwrap();

        assert_eq!(queue.execute(), 1);
        let first: Vec<Vec<ExecutionError>> = queue.errors().iter().map(|e| e.to_vec()).collect();
        let second: Vec<Vec<ExecutionError>> = queue.errors().iter().map(|e| e.to_vec()).collect();
        assert_eq!(first, second);

        assert_eq!(queue.execute(), 1);
        drop(queue);
        assert_eq!(conn.calls.len(), 2);
    }

    #[test]
    fn test_duplicate_targets_are_kept() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue.queue_user_delete("a@example.com", false).unwrap();
        queue.queue_user_delete("a@example.com", true).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.execute(), 2);
    }

    #[test]
    fn test_user_create_defaults_username_to_email() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);

        queue.queue_user_create(create_request("a@example.com")).unwrap();
        queue
            .queue_user_create(UserCreateRequest {
                username: Some(String::new()),
                ..create_request("b@example.com")
            })
            .unwrap();
        queue
            .queue_user_create(UserCreateRequest {
                username: Some("bee".to_string()),
                domain: Some("example.com".to_string()),
                ..create_request("c@example.com")
            })
            .unwrap();

        let actions: Vec<&Action> = queue.actions().collect();
        assert_eq!(actions[0].key(), "a@example.com");
        assert_eq!(actions[1].key(), "b@example.com");
        assert_eq!(actions[2].key(), "bee");
        assert_eq!(
            actions[2].target(),
            &Target::User {
                key: "bee".to_string(),
                domain: Some("example.com".to_string())
            }
        );
        assert_eq!(actions[0].steps().len(), 1);
    }

    #[test]
    fn test_user_create_attaches_groups() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_user_create(UserCreateRequest {
                groups: vec!["g1".to_string(), "g2".to_string()],
                ..create_request("a@example.com")
            })
            .unwrap();

        let action = queue.actions().next().unwrap();
        assert_eq!(action.operation(), Operation::Create);
        assert_eq!(
            action.steps()[1],
            Step::Membership(MembershipEdit {
                change: Change::Add,
                member: Member::Groups,
                names: vec!["g1".to_string(), "g2".to_string()],
            })
        );
    }

    #[test]
    fn test_user_create_validation_happens_before_any_call() {
        let mut conn = MockConnection::new();
        conn.expect_execute_single().never();
        conn.expect_execute_queued().never();
        conn.expect_execute_immediate().never();

        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        assert_eq!(
            queue.queue_user_create(UserCreateRequest {
                country: "USA".to_string(),
                ..create_request("a@example.com")
            }),
            Err(ValidationError::InvalidCountryFormat("USA".to_string()))
        );
        assert_eq!(
            queue.queue_user_create(UserCreateRequest {
                country: "u1".to_string(),
                ..create_request("a@example.com")
            }),
            Err(ValidationError::InvalidCountryFormat("u1".to_string()))
        );
        assert_eq!(
            queue.queue_user_create(UserCreateRequest {
                identity_type: "guestID".to_string(),
                ..create_request("a@example.com")
            }),
            Err(ValidationError::InvalidIdentityType("guestID".to_string()))
        );
        assert_eq!(
            queue.queue_user_create(create_request("")),
            Err(ValidationError::MissingField("email"))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_user_update_suppresses_username_equal_to_new_email() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_user_update(
                "old@example.com",
                UserUpdateRequest {
                    email_new: Some("new@example.com".to_string()),
                    username: Some("new@example.com".to_string()),
                    ..UserUpdateRequest::default()
                },
            )
            .unwrap();

        let action = queue.actions().next().unwrap();
        assert_eq!(action.key(), "old@example.com");
        assert_eq!(
            action.steps(),
            &[Step::Update(Update::User(UserUpdate {
                email: Some("new@example.com".to_string()),
                ..UserUpdate::default()
            }))]
        );
    }

    #[test]
    fn test_user_update_without_new_email() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_user_update(
                "jdoe@example.com",
                UserUpdateRequest {
                    firstname: Some("Jane".to_string()),
                    username: Some("jdoe".to_string()),
                    remove_groups: vec!["Old".to_string()],
                    ..UserUpdateRequest::default()
                },
            )
            .unwrap();

        let action = queue.actions().next().unwrap();
        assert_eq!(action.steps().len(), 2);
        assert_eq!(
            action.steps()[0],
            Step::Update(Update::User(UserUpdate {
                email: None,
                username: Some("jdoe".to_string()),
                firstname: Some("Jane".to_string()),
                ..UserUpdate::default()
            }))
        );
        assert_eq!(action.steps()[1].operation(), Operation::GroupMembershipEdit);
    }

    #[test]
    fn test_user_update_groups_only_and_empty() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_user_update(
                "jdoe@example.com",
                UserUpdateRequest {
                    add_groups: vec!["New".to_string()],
                    ..UserUpdateRequest::default()
                },
            )
            .unwrap();
        assert_eq!(
            queue.actions().next().unwrap().operation(),
            Operation::GroupMembershipEdit
        );

        assert_eq!(
            queue.queue_user_update("jdoe@example.com", UserUpdateRequest::default()),
            Err(ValidationError::NoChanges("jdoe@example.com".to_string()))
        );
        assert_eq!(
            queue.queue_user_update(
                "jdoe@example.com",
                UserUpdateRequest {
                    country: Some("USA".to_string()),
                    ..UserUpdateRequest::default()
                }
            ),
            Err(ValidationError::InvalidCountryFormat("USA".to_string()))
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_group_create() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_group_create("Stock Users", Some("Stock provisioning group".to_string()))
            .unwrap();
        assert_eq!(
            queue.queue_group_create("  ", None),
            Err(ValidationError::MissingField("name"))
        );

        let action = queue.actions().next().unwrap();
        assert_eq!(action.key(), "Stock Users");
        assert_eq!(action.operation(), Operation::Create);
        assert_eq!(action.identity_type(), None);
    }

    #[test]
    fn test_group_update_attaches_only_present_edits() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_group_update(
                "Stock Users",
                GroupUpdateRequest {
                    add_users: vec!["a@example.com".to_string()],
                    add_profiles: vec![],
                    remove_profiles: vec!["Default".to_string()],
                    ..GroupUpdateRequest::default()
                },
            )
            .unwrap();

        let action = queue.actions().next().unwrap();
        assert_eq!(
            action.steps(),
            &[
                membership(Change::Add, Member::Users, vec!["a@example.com".to_string()]),
                membership(Change::Remove, Member::ProductProfiles, vec!["Default".to_string()]),
            ]
        );
    }

    #[test]
    fn test_group_update_rename() {
        let mut conn = ScriptedConnection::default();
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue
            .queue_group_update(
                "Old",
                GroupUpdateRequest {
                    name_new: Some("New".to_string()),
                    ..GroupUpdateRequest::default()
                },
            )
            .unwrap();
        assert_eq!(
            queue.actions().next().unwrap().steps(),
            &[Step::Update(Update::Group(GroupUpdate {
                name: Some("New".to_string()),
                description: None,
            }))]
        );
        assert_eq!(
            queue.queue_group_update("Old", GroupUpdateRequest::default()),
            Err(ValidationError::NoChanges("Old".to_string()))
        );
    }

    #[test]
    fn test_group_delete_executes_immediately() {
        let mut conn = ScriptedConnection::failing(&["Gone"]);
        {
            let mut queue = ActionQueue::new(&mut conn, SilentReporter);
            queue.queue_user_delete("a@example.com", false).unwrap();
            queue.queue_group_delete("Stale").unwrap();
            queue.queue_group_delete("Gone").unwrap();

            assert_eq!(queue.len(), 1);
            let errors = queue.errors();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0][0].message, "Gone rejected");

            assert_eq!(queue.execute(), 3);
            assert_eq!(queue.errors().len(), 1);
        }

        assert_eq!(
            conn.calls,
            vec![
                Call::Immediate(ActionId(1), "Stale".to_string()),
                Call::Immediate(ActionId(2), "Gone".to_string()),
                Call::Single(ActionId(0), "a@example.com".to_string()),
                Call::Queued,
            ]
        );
    }

    #[test]
    fn test_group_delete_default_immediate_path() {
        let mut conn = BufferingConnection {
            fail_key: Some("Gone".to_string()),
            ..BufferingConnection::default()
        };
        let mut queue = ActionQueue::new(&mut conn, SilentReporter);
        queue.queue_group_delete("Gone").unwrap();

        assert!(queue.is_empty());
        assert_eq!(queue.completed(), 1);
        assert_eq!(queue.errors()[0][0].kind, "error.user.not_found");
    }

    #[test]
    fn test_group_deletes_are_reported() {
        let mut conn = ScriptedConnection::failing(&["Gone"]);
        let reporter = RecordingReporter::default();
        let mut queue = ActionQueue::new(&mut conn, reporter.clone());
        queue.queue_group_delete("Stale").unwrap();
        queue.queue_group_delete("Gone").unwrap();

        assert_eq!(
            *reporter.immediate.borrow(),
            vec![("Stale".to_string(), 1), ("Gone".to_string(), 2)]
        );

        assert_eq!(queue.execute(), 2);
        assert_eq!(*reporter.started.borrow(), vec![2]);
        assert_eq!(reporter.progress.borrow().last(), Some(&(2, 2)));
        assert_eq!(*reporter.failed.borrow(), vec!["Gone".to_string()]);
    }
}
