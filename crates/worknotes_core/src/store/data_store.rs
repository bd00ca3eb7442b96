//! Data store lifecycle and mutation operations.

use super::notice::StoreNotice;
use super::writer::CollectionWriter;
use crate::kv::KvError;
use crate::model::{normalize_text, Employee, Message};
use crate::storage::{CollectionStorage, Record, StorageCause, StorageError, StorageResult};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};

const NOTICE_CAPACITY: usize = 32;

/// Immutable view of the store published to subscribers.
///
/// Collections are shared behind `Arc`, so cloning a snapshot is cheap and
/// holding one never blocks later mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// `true` until the current hydration pass completes.
    pub loading: bool,
    /// Messages in insertion order.
    pub messages: Arc<Vec<Message>>,
    /// Employees in insertion order.
    pub employees: Arc<Vec<Employee>>,
    /// `LoadFailed` notices from the latest hydration pass; empty once a
    /// pass succeeds.
    pub load_failures: Vec<StoreNotice>,
}

impl StoreSnapshot {
    fn initial() -> Self {
        Self {
            loading: true,
            messages: Arc::new(Vec::new()),
            employees: Arc::new(Vec::new()),
            load_failures: Vec::new(),
        }
    }

    /// `true` when the latest hydration pass could not read storage.
    pub fn load_failed(&self) -> bool {
        !self.load_failures.is_empty()
    }

    pub fn find_message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn find_employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|employee| employee.id == employee_id)
    }
}

/// Sole owner of the message and employee collections.
///
/// # Lifecycle
/// 1. [`DataStore::new`] inside a Tokio runtime (starts the write queues).
/// 2. [`DataStore::reload`] to hydrate, or [`DataStore::open`] for both.
/// 3. Mutate through the `&self` operations; observe via
///    [`DataStore::subscribe`] and [`DataStore::notices`].
/// 4. [`DataStore::close`] to drain pending writes.
///
/// Mutations assume one logical writer issuing one call at a time.
pub struct DataStore {
    storage: CollectionStorage,
    state: watch::Sender<StoreSnapshot>,
    notices: broadcast::Sender<StoreNotice>,
    messages_writer: CollectionWriter<Message>,
    employees_writer: CollectionWriter<Employee>,
}

impl DataStore {
    /// Creates an empty store in the `loading` state.
    ///
    /// # Panics
    /// - When called outside a Tokio runtime.
    pub fn new(storage: CollectionStorage) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::initial());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let messages_writer = CollectionWriter::spawn(storage.clone(), notices.clone());
        let employees_writer = CollectionWriter::spawn(storage.clone(), notices.clone());

        Self {
            storage,
            state,
            notices,
            messages_writer,
            employees_writer,
        }
    }

    /// Creates a store and runs the first hydration pass.
    ///
    /// Load failures of this first pass are recorded on
    /// [`StoreSnapshot::load_failures`], since no notice receiver exists yet.
    pub async fn open(storage: CollectionStorage) -> Self {
        let store = Self::new(storage);
        store.reload().await;
        store
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn messages(&self) -> Arc<Vec<Message>> {
        Arc::clone(&self.state.borrow().messages)
    }

    pub fn employees(&self) -> Arc<Vec<Employee>> {
        Arc::clone(&self.state.borrow().employees)
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Subscribes to storage load/save warnings.
    pub fn notices(&self) -> broadcast::Receiver<StoreNotice> {
        self.notices.subscribe()
    }

    /// Appends a message built from trimmed `text`.
    ///
    /// Returns `None` without touching state when `text` is blank.
    pub fn add_message(&self, text: &str) -> Option<Message> {
        let Some(text) = normalize_text(text) else {
            debug!("event=message_add module=store status=skipped reason=empty_text");
            return None;
        };
        let message = Message::new(text);

        let mut count = 0;
        self.state.send_modify(|snapshot| {
            Arc::make_mut(&mut snapshot.messages).push(message.clone());
            self.messages_writer.enqueue(Arc::clone(&snapshot.messages));
            count = snapshot.messages.len();
        });

        info!(
            "event=message_add module=store status=ok message_id={} message_count={}",
            message.id, count
        );
        Some(message)
    }

    /// Appends an employee named by trimmed `name`.
    ///
    /// `initial_note_id` is stored as-is; it is not checked against the
    /// message collection. Returns `None` when `name` is blank.
    pub fn add_employee(&self, name: &str, initial_note_id: Option<&str>) -> Option<Employee> {
        let Some(name) = normalize_text(name) else {
            debug!("event=employee_add module=store status=skipped reason=empty_name");
            return None;
        };
        let initial_note_id = initial_note_id.filter(|id| !id.is_empty());
        let employee = Employee::new(name, initial_note_id.map(str::to_string));

        let mut count = 0;
        self.state.send_modify(|snapshot| {
            Arc::make_mut(&mut snapshot.employees).push(employee.clone());
            self.employees_writer.enqueue(Arc::clone(&snapshot.employees));
            count = snapshot.employees.len();
        });

        info!(
            "event=employee_add module=store status=ok employee_id={} employee_count={} with_note={}",
            employee.id,
            count,
            initial_note_id.is_some()
        );
        Some(employee)
    }

    /// References `message_id` from the employee's notes.
    ///
    /// Idempotent; no-op when the employee does not exist.
    pub fn attach_note_to_employee(&self, employee_id: &str, message_id: &str) {
        self.update_employee("note_attach", employee_id, |employee| {
            employee.attach_note(message_id)
        });
    }

    /// Renames the employee. Blank names leave the current name unchanged.
    pub fn update_employee_name(&self, employee_id: &str, name: &str) {
        let Some(name) = normalize_text(name) else {
            debug!(
                "event=employee_rename module=store status=skipped reason=empty_name employee_id={}",
                employee_id
            );
            return;
        };
        self.update_employee("employee_rename", employee_id, |employee| {
            employee.rename(name)
        });
    }

    /// Drops `message_id` from the employee's notes if present.
    pub fn remove_note_from_employee(&self, employee_id: &str, message_id: &str) {
        self.update_employee("note_remove", employee_id, |employee| {
            employee.detach_note(message_id)
        });
    }

    /// Re-hydrates both collections from storage.
    ///
    /// Pending writes are flushed first. State is replaced only when both
    /// collections load; otherwise the previous state is kept and one
    /// `LoadFailed` notice is sent per failing collection. A full outage
    /// therefore yields two notices, which consumers may merge into a single
    /// alert. The same notices are kept on [`StoreSnapshot::load_failures`].
    pub async fn reload(&self) {
        self.state.send_if_modified(|snapshot| {
            let changed = !snapshot.loading;
            snapshot.loading = true;
            changed
        });
        self.flush().await;

        let started_at = Instant::now();
        let (messages, employees) = tokio::join!(
            load_blocking::<Message>(self.storage.clone()),
            load_blocking::<Employee>(self.storage.clone()),
        );

        match (messages, employees) {
            (Ok(messages), Ok(employees)) => {
                let (message_count, employee_count) = (messages.len(), employees.len());
                self.state.send_modify(|snapshot| {
                    snapshot.messages = Arc::new(messages);
                    snapshot.employees = Arc::new(employees);
                    snapshot.load_failures.clear();
                    snapshot.loading = false;
                });
                info!(
                    "event=store_hydrate module=store status=ok message_count={} employee_count={} duration_ms={}",
                    message_count,
                    employee_count,
                    started_at.elapsed().as_millis()
                );
            }
            (messages, employees) => {
                let mut failures = Vec::new();
                for err in [messages.err(), employees.err()].into_iter().flatten() {
                    warn!(
                        "event=store_hydrate module=store status=error kind={} error={}",
                        err.kind(),
                        err
                    );
                    failures.push(StoreNotice::from(&err));
                }
                self.state.send_modify(|snapshot| {
                    snapshot.load_failures = failures.clone();
                    snapshot.loading = false;
                });
                for notice in failures {
                    if self.notices.send(notice).is_err() {
                        debug!("event=store_hydrate module=store status=unobserved reason=no_notice_receivers");
                    }
                }
            }
        }
    }

    /// Waits until every write queued so far has been attempted.
    pub async fn flush(&self) {
        tokio::join!(self.messages_writer.flush(), self.employees_writer.flush());
    }

    /// Drains pending writes and stops the write queues.
    pub async fn close(self) {
        let Self {
            messages_writer,
            employees_writer,
            ..
        } = self;
        tokio::join!(messages_writer.close(), employees_writer.close());
        debug!("event=store_close module=store status=ok");
    }

    fn update_employee(
        &self,
        operation: &'static str,
        employee_id: &str,
        apply: impl FnOnce(&mut Employee) -> bool,
    ) {
        let mut found = false;
        let changed = self.state.send_if_modified(|snapshot| {
            let Some(index) = snapshot
                .employees
                .iter()
                .position(|employee| employee.id == employee_id)
            else {
                return false;
            };
            found = true;

            let mut employee = snapshot.employees[index].clone();
            if !apply(&mut employee) {
                return false;
            }
            Arc::make_mut(&mut snapshot.employees)[index] = employee;
            self.employees_writer.enqueue(Arc::clone(&snapshot.employees));
            true
        });

        let status = match (found, changed) {
            (false, _) => "not_found",
            (true, false) => "unchanged",
            (true, true) => "ok",
        };
        debug!(
            "event={} module=store status={} employee_id={}",
            operation, status, employee_id
        );
    }
}

async fn load_blocking<T: Record>(storage: CollectionStorage) -> StorageResult<Vec<T>> {
    match tokio::task::spawn_blocking(move || storage.load::<T>()).await {
        Ok(result) => result,
        Err(join_err) => Err(StorageError::Read {
            kind: T::KIND,
            cause: StorageCause::Backend(KvError::Unavailable(format!(
                "load task aborted: {join_err}"
            ))),
        }),
    }
}
