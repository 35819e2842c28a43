//! # Core Synchronizer
//!
//! This module defines the generic building blocks of the synchronizer.
//!
//! ## Key Types
//!
//! - [`RemoteEntity`]: The trait that every mirrored record type implements.
//! - [`RemoteResource`]: The transport seam (list/create/update/delete against the remote side).
//! - [`SyncActor`]: The single control task that owns the Collection and the Request State.
//! - [`SyncClient`]: The cloneable handle used to issue operations and observe snapshots.

use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub use super::error::{SyncError, TransportError};

// =============================================================================
// 1. THE ABSTRACTION (Entity + Transport)
// =============================================================================

/// Trait that any record type must implement to be mirrored by a [`SyncActor`].
///
/// # Architecture Note
/// The synchronizer never invents identifiers. `id()` always returns the value the
/// remote resource assigned, and every local lookup (update, delete) goes through it.
///
/// The associated types keep payloads apart: a `Fields` value can only be sent to
/// `create`, a `Patch` only to `update`.
pub trait RemoteEntity: Clone + Debug + Send + Sync + 'static {
    /// The server-assigned identifier.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;

    /// The payload sent when creating a record.
    type Fields: Send + Debug + 'static;

    /// The partial payload sent when updating a record.
    type Patch: Send + Debug + 'static;

    /// The identifier of this record.
    fn id(&self) -> Self::Id;

    /// Checked locally before a create is sent. The default accepts everything.
    fn validate_create(_fields: &Self::Fields) -> Result<(), String> {
        Ok(())
    }
}

/// The remote side of the synchronizer.
///
/// Implementations perform exactly one round trip per call and never retry.
/// See [`HttpRemote`](crate::remote::HttpRemote) for the REST implementation and
/// [`MockRemote`](crate::framework::mock::MockRemote) for tests.
#[async_trait]
pub trait RemoteResource<T: RemoteEntity>: Send + Sync + 'static {
    /// Fetch the full remote collection, in server order.
    async fn list(&self) -> Result<Vec<T>, TransportError>;

    /// Create a record; returns it with its server-assigned id.
    async fn create(&self, fields: T::Fields) -> Result<T, TransportError>;

    /// Apply a partial update; returns the updated record as the server sees it.
    async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, TransportError>;

    /// Delete a record; returns the id the server confirms as deleted.
    async fn delete(&self, id: T::Id) -> Result<T::Id, TransportError>;
}

// =============================================================================
// 2. STATE, SNAPSHOTS & MESSAGES
// =============================================================================

/// The synchronizer's current in-flight/error/idle status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    /// The human-readable message of a failed operation.
    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// The Collection and Request State as published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    pub state: RequestState,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            state: RequestState::Idle,
        }
    }
}

/// Nouns used in operation-level error messages, e.g. "Failed to add product".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLabels {
    pub singular: String,
    pub plural: String,
}

impl ResourceLabels {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }
}

/// The four remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// The message published as `RequestState::Error` when this operation fails.
    pub fn failure_message(self, labels: &ResourceLabels) -> String {
        match self {
            Operation::Refresh => format!("Failed to fetch {}", labels.plural),
            Operation::Create => format!("Failed to add {}", labels.singular),
            Operation::Update => format!("Failed to update {}", labels.singular),
            Operation::Delete => format!("Failed to delete {}", labels.singular),
        }
    }
}

/// Type alias for the one-shot response channel used by the synchronizer.
pub type Response<T> = oneshot::Sender<Result<T, SyncError>>;

/// Requests sent from a [`SyncClient`] to its [`SyncActor`].
#[derive(Debug)]
pub enum SyncRequest<T: RemoteEntity> {
    Refresh {
        respond_to: Response<usize>,
    },
    Create {
        fields: T::Fields,
        respond_to: Response<T>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T::Id>,
    },
}

/// A finished round trip, applied on the control task.
enum Completion<T: RemoteEntity> {
    Refreshed {
        result: Result<Vec<T>, TransportError>,
        respond_to: Response<usize>,
    },
    Created {
        result: Result<T, TransportError>,
        respond_to: Response<T>,
    },
    Updated {
        result: Result<T, TransportError>,
        respond_to: Response<T>,
    },
    Deleted {
        result: Result<T::Id, TransportError>,
        respond_to: Response<T::Id>,
    },
}

// =============================================================================
// 3. THE SYNCHRONIZER (control task)
// =============================================================================

/// The control task that owns the Collection.
///
/// # Concurrency Model
/// Requests are read from one channel and never awaited inline: each round trip is
/// spawned as its own task and reports back on a completion channel. The Collection
/// is only touched here, when a completion is applied, so no lock guards it.
///
/// Because round trips run side by side, responses can arrive in any order. The one
/// that arrives last wins when two operations target the same record.
pub struct SyncActor<T: RemoteEntity, R: RemoteResource<T>> {
    receiver: mpsc::Receiver<SyncRequest<T>>,
    completions: mpsc::UnboundedReceiver<Completion<T>>,
    completion_sender: mpsc::UnboundedSender<Completion<T>>,
    remote: Arc<R>,
    records: Vec<T>,
    state: RequestState,
    in_flight: usize,
    labels: ResourceLabels,
    publisher: watch::Sender<Snapshot<T>>,
}

impl<T: RemoteEntity, R: RemoteResource<T>> SyncActor<T, R> {
    pub fn new(buffer_size: usize, remote: R, labels: ResourceLabels) -> (Self, SyncClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completion_sender, completions) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(Snapshot::default());
        let actor = Self {
            receiver,
            completions,
            completion_sender,
            remote: Arc::new(remote),
            records: Vec::new(),
            state: RequestState::Idle,
            in_flight: 0,
            labels,
            publisher,
        };
        let client = SyncClient::new(sender, snapshots);
        (actor, client)
    }

    /// Runs the event loop until every client is dropped and no round trip is pending.
    pub async fn run(mut self) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Synchronizer started");

        let mut accepting = true;
        loop {
            tokio::select! {
                msg = self.receiver.recv(), if accepting => match msg {
                    Some(request) => self.handle_request(request, entity_type),
                    None => accepting = false,
                },
                Some(done) = self.completions.recv() => self.apply(done, entity_type),
                else => break,
            }
            if !accepting && self.in_flight == 0 {
                break;
            }
        }

        info!(entity_type, size = self.records.len(), "Shutdown");
    }

    fn handle_request(&mut self, request: SyncRequest<T>, entity_type: &str) {
        match request {
            SyncRequest::Refresh { respond_to } => {
                debug!(entity_type, "Refresh");
                let remote = Arc::clone(&self.remote);
                self.dispatch(async move {
                    let result = remote.list().await;
                    Completion::Refreshed { result, respond_to }
                });
            }
            SyncRequest::Create { fields, respond_to } => {
                debug!(entity_type, ?fields, "Create");
                if let Err(e) = T::validate_create(&fields) {
                    warn!(entity_type, error = %e, "Create rejected");
                    let _ = respond_to.send(Err(SyncError::Validation(e)));
                    return;
                }
                let remote = Arc::clone(&self.remote);
                self.dispatch(async move {
                    let result = remote.create(fields).await;
                    Completion::Created { result, respond_to }
                });
            }
            SyncRequest::Update { id, patch, respond_to } => {
                debug!(entity_type, %id, ?patch, "Update");
                if self.position(&id).is_none() {
                    warn!(entity_type, %id, "Not found");
                    let _ = respond_to.send(Err(SyncError::NotFound(id.to_string())));
                    return;
                }
                let remote = Arc::clone(&self.remote);
                self.dispatch(async move {
                    let result = remote.update(id, patch).await;
                    Completion::Updated { result, respond_to }
                });
            }
            SyncRequest::Delete { id, respond_to } => {
                debug!(entity_type, %id, "Delete");
                let remote = Arc::clone(&self.remote);
                self.dispatch(async move {
                    let result = remote.delete(id).await;
                    Completion::Deleted { result, respond_to }
                });
            }
        }
    }

    /// Spawns a round trip and marks the synchronizer as loading.
    fn dispatch<F>(&mut self, round_trip: F)
    where
        F: Future<Output = Completion<T>> + Send + 'static,
    {
        self.in_flight += 1;
        self.state = RequestState::Loading;
        self.publish();

        let completions = self.completion_sender.clone();
        tokio::spawn(async move {
            let _ = completions.send(round_trip.await);
        });
    }

    /// Applies a finished round trip. The new snapshot is published before the caller is answered.
    fn apply(&mut self, completion: Completion<T>, entity_type: &str) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Refreshed { result, respond_to } => {
                let reply = match result {
                    Ok(records) => {
                        self.records = dedup_by_id(records, entity_type);
                        self.settle();
                        info!(entity_type, size = self.records.len(), "Refreshed");
                        Ok(self.records.len())
                    }
                    Err(e) => Err(self.fail(Operation::Refresh, e, entity_type)),
                };
                self.publish();
                let _ = respond_to.send(reply);
            }
            Completion::Created { result, respond_to } => {
                let reply = match result {
                    Ok(record) => {
                        let id = record.id();
                        match self.position(&id) {
                            Some(index) => {
                                warn!(entity_type, %id, "Server reused an existing id, replacing");
                                self.records[index] = record.clone();
                            }
                            None => self.records.push(record.clone()),
                        }
                        self.settle();
                        info!(entity_type, %id, size = self.records.len(), "Created");
                        Ok(record)
                    }
                    Err(e) => Err(self.fail(Operation::Create, e, entity_type)),
                };
                self.publish();
                let _ = respond_to.send(reply);
            }
            Completion::Updated { result, respond_to } => {
                let reply = match result {
                    Ok(record) => {
                        let id = record.id();
                        match self.position(&id) {
                            Some(index) => {
                                self.records[index] = record.clone();
                                info!(entity_type, %id, "Updated");
                            }
                            None => {
                                warn!(entity_type, %id, "No local record for response, discarded")
                            }
                        }
                        self.settle();
                        Ok(record)
                    }
                    Err(e) => Err(self.fail(Operation::Update, e, entity_type)),
                };
                self.publish();
                let _ = respond_to.send(reply);
            }
            Completion::Deleted { result, respond_to } => {
                let reply = match result {
                    Ok(id) => {
                        match self.position(&id) {
                            Some(index) => {
                                self.records.remove(index);
                                info!(entity_type, %id, size = self.records.len(), "Deleted");
                            }
                            None => {
                                warn!(entity_type, %id, "No local record for response, discarded")
                            }
                        }
                        self.settle();
                        Ok(id)
                    }
                    Err(e) => Err(self.fail(Operation::Delete, e, entity_type)),
                };
                self.publish();
                let _ = respond_to.send(reply);
            }
        }
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.records.iter().position(|record| record.id() == *id)
    }

    /// Loading while other round trips are still pending, idle otherwise.
    fn settle(&mut self) {
        self.state = if self.in_flight > 0 {
            RequestState::Loading
        } else {
            RequestState::Idle
        };
    }

    fn fail(
        &mut self,
        operation: Operation,
        source: TransportError,
        entity_type: &str,
    ) -> SyncError {
        let message = operation.failure_message(&self.labels);
        warn!(entity_type, ?operation, error = %source, "{}", message);
        self.state = RequestState::Error(message.clone());
        SyncError::Transport { message, source }
    }

    fn publish(&self) {
        self.publisher.send_replace(Snapshot {
            records: self.records.clone(),
            state: self.state.clone(),
        });
    }
}

/// Keeps the first occurrence of every id, preserving order.
fn dedup_by_id<T: RemoteEntity>(records: Vec<T>, entity_type: &str) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        let id = record.id();
        if !seen.insert(id.clone()) {
            warn!(entity_type, %id, "Duplicate id in remote collection, skipped");
            continue;
        }
        unique.push(record);
    }
    unique
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A cloneable handle for issuing operations against a [`SyncActor`].
///
/// Operations do not wait for each other: two calls awaited concurrently (e.g. with
/// `tokio::join!`) are both in flight at once.
#[derive(Clone)]
pub struct SyncClient<T: RemoteEntity> {
    sender: mpsc::Sender<SyncRequest<T>>,
    snapshots: watch::Receiver<Snapshot<T>>,
}

impl<T: RemoteEntity> SyncClient<T> {
    pub fn new(
        sender: mpsc::Sender<SyncRequest<T>>,
        snapshots: watch::Receiver<Snapshot<T>>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Replaces the local Collection with the remote one. Returns the new record count.
    pub async fn refresh(&self) -> Result<usize, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(SyncRequest::Refresh { respond_to })
            .await.map_err(|_| SyncError::ActorClosed)?;
        response.await.map_err(|_| SyncError::ActorDropped)?
    }

    pub async fn create(&self, fields: T::Fields) -> Result<T, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(SyncRequest::Create { fields, respond_to })
            .await.map_err(|_| SyncError::ActorClosed)?;
        response.await.map_err(|_| SyncError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(SyncRequest::Update { id, patch, respond_to })
            .await.map_err(|_| SyncError::ActorClosed)?;
        response.await.map_err(|_| SyncError::ActorDropped)?
    }

    pub async fn delete(&self, id: T::Id) -> Result<T::Id, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(SyncRequest::Delete { id, respond_to })
            .await.map_err(|_| SyncError::ActorClosed)?;
        response.await.map_err(|_| SyncError::ActorDropped)?
    }

    /// The latest published Collection and Request State.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshots.borrow().clone()
    }

    pub fn state(&self) -> RequestState {
        self.snapshots.borrow().state.clone()
    }

    /// Local lookup, no round trip.
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.snapshots
            .borrow()
            .records
            .iter()
            .find(|record| record.id() == *id)
            .cloned()
    }

    /// A receiver that is notified on every state change and Collection mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshots.clone()
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: u64,
        text: String,
    }

    #[derive(Debug)]
    struct NoteCreate {
        text: String,
    }

    #[derive(Debug)]
    struct NoteUpdate {
        text: Option<String>,
    }

    impl RemoteEntity for Note {
        type Id = u64;
        type Fields = NoteCreate;
        type Patch = NoteUpdate;

        fn id(&self) -> u64 {
            self.id
        }

        fn validate_create(fields: &NoteCreate) -> Result<(), String> {
            if fields.text.is_empty() {
                return Err("text is required".to_string());
            }
            Ok(())
        }
    }

    // --- A remote that keeps its own in-memory copy ---

    struct InMemoryRemote {
        notes: Mutex<Vec<Note>>,
        next_id: AtomicU64,
    }

    impl InMemoryRemote {
        fn with(notes: Vec<Note>) -> Self {
            let next = notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
            Self {
                notes: Mutex::new(notes),
                next_id: AtomicU64::new(next),
            }
        }
    }

    #[async_trait]
    impl RemoteResource<Note> for InMemoryRemote {
        async fn list(&self) -> Result<Vec<Note>, TransportError> {
            Ok(self.notes.lock().unwrap().clone())
        }

        async fn create(&self, fields: NoteCreate) -> Result<Note, TransportError> {
            let note = Note {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                text: fields.text,
            };
            self.notes.lock().unwrap().push(note.clone());
            Ok(note)
        }

        async fn update(&self, id: u64, patch: NoteUpdate) -> Result<Note, TransportError> {
            let mut notes = self.notes.lock().unwrap();
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(TransportError::Remote { status: 404, body: String::new() })?;
            if let Some(text) = patch.text {
                note.text = text;
            }
            Ok(note.clone())
        }

        async fn delete(&self, id: u64) -> Result<u64, TransportError> {
            let mut notes = self.notes.lock().unwrap();
            let before = notes.len();
            notes.retain(|n| n.id != id);
            if notes.len() == before {
                return Err(TransportError::Remote { status: 404, body: String::new() });
            }
            Ok(id)
        }
    }

    fn labels() -> ResourceLabels {
        ResourceLabels::new("note", "notes")
    }

    fn note(id: u64, text: &str) -> Note {
        Note { id, text: text.into() }
    }

    // --- Test ---

    #[tokio::test]
    async fn test_sync_actor_round_trips() {
        let remote = InMemoryRemote::with(vec![note(1, "first"), note(2, "second")]);
        let (actor, client) = SyncActor::<Note, _>::new(10, remote, labels());
        let handle = tokio::spawn(actor.run());

        // 1. Refresh
        assert_eq!(client.refresh().await.unwrap(), 2);
        assert_eq!(client.snapshot().records, vec![note(1, "first"), note(2, "second")]);
        assert_eq!(client.state(), RequestState::Idle);

        // 2. Create
        let created = client.create(NoteCreate { text: "third".into() }).await.unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(client.snapshot().records.len(), 3);

        // 3. Update keeps position
        let updated = client
            .update(1, NoteUpdate { text: Some("edited".into()) })
            .await
            .unwrap();
        assert_eq!(updated, note(1, "edited"));
        assert_eq!(client.snapshot().records[0], note(1, "edited"));

        // 4. Delete
        assert_eq!(client.delete(2).await.unwrap(), 2);
        assert_eq!(
            client.snapshot().records,
            vec![note(1, "edited"), note(3, "third")]
        );
        assert!(client.get(&2).is_none());

        // 5. Shutdown once every client is gone
        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_preconditions_do_not_touch_state() {
        let remote = InMemoryRemote::with(vec![note(1, "first")]);
        let (actor, client) = SyncActor::<Note, _>::new(10, remote, labels());
        tokio::spawn(actor.run());

        let err = client.create(NoteCreate { text: String::new() }).await.unwrap_err();
        assert_eq!(err, SyncError::Validation("text is required".into()));

        // Nothing fetched yet, so id 1 is not known locally.
        let err = client.update(1, NoteUpdate { text: None }).await.unwrap_err();
        assert_eq!(err, SyncError::NotFound("1".into()));

        assert_eq!(client.snapshot(), Snapshot::default());
    }

    #[tokio::test]
    async fn test_remote_failure_sets_error_and_recovers() {
        let remote = InMemoryRemote::with(vec![note(1, "first")]);
        let (actor, client) = SyncActor::<Note, _>::new(10, remote, labels());
        tokio::spawn(actor.run());

        client.refresh().await.unwrap();

        let err = client.delete(42).await.unwrap_err();
        assert_eq!(
            err.transport(),
            Some(&TransportError::Remote { status: 404, body: String::new() })
        );
        assert_eq!(client.state(), RequestState::Error("Failed to delete note".into()));
        assert_eq!(client.snapshot().records, vec![note(1, "first")]);

        // Still usable after the error.
        client.refresh().await.unwrap();
        assert_eq!(client.state(), RequestState::Idle);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let records = vec![note(1, "a"), note(2, "b"), note(1, "c")];
        assert_eq!(dedup_by_id(records, "Note"), vec![note(1, "a"), note(2, "b")]);
    }

    #[test]
    fn test_failure_messages() {
        let labels = ResourceLabels::new("product", "products");
        assert_eq!(Operation::Refresh.failure_message(&labels), "Failed to fetch products");
        assert_eq!(Operation::Create.failure_message(&labels), "Failed to add product");
        assert_eq!(Operation::Update.failure_message(&labels), "Failed to update product");
        assert_eq!(Operation::Delete.failure_message(&labels), "Failed to delete product");
    }
}
