//! # Mock Remote
//!
//! Utilities for testing the synchronizer without a network.
//!
//! [`MockRemote`] implements [`RemoteResource`] from a queue of expectations.
//! Each expectation can be *gated*: its response is held back until the test opens
//! the [`Gate`], which lets a test decide the order in which responses arrive.

use crate::framework::{RemoteEntity, RemoteResource, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// =============================================================================
// EXPECTATIONS
// =============================================================================

/// A canned response, optionally held until a gate opens.
struct Reply<R> {
    response: Result<R, TransportError>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<R> Reply<R> {
    async fn resolve(self) -> Result<R, TransportError> {
        if let Some(gate) = self.gate {
            // A dropped gate releases the response as well.
            let _ = gate.await;
        }
        self.response
    }
}

enum Expectation<T: RemoteEntity> {
    List { reply: Reply<Vec<T>> },
    Create { reply: Reply<T> },
    Update { id: T::Id, reply: Reply<T> },
    Delete { id: T::Id, reply: Reply<T::Id> },
}

/// A request the mock received, in arrival order.
#[derive(Debug)]
pub enum RecordedCall<T: RemoteEntity> {
    List,
    Create(T::Fields),
    Update(T::Id, T::Patch),
    Delete(T::Id),
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// Releases a gated response.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

// =============================================================================
// MOCK REMOTE
// =============================================================================

/// A [`RemoteResource`] driven by expectations.
///
/// Requests are matched against the first pending expectation of the same kind
/// (and, for update/delete, the same id), so round trips that start in any order
/// still pick up the right response.
///
/// # Example
/// ```ignore
/// let mock = MockRemote::<Record>::new();
/// mock.expect_list().return_ok(vec![record]);
/// let (pending, gate) = mock.expect_create().gated();
/// pending.return_err(TransportError::Network("offline".into()));
///
/// let (actor, client) = SyncActor::new(8, mock.clone(), labels);
/// // ... drive the client, then `gate.open()` ...
/// mock.verify();
/// ```
pub struct MockRemote<T: RemoteEntity> {
    expectations: Expectations<T>,
    calls: Arc<Mutex<Vec<RecordedCall<T>>>>,
    unexpected: Arc<Mutex<Vec<String>>>,
}

impl<T: RemoteEntity> Clone for MockRemote<T> {
    fn clone(&self) -> Self {
        Self {
            expectations: self.expectations.clone(),
            calls: self.calls.clone(),
            unexpected: self.unexpected.clone(),
        }
    }
}

impl<T: RemoteEntity> Default for MockRemote<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RemoteEntity> MockRemote<T> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            unexpected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Expects a `list` call.
    pub fn expect_list(&self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(Box::new(|reply: Reply<Vec<T>>| Expectation::List { reply }))
    }

    /// Expects a `create` call.
    pub fn expect_create(&self) -> ExpectationBuilder<T, T> {
        self.builder(Box::new(|reply: Reply<T>| Expectation::Create { reply }))
    }

    /// Expects an `update` call for `id`.
    pub fn expect_update(&self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(Box::new(move |reply: Reply<T>| Expectation::Update { id, reply }))
    }

    /// Expects a `delete` call for `id`.
    pub fn expect_delete(&self, id: T::Id) -> ExpectationBuilder<T, T::Id> {
        self.builder(Box::new(move |reply: Reply<T::Id>| Expectation::Delete { id, reply }))
    }

    fn builder<R>(
        &self,
        build: Box<dyn FnOnce(Reply<R>) -> Expectation<T>>,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            gate: None,
            build,
        }
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Drains the recorded requests.
    pub fn take_calls(&self) -> Vec<RecordedCall<T>> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let unexpected = self.unexpected.lock().unwrap();
        if !unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", *unexpected);
        }
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn record(&self, call: RecordedCall<T>) {
        self.calls.lock().unwrap().push(call);
    }

    fn take(&self, matches: impl Fn(&Expectation<T>) -> bool) -> Option<Expectation<T>> {
        let mut exps = self.expectations.lock().unwrap();
        let index = exps.iter().position(matches)?;
        exps.remove(index)
    }

    fn unexpected(&self, request: String) -> TransportError {
        self.unexpected.lock().unwrap().push(request.clone());
        TransportError::Network(format!("unexpected request: {}", request))
    }
}

#[async_trait]
impl<T: RemoteEntity> RemoteResource<T> for MockRemote<T> {
    async fn list(&self) -> Result<Vec<T>, TransportError> {
        self.record(RecordedCall::List);
        match self.take(|e| matches!(e, Expectation::List { .. })) {
            Some(Expectation::List { reply }) => reply.resolve().await,
            _ => Err(self.unexpected("list".to_string())),
        }
    }

    async fn create(&self, fields: T::Fields) -> Result<T, TransportError> {
        self.record(RecordedCall::Create(fields));
        match self.take(|e| matches!(e, Expectation::Create { .. })) {
            Some(Expectation::Create { reply }) => reply.resolve().await,
            _ => Err(self.unexpected("create".to_string())),
        }
    }

    async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, TransportError> {
        let expectation = self.take(|e| {
            matches!(e, Expectation::Update { id: expected, .. } if *expected == id)
        });
        let request = format!("update {}", id);
        self.record(RecordedCall::Update(id, patch));
        match expectation {
            Some(Expectation::Update { reply, .. }) => reply.resolve().await,
            _ => Err(self.unexpected(request)),
        }
    }

    async fn delete(&self, id: T::Id) -> Result<T::Id, TransportError> {
        let expectation = self.take(|e| {
            matches!(e, Expectation::Delete { id: expected, .. } if *expected == id)
        });
        let request = format!("delete {}", id);
        self.record(RecordedCall::Delete(id));
        match expectation {
            Some(Expectation::Delete { reply, .. }) => reply.resolve().await,
            _ => Err(self.unexpected(request)),
        }
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Builder returned by the `expect_*` methods of [`MockRemote`].
pub struct ExpectationBuilder<T: RemoteEntity, R> {
    expectations: Expectations<T>,
    gate: Option<oneshot::Receiver<()>>,
    build: Box<dyn FnOnce(Reply<R>) -> Expectation<T>>,
}

impl<T: RemoteEntity, R> ExpectationBuilder<T, R> {
    /// Holds the response back until the returned [`Gate`] is opened.
    pub fn gated(mut self) -> (Self, Gate) {
        let (open, wait) = oneshot::channel();
        self.gate = Some(wait);
        (self, Gate(open))
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, TransportError>) {
        let Self { expectations, gate, build } = self;
        let expectation = build(Reply { response, gate });
        expectations.lock().unwrap().push_back(expectation);
    }
}
