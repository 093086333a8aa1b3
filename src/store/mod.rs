//! # Document store engine
//!
//! The generic building blocks behind every collection in the system.
//!
//! ## Key Types
//!
//! - [`Document`]: the trait a resource type implements to be stored.
//! - [`CollectionActor`]: the actor owning all documents of one type.
//! - [`StoreClient`]: the generic client for talking to a collection.
//! - [`Subscription`]: a live snapshot stream for one scope.
//! - [`StoreError`]: common errors (closed channel, not found, conflict).
//!
//! Each [`CollectionActor`] runs in its own task and processes requests
//! sequentially, so documents need no locking. Mutations are atomic with
//! respect to each other; `Put` in particular decides create-vs-replace
//! inside the actor, not in the caller. After every mutation the actor
//! publishes the affected scope's full snapshot to all watchers.

pub mod mock;

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Trait a resource type must implement to be managed by [`CollectionActor`].
///
/// Documents are partitioned by `Scope` (e.g. a poll id) and keyed by `Id`
/// within their scope. `Id` is `Ord` so scope snapshots have a stable order.
/// `Patch` carries a partial update applied via [`Document::apply_patch`].
pub trait Document: Clone + Send + Sync + 'static {
    /// The partition this document lives in.
    type Scope: Eq + Hash + Clone + Send + Sync + Debug;

    /// The unique key within the scope.
    type Id: Eq + Hash + Ord + Clone + Send + Sync + Debug + Display;

    /// Partial-update payload.
    type Patch: Send + Sync + Debug;

    fn scope(&self) -> Self::Scope;

    fn id(&self) -> Self::Id;

    /// Merge a partial update into this document.
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Errors produced by the store layer.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Document already exists: {0}")]
    Conflict(String),
}

/// Outcome of an atomic upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No document with this id existed before.
    Created,
    /// An existing document was overwritten.
    Replaced,
}

/// A live snapshot stream for one scope: the state at subscription time plus
/// a receiver delivering the full scope snapshot after every mutation.
///
/// Snapshots supersede one another, so a lagged receiver may simply skip to
/// the newest one; consumers must tolerate duplicate delivery.
#[derive(Debug)]
pub struct Subscription<T> {
    pub initial: Vec<T>,
    pub updates: broadcast::Receiver<Vec<T>>,
}

/// Type alias for the one-shot response channel used by the store.
pub type Respond<V> = oneshot::Sender<Result<V, StoreError>>;

/// Requests processed by a [`CollectionActor`].
pub enum StoreRequest<T: Document> {
    Get {
        scope: T::Scope,
        id: T::Id,
        respond_to: Respond<Option<T>>,
    },
    /// Batched lookup; returns only the documents that exist, in id order
    /// of the request.
    GetMany {
        scope: T::Scope,
        ids: Vec<T::Id>,
        respond_to: Respond<Vec<T>>,
    },
    List {
        scope: T::Scope,
        respond_to: Respond<Vec<T>>,
    },
    /// Create; fails with [`StoreError::Conflict`] if the id is taken.
    Insert {
        doc: T,
        respond_to: Respond<()>,
    },
    /// Atomic create-or-replace.
    Put {
        doc: T,
        respond_to: Respond<PutOutcome>,
    },
    Patch {
        scope: T::Scope,
        id: T::Id,
        patch: T::Patch,
        respond_to: Respond<T>,
    },
    Remove {
        scope: T::Scope,
        id: T::Id,
        respond_to: Respond<()>,
    },
    Watch {
        scope: T::Scope,
        respond_to: Respond<Subscription<T>>,
    },
}

/// The actor owning every document of one type.
///
/// State lives exclusively inside the task running [`CollectionActor::run`];
/// all access goes through a [`StoreClient`]. Watchers are broadcast senders
/// kept per scope and dropped once their last receiver goes away.
pub struct CollectionActor<T: Document> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    docs: HashMap<T::Scope, BTreeMap<T::Id, T>>,
    watchers: HashMap<T::Scope, broadcast::Sender<Vec<T>>>,
    watch_capacity: usize,
}

impl<T: Document> CollectionActor<T> {
    pub fn new(buffer_size: usize, watch_capacity: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            docs: HashMap::new(),
            watchers: HashMap::new(),
            watch_capacity: watch_capacity.max(1),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the collection's event loop until every client is dropped.
    pub async fn run(mut self) {
        let doc_type = std::any::type_name::<T>().split("::").last().unwrap_or("Unknown");
        info!(doc_type, "Collection started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get { scope, id, respond_to } => {
                    let doc = self.docs.get(&scope).and_then(|m| m.get(&id)).cloned();
                    debug!(doc_type, ?scope, %id, found = doc.is_some(), "Get");
                    let _ = respond_to.send(Ok(doc));
                }
                StoreRequest::GetMany { scope, ids, respond_to } => {
                    let found = match self.docs.get(&scope) {
                        Some(m) => ids.iter().filter_map(|id| m.get(id)).cloned().collect(),
                        None => Vec::new(),
                    };
                    debug!(doc_type, ?scope, requested = ids.len(), "GetMany");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::List { scope, respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot(&scope)));
                }
                StoreRequest::Insert { doc, respond_to } => {
                    let (scope, id) = (doc.scope(), doc.id());
                    let slot = self.docs.entry(scope.clone()).or_default();
                    if slot.contains_key(&id) {
                        warn!(doc_type, ?scope, %id, "Insert conflict");
                        let _ = respond_to.send(Err(StoreError::Conflict(id.to_string())));
                    } else {
                        slot.insert(id.clone(), doc);
                        info!(doc_type, ?scope, %id, "Created");
                        let _ = respond_to.send(Ok(()));
                        self.publish(&scope);
                    }
                }
                StoreRequest::Put { doc, respond_to } => {
                    let (scope, id) = (doc.scope(), doc.id());
                    let previous = self.docs.entry(scope.clone()).or_default().insert(id.clone(), doc);
                    let outcome = if previous.is_some() { PutOutcome::Replaced } else { PutOutcome::Created };
                    info!(doc_type, ?scope, %id, ?outcome, "Put");
                    let _ = respond_to.send(Ok(outcome));
                    self.publish(&scope);
                }
                StoreRequest::Patch { scope, id, patch, respond_to } => {
                    match self.docs.get_mut(&scope).and_then(|m| m.get_mut(&id)) {
                        Some(doc) => {
                            doc.apply_patch(patch);
                            let updated = doc.clone();
                            info!(doc_type, ?scope, %id, "Patched");
                            let _ = respond_to.send(Ok(updated));
                            self.publish(&scope);
                        }
                        None => {
                            warn!(doc_type, ?scope, %id, "Not found");
                            let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        }
                    }
                }
                StoreRequest::Remove { scope, id, respond_to } => {
                    match self.docs.get_mut(&scope).and_then(|m| m.remove(&id)) {
                        Some(_) => {
                            info!(doc_type, ?scope, %id, "Removed");
                            let _ = respond_to.send(Ok(()));
                            self.publish(&scope);
                        }
                        None => {
                            warn!(doc_type, ?scope, %id, "Not found");
                            let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        }
                    }
                }
                StoreRequest::Watch { scope, respond_to } => {
                    let capacity = self.watch_capacity;
                    let sender = self
                        .watchers
                        .entry(scope.clone())
                        .or_insert_with(|| broadcast::channel(capacity).0);
                    let subscription = Subscription {
                        initial: self.docs.get(&scope).map(|m| m.values().cloned().collect()).unwrap_or_default(),
                        updates: sender.subscribe(),
                    };
                    debug!(doc_type, ?scope, watchers = sender.receiver_count(), "Watch");
                    let _ = respond_to.send(Ok(subscription));
                }
            }
        }

        info!(doc_type, scopes = self.docs.len(), "Collection shutdown");
    }

    fn snapshot(&self, scope: &T::Scope) -> Vec<T> {
        self.docs.get(scope).map(|m| m.values().cloned().collect()).unwrap_or_default()
    }

    /// Push the scope's current snapshot to its watchers, if any. A send
    /// error means the last receiver is gone; the watcher entry is dropped.
    fn publish(&mut self, scope: &T::Scope) {
        let snapshot = self.snapshot(scope);
        if let Some(sender) = self.watchers.get(scope) {
            if sender.send(snapshot).is_err() {
                self.watchers.remove(scope);
            }
        }
    }
}

/// A type-safe client for a [`CollectionActor`].
#[derive(Clone)]
pub struct StoreClient<T: Document> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Document> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn get(&self, scope: T::Scope, id: T::Id) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get { scope, id, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn get_many(&self, scope: T::Scope, ids: Vec<T::Id>) -> Result<Vec<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::GetMany { scope, ids, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn list(&self, scope: T::Scope) -> Result<Vec<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::List { scope, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, doc: T) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { doc, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn put(&self, doc: T) -> Result<PutOutcome, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Put { doc, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn patch(&self, scope: T::Scope, id: T::Id, patch: T::Patch) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Patch { scope, id, patch, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn remove(&self, scope: T::Scope, id: T::Id) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Remove { scope, id, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn watch(&self, scope: T::Scope) -> Result<Subscription<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Watch { scope, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        room: String,
        key: String,
        value: u32,
    }

    #[derive(Debug)]
    struct EntryPatch {
        value: u32,
    }

    impl Document for Entry {
        type Scope = String;
        type Id = String;
        type Patch = EntryPatch;

        fn scope(&self) -> String {
            self.room.clone()
        }

        fn id(&self) -> String {
            self.key.clone()
        }

        fn apply_patch(&mut self, patch: EntryPatch) {
            self.value = patch.value;
        }
    }

    fn entry(room: &str, key: &str, value: u32) -> Entry {
        Entry { room: room.into(), key: key.into(), value }
    }

    #[tokio::test]
    async fn put_reports_created_then_replaced() {
        let (actor, client) = CollectionActor::new(8, 8);
        tokio::spawn(actor.run());

        let first = client.put(entry("a", "k", 1)).await.unwrap();
        assert_eq!(first, PutOutcome::Created);

        let second = client.put(entry("a", "k", 2)).await.unwrap();
        assert_eq!(second, PutOutcome::Replaced);

        let listed = client.list("a".to_string()).await.unwrap();
        assert_eq!(listed, vec![entry("a", "k", 2)]);
    }

    #[tokio::test]
    async fn insert_conflicts_on_existing_id() {
        let (actor, client) = CollectionActor::new(8, 8);
        tokio::spawn(actor.run());

        client.insert(entry("a", "k", 1)).await.unwrap();
        let err = client.insert(entry("a", "k", 2)).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("k".to_string()));
    }

    #[tokio::test]
    async fn watch_delivers_snapshot_per_mutation() {
        let (actor, client) = CollectionActor::new(8, 8);
        tokio::spawn(actor.run());

        client.put(entry("a", "k1", 1)).await.unwrap();
        let mut sub = client.watch("a".to_string()).await.unwrap();
        assert_eq!(sub.initial, vec![entry("a", "k1", 1)]);

        client.put(entry("a", "k2", 2)).await.unwrap();
        let snap = sub.updates.recv().await.unwrap();
        assert_eq!(snap.len(), 2);

        client.remove("a".to_string(), "k1".to_string()).await.unwrap();
        let snap = sub.updates.recv().await.unwrap();
        assert_eq!(snap, vec![entry("a", "k2", 2)]);
    }

    #[tokio::test]
    async fn mutations_in_other_scopes_are_not_broadcast() {
        let (actor, client) = CollectionActor::new(8, 8);
        tokio::spawn(actor.run());

        let mut sub = client.watch("a".to_string()).await.unwrap();
        client.put(entry("b", "k", 1)).await.unwrap();
        client.put(entry("a", "k", 1)).await.unwrap();

        let snap = sub.updates.recv().await.unwrap();
        assert_eq!(snap, vec![entry("a", "k", 1)]);
    }

    #[tokio::test]
    async fn patch_and_remove_report_missing_documents() {
        let (actor, client) = CollectionActor::<Entry>::new(8, 8);
        tokio::spawn(actor.run());

        let err = client
            .patch("a".to_string(), "k".to_string(), EntryPatch { value: 9 })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("k".to_string()));

        let err = client.remove("a".to_string(), "k".to_string()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("k".to_string()));
    }
}
