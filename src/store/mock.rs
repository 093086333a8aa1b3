//! Test utilities for driving a [`StoreClient`] without a running
//! [`CollectionActor`](super::CollectionActor).
//!
//! [`mock_client`] returns a real client plus the receiving end of its
//! request channel; a test answers each request explicitly through the
//! `expect_*` helpers, which makes failure injection (returning a
//! [`StoreError`](super::StoreError)) deterministic.

use tokio::sync::mpsc;

use super::{Document, PutOutcome, Respond, StoreClient, StoreRequest, Subscription};

/// Creates a client whose request stream is held by the caller.
pub fn mock_client<T: Document>(buffer_size: usize) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Receives the next request and asserts it is a `Get`.
pub async fn expect_get<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Scope, T::Id, Respond<Option<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { scope, id, respond_to }) => Some((scope, id, respond_to)),
        _ => None,
    }
}

/// Receives the next request and asserts it is a `GetMany`.
pub async fn expect_get_many<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Scope, Vec<T::Id>, Respond<Vec<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::GetMany { scope, ids, respond_to }) => Some((scope, ids, respond_to)),
        _ => None,
    }
}

/// Receives the next request and asserts it is a `Put`.
pub async fn expect_put<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T, Respond<PutOutcome>)> {
    match receiver.recv().await {
        Some(StoreRequest::Put { doc, respond_to }) => Some((doc, respond_to)),
        _ => None,
    }
}

/// Receives the next request and asserts it is a `Patch`.
pub async fn expect_patch<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Scope, T::Id, T::Patch, Respond<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::Patch { scope, id, patch, respond_to }) => Some((scope, id, patch, respond_to)),
        _ => None,
    }
}

/// Receives the next request and asserts it is a `Remove`.
pub async fn expect_remove<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Scope, T::Id, Respond<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Remove { scope, id, respond_to }) => Some((scope, id, respond_to)),
        _ => None,
    }
}

/// Receives the next request and asserts it is a `Watch`.
pub async fn expect_watch<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Scope, Respond<Subscription<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Watch { scope, respond_to }) => Some((scope, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
    }

    impl Document for Row {
        type Scope = ();
        type Id = String;
        type Patch = ();

        fn scope(&self) {}

        fn id(&self) -> String {
            self.id.clone()
        }

        fn apply_patch(&mut self, _patch: ()) {}
    }

    #[tokio::test]
    async fn mocked_get_answers_with_injected_error() {
        let (client, mut receiver) = mock_client::<Row>(8);

        let get = tokio::spawn(async move { client.get((), "r1".to_string()).await });

        let (_, id, respond_to) = expect_get(&mut receiver).await.expect("expected Get request");
        assert_eq!(id, "r1");
        respond_to.send(Err(StoreError::Closed)).unwrap();

        assert_eq!(get.await.unwrap(), Err(StoreError::Closed));
    }
}
