//! The poll/order session controller.
//!
//! [`SessionActor`] is the live heart of a poll page: it fetches the poll
//! and the acting user's own order, follows the poll document and the
//! poll's order list through store subscriptions, and serves the mutation
//! commands a UI issues. Both snapshot streams and all commands are merged
//! into one sequentially processed loop, so every handler observes a
//! consistent state without locks.
//!
//! Mutations never return an error: every outcome the user should see is
//! funnelled into the injected [`Notifier`](crate::notify::Notifier), and
//! the current [`SessionView`] is published through a watch channel after
//! every change (including the in-flight `submitting` bracket).

pub mod deadline;

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::{OrderClient, PollClient, StoreBacked, UserClient};
use crate::model::{
    with_menu_url, EnrichedOrder, Order, OrderDraft, OrderPatch, Poll, PollId, PollPatch, UserId,
};
use crate::notify::{Notice, NotifierHandle};
use crate::order_actor::OrderError;
use crate::store::{PutOutcome, Subscription};
use deadline::DeadlinePhase;

/// Display name used when enrichment cannot resolve a user id.
pub const UNKNOWN_USER: &str = "Unknown user";

/// The collaborators injected into every session.
#[derive(Clone)]
pub struct SessionContext {
    pub polls: PollClient,
    pub orders: OrderClient,
    pub users: UserClient,
    pub notifier: NotifierHandle,
}

/// Commands a UI issues against the session.
enum SessionRequest {
    SubmitOrder {
        draft: OrderDraft,
        done: oneshot::Sender<()>,
    },
    CloseOrdering {
        done: oneshot::Sender<()>,
    },
    DeleteOrder {
        done: oneshot::Sender<()>,
    },
    AmendOrder {
        user_id: UserId,
        patch: OrderPatch,
        done: oneshot::Sender<()>,
    },
    SetMenuUrl {
        url: String,
        done: oneshot::Sender<()>,
    },
}

/// Snapshot events forwarded from the store subscriptions.
enum SessionEvent {
    Orders(Vec<Order>),
    Poll(Option<Poll>),
}

/// The state a UI renders from.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub poll: Option<Poll>,
    /// The poll's orders, enriched with display names.
    pub orders: Vec<EnrichedOrder>,
    /// The acting user's own order, if any.
    pub user_order: Option<Order>,
    /// True until the first successful order-list resolution.
    pub loading: bool,
    /// True while a submit or delete write is in flight.
    pub submitting: bool,
}

impl SessionView {
    /// Whether the ordering deadline has passed, evaluated against the
    /// wall clock at call time.
    pub fn ordering_ended(&self) -> bool {
        self.poll.as_ref().is_some_and(|poll| poll.ordering_ended(Utc::now()))
    }

    /// Sum of all visible orders' costs.
    pub fn total_cost(&self) -> f64 {
        self.orders.iter().map(|enriched| enriched.order.cost).sum()
    }
}

/// Handle to a running [`SessionActor`].
///
/// Dropping the handle (or calling [`SessionHandle::shutdown`]) stops the
/// actor and cancels both subscriptions; no state update is observable
/// afterwards.
pub struct SessionHandle {
    requests: mpsc::Sender<SessionRequest>,
    view: watch::Receiver<SessionView>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// The latest published state.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// A receiver that can await state changes.
    pub fn watch_view(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Submits (or replaces) the acting user's order.
    pub async fn submit_order(&self, draft: OrderDraft) {
        self.request(|done| SessionRequest::SubmitOrder { draft, done }).await;
    }

    /// Stamps the poll's ordering deadline to now. No role check happens
    /// here; authorization is enforced by the layer exposing this call.
    pub async fn close_ordering(&self) {
        self.request(|done| SessionRequest::CloseOrdering { done }).await;
    }

    /// Deletes the acting user's own order.
    pub async fn delete_order(&self) {
        self.request(|done| SessionRequest::DeleteOrder { done }).await;
    }

    /// Administrative override: merges partial fields over the addressed
    /// user's order.
    pub async fn amend_order(&self, user_id: UserId, patch: OrderPatch) {
        self.request(|done| SessionRequest::AmendOrder { user_id, patch, done }).await;
    }

    /// Rewrites the menu URL of the poll's selected restaurant.
    pub async fn set_menu_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.request(|done| SessionRequest::SetMenuUrl { url, done }).await;
    }

    /// Stops the actor and waits for it to finish.
    pub async fn shutdown(self) {
        drop(self.requests);
        let _ = self.task.await;
    }

    async fn request(&self, make: impl FnOnce(oneshot::Sender<()>) -> SessionRequest) {
        let (done, completed) = oneshot::channel();
        if self.requests.send(make(done)).await.is_ok() {
            let _ = completed.await;
        }
    }
}

/// The controller actor. See the module docs for the protocol.
pub struct SessionActor {
    poll_id: Option<PollId>,
    user_id: Option<UserId>,
    ctx: SessionContext,
    requests: mpsc::Receiver<SessionRequest>,
    events: mpsc::Receiver<SessionEvent>,
    // Kept open so the event channel never closes under the select loop;
    // forwarder tasks hold clones.
    events_tx: mpsc::Sender<SessionEvent>,
    view_tx: watch::Sender<SessionView>,
    state: SessionView,
    phase: DeadlinePhase,
    forwarders: Vec<JoinHandle<()>>,
}

impl SessionActor {
    /// Spawns a session for `poll_id` as `user_id`. Either identifier may
    /// be absent (e.g. before authentication resolves); nothing is fetched
    /// or subscribed until both are present, and every mutation no-ops.
    pub fn spawn(poll_id: Option<PollId>, user_id: Option<UserId>, ctx: SessionContext) -> SessionHandle {
        let (requests_tx, requests_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::channel(32);
        let state = SessionView {
            loading: poll_id.is_some() && user_id.is_some(),
            ..SessionView::default()
        };
        let (view_tx, view_rx) = watch::channel(state.clone());

        let actor = Self {
            poll_id,
            user_id,
            ctx,
            requests: requests_rx,
            events: events_rx,
            events_tx,
            view_tx,
            state,
            phase: DeadlinePhase::default(),
            forwarders: Vec::new(),
        };
        let task = tokio::spawn(actor.run());

        SessionHandle {
            requests: requests_tx,
            view: view_rx,
            task,
        }
    }

    async fn run(mut self) {
        self.initialize().await;

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
                Some(event) = self.events.recv() => {
                    self.handle_event(event).await;
                    self.publish();
                }
            }
        }

        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        debug!(poll_id = ?self.poll_id, "Session stopped");
    }

    /// Initial fetches plus the two live subscriptions. A removed poll
    /// aborts setup after notifying; transient fetch errors notify and
    /// continue, since the subscriptions heal the state on the next
    /// snapshot.
    async fn initialize(&mut self) {
        let (Some(poll_id), Some(user_id)) = (self.poll_id.clone(), self.user_id.clone()) else {
            return;
        };
        info!(%poll_id, %user_id, "Session starting");

        match self.ctx.polls.get(&poll_id).await {
            Ok(Some(poll)) => self.state.poll = Some(poll),
            Ok(None) => {
                self.notify(Notice::error(
                    "Poll removed",
                    "This poll has been removed by an administrator.",
                ))
                .await;
                self.state.loading = false;
                self.publish();
                return;
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch poll");
                self.notify(Notice::error("Error", "Could not load the poll. Please try again."))
                    .await;
            }
        }

        match self.ctx.orders.get(poll_id.clone(), user_id.clone()).await {
            Ok(order) => self.state.user_order = order,
            Err(err) => warn!(error = %err, "Failed to fetch own order"),
        }

        match self.ctx.orders.watch(&poll_id).await {
            Ok(Subscription { initial, updates }) => {
                self.forward_orders(updates);
                self.apply_orders_snapshot(initial).await;
            }
            Err(err) => warn!(error = %err, "Failed to subscribe to orders"),
        }

        match self.ctx.polls.watch(&poll_id).await {
            Ok((current, updates)) => {
                self.forward_poll(updates);
                self.apply_poll_snapshot(current).await;
            }
            Err(err) => warn!(error = %err, "Failed to subscribe to poll"),
        }

        self.publish();
    }

    fn forward_orders(&mut self, mut updates: broadcast::Receiver<Vec<Order>>) {
        let events = self.events_tx.clone();
        self.forwarders.push(tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(snapshot) => {
                        if events.send(SessionEvent::Orders(snapshot)).await.is_err() {
                            break;
                        }
                    }
                    // Snapshots supersede one another; skip to the newest.
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Orders stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    fn forward_poll(&mut self, mut updates: broadcast::Receiver<Vec<Poll>>) {
        let events = self.events_tx.clone();
        self.forwarders.push(tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(snapshot) => {
                        let poll = snapshot.into_iter().next();
                        if events.send(SessionEvent::Poll(poll)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Poll stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Orders(snapshot) => self.apply_orders_snapshot(snapshot).await,
            SessionEvent::Poll(snapshot) => self.apply_poll_snapshot(snapshot).await,
        }
    }

    /// Joins the raw snapshot against a batched name lookup. On lookup
    /// failure the previous list is kept (no partial state), and `loading`
    /// only clears on success.
    async fn apply_orders_snapshot(&mut self, orders: Vec<Order>) {
        let mut ids: Vec<UserId> = orders.iter().map(|order| order.user_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let users = match self.ctx.users.get_many(ids).await {
            Ok(users) => users,
            Err(err) => {
                warn!(error = %err, "Failed to resolve user names");
                return;
            }
        };
        let names: HashMap<UserId, String> =
            users.into_iter().map(|user| (user.id, user.name)).collect();

        self.state.orders = orders
            .into_iter()
            .map(|order| {
                let user_name = names
                    .get(&order.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string());
                EnrichedOrder { order, user_name }
            })
            .collect();
        self.state.loading = false;
    }

    async fn apply_poll_snapshot(&mut self, poll: Option<Poll>) {
        // Deletion mid-session: keep the last known poll; the removal
        // notice fires only on the initial fetch.
        let Some(poll) = poll else { return };

        let (phase, emit) = self.phase.observe(poll.ordering_ends_at, Utc::now());
        self.phase = phase;
        if emit {
            self.notify(Notice::error(
                "Ordering closed",
                "The administrator has closed ordering.",
            ))
            .await;
        }
        self.state.poll = Some(poll);
    }

    async fn handle_request(&mut self, request: SessionRequest) {
        match request {
            SessionRequest::SubmitOrder { draft, done } => {
                self.submit_order(draft).await;
                let _ = done.send(());
            }
            SessionRequest::CloseOrdering { done } => {
                self.close_ordering().await;
                let _ = done.send(());
            }
            SessionRequest::DeleteOrder { done } => {
                self.delete_order().await;
                let _ = done.send(());
            }
            SessionRequest::AmendOrder { user_id, patch, done } => {
                self.amend_order(user_id, patch).await;
                let _ = done.send(());
            }
            SessionRequest::SetMenuUrl { url, done } => {
                self.set_menu_url(url).await;
                let _ = done.send(());
            }
        }
    }

    async fn submit_order(&mut self, draft: OrderDraft) {
        let (Some(poll_id), Some(user_id)) = (self.poll_id.clone(), self.user_id.clone()) else {
            return;
        };
        let Some(poll) = self.state.poll.clone() else { return };

        if poll.ordering_ended(Utc::now()) {
            self.notify(Notice::error(
                "Time is up",
                "Orders can no longer be placed; the ordering window has closed.",
            ))
            .await;
            self.publish();
            return;
        }

        self.set_submitting(true);
        match self.ctx.orders.submit(&poll_id, &user_id, draft).await {
            Ok((order, PutOutcome::Created)) => {
                self.state.user_order = Some(order);
                self.notify(Notice::info("Order placed", "Your order has been placed.")).await;
            }
            Ok((order, PutOutcome::Replaced)) => {
                self.state.user_order = Some(order);
                self.notify(Notice::info("Order updated", "Your order has been updated.")).await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to submit order");
                self.notify(Notice::error(
                    "Error",
                    "Could not submit your order. Please try again.",
                ))
                .await;
            }
        }
        self.set_submitting(false);
    }

    async fn close_ordering(&mut self) {
        let (Some(poll_id), Some(_)) = (self.poll_id.clone(), self.user_id.clone()) else {
            return;
        };
        if self.state.poll.is_none() {
            return;
        }

        let patch = PollPatch {
            ordering_ends_at: Some(Utc::now()),
            ..PollPatch::default()
        };
        match self.ctx.polls.update(&poll_id, patch).await {
            Ok(updated) => {
                self.state.poll = Some(updated);
                self.notify(Notice::info(
                    "Ordering closed",
                    "Order collection has been closed by the administrator.",
                ))
                .await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to close ordering");
                self.notify(Notice::error("Error", "Could not close ordering.")).await;
            }
        }
        self.publish();
    }

    async fn delete_order(&mut self) {
        let (Some(poll_id), Some(user_id)) = (self.poll_id.clone(), self.user_id.clone()) else {
            return;
        };
        if self.state.user_order.is_none() {
            return;
        }

        self.set_submitting(true);
        match self.ctx.orders.remove(poll_id, user_id).await {
            Ok(()) => {
                self.state.user_order = None;
                self.notify(Notice::info("Order deleted", "Your order has been deleted.")).await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to delete order");
                self.notify(Notice::error(
                    "Error",
                    "Could not delete your order. Please try again.",
                ))
                .await;
            }
        }
        self.set_submitting(false);
    }

    async fn amend_order(&mut self, user_id: UserId, patch: OrderPatch) {
        let Some(poll_id) = self.poll_id.clone() else { return };
        if self.state.poll.is_none() {
            return;
        }

        match self.ctx.orders.amend(&poll_id, &user_id, patch).await {
            Ok(_) => {
                self.notify(Notice::info(
                    "Order updated",
                    "The order has been updated by the administrator.",
                ))
                .await;
            }
            // No order for the addressed user: silent no-op.
            Err(OrderError::NotFound(_)) => {
                debug!(%user_id, "No order to amend");
            }
            Err(err) => {
                warn!(error = %err, "Failed to amend order");
                self.notify(Notice::error("Error", "Could not update the order.")).await;
            }
        }
        self.publish();
    }

    async fn set_menu_url(&mut self, url: String) {
        let Some(poll_id) = self.poll_id.clone() else { return };
        let Some(poll) = self.state.poll.clone() else { return };
        let Some(restaurant) = poll.selected_restaurant.clone() else { return };

        // The empty string clears the link.
        let url = (!url.is_empty()).then_some(url);
        let options = with_menu_url(&poll.restaurant_options, &restaurant, url.as_deref());

        let patch = PollPatch {
            restaurant_options: Some(options),
            ..PollPatch::default()
        };
        match self.ctx.polls.update(&poll_id, patch).await {
            Ok(updated) => {
                self.state.poll = Some(updated);
                self.notify(Notice::info(
                    "Menu link updated",
                    "The menu link has been updated.",
                ))
                .await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to update menu link");
                self.notify(Notice::error("Error", "Could not update the menu link.")).await;
            }
        }
        self.publish();
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.state.submitting = submitting;
        self.publish();
    }

    fn publish(&self) {
        let _ = self.view_tx.send(self.state.clone());
    }

    async fn notify(&self, notice: Notice) {
        self.ctx.notifier.notify(notice).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PollId;

    fn enriched(user: &str, cost: f64) -> EnrichedOrder {
        EnrichedOrder {
            order: Order {
                poll_id: PollId::from("poll_1"),
                user_id: UserId::from(user),
                dish: "Dish".to_string(),
                notes: None,
                cost,
                created_at: Utc::now(),
            },
            user_name: user.to_string(),
        }
    }

    #[test]
    fn total_cost_sums_visible_orders() {
        let view = SessionView {
            orders: vec![enriched("a", 12.5), enriched("b", 7.0), enriched("c", 9.25)],
            ..SessionView::default()
        };
        assert_eq!(view.total_cost(), 28.75);
    }

    #[test]
    fn ordering_ended_is_false_without_a_poll() {
        assert!(!SessionView::default().ordering_ended());
    }
}
