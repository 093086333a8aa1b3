//! Runtime orchestration: spawning the collections and opening sessions.

pub mod tracing;

use std::sync::Arc;

use ::tracing::{error, info};
use tokio::task::JoinHandle;

use crate::clients::{OrderClient, PollClient, UserClient};
use crate::model::{PollId, UserId};
use crate::notify::{Notifier, TracingNotifier};
use crate::session::{SessionActor, SessionContext, SessionHandle};

/// Channel sizing for the collection actors.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Request channel capacity per collection.
    pub buffer_size: usize,
    /// Broadcast capacity per watched scope; a slow consumer past this
    /// many pending snapshots skips to the newest one.
    pub watch_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            watch_capacity: 16,
        }
    }
}

/// The running ordering system: three collection actors plus the clients
/// for talking to them.
///
/// Sessions opened through [`OrderingSystem::open_session`] hold client
/// clones, so shut sessions down before calling
/// [`OrderingSystem::shutdown`].
pub struct OrderingSystem {
    /// Client for the poll collection.
    pub polls: PollClient,

    /// Client for the order collection.
    pub orders: OrderClient,

    /// Client for the user directory.
    pub users: UserClient,

    notifier: Arc<dyn Notifier>,

    /// Task handles for all running collection actors.
    handles: Vec<JoinHandle<()>>,
}

impl OrderingSystem {
    /// Starts the system with default channel sizing, surfacing notices
    /// through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(&SystemConfig::default(), notifier)
    }

    /// Starts the system with notices emitted as structured log lines.
    pub fn with_tracing_notifier() -> Self {
        Self::new(Arc::new(TracingNotifier))
    }

    pub fn with_config(config: &SystemConfig, notifier: Arc<dyn Notifier>) -> Self {
        let (poll_actor, polls) = crate::poll_actor::new(config.buffer_size, config.watch_capacity);
        let (order_actor, orders) = crate::order_actor::new(config.buffer_size, config.watch_capacity);
        let (user_actor, users) = crate::user_actor::new(config.buffer_size, config.watch_capacity);

        let handles = vec![
            tokio::spawn(poll_actor.run()),
            tokio::spawn(order_actor.run()),
            tokio::spawn(user_actor.run()),
        ];

        Self {
            polls,
            orders,
            users,
            notifier,
            handles,
        }
    }

    /// Opens a session controller for one poll as one acting user. Either
    /// identifier may be absent; the session stays inert until a new one
    /// is opened with both present.
    pub fn open_session(&self, poll_id: Option<PollId>, user_id: Option<UserId>) -> SessionHandle {
        SessionActor::spawn(
            poll_id,
            user_id,
            SessionContext {
                polls: self.polls.clone(),
                orders: self.orders.clone(),
                users: self.users.clone(),
                notifier: self.notifier.clone(),
            },
        )
    }

    /// Gracefully shuts down the system: drops the clients, which closes
    /// the collection channels, then waits for every actor task.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.polls);
        drop(self.orders);
        drop(self.users);

        for handle in self.handles {
            if let Err(err) = handle.await {
                error!("Collection task failed: {:?}", err);
                return Err(format!("Collection task failed: {:?}", err));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
