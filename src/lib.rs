//! # Lunchpoll
//!
//! > **Group food ordering as a set of resource actors.**
//!
//! This crate implements the domain core of a group food-ordering app:
//! users join a *poll* (a shared ordering session tied to a restaurant),
//! submit individual dish orders with cost, and an administrator can close
//! ordering and manage orders. State lives in message-passing actors; the
//! UI-facing surface is a session controller that follows two live
//! snapshot streams and funnels every outcome into an injected
//! notification sink.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`store`])
//! A generic [`CollectionActor`](store::CollectionActor) owns every
//! document of one type and publishes full-state snapshots per scope.
//! Requests arrive over a channel and are processed sequentially, so a
//! `Put` is an atomic create-or-replace — the store, not its callers,
//! upholds the one-order-per-user invariant.
//!
//! ### 2. The Resources ([`model`], [`poll_actor`], [`order_actor`], [`user_actor`])
//! Pure data structures plus the per-resource wiring: `Document` impls,
//! error enums, and factories producing an actor together with its client.
//!
//! ### 3. The Interface ([`clients`])
//! Raw message passing is never exposed; [`PollClient`](clients::PollClient),
//! [`OrderClient`](clients::OrderClient) and [`UserClient`](clients::UserClient)
//! wrap the generic store client with domain operations.
//!
//! ### 4. The Controller ([`session`])
//! [`SessionActor`](session::SessionActor) merges the poll stream, the
//! order stream, and UI commands into one ordered event loop: enrichment
//! with display names, the one-time ordering-deadline notification, and
//! the five mutations. The UI reads a live
//! [`SessionView`](session::SessionView) through a watch channel.
//!
//! ### 5. The Edges ([`notify`], [`commit_feed`], [`lifecycle`])
//! The notification capability and its stock implementations, the footer's
//! best-effort latest-commit lookup, and the orchestrator that spins
//! everything up and shuts it down again.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lunchpoll::lifecycle::OrderingSystem;
//! use lunchpoll::model::{OrderDraft, PollCreate, User};
//!
//! let system = OrderingSystem::with_tracing_notifier();
//! system.users.put(User::new("user_1", "Alice")).await?;
//! let poll = system.polls.create(PollCreate::default()).await?;
//!
//! let session = system.open_session(Some(poll.id), Some("user_1".into()));
//! session.submit_order(OrderDraft {
//!     dish: "Ramen".into(),
//!     notes: None,
//!     cost: 12.5,
//! }).await;
//!
//! session.shutdown().await;
//! system.shutdown().await?;
//! ```
//!
//! ## 🧪 Testing
//!
//! Integration tests drive a real [`OrderingSystem`](lifecycle::OrderingSystem);
//! [`store::mock`] provides clients whose request stream is held by the
//! test, for deterministic failure injection.

pub mod clients;
pub mod commit_feed;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod poll_actor;
pub mod session;
pub mod store;
pub mod user_actor;
