//! Realtime Broadcast Module
//!
//! Maintains the set of currently connected clients and delivers result
//! batches to them over WebSockets.
//!
//! ## Core Concepts
//! - **Registry**: An owned map from `ConnectionId` to the connection's
//!   outbound queue. Connect/disconnect events and in-flight broadcasts can
//!   race, so the map is a concurrent `DashMap` mutated only through
//!   subscribe/unsubscribe.
//! - **Bounded queues**: Each connection buffers a fixed number of pending
//!   events. A stalled client whose queue overflows is dropped from the
//!   active set instead of growing memory without bound.
//! - **Fan-out**: `broadcast` queues an event for every active connection in
//!   call order. There is no replay: a client that connects after a
//!   broadcast completed does not receive it.

pub mod handlers;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
