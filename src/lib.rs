//! Visual Product Search Storefront: Result Delivery Core
//!
//! This library crate defines the core modules behind the storefront's
//! photo search. A user uploads a photo, an external image-search backend
//! matches it against the shop's catalog, and the matched product
//! identifiers travel back to waiting browsers through the relay server
//! (`main.rs`).
//!
//! ## Architecture Modules
//! The pipeline is composed of four loosely coupled subsystems:
//!
//! - **`correlation`**: Tracks in-flight search requests awaiting callback
//!   delivery. Owns the only timeout in the system: a registered search that
//!   never receives its callback is expired and its waiter notified.
//! - **`callback`**: The HTTP ingress accepting asynchronous result payloads
//!   from the search backend. Validates the payload shape at the boundary
//!   and hands valid batches off for delivery.
//! - **`broadcast`**: The realtime layer. Maintains the set of live
//!   WebSocket connections and fans result batches out to them with a
//!   bounded queue per connection.
//! - **`orchestrator`**: The client-side workflow. Drives the multi-step
//!   search sequence: fetch the shop's image-source configuration, submit
//!   the search, post the callback, navigate to the results view.

pub mod broadcast;
pub mod callback;
pub mod correlation;
pub mod orchestrator;
