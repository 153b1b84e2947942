//! Search Correlation Module
//!
//! Associates an in-flight search with the connection that should receive
//! its result, so a callback can be delivered to exactly the waiter that
//! asked for it instead of the whole room.
//!
//! ## Lifecycle
//! 1. **Register**: a waiting connection announces a request id and hands
//!    over its outbound queue; an expiry timer starts.
//! 2. **Resolve**: the callback arrives with the id; the batch goes to the
//!    registered queue and the timer is cancelled.
//! 3. **Expire**: no callback within the timeout; the waiter is told the
//!    search failed rather than left hanging, and any late callback for the
//!    id is dropped.
//!
//! Resolve and expire racing on one id commit through atomic removal of the
//! pending entry, so only one of them ever fires client-visible effects.

pub mod store;
pub mod types;
