//! Callback Ingress Module
//!
//! The HTTP boundary where the external search backend reports matched
//! product identifiers. The payload shape is validated here so malformed
//! batches never reach the broadcaster; valid batches are handed off for
//! delivery and acknowledged immediately (fire-and-forget: the 200 means
//! handed off, not delivered).

pub mod handlers;
pub mod protocol;

#[cfg(test)]
mod tests;
