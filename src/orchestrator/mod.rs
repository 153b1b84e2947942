//! Search Orchestrator Module
//!
//! The client-side workflow that drives one photo search from file
//! selection to a rendered results list.
//!
//! ## Flow
//! 1. Fetch the shop's image-source configuration (object-storage
//!    credentials the search backend uses to read catalog images).
//! 2. Submit the photo to the search backend and collect the ranked
//!    matches.
//! 3. Report the matched product ids to the callback ingress so watching
//!    clients receive them in real time.
//! 4. Navigate to the results view, which reads the ids back out of the
//!    navigation parameters the workflow encoded.
//!
//! Every failure is per-attempt: the workflow surfaces a message, parks in
//! `Failed`, and resets on the next user action. There is no automatic
//! retry.

pub mod client;
pub mod types;
pub mod workflow;
