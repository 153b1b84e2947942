//! Callback API Contract
//!
//! Defines the endpoints exposed by the relay server and the response
//! bodies of the callback ingress.

use serde::{Deserialize, Serialize};

/// Public endpoint where the search backend reports matched product ids.
pub const ENDPOINT_CALLBACK: &str = "/api/callback";
/// Endpoint where clients open the realtime event channel.
pub const ENDPOINT_EVENTS: &str = "/ws";

/// Rejection message for any payload that is not an array of product-id
/// strings.
pub const REJECT_NOT_AN_ARRAY: &str = "Expected an array of product IDs";

/// Acknowledgement once a batch has been handed off for delivery.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackAck {
    pub success: bool,
}

/// Error body for malformed payloads.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackRejection {
    pub error: String,
}
