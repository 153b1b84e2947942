//! Search Workflow State Machine
//!
//! Drives one search attempt through
//! `Idle → ConfigFetching → Searching → CallbackPosting → AwaitingDelivery
//! → Rendered`, parking in `Failed` on any error. A fresh user action
//! resets a failed attempt; nothing retries on its own.

use super::client::{DEFAULT_TOP_K, ShopClient};
use super::types::{SearchPhase, SearchRequest, SearchResult, SourceImage, now_ms};
use crate::correlation::types::RequestId;

/// Operator-facing message when the shop has no usable image source.
pub const MISSING_CONFIG_ERROR: &str =
    "Image source configuration not found for this shop. Please configure it in the admin panel first.";

/// Generic message for any network failure; the user may retry manually.
pub const GENERIC_SEARCH_ERROR: &str = "Failed to search products. Please try again.";

pub struct SearchWorkflow {
    client: ShopClient,
    relay_url: String,
    shop_id: u64,
    phase: SearchPhase,
    error: Option<String>,
    results: Vec<SearchResult>,
    request: Option<SearchRequest>,
    /// Request id a live viewer registered with the relay, if any. When set,
    /// the callback is delivered to that viewer instead of broadcast.
    deliver_to: Option<RequestId>,
}

impl SearchWorkflow {
    pub fn new(client: ShopClient, relay_url: &str, shop_id: u64) -> Self {
        Self {
            client,
            relay_url: relay_url.trim_end_matches('/').to_string(),
            shop_id,
            phase: SearchPhase::Idle,
            error: None,
            results: Vec::new(),
            request: None,
            deliver_to: None,
        }
    }

    /// Targets callback delivery at the viewer that registered `request_id`
    /// on the relay's event channel.
    pub fn with_delivery_target(mut self, request_id: RequestId) -> Self {
        self.deliver_to = Some(request_id);
        self
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Ranked matches from the most recent successful attempt.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    /// Drives one full search attempt.
    ///
    /// Submitting without a selected photo is a no-op. On success the
    /// rendered product ids are returned, read back out of the results-view
    /// navigation parameters the workflow itself encoded.
    pub async fn run(&mut self, selected: Option<SourceImage>) -> Option<Vec<String>> {
        let Some(image) = selected else {
            return None;
        };

        // A fresh user action clears any previous failure.
        self.phase = SearchPhase::Idle;
        self.error = None;
        self.results.clear();

        let request = SearchRequest {
            request_id: self
                .deliver_to
                .clone()
                .unwrap_or_else(RequestId::new),
            shop_id: self.shop_id,
            issued_at: now_ms(),
            source_image_ref: image.file_name.clone(),
        };

        self.phase = SearchPhase::ConfigFetching;
        let config = match self.client.fetch_image_source(self.shop_id).await {
            Ok(Some(config)) => config,
            Ok(None) => return self.fail(MISSING_CONFIG_ERROR),
            Err(e) => {
                tracing::error!("Image source fetch failed: {}", e);
                return self.fail(GENERIC_SEARCH_ERROR);
            }
        };

        self.phase = SearchPhase::Searching;
        let results = match self
            .client
            .search_in_shop(self.shop_id, &image, &config, DEFAULT_TOP_K)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Search failed for shop {}: {}", self.shop_id, e);
                return self.fail(GENERIC_SEARCH_ERROR);
            }
        };

        // Matches arrive ranked best-first; keep that order end to end.
        let product_ids: Vec<String> = results.iter().map(|r| r.product_id.clone()).collect();
        self.results = results;

        self.phase = SearchPhase::CallbackPosting;
        if let Err(e) = self
            .client
            .post_callback(&self.relay_url, &product_ids, self.deliver_to.as_ref())
            .await
        {
            tracing::error!("Callback post failed: {}", e);
            return self.fail(GENERIC_SEARCH_ERROR);
        }

        self.phase = SearchPhase::AwaitingDelivery;
        let route = results_route(&product_ids);

        // The results view renders whatever its navigation parameters carry.
        let rendered = ids_from_route(&route);

        tracing::info!(
            "Rendered {} product(s) for shop {} (request {})",
            rendered.len(),
            self.shop_id,
            request.request_id.0
        );

        self.request = Some(request);
        self.phase = SearchPhase::Rendered;

        Some(rendered)
    }

    fn fail(&mut self, message: &str) -> Option<Vec<String>> {
        self.phase = SearchPhase::Failed;
        self.error = Some(message.to_string());
        None
    }
}

/// Encodes the matched ids into the results-view navigation parameters.
pub fn results_route(product_ids: &[String]) -> String {
    let encoded = serde_json::to_string(product_ids).unwrap_or_else(|_| "[]".to_string());
    format!("/callback?ids={}", urlencoding::encode(&encoded))
}

/// Reads product ids back out of a results-view route.
///
/// A missing or malformed `ids` parameter renders as an empty list, never
/// an error.
pub fn ids_from_route(route: &str) -> Vec<String> {
    let Some((_, query)) = route.split_once('?') else {
        return Vec::new();
    };

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("ids=") {
            let Ok(decoded) = urlencoding::decode(value) else {
                return Vec::new();
            };

            return serde_json::from_str::<Vec<String>>(&decoded).unwrap_or_default();
        }
    }

    Vec::new()
}
