//! Collaborator HTTP Client
//!
//! Thin typed client over the external services the workflow talks to: the
//! identity provider (bearer tokens), the shop service (image-source
//! configuration), the search backend, and the relay's callback ingress.
//! Every call carries a bounded timeout and there is no retry here; failed
//! attempts surface to the workflow and the user decides.

use anyhow::Result;
use reqwest::multipart;
use std::time::Duration;

use super::types::{AuthResponse, ImageSourceConfig, ImageSourceResponse, SearchResult, SourceImage};
use crate::callback::protocol::ENDPOINT_CALLBACK;
use crate::correlation::types::RequestId;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How many ranked matches to ask the search backend for.
pub const DEFAULT_TOP_K: usize = 3;

pub struct ShopClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ShopClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A client that already holds a session token.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.to_string());
        client
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Exchanges credentials for a bearer token with the identity provider
    /// and keeps it for subsequent calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/auth/login", self.base_url);

        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let auth: AuthResponse = response.json().await?;
        self.token = Some(auth.token.clone());

        tracing::info!("Logged in as {}", auth.username);

        Ok(auth)
    }

    /// Fetches the shop's image-source configuration.
    ///
    /// Returns `None` when the shop has no usable configuration: a missing
    /// record (404) or one with incomplete credentials.
    pub async fn fetch_image_source(&self, shop_id: u64) -> Result<Option<ImageSourceConfig>> {
        let url = format!("{}/shop/{}/images/source", self.base_url, shop_id);

        let response = self
            .authorized(self.http.get(url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Image source lookup failed: {}",
                response.status()
            ));
        }

        let raw: ImageSourceResponse = response.json().await?;
        Ok(raw.into_config())
    }

    /// Submits the photo to the search backend.
    ///
    /// The photo travels as a multipart `file` part; the object-storage
    /// configuration rides along as a JSON `s3_config` part so the backend
    /// can read the shop's catalog images. Matches come back ranked by
    /// similarity, best first.
    pub async fn search_in_shop(
        &self,
        shop_id: u64,
        image: &SourceImage,
        config: &ImageSourceConfig,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search/{}?top_k={}", self.base_url, shop_id, top_k);

        let file_part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("s3_config", serde_json::to_string(config)?);

        let response = self
            .authorized(self.http.post(url))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Search request failed: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    /// Reports the matched product ids to the relay's callback ingress.
    ///
    /// Passing a request id turns the relay's fan-out into a targeted
    /// delivery for the connection that registered that id.
    pub async fn post_callback(
        &self,
        relay_url: &str,
        product_ids: &[String],
        request_id: Option<&RequestId>,
    ) -> Result<()> {
        let mut url = format!("{}{}", relay_url.trim_end_matches('/'), ENDPOINT_CALLBACK);
        if let Some(id) = request_id {
            url = format!("{}?request_id={}", url, urlencoding::encode(&id.0));
        }

        let response = self
            .authorized(self.http.post(url))
            .json(&product_ids)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Callback post failed: {}",
                response.status()
            ));
        }

        Ok(())
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
