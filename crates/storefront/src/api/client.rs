//! HTTP transport and read cache.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, Generation, Generations, Resource};
use super::response::ApiResponse;
use crate::config::ApiConfig;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend.
///
/// Successful GET responses are cached per `METHOD:path`; writes invalidate
/// the GET entries of the resource they touch. A GET still in flight when
/// its entry is invalidated is not cached. Clones share the HTTP pool and
/// the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, ApiResponse>,
    generations: Generations,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
                generations: Generations::default(),
            }),
        }
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a JSON request.
    ///
    /// Only GET consults and fills the cache. Never fails: transport and
    /// parse problems come back as [`ApiResponse::network_error`].
    #[instrument(skip(self, body, token), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        let cache_key = (method == Method::GET).then(|| CacheKey::new(&method, path));

        if let Some(key) = &cache_key
            && let Some(cached) = self.inner.cache.get(key).await
        {
            debug!("Cache hit");
            return cached;
        }
        let seen = cache_key
            .as_ref()
            .map(|key| self.inner.generations.current(key));

        let mut builder = self
            .inner
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = Self::send(builder).await;

        if let Some(key) = cache_key
            && let Some(seen) = seen
            && response.success
        {
            self.fill(key, seen, &response).await;
        }

        response
    }

    /// Cache a GET response unless its key was invalidated since `seen`.
    async fn fill(&self, key: CacheKey, seen: Generation, response: &ApiResponse) {
        let generations = &self.inner.generations;
        if generations.current(&key) != seen {
            debug!(key = key.as_str(), "Not caching a read that raced a write");
            return;
        }
        self.inner.cache.insert(key.clone(), response.clone()).await;
        // an invalidation can land between the check and the insert
        if generations.current(&key) != seen {
            self.inner.cache.invalidate(&key).await;
        }
    }

    /// Serialize `body` and send it as JSON.
    pub async fn request_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        match serde_json::to_value(body) {
            Ok(value) => self.request(method, path, Some(&value), token).await,
            Err(e) => {
                warn!(error = %e, path, "Failed to encode request body");
                ApiResponse::network_error()
            }
        }
    }

    /// Send a multipart form. No JSON content type is set; reqwest supplies
    /// the boundary header.
    #[instrument(skip(self, form, token), fields(path = %path))]
    pub async fn upload(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        let mut builder = self.inner.client.request(method, self.url(path)).multipart(form);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        Self::send(builder).await
    }

    async fn send(builder: RequestBuilder) -> ApiResponse {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Backend request failed");
                return ApiResponse::network_error();
            }
        };

        let status = response.status().as_u16();

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, status, "Failed to read backend response");
                return ApiResponse::network_error();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(payload) => ApiResponse::from_http(status, payload),
            // A refused token is meaningful whatever the body looks like.
            Err(_) if status == 401 => ApiResponse::from_http(status, Value::Null),
            Err(e) => {
                warn!(
                    error = %e,
                    status,
                    body = %text.chars().take(200).collect::<String>(),
                    "Backend response is not JSON"
                );
                ApiResponse::network_error()
            }
        }
    }

    // =========================================================================
    // Cache Methods
    // =========================================================================

    /// Drop the cached GET response for `path`.
    pub async fn invalidate(&self, path: &str) {
        debug!(path, "Invalidating cached response");
        let key = CacheKey::get(path);
        self.inner.generations.bump(&key);
        self.inner.cache.invalidate(&key).await;
    }

    /// Drop every cached GET response for `resource`.
    pub async fn invalidate_resource(&self, resource: Resource<'_>) {
        for path in resource.paths() {
            self.invalidate(&path).await;
        }
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        debug!("Invalidating all cached responses");
        self.inner.generations.bump_all();
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Whether a GET response for `path` is cached.
    #[must_use]
    pub fn is_cached(&self, path: &str) -> bool {
        self.inner.cache.contains_key(&CacheKey::get(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // port 9 (discard) on localhost is closed in test environments
        let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap());
        let response = client.request(Method::GET, "/api/products", None, None).await;
        assert!(response.is_transport_failure());
        assert_eq!(response.message(), Some("Network error"));
        assert!(!client.is_cached("/api/products"));
    }

    #[test]
    fn test_base_url_join() {
        let client = ApiClient::new(&ApiConfig::new("http://localhost:5000/").unwrap());
        assert_eq!(client.url("/api/products"), "http://localhost:5000/api/products");
    }
}
