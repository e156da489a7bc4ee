//! Remote store trait and HTTP implementation.

use async_trait::async_trait;
use sp_core::SyncScope;
use url::Url;

use crate::error::{RemoteError, RemoteResult};
use crate::wire::ScopeDocument;

/// A remote document store holding one document per sync scope.
///
/// The protocol is deliberately coarse: `put_scope` overwrites the whole
/// node (last pusher wins at the collection level) and `fetch_scope` reads
/// it back whole. There is no delta exchange.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Overwrite the document at `<root>/<scopeId>`.
    async fn put_scope(&self, scope: &SyncScope, document: &ScopeDocument) -> RemoteResult<()>;

    /// Fetch the document at `<root>/<scopeId>`.
    ///
    /// Returns `None` when no node exists at that path: a scope that has
    /// never been pushed to is empty, not an error.
    async fn fetch_scope(&self, scope: &SyncScope) -> RemoteResult<Option<ScopeDocument>>;
}

/// HTTP client for Realtime-Database-style JSON endpoints.
///
/// Nodes live at `<base>/<root>/<scopeId>.json`; a GET of an absent node
/// returns a JSON `null` body.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpRemoteStore {
    /// Create a new remote store client.
    pub fn new(base_url: Url) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sprint-pilot/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { http, base_url }
    }

    /// Create a client from a base URL string.
    pub fn from_url(base_url: &str) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::new(base_url))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn node_url(&self, scope: &SyncScope) -> RemoteResult<Url> {
        Ok(self.base_url.join(&format!("/{}.json", scope.path()))?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn put_scope(&self, scope: &SyncScope, document: &ScopeDocument) -> RemoteResult<()> {
        let url = self.node_url(scope)?;
        let response = self.http.put(url).json(document).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, message });
        }
        Ok(())
    }

    async fn fetch_scope(&self, scope: &SyncScope) -> RemoteResult<Option<ScopeDocument>> {
        let url = self.node_url(scope)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, message });
        }

        // An absent node comes back as a JSON `null` body.
        let document: Option<ScopeDocument> = response.json().await?;
        Ok(document)
    }
}
