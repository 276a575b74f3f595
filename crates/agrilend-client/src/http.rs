//! Authenticated JSON-over-HTTP request layer.
//!
//! Every request carries a bearer token plus tenant and branch headers read
//! from a [`CredentialStore`]. A 401 is intercepted here: the
//! [`SessionHandler`] given at construction is notified and callers receive a
//! bare [`ClientError::SessionExpired`] without any upstream detail.

use std::marker::PhantomData;
use std::sync::Arc;

use agrilend_browser::{FilterOption, FilterValue};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::source::{OptionSource, PageRequest, PageResponse, RecordSource};

pub const TENANT_HEADER: &str = "X-Tenant-ID";
pub const BRANCH_HEADER: &str = "X-Branch-ID";

/// Where request credentials come from.
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn tenant(&self) -> Option<String>;
    fn branch(&self) -> Option<String>;
}

/// Credentials fixed at startup, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub token: Option<String>,
    pub tenant: Option<String>,
    pub branch: Option<String>,
}

impl CredentialStore for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn tenant(&self) -> Option<String> {
        self.tenant.clone()
    }

    fn branch(&self) -> Option<String> {
        self.branch.clone()
    }
}

/// Notified when the backend rejects the session.
pub trait SessionHandler: Send + Sync {
    fn on_session_expired(&self);
}

impl<F> SessionHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self()
    }
}

/// Logs the expiry and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSessionExpiry;

impl SessionHandler for LogSessionExpiry {
    fn on_session_expired(&self) {
        log::warn!("session expired; sign in again to continue");
    }
}

/// Shared request layer.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<dyn SessionHandler>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionHandler>,
    ) -> Result<Self> {
        // A trailing slash makes `join` append instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url,
            credentials,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `path` with `query` appended.
    pub fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R> {
        let url = self.url(path, query)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = self.url(path, &[])?;
        let response = self.send(self.request(Method::POST, url).json(body)).await?;
        decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = self.url(path, &[])?;
        let response = self.send(self.request(Method::PUT, url).json(body)).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        if let Some(tenant) = self.credentials.tenant() {
            request = request.header(TENANT_HEADER, tenant);
        }
        if let Some(branch) = self.credentials.branch() {
            request = request.header(BRANCH_HEADER, branch);
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("request to {} rejected with 401", response.url().path());
            self.session.on_session_expired();
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            log::debug!("request to {} failed with {status}", response.url().path());
            return Err(ClientError::http(status.as_u16()));
        }
        Ok(response)
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Query parameters for a page request: `page`, `per_page`, `search` and one
/// entry per filter. Range filters expand to `<id>_from` / `<id>_to`.
pub fn page_query(request: &PageRequest) -> Vec<(String, String)> {
    let mut query = vec![
        ("page".to_string(), request.page.to_string()),
        ("per_page".to_string(), request.per_page.to_string()),
    ];
    if !request.search.is_empty() {
        query.push(("search".to_string(), request.search.clone()));
    }
    for (id, value) in request.filters.iter() {
        match value {
            FilterValue::Text(text) => query.push((id.to_string(), text.clone())),
            FilterValue::Date(day) => query.push((id.to_string(), day_param(*day))),
            FilterValue::Range(range) => {
                if let Some(from) = range.from {
                    query.push((format!("{id}_from"), day_param(from)));
                }
                if let Some(to) = range.to {
                    query.push((format!("{id}_to"), day_param(to)));
                }
            }
        }
    }
    query
}

fn day_param(ts: agrilend_browser::Timestamp) -> String {
    ts.date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Pages of `T` served by the backend at `path`.
pub struct HttpRecordSource<T> {
    client: ApiClient,
    path: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> HttpRecordSource<T> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        HttpRecordSource {
            client,
            path: path.into(),
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> RecordSource<T> for HttpRecordSource<T>
where
    T: DeserializeOwned + Send,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse<T>> {
        self.client.get(&self.path, &page_query(&request)).await
    }
}

#[derive(Debug, Deserialize)]
struct OptionsEnvelope {
    data: Vec<FilterOption>,
}

/// Option lists served at `<path>/<filter_id>` as `{ "data": [...] }`.
#[derive(Debug, Clone)]
pub struct HttpOptionSource {
    client: ApiClient,
    path: String,
}

impl HttpOptionSource {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        HttpOptionSource {
            client,
            path: path.into(),
        }
    }
}

#[async_trait]
impl OptionSource for HttpOptionSource {
    async fn fetch_options(&self, filter_id: &str) -> Result<Vec<FilterOption>> {
        let path = format!("{}/{}", self.path.trim_end_matches('/'), filter_id);
        let envelope: OptionsEnvelope = self.client.get(&path, &[]).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrilend_browser::{DateRange, FilterMap, Timestamp};

    fn client(base: &str) -> Result<ApiClient> {
        let credentials = Arc::new(StaticCredentials::default());
        ApiClient::new(base, credentials, Arc::new(LogSessionExpiry))
    }

    #[test]
    fn urls_join_under_the_base_path() {
        let api = client("https://api.example.com/v1").unwrap();
        let url = api.url("/farmers", &[("page".into(), "2".into())]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/farmers?page=2");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(client("not a url"), Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn page_query_expands_filters() {
        let mut filters = FilterMap::new();
        filters.set("status", "Active");
        let (from, to) = (Timestamp::from_ymd(2024, 1, 1), Timestamp::from_ymd(2024, 3, 31));
        filters.set("registered", DateRange::new(from, to));
        let request = PageRequest::new(2, 25).search("juan").filters(filters);
        let query = page_query(&request);
        let pairs: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("page", "2"),
                ("per_page", "25"),
                ("search", "juan"),
                ("registered_from", "2024-01-01"),
                ("registered_to", "2024-03-31"),
                ("status", "Active"),
            ]
        );
    }
}
