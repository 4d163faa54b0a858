//! PostgREST backend, as exposed by Supabase.
//!
//! Every call targets `{url}/rest/v1/{table}` and authenticates with the
//! project API key, sent both as `apikey` and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Order, RemoteStore, Result, StoreError};
use crate::member::{MemberRecord, NewMember, PresenceUpdate};

/// Path prefix of the PostgREST API on a Supabase project.
const REST_PREFIX: &str = "rest/v1";

/// Member table behind a PostgREST endpoint.
pub struct RestStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else if err.is_timeout() {
            Self::unavailable(format!("request timed out: {err}"))
        } else {
            Self::unavailable(err.to_string())
        }
    }
}

impl RestStore {
    /// Create a client for `table` on the project at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, key or table is empty, or the HTTP client
    /// cannot be built.
    pub fn new(url: &str, api_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() || api_key.trim().is_empty() || table.trim().is_empty() {
            return Err(StoreError::Config {
                message: "url, api_key and table must all be set".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{url}/{REST_PREFIX}/{}", table.trim()),
            api_key: api_key.trim().to_string(),
        })
    }

    /// The table URL every request is sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters for a full listing.
    #[must_use]
    pub fn list_query(order: Order) -> Vec<(&'static str, String)> {
        vec![
            ("select", "*".to_string()),
            ("order", format!("{}.{}", order.column, order.direction())),
        ]
    }

    /// Query parameter selecting a single row by id.
    #[must_use]
    pub fn id_filter(id: &str) -> Vec<(&'static str, String)> {
        vec![("id", format!("eq.{id}"))]
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Turn a non-2xx response into a rejection.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(&body, status.canonical_reason().unwrap_or("error"));
        warn!("Store rejected request with {}: {}", status, message);
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Extract a readable message from a PostgREST error body.
///
/// Falls back to the raw body, then to `fallback` when the body is empty.
#[must_use]
pub fn rejection_message(body: &str, fallback: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            let extra = parsed.details.or(parsed.hint).filter(|d| !d.is_empty());
            return match extra {
                Some(extra) => format!("{message} ({extra})"),
                None => message,
            };
        }
    }
    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn list(&self, order: Order) -> Result<Vec<MemberRecord>> {
        let request = self
            .authorized(self.client.get(&self.endpoint))
            .query(&Self::list_query(order));
        let response = Self::check(request.send().await?).await?;
        let records: Vec<MemberRecord> = response.json().await?;
        debug!("Fetched {} members from {}", records.len(), self.endpoint);
        Ok(records)
    }

    async fn insert(&self, member: &NewMember) -> Result<MemberRecord> {
        let request = self
            .authorized(self.client.post(&self.endpoint))
            .header("Prefer", "return=representation")
            .json(&[member]);
        let response = Self::check(request.send().await?).await?;
        let mut created: Vec<MemberRecord> = response.json().await?;
        if created.is_empty() {
            return Err(StoreError::decode("insert returned no rows"));
        }
        let record = created.swap_remove(0);
        debug!("Created member {}", record.id);
        Ok(record)
    }

    async fn update(&self, id: &str, update: &PresenceUpdate) -> Result<()> {
        let request = self
            .authorized(self.client.patch(&self.endpoint))
            .query(&Self::id_filter(id))
            .header("Prefer", "return=minimal")
            .json(update);
        Self::check(request.send().await?).await?;
        debug!("Updated presence of {}", id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self
            .authorized(self.client.delete(&self.endpoint))
            .query(&Self::id_filter(id));
        Self::check(request.send().await?).await?;
        debug!("Deleted {}", id);
        Ok(())
    }
}
