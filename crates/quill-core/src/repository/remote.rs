//! Remote backend: a conventional resource-per-note REST API.
//!
//! `GET {base}/notes`, `POST {base}/notes`, `PUT {base}/notes/{id}` and
//! `DELETE {base}/notes/{id}`, all exchanging JSON.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::PersistenceMode;
use crate::error::{Error, Result};
use crate::models::{Note, NoteId};
use crate::repository::NoteBackend;
use crate::util::{is_http_url, strip_trailing_slashes};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Notes persisted through the remote REST API.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base_url: String,
    client: Client,
}

impl RemoteBackend {
    /// Backend rooted at `base_url` (trailing slashes are stripped).
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = strip_trailing_slashes(base_url.as_ref().trim()).to_string();
        if !is_http_url(&base_url) {
            return Err(Error::Config(format!(
                "API base URL must include http:// or https:// (got '{base_url}')"
            )));
        }

        Ok(Self {
            base_url,
            client: Client::builder().build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    fn note_url(&self, id: &NoteId) -> String {
        format!(
            "{}/notes/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
    }
}

#[async_trait]
impl NoteBackend for RemoteBackend {
    async fn list(&self) -> Result<Vec<Note>> {
        let response = self
            .request(Method::GET, &self.collection_url())
            .send()
            .await?;
        Ok(read_json::<Vec<Note>>(response).await?.unwrap_or_default())
    }

    async fn upsert(&self, note: Note) -> Result<Note> {
        // Client-generated ids mean an existing id selects PUT; only notes
        // without one are POSTed for the server to assign.
        let request = if note.id.is_empty() {
            self.request(Method::POST, &self.collection_url())
        } else {
            self.request(Method::PUT, &self.note_url(&note.id))
        };

        let response = request.json(&note).send().await?;
        Ok(read_json::<Note>(response).await?.unwrap_or(note))
    }

    async fn remove(&self, id: &NoteId) -> Result<()> {
        let response = self
            .request(Method::DELETE, &self.note_url(id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Note {id} was already absent on the server");
            return Ok(());
        }

        ensure_success(response).await.map(|_| ())
    }

    fn mode(&self) -> PersistenceMode {
        PersistenceMode::Api
    }
}

/// Fail with the response body (or a status message) on non-2xx.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Notes API returned HTTP {}", status.as_u16());
    Err(Error::Api(api_error_message(status, &body)))
}

/// Decode a JSON body; `204 No Content` is an explicit `None`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let response = ensure_success(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("Request failed {}", status.as_u16())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slashes() {
        let backend = RemoteBackend::new("https://api.example.com//").unwrap();
        assert_eq!(backend.base_url(), "https://api.example.com");
        assert_eq!(backend.collection_url(), "https://api.example.com/notes");
    }

    #[test]
    fn note_url_encodes_id() {
        let backend = RemoteBackend::new("https://api.example.com").unwrap();
        assert_eq!(
            backend.note_url(&NoteId::from("a b/c")),
            "https://api.example.com/notes/a%20b%2Fc"
        );
    }

    #[test]
    fn api_error_message_prefers_body() {
        assert_eq!(
            api_error_message(StatusCode::BAD_REQUEST, "  title too long "),
            "title too long"
        );
        assert_eq!(
            api_error_message(StatusCode::INTERNAL_SERVER_ERROR, "  "),
            "Request failed 500"
        );
    }

    #[test]
    fn rejects_base_without_scheme() {
        assert!(matches!(
            RemoteBackend::new("localhost:8080"),
            Err(Error::Config(_))
        ));
    }
}
