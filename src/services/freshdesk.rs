use std::time::Duration;

use reqwest::{Client, StatusCode, multipart};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::Ticket;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Freshdesk basic-auth uses the API key as the username with a fixed
/// placeholder password.
const BASIC_AUTH_PASSWORD: &str = "X";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FreshdeskError {
    #[error("{method} {url} returned {status}: {body}")]
    Api {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// File sent as a multipart part alongside a note.
#[derive(Debug, Clone)]
pub struct NoteAttachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Thin client over the Freshdesk v2 REST API.
///
/// Each operation is a single stateless request/response round-trip; errors
/// carry method, URL, status, and response body so the handler can log them
/// without retrying.
#[derive(Clone)]
pub struct FreshdeskClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FreshdeskClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, FreshdeskError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FreshdeskError> {
        Self::new(
            format!("https://{}/api/v2", config.freshdesk_domain),
            config.freshdesk_api_key.clone(),
        )
    }

    /// Fetch a ticket; only the tag list is consumed by this service.
    pub async fn fetch_ticket(&self, ticket_id: &str) -> Result<Ticket, FreshdeskError> {
        let url = format!("{}/tickets/{}", self.base_url, ticket_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some(BASIC_AUTH_PASSWORD))
            .send()
            .await?;

        let response = check_status("GET", url, response).await?;
        Ok(response.json().await?)
    }

    /// Post a note on a ticket. With an attachment the request is multipart
    /// (text fields plus the file part); without one a plain JSON body is
    /// sent.
    pub async fn create_note(
        &self,
        ticket_id: &str,
        body: &str,
        private: bool,
        attachment: Option<NoteAttachment>,
    ) -> Result<(), FreshdeskError> {
        let url = format!("{}/tickets/{}/notes", self.base_url, ticket_id);
        let request = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(BASIC_AUTH_PASSWORD));

        let request = match attachment {
            Some(file) => {
                debug!(ticket_id, file_name = %file.file_name, "posting multipart note");
                let part = multipart::Part::bytes(file.content)
                    .file_name(file.file_name)
                    .mime_str(DOCX_MIME)?;
                let form = multipart::Form::new()
                    .text("body", body.to_string())
                    .text("private", private.to_string())
                    .part("attachments[]", part);
                request.multipart(form)
            }
            None => {
                debug!(ticket_id, "posting text-only note");
                request.json(&serde_json::json!({ "body": body, "private": private }))
            }
        };

        let response = request.send().await?;
        check_status("POST", url, response).await?;
        Ok(())
    }

    /// Merge tags onto a ticket: read the current set, union in the
    /// additions (duplicates collapsed, nothing removed), write the full
    /// result back. Read-modify-write with last-writer-wins semantics.
    pub async fn merge_tags(
        &self,
        ticket_id: &str,
        additions: &[&str],
    ) -> Result<Vec<String>, FreshdeskError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        let merged = union_tags(ticket.tags, additions);

        let url = format!("{}/tickets/{}", self.base_url, ticket_id);
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.api_key, Some(BASIC_AUTH_PASSWORD))
            .json(&serde_json::json!({ "tags": merged }))
            .send()
            .await?;

        check_status("PUT", url, response).await?;
        Ok(merged)
    }
}

/// Order-preserving set union: existing tags first, then additions not
/// already present.
fn union_tags(existing: Vec<String>, additions: &[&str]) -> Vec<String> {
    let mut merged = existing;
    for tag in additions {
        if !merged.iter().any(|t| t == tag) {
            merged.push(tag.to_string());
        }
    }
    merged
}

async fn check_status(
    method: &'static str,
    url: String,
    response: reqwest::Response,
) -> Result<reqwest::Response, FreshdeskError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FreshdeskError::Api {
        method,
        url,
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn union_keeps_existing_and_collapses_duplicates() {
        let merged = union_tags(tags(&["a", "b"]), &["b", "c"]);
        assert_eq!(merged, tags(&["a", "b", "c"]));
    }

    #[test]
    fn union_never_removes() {
        let merged = union_tags(tags(&["billing", "vip"]), &[]);
        assert_eq!(merged, tags(&["billing", "vip"]));
    }

    #[test]
    fn union_on_empty_ticket() {
        let merged = union_tags(Vec::new(), &["AI-Draft-Pending", "Intent:Payoff"]);
        assert_eq!(merged, tags(&["AI-Draft-Pending", "Intent:Payoff"]));
    }
}
