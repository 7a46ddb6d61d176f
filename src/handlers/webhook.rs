use std::path::{Path, PathBuf};

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{info, warn};

use crate::AppState;
use crate::draft::{self, DRAFT_PENDING_TAG, INTENT_TAG, TEMPLATE_MISSING_TAG};
use crate::error::{ApiError, Result};
use crate::models::{
    REQUESTER_NAME_FALLBACK, WebhookResponse, extract_requester_name, extract_ticket_id,
};
use crate::services::freshdesk::NoteAttachment;

const SHARED_SECRET_HEADER: &str = "X-Shared-Secret";

/// File name the automation expects; must be deployed next to the binary or
/// in the working directory.
pub const TEMPLATE_FILE_NAME: &str = "Payoff_Letter_Template_Fill.docx";

/// `POST /freshdesk/webhook`
///
/// Validates the shared secret, locates the ticket id in the payload, posts a
/// private draft note (with the DOCX template attached when it exists on
/// disk), then merges the view tags onto the ticket. A missing template file
/// degrades to a text-only note plus the `Template-Missing` tag and a 206
/// response; it never fails the request.
pub async fn freshdesk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    verify_shared_secret(&headers, &state.config.shared_secret)?;

    let payload = parse_payload(&headers, &body)?;
    let ticket_id = extract_ticket_id(&payload)
        .ok_or_else(|| ApiError::BadRequest("missing ticket_id".to_string()))?;
    let requester_name =
        extract_requester_name(&payload).unwrap_or_else(|| REQUESTER_NAME_FALLBACK.to_string());

    let note_body = draft::build_draft(&requester_name);

    match load_template(state.config.template_path.as_deref()).await {
        Some(attachment) => {
            state
                .freshdesk
                .create_note(&ticket_id, &note_body, true, Some(attachment))
                .await?;
            state
                .freshdesk
                .merge_tags(&ticket_id, &[DRAFT_PENDING_TAG, INTENT_TAG])
                .await?;

            info!(ticket_id, "draft posted with template attached");
            Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    status: "ok".to_string(),
                    detail: "draft posted + template attached".to_string(),
                }),
            )
                .into_response())
        }
        None => {
            warn!(
                ticket_id,
                template = TEMPLATE_FILE_NAME,
                "template file not found; posting draft without attachment"
            );
            state
                .freshdesk
                .create_note(&ticket_id, &note_body, true, None)
                .await?;
            state
                .freshdesk
                .merge_tags(
                    &ticket_id,
                    &[DRAFT_PENDING_TAG, INTENT_TAG, TEMPLATE_MISSING_TAG],
                )
                .await?;

            Ok((
                StatusCode::PARTIAL_CONTENT,
                Json(WebhookResponse {
                    status: "degraded".to_string(),
                    detail: "draft posted, template attachment missing".to_string(),
                }),
            )
                .into_response())
        }
    }
}

/// Trimmed, case-sensitive comparison against the configured secret. Header
/// name matching is case-insensitive in `HeaderMap`, so both the canonical
/// and lower-case spellings the sender may use are covered by one lookup.
fn verify_shared_secret(headers: &HeaderMap, expected: &str) -> Result<()> {
    let supplied = headers
        .get(SHARED_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    match supplied {
        Some(secret) if secret == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("bad secret".to_string())),
    }
}

/// Decode the webhook body as JSON or form-encoded, based on content type.
/// Form values that themselves parse as JSON are unwrapped so nested records
/// (e.g. a `requester` object) survive form encoding.
fn parse_payload(headers: &HeaderMap, body: &Bytes) -> Result<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let parsed = if content_type.contains("json") {
        serde_json::from_slice(body).ok()
    } else if content_type.contains("x-www-form-urlencoded") {
        parse_form(body)
    } else {
        serde_json::from_slice(body)
            .ok()
            .or_else(|| parse_form(body))
    };

    parsed.ok_or_else(|| ApiError::BadRequest("unreadable payload".to_string()))
}

fn parse_form(body: &[u8]) -> Option<Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    let mut map = serde_json::Map::new();
    for (key, value) in pairs {
        let parsed = match serde_json::from_str(&value) {
            Ok(json) => json,
            Err(_) => Value::String(value),
        };
        map.insert(key, parsed);
    }
    Some(Value::Object(map))
}

/// Ordered candidate paths for the template file; first existing file wins.
fn template_candidates(override_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = override_path {
        candidates.push(path.to_path_buf());
    }
    candidates.push(PathBuf::from(TEMPLATE_FILE_NAME));
    candidates.push(Path::new("templates").join(TEMPLATE_FILE_NAME));
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(TEMPLATE_FILE_NAME));
    }
    candidates
}

async fn load_template(override_path: Option<&Path>) -> Option<NoteAttachment> {
    for candidate in template_candidates(override_path) {
        if let Ok(content) = tokio::fs::read(&candidate).await {
            let file_name = candidate
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(TEMPLATE_FILE_NAME)
                .to_string();
            return Some(NoteAttachment { file_name, content });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers_with_secret(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SHARED_SECRET_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn secret_accepts_exact_match_after_trim() {
        let headers = headers_with_secret("  s3cret  ");
        assert!(verify_shared_secret(&headers, "s3cret").is_ok());
    }

    #[test]
    fn secret_rejects_mismatch_and_absence() {
        assert!(verify_shared_secret(&headers_with_secret("wrong"), "s3cret").is_err());
        assert!(verify_shared_secret(&HeaderMap::new(), "s3cret").is_err());
    }

    #[test]
    fn secret_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-shared-secret", HeaderValue::from_static("s3cret"));
        assert!(verify_shared_secret(&headers, "s3cret").is_ok());
    }

    #[test]
    fn form_body_decodes_scalar_and_nested_values() {
        let body = b"ticket_id=123&requester=%7B%22name%22%3A%22Ann%22%7D";
        let payload = parse_form(body).unwrap();
        assert_eq!(payload["ticket_id"], json!(123));
        assert_eq!(payload["requester"]["name"], json!("Ann"));
    }

    #[test]
    fn unknown_content_type_falls_back_to_json_then_form() {
        let headers = HeaderMap::new();
        let json_body = Bytes::from_static(br#"{"ticket_id": 5}"#);
        assert_eq!(
            parse_payload(&headers, &json_body).unwrap()["ticket_id"],
            json!(5)
        );

        let form_body = Bytes::from_static(b"ticket_id=5");
        assert_eq!(
            parse_payload(&headers, &form_body).unwrap()["ticket_id"],
            json!(5)
        );
    }

    #[test]
    fn override_path_is_tried_first() {
        let candidates = template_candidates(Some(Path::new("/opt/templates/payoff.docx")));
        assert_eq!(candidates[0], PathBuf::from("/opt/templates/payoff.docx"));
        assert_eq!(candidates[1], PathBuf::from(TEMPLATE_FILE_NAME));
    }

    #[tokio::test]
    async fn load_template_reads_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payoff.docx");
        tokio::fs::write(&path, b"docx bytes").await.unwrap();

        let attachment = load_template(Some(&path)).await.unwrap();
        assert_eq!(attachment.file_name, "payoff.docx");
        assert_eq!(attachment.content, b"docx bytes");
    }

    #[tokio::test]
    async fn load_template_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.docx");
        assert!(load_template(Some(&missing)).await.is_none());
    }
}
