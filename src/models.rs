use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal placeholder left in the draft when no requester name is present in
/// the payload. Intentionally visible text so the agent notices and fills it
/// in.
pub const REQUESTER_NAME_FALLBACK: &str = "{{requester.name}}";

/// Ticket record as returned by the Freshdesk API. Only the tag list is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Success body for the webhook endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    pub detail: String,
}

/// Locate the ticket identifier in the webhook payload. Freshdesk automation
/// rules are configured by hand, so the id shows up under different shapes
/// depending on the rule: `ticket_id`, `id`, or a nested `ticket.id`. First
/// non-empty hit wins.
pub fn extract_ticket_id(payload: &Value) -> Option<String> {
    const PATHS: [&[&str]; 3] = [&["ticket_id"], &["id"], &["ticket", "id"]];

    PATHS
        .iter()
        .find_map(|path| lookup(payload, path).and_then(value_as_id))
}

/// Resolve the requester display name, trying the shapes seen in real
/// payloads. Returns `None` when absent; callers substitute
/// [`REQUESTER_NAME_FALLBACK`].
pub fn extract_requester_name(payload: &Value) -> Option<String> {
    const PATHS: [&[&str]; 3] = [
        &["requester", "name"],
        &["ticket", "requester", "name"],
        &["contact", "name"],
    ];

    PATHS.iter().find_map(|path| {
        lookup(payload, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |value, key| value.get(key))
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
