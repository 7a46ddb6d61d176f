// Outbound integrations
// Freshdesk REST client used by the webhook handler.

pub mod freshdesk;

pub use freshdesk::{FreshdeskClient, FreshdeskError, NoteAttachment};
