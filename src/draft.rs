//! Draft note text for the agent.
//!
//! The draft is a fixed template: only the requester's name is substituted
//! (greeting line). The bracket tokens are left verbatim on purpose — a human
//! agent replaces them before the reply goes out.

/// Tag that puts the ticket into the agent's "drafts pending" view.
pub const DRAFT_PENDING_TAG: &str = "AI-Draft-Pending";

/// Intent classification tag for filtering.
pub const INTENT_TAG: &str = "Intent:Payoff";

/// Applied when the DOCX template could not be found on disk, so the degraded
/// note is visible from the ticket list.
pub const TEMPLATE_MISSING_TAG: &str = "Template-Missing";

/// Build the private draft note body.
pub fn build_draft(requester_name: &str) -> String {
    format!(
        r#"
— DRAFT for Agent —
Subject: Payoff Letter (Ticket {{{{ticket.id}}}})
Hi {requester_name},

Attached is the payoff letter template for [BUSINESS_NAME], reflecting an outstanding purchased amount of [OUTSTANDING_AMOUNT] as of [AS_OF_DATE].

(Agent checklist)
1) Open attached DOCX template.
2) Replace tokens: {{{{BUSINESS_NAME}}}}, {{{{CONTACT_NAME}}}}, {{{{ADDRESS_LINE}}}}, {{{{DEAL_ID}}}}, {{{{OUTSTANDING_AMOUNT}}}}, {{{{AGREEMENT_DATE}}}}, {{{{AS_OF_DATE}}}}
3) Export PDF & attach in public reply.
4) Replace [BRACKETS] in the email body, then send.
— End Draft —"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::REQUESTER_NAME_FALLBACK;

    #[test]
    fn draft_contains_bracket_tokens_verbatim() {
        let draft = build_draft("Maria");
        for token in ["[BUSINESS_NAME]", "[OUTSTANDING_AMOUNT]", "[AS_OF_DATE]"] {
            assert!(draft.contains(token), "missing token {token}");
        }
    }

    #[test]
    fn draft_contains_checklist_tokens() {
        let draft = build_draft("Maria");
        assert!(draft.contains(
            "{{BUSINESS_NAME}}, {{CONTACT_NAME}}, {{ADDRESS_LINE}}, {{DEAL_ID}}, {{OUTSTANDING_AMOUNT}}, {{AGREEMENT_DATE}}, {{AS_OF_DATE}}"
        ));
    }

    #[test]
    fn name_is_substituted_only_in_greeting() {
        let draft = build_draft("Maria Lopez");
        assert!(draft.contains("Hi Maria Lopez,"));
        assert_eq!(draft.matches("Maria Lopez").count(), 1);
    }

    #[test]
    fn fallback_placeholder_survives_unchanged() {
        let draft = build_draft(REQUESTER_NAME_FALLBACK);
        assert!(draft.contains("Hi {{requester.name}},"));
    }
}
