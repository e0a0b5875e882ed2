//! Typed shapes for the Nulz Mail API.

use serde::{Deserialize, Serialize};

/// A disposable inbox (alias) owned by the account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Inbox {
    /// Server-assigned inbox id.
    pub id: String,
    /// Full email address of the inbox.
    pub address: String,
    /// Whether the inbox still receives mail.
    pub active: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Cancellation timestamp, once the inbox has been deleted.
    #[serde(default)]
    pub cancelled_at: Option<String>,
}

/// Result of creating a new inbox, including what it cost.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedInbox {
    pub id: String,
    pub address: String,
    pub active: bool,
    pub created_at: String,
    /// Credits deducted from the account for this inbox.
    pub cost_credits: i64,
}

/// A message as it appears in an inbox listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    /// Delivery timestamp (RFC 3339).
    pub received_at: String,
}

/// A full message, including bodies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: String,
    /// Id of the inbox this message was delivered to.
    pub alias_id: String,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    /// Raw RFC 822 source, when the server retained it.
    pub raw_rfc822: Option<String>,
    pub received_at: String,
}

/// Reduced projection of a message carrying only an extracted code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageCode {
    /// Verification code found in the message, if any.
    pub code: Option<String>,
}

/// Account profile returned by the `/me` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub credits_balance: i64,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub active_aliases: Vec<ActiveAlias>,
    #[serde(default)]
    pub next_free_claim_at: Option<String>,
    #[serde(default)]
    pub total_messages: Option<u64>,
    #[serde(default)]
    pub max_messages_per_inbox: Option<u64>,
    #[serde(default)]
    pub inbox_expire_days: Option<u64>,
    #[serde(default)]
    pub message_retention_days: Option<u64>,
}

/// An active inbox as embedded in the account profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActiveAlias {
    pub id: String,
    pub address: String,
    pub active: bool,
    pub created_at: String,
}

/// One page of inboxes.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct InboxPage {
    #[serde(default)]
    pub aliases: Vec<Inbox>,
    /// Total number of inboxes on the account, across all pages.
    #[serde(default)]
    pub total: u64,
}

/// One page of message summaries for an inbox.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<MessageSummary>,
    /// Total number of messages in the inbox, across all pages.
    #[serde(default)]
    pub total: u64,
}

/// Result of claiming the periodic free credit grant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClaimedCredits {
    /// Credits added by this claim.
    pub granted: i64,
    /// Balance after the claim.
    pub credits_balance: i64,
    pub next_free_claim_at: Option<String>,
}

/// Current credit balance, derived from the account profile.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditsBalance {
    pub credits_balance: i64,
    pub next_free_claim_at: Option<String>,
}

/// Options for creating an inbox. Leave fields unset to let the server pick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateInboxOptions {
    /// Requested local part of the address (before the `@`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Requested domain (must be one of [`Client::domains`](crate::Client::domains)).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Pagination options for listing inboxes or messages.
///
/// Unset fields are omitted from the query string, leaving the server's
/// defaults in effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub(crate) mod wire {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    pub struct Domains {
        #[serde(default)]
        pub domains: Vec<String>,
    }
}
