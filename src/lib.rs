//! # Nulz Mail Client
//! Asynchronous client for the Nulz Mail disposable email HTTP API, providing simple methods to create, poll, and delete temporary inboxes and track account credits from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers who need throwaway addresses in integration tests, demos, or automation scripts without running mail infrastructure: configure with an API key, create an inbox, wait for a message ([`MessageSummary`]) or its verification code, then discard the inbox when done.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your application.
//!
//! ## Out of scope
//! Not a general-purpose mail client, SMTP sender, or durable mailbox. It only proxies the Nulz Mail service and inherits its availability, credit accounting, and retention limits.
//!
//! ## Errors
//! Every non-2xx response, client-side timeout (status 408), and undecodable body surfaces as [`Error::Api`] with the server's message, status, and error payload. Transport failures stay [`Error::Transport`]; a body that decodes but does not fit the expected shape becomes [`Error::Json`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use nulz_mail_client::{Client, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nulz_mail_client::Error> {
//!     let client = Client::new("nlz_live_xxx")?;
//!     let inbox = client.create_inbox(Default::default()).await?;
//!     println!("Created: {}", inbox.address);
//!
//!     if let Some(message) = client.wait_for_message(&inbox.id, WaitOptions::default()).await? {
//!         println!("From: {}, Subject: {}", message.from_addr, message.subject);
//!         if let Some(code) = client.get_message_code(&message.id).await? {
//!             println!("Code: {code}");
//!         }
//!     }
//!
//!     client.delete_inbox(&inbox.id).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod sanitize;

pub use client::{Client, ClientBuilder, WaitOptions};
pub use error::Error;
pub use models::{
    ActiveAlias, ClaimedCredits, CreateInboxOptions, CreatedInbox, CreditsBalance, Inbox,
    InboxPage, ListOptions, Message, MessageCode, MessagePage, MessageSummary, Profile,
};
pub use sanitize::sanitize;

/// Result type alias for Nulz Mail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
