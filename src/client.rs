//! Nulz Mail async client implementation.

use crate::models::{
    ClaimedCredits, CreateInboxOptions, CreatedInbox, CreditsBalance, Inbox, InboxPage,
    ListOptions, Message, MessageCode, MessagePage, MessageSummary, Profile, wire,
};
use crate::sanitize::sanitize;
use crate::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Async client for the Nulz Mail temporary email service.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings
/// like the base URL, request timeout, proxies, and a custom user agent.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    headers: HeaderMap,
    base_url: String,
    timeout: Duration,
    proxy: Option<String>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Create a new Nulz Mail client with default settings.
    ///
    /// # Arguments
    /// * `api_key` - The account API key. Used verbatim when it already
    ///   carries a `Bearer` or `ApiKey` scheme, otherwise sent as
    ///   `ApiKey <key>`.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::Client;
    /// # fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Get the proxy URL if one was configured.
    ///
    /// Returns `None` when no proxy was set on the builder.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Create a temporary inbox.
    ///
    /// # Arguments
    /// * `options` - Requested prefix and domain; leave unset to let the
    ///   server pick both.
    ///
    /// # Returns
    /// The created inbox, including the credits it cost.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// let inbox = client.create_inbox(Default::default()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_inbox(&self, options: CreateInboxOptions) -> Result<CreatedInbox> {
        let body = serde_json::to_value(&options)?;
        self.request(Method::POST, "/aliases", Some(body), &[]).await
    }

    /// List inboxes on the account, most recent first.
    ///
    /// # Arguments
    /// * `options` - Pagination; unset fields use the server's defaults.
    pub async fn list_inboxes(&self, options: ListOptions) -> Result<InboxPage> {
        let query = [
            ("limit", options.limit.map(|v| v.to_string())),
            ("offset", options.offset.map(|v| v.to_string())),
        ];
        match self.execute(Method::GET, "/aliases", None, &query).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(InboxPage::default()),
        }
    }

    /// Fetch a single inbox by id.
    pub async fn get_inbox(&self, id: &str) -> Result<Inbox> {
        self.request(Method::GET, &format!("/aliases/{id}"), None, &[])
            .await
    }

    /// Delete an inbox. It stops receiving mail immediately.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// let inbox = client.create_inbox(Default::default()).await?;
    /// client.delete_inbox(&inbox.id).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn delete_inbox(&self, id: &str) -> Result<()> {
        self.execute(Method::DELETE, &format!("/aliases/{id}"), None, &[])
            .await?;
        Ok(())
    }

    /// List messages delivered to an inbox, most recent first.
    ///
    /// # Arguments
    /// * `inbox_id` - The inbox to read
    /// * `options` - Pagination; unset fields use the server's defaults
    pub async fn list_messages(&self, inbox_id: &str, options: ListOptions) -> Result<MessagePage> {
        let query = [
            ("limit", options.limit.map(|v| v.to_string())),
            ("offset", options.offset.map(|v| v.to_string())),
        ];
        let path = format!("/aliases/{inbox_id}/messages");
        match self.execute(Method::GET, &path, None, &query).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(MessagePage::default()),
        }
    }

    /// Fetch the full content of a message.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// let page = client.list_messages("inbox-id", Default::default()).await?;
    /// if let Some(summary) = page.messages.first() {
    ///     let message = client.get_message(&summary.id).await?;
    ///     println!("{}", message.body_text.unwrap_or_default());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        self.request(Method::GET, &format!("/messages/{id}"), None, &[])
            .await
    }

    /// Fetch only the verification code extracted from a message.
    ///
    /// Returns `None` when the server found no code in the message body.
    pub async fn get_message_code(&self, id: &str) -> Result<Option<String>> {
        let query = [("code_only", Some("1".to_string()))];
        let code: MessageCode = self
            .request(Method::GET, &format!("/messages/{id}"), None, &query)
            .await?;
        Ok(code.code)
    }

    /// Fetch the account profile: credit balance, active inboxes, and quotas.
    pub async fn me(&self) -> Result<Profile> {
        self.request(Method::GET, "/me", None, &[]).await
    }

    /// List the domains available for new inboxes.
    pub async fn domains(&self) -> Result<Vec<String>> {
        match self.execute(Method::GET, "/domains", None, &[]).await? {
            Some(value) => Ok(serde_json::from_value::<wire::Domains>(value)?.domains),
            None => Ok(Vec::new()),
        }
    }

    /// Claim the periodic free credit grant.
    ///
    /// Fails with an [`Error::Api`] when the grant is not yet available;
    /// [`Profile::next_free_claim_at`] says when it will be.
    pub async fn claim_free_credits(&self) -> Result<ClaimedCredits> {
        self.request(Method::POST, "/credits/claim", None, &[]).await
    }

    /// Fetch the current credit balance.
    pub async fn credits(&self) -> Result<CreditsBalance> {
        let profile = self.me().await?;
        Ok(CreditsBalance {
            credits_balance: profile.credits_balance,
            next_free_claim_at: profile.next_free_claim_at,
        })
    }

    /// Wait until any message arrives in an inbox.
    ///
    /// Polls the inbox until a message shows up or the wait deadline passes.
    /// A deadline reached without a message is an expected outcome and
    /// returns `Ok(None)`, not an error.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::{Client, WaitOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// let inbox = client.create_inbox(Default::default()).await?;
    /// if let Some(message) = client.wait_for_message(&inbox.id, WaitOptions::default()).await? {
    ///     println!("{}: {}", message.from_addr, message.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_message(
        &self,
        inbox_id: &str,
        options: WaitOptions,
    ) -> Result<Option<MessageSummary>> {
        self.wait_for_message_matching(inbox_id, options, |_| true)
            .await
    }

    /// Wait until a message matching `predicate` arrives in an inbox.
    ///
    /// Each poll scans the most recent page of messages in the order the
    /// server returns them and resolves with the first match. Errors from the
    /// underlying listing call end the wait immediately; only the absence of
    /// a match is retried.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::{Client, WaitOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::new("nlz_live_xxx")?;
    /// let found = client
    ///     .wait_for_message_matching("inbox-id", WaitOptions::default(), |m| {
    ///         m.from_addr.ends_with("@github.com")
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_message_matching<F>(
        &self,
        inbox_id: &str,
        options: WaitOptions,
        mut predicate: F,
    ) -> Result<Option<MessageSummary>>
    where
        F: FnMut(&MessageSummary) -> bool,
    {
        let deadline = Instant::now() + options.timeout;
        debug!(
            inbox_id,
            timeout_ms = options.timeout.as_millis() as u64,
            interval_ms = options.poll_interval.as_millis() as u64,
            "waiting for message"
        );

        while Instant::now() < deadline {
            let page = self
                .list_messages(
                    inbox_id,
                    ListOptions {
                        limit: Some(POLL_PAGE_SIZE),
                        offset: None,
                    },
                )
                .await?;

            if let Some(found) = page.messages.into_iter().find(|m| predicate(m)) {
                debug!(inbox_id, message_id = %found.id, "message matched");
                return Ok(Some(found));
            }

            tokio::time::sleep(options.poll_interval).await;
        }

        debug!(inbox_id, "wait deadline reached with no matching message");
        Ok(None)
    }

    /// Execute a request and decode the sanitized body into `T`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, Option<String>)],
    ) -> Result<T> {
        let value = self
            .execute(method, path, body, query)
            .await?
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// Build, send, and settle one API request.
    ///
    /// Returns `Ok(None)` for responses without a body (204 or empty text).
    /// The whole send-and-read runs under the configured timeout; on elapse
    /// the in-flight request is dropped and the call fails with status 408.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, Option<String>)],
    ) -> Result<Option<Value>> {
        let url = Self::endpoint(&self.base_url, path);
        debug!(method = %method, path, "sending API request");

        let mut request = self.http.request(method, url).headers(self.headers.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }
        let params = Self::present_query(query);
        if !params.is_empty() {
            request = request.query(&params);
        }

        match tokio::time::timeout(self.timeout, self.settle(request)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    path,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "request timed out"
                );
                Err(Error::timeout())
            }
        }
    }

    /// Send a prepared request and normalize its response.
    async fn settle(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "API request failed");
            return Err(Error::from_response(response).await);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("html"));

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(decoded) => Ok(Some(sanitize(decoded))),
            Err(_) => {
                warn!(status = status.as_u16(), "response body was not valid JSON");
                let message = if html {
                    format!(
                        "Server returned HTML instead of JSON; check the configured base URL (e.g. {BASE_URL})"
                    )
                } else {
                    "Invalid JSON response".to_string()
                };
                let excerpt: String = text.chars().take(200).collect();
                Err(Error::Api {
                    message,
                    status: status.as_u16(),
                    body: Some(json!({ "error": excerpt })),
                })
            }
        }
    }

    /// Join the configured base URL with a request path.
    fn endpoint(base_url: &str, path: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Query entries that have a value; absent entries are dropped.
    fn present_query<'q>(query: &'q [(&'q str, Option<String>)]) -> Vec<(&'q str, &'q str)> {
        query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
            .collect()
    }

    /// Authorization header value for the configured API key.
    fn authorization(api_key: &str) -> String {
        if AUTH_SCHEMES.iter().any(|scheme| api_key.starts_with(scheme)) {
            api_key.to_string()
        } else {
            format!("ApiKey {api_key}")
        }
    }
}

/// How long to wait for a message and how often to poll for it.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Overall wait deadline, independent of each request's own timeout.
    pub timeout: Duration,
    /// Pause between polls.
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    /// Defaults: wait up to 60 seconds, polling every 2 seconds.
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
        }
    }
}

const BASE_URL: &str = "https://v1.nulz.lol/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT_VALUE: &str = concat!("nulz-mail-client/", env!("CARGO_PKG_VERSION"));
/// Schemes the Authorization header is passed through verbatim for.
const AUTH_SCHEMES: &[&str] = &["Bearer ", "ApiKey "];
/// Page size requested on each poll of [`Client::wait_for_message_matching`].
const POLL_PAGE_SIZE: u32 = 50;

/// Builder for configuring a Nulz Mail client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Production base URL
    /// - 30 second request timeout
    /// - No proxy
    /// - `danger_accept_invalid_certs = false`
    /// - Default user agent
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT_VALUE.to_string(),
            proxy: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing or self-hosted deployments. A trailing slash is
    /// tolerated.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    ///
    /// A request still in flight when the timeout elapses is cancelled and
    /// fails with status 408.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Build the client.
    ///
    /// Validates the API key and user agent as header values and constructs
    /// the underlying HTTP client.
    ///
    /// # Examples
    /// ```no_run
    /// # use nulz_mail_client::Client;
    /// # fn main() -> Result<(), nulz_mail_client::Error> {
    /// let client = Client::builder("nlz_live_xxx")
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let http = builder.build()?;

        let mut headers = HeaderMap::new();
        let auth = Client::authorization(&self.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("API key is not a valid header value".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| Error::Config("user agent is not a valid header value".to_string()))?,
        );

        Ok(Client {
            http,
            headers,
            base_url: self.base_url,
            timeout: self.timeout,
            proxy: self.proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client(server: &MockServer) -> Client {
        Client::builder("test-key")
            .base_url(server.base_url())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn endpoint_trims_trailing_slash_and_enforces_leading_slash() {
        assert_eq!(
            Client::endpoint("https://v1.nulz.lol/v1/", "/me"),
            "https://v1.nulz.lol/v1/me"
        );
        assert_eq!(
            Client::endpoint("https://v1.nulz.lol/v1", "me"),
            "https://v1.nulz.lol/v1/me"
        );
    }

    #[test]
    fn authorization_prefixes_bare_keys_only() {
        assert_eq!(Client::authorization("abc"), "ApiKey abc");
        assert_eq!(Client::authorization("ApiKey abc"), "ApiKey abc");
        assert_eq!(Client::authorization("Bearer abc"), "Bearer abc");
    }

    #[test]
    fn present_query_drops_absent_entries() {
        let query = [
            ("limit", Some("5".to_string())),
            ("offset", None),
            ("code_only", Some("1".to_string())),
        ];
        assert_eq!(
            Client::present_query(&query),
            vec![("limit", "5"), ("code_only", "1")]
        );
    }

    #[test]
    fn build_rejects_keys_that_are_not_header_values() {
        let err = Client::new("bad\nkey").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn execute_strips_forbidden_fields_at_every_depth() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/me");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "credits_balance": 3,
                        "is_admin": true,
                        "active_aliases": [{"id": "a", "is_admin": false}],
                    }));
            })
            .await;

        let client = test_client(&server);
        let value = client
            .execute(reqwest::Method::GET, "/me", None, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "credits_balance": 3,
                "active_aliases": [{"id": "a"}],
            })
        );
    }

    #[tokio::test]
    async fn execute_returns_absent_for_204() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/aliases/x");
                then.status(204);
            })
            .await;

        let client = test_client(&server);
        let value = client
            .execute(reqwest::Method::DELETE, "/aliases/x", None, &[])
            .await
            .unwrap();
        assert!(value.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_returns_absent_for_empty_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains");
                then.status(200).body("");
            })
            .await;

        let client = test_client(&server);
        let value = client
            .execute(reqwest::Method::GET, "/domains", None, &[])
            .await
            .unwrap();
        assert!(value.is_none());
    }
}
