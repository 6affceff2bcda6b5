//! Resolved account credentials for the address-book server.

use std::fmt;

/// Endpoint + account + application-scoped secret.
///
/// Owned by whoever drives the refresh; the core never stores or persists it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint_url: String,
    pub account_identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(
        endpoint_url: impl Into<String>,
        account_identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Credentials {
            endpoint_url: endpoint_url.into(),
            account_identifier: account_identifier.into(),
            secret: secret.into(),
        }
    }

    /// Get credentials as (username, password) tuple for HTTP basic auth
    pub fn basic_auth(&self) -> (&str, &str) {
        (&self.account_identifier, &self.secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint_url", &self.endpoint_url)
            .field("account_identifier", &self.account_identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}
