//! CardDAV address-book client.

use std::future::Future;
use std::time::Duration;

use bdaycal_core::contact::RawContact;
use bdaycal_core::credentials::Credentials;
use bdaycal_core::error::{BdayCalError, BdayCalResult};
use bdaycal_core::source::AddressBook;
use tracing::{info, instrument};

use crate::carddav::DavSession;
use crate::constants::{ICLOUD_PARTITION_TEMPLATE, USER_AGENT};
use crate::discovery::{Discovered, discover};
use crate::report::query_contacts;

/// Fetches contact records over CardDAV with HTTP Basic auth.
///
/// Holds no per-account state: every fetch runs discovery from scratch.
pub struct CardDavClient {
    http: reqwest::Client,
    partition_template: String,
}

impl CardDavClient {
    pub fn new() -> BdayCalResult<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BdayCalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            partition_template: ICLOUD_PARTITION_TEMPLATE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_partition_template(mut self, template: &str) -> Self {
        self.partition_template = template.to_string();
        self
    }

    /// Run discovery only, to validate an account without pulling contacts.
    #[instrument(skip_all, fields(endpoint = %credentials.endpoint_url))]
    pub async fn check(&self, credentials: &Credentials, timeout: Duration) -> BdayCalResult<Discovered> {
        with_timeout(timeout, async {
            let session = DavSession::new(&self.http, credentials);
            discover(&session, &self.partition_template).await
        })
        .await
    }

    async fn fetch_contacts(&self, credentials: &Credentials) -> BdayCalResult<Vec<RawContact>> {
        let session = DavSession::new(&self.http, credentials);
        let discovered = discover(&session, &self.partition_template).await?;

        let mut contacts = Vec::new();
        for book in &discovered.address_books {
            contacts.extend(query_contacts(&session, book).await?);
        }

        info!(
            contacts = contacts.len(),
            address_books = discovered.address_books.len(),
            "Fetched contacts"
        );
        Ok(contacts)
    }
}

impl AddressBook for CardDavClient {
    #[instrument(skip_all, fields(endpoint = %credentials.endpoint_url))]
    async fn fetch(
        &self,
        credentials: Credentials,
        timeout: Duration,
    ) -> BdayCalResult<Vec<RawContact>> {
        with_timeout(timeout, self.fetch_contacts(&credentials)).await
    }
}

async fn with_timeout<T>(
    duration: Duration,
    fut: impl Future<Output = BdayCalResult<T>>,
) -> BdayCalResult<T> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| BdayCalError::Connect(format!("Timed out after {:?}", duration)))?
}
