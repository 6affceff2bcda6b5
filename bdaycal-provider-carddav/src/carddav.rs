//! WebDAV request plumbing over reqwest.
//!
//! Redirects are followed here rather than by reqwest, which rewrites a
//! redirected PROPFIND/REPORT into a GET.

use bdaycal_core::credentials::Credentials;
use bdaycal_core::error::{BdayCalError, BdayCalResult};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

use crate::constants::{MAX_REDIRECTS, PARTITION_HEADER};

#[derive(Debug, Clone, Copy)]
pub enum Depth {
    Zero,
    One,
}

impl Depth {
    fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
        }
    }
}

/// A fully read response.
#[derive(Debug)]
pub struct Reply {
    /// The URL that produced this reply, after redirects
    pub url: Url,
    pub status: StatusCode,
    pub partition: Option<String>,
    pub body: String,
}

impl Reply {
    /// Anything outside 2xx means the server refused us.
    pub fn ensure_success(&self) -> BdayCalResult<()> {
        if self.status.is_success() {
            Ok(())
        } else {
            Err(BdayCalError::Auth(format!("{} returned {}", self.url, self.status)))
        }
    }

    /// Resolve an href against the URL that produced it.
    pub fn resolve(&self, href: &str) -> BdayCalResult<Url> {
        self.url
            .join(href)
            .map_err(|e| BdayCalError::Discovery(format!("Invalid href '{}': {}", href, e)))
    }
}

/// Authenticated requests for one fetch.
pub struct DavSession<'a> {
    http: &'a reqwest::Client,
    credentials: &'a Credentials,
}

impl<'a> DavSession<'a> {
    pub fn new(http: &'a reqwest::Client, credentials: &'a Credentials) -> Self {
        DavSession { http, credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        self.credentials
    }

    pub async fn propfind(&self, url: Url, depth: Depth, body: &'static str) -> BdayCalResult<Reply> {
        self.send(dav_method("PROPFIND")?, url, depth, body).await
    }

    pub async fn report(&self, url: Url, body: &'static str) -> BdayCalResult<Reply> {
        self.send(dav_method("REPORT")?, url, Depth::One, body).await
    }

    async fn send(
        &self,
        method: Method,
        mut url: Url,
        depth: Depth,
        body: &'static str,
    ) -> BdayCalResult<Reply> {
        let (username, password) = self.credentials.basic_auth();

        for _ in 0..=MAX_REDIRECTS {
            debug!(%method, %url, depth = depth.as_str(), "DAV request");

            let response = self
                .http
                .request(method.clone(), url.clone())
                .basic_auth(username, Some(password))
                .header(CONTENT_TYPE, "application/xml; charset=utf-8")
                .header("Depth", depth.as_str())
                .body(body)
                .send()
                .await
                .map_err(connect_error)?;

            let status = response.status();
            let partition = response
                .headers()
                .get(PARTITION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string());

            // A partition hint is handled by discovery instead of the redirect
            if status.is_redirection() && partition.is_none() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok());

                if let Some(location) = location {
                    url = follow(&url, location)?;
                    continue;
                }
            }

            let body = response.text().await.map_err(connect_error)?;
            return Ok(Reply {
                url,
                status,
                partition,
                body,
            });
        }

        Err(BdayCalError::Discovery(format!(
            "More than {} redirects, last at {}",
            MAX_REDIRECTS, url
        )))
    }
}

fn follow(from: &Url, location: &str) -> BdayCalResult<Url> {
    let next = from
        .join(location)
        .map_err(|e| BdayCalError::Discovery(format!("Invalid redirect '{}': {}", location, e)))?;

    if from.scheme() == "https" && next.scheme() != "https" {
        return Err(BdayCalError::Discovery(format!(
            "Refusing redirect from {} to {}",
            from, next
        )));
    }

    debug!(from = %from, to = %next, "Following redirect");
    Ok(next)
}

fn dav_method(name: &str) -> BdayCalResult<Method> {
    Method::from_bytes(name.as_bytes()).map_err(|e| BdayCalError::Discovery(e.to_string()))
}

pub fn connect_error(err: reqwest::Error) -> BdayCalError {
    if err.is_timeout() {
        BdayCalError::Connect(format!("Request timed out: {}", err))
    } else {
        BdayCalError::Connect(err.to_string())
    }
}
