//! CardDAV service discovery.
//!
//! Discovery flow:
//! 1. PROPFIND {endpoint}/.well-known/carddav for `current-user-principal`
//!    (iCloud answers with a partition header instead: re-ask at
//!    `https://pNN-contacts.icloud.com/`). Without a well-known answer the
//!    endpoint itself is asked, and used as the principal if it names none.
//! 2. PROPFIND principal for `addressbook-home-set`
//! 3. PROPFIND home (Depth 1) to list address-book collections, falling back
//!    to the home itself when none is listed

use bdaycal_core::error::{BdayCalError, BdayCalResult};
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::carddav::{DavSession, Depth, Reply};
use crate::constants::WELL_KNOWN_PATH;
use crate::xml;

const PRINCIPAL_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:current-user-principal/>
  </d:prop>
</d:propfind>"#;

const HOME_SET_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">
  <d:prop>
    <card:addressbook-home-set/>
  </d:prop>
</d:propfind>"#;

const COLLECTIONS_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
    <d:displayname/>
  </d:prop>
</d:propfind>"#;

/// Where an account's contacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub principal: Url,
    pub home: Url,
    pub address_books: Vec<Url>,
}

pub async fn discover(session: &DavSession<'_>, partition_template: &str) -> BdayCalResult<Discovered> {
    let principal = principal(session, partition_template).await?;
    debug!(%principal, "Found principal");

    let home = home_set(session, &principal).await?;
    debug!(%home, "Found address book home");

    let address_books = address_books(session, &home).await?;
    debug!(count = address_books.len(), "Found address books");

    Ok(Discovered {
        principal,
        home,
        address_books,
    })
}

async fn principal(session: &DavSession<'_>, partition_template: &str) -> BdayCalResult<Url> {
    let endpoint = endpoint_url(&session.credentials().endpoint_url)?;
    let well_known = endpoint
        .join(WELL_KNOWN_PATH)
        .map_err(|e| BdayCalError::Config(format!("Invalid endpoint URL: {}", e)))?;

    let reply = session
        .propfind(well_known, Depth::Zero, PRINCIPAL_PROPFIND)
        .await?;

    if reply.status.is_success() {
        match xml::property_href(&reply.body, "current-user-principal") {
            Ok(Some(href)) => return reply.resolve(&href),
            Ok(None) => {}
            // iCloud may answer with an empty body next to the partition header
            Err(_) if reply.partition.is_some() => {}
            Err(err) => return Err(err),
        }
    }

    if let Some(partition) = &reply.partition {
        let base = partition_base(partition_template, partition)?;
        debug!(%partition, %base, "Using account partition");

        let reply = session.propfind(base, Depth::Zero, PRINCIPAL_PROPFIND).await?;
        return required_href(&reply, "current-user-principal");
    }

    if is_refusal(reply.status) {
        reply.ensure_success()?;
    }

    debug!(status = %reply.status, %endpoint, "No principal at well-known, asking the endpoint");
    endpoint_principal(session, endpoint).await
}

/// The endpoint's own `current-user-principal`, or the endpoint itself when
/// it does not name one.
async fn endpoint_principal(session: &DavSession<'_>, endpoint: Url) -> BdayCalResult<Url> {
    let reply = session
        .propfind(endpoint, Depth::Zero, PRINCIPAL_PROPFIND)
        .await?;
    reply.ensure_success()?;

    match xml::property_href(&reply.body, "current-user-principal")? {
        Some(href) => reply.resolve(&href),
        None => {
            debug!(url = %reply.url, "Using the endpoint as principal");
            Ok(reply.url)
        }
    }
}

fn is_refusal(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn home_set(session: &DavSession<'_>, principal: &Url) -> BdayCalResult<Url> {
    let reply = session
        .propfind(principal.clone(), Depth::Zero, HOME_SET_PROPFIND)
        .await?;
    required_href(&reply, "addressbook-home-set")
}

async fn address_books(session: &DavSession<'_>, home: &Url) -> BdayCalResult<Vec<Url>> {
    let reply = session
        .propfind(home.clone(), Depth::One, COLLECTIONS_PROPFIND)
        .await?;
    reply.ensure_success()?;

    let mut books = Vec::new();
    for member in xml::collection_members(&reply.body)? {
        if !member.is_address_book {
            continue;
        }
        let url = reply.resolve(&member.href)?;
        if &url != home && !books.contains(&url) {
            books.push(url);
        }
    }

    if books.is_empty() {
        debug!(%home, "No address book listed, querying the home collection");
        books.push(home.clone());
    }

    Ok(books)
}

/// The href inside `property`, resolved. Non-2xx is an auth failure, a
/// missing property a discovery failure.
fn required_href(reply: &Reply, property: &str) -> BdayCalResult<Url> {
    reply.ensure_success()?;

    let href = xml::property_href(&reply.body, property)?.ok_or_else(|| {
        BdayCalError::Discovery(format!("No {} in response from {}", property, reply.url))
    })?;

    reply.resolve(&href)
}

fn endpoint_url(raw: &str) -> BdayCalResult<Url> {
    Url::parse(raw).map_err(|e| BdayCalError::Config(format!("Invalid endpoint URL '{}': {}", raw, e)))
}

fn partition_base(template: &str, partition: &str) -> BdayCalResult<Url> {
    if partition.is_empty() || !partition.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BdayCalError::Discovery(format!(
            "Unexpected partition '{}'",
            partition
        )));
    }

    let base = template.replace("{partition}", partition);
    Url::parse(&format!("{}/", base.trim_end_matches('/')))
        .map_err(|e| BdayCalError::Discovery(format!("Invalid partition URL '{}': {}", base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ICLOUD_PARTITION_TEMPLATE;

    #[test]
    fn test_partition_base() {
        assert_eq!(
            partition_base(ICLOUD_PARTITION_TEMPLATE, "12").unwrap().as_str(),
            "https://p12-contacts.icloud.com/"
        );
        assert_eq!(
            partition_base("http://127.0.0.1:8080/p{partition}", "07").unwrap().as_str(),
            "http://127.0.0.1:8080/p07/"
        );
    }

    #[test]
    fn test_partition_must_be_numeric() {
        assert!(matches!(
            partition_base(ICLOUD_PARTITION_TEMPLATE, "evil.example.com/"),
            Err(BdayCalError::Discovery(_))
        ));
        assert!(partition_base(ICLOUD_PARTITION_TEMPLATE, "").is_err());
    }

    #[test]
    fn test_only_401_and_403_are_refusals() {
        assert!(is_refusal(StatusCode::UNAUTHORIZED));
        assert!(is_refusal(StatusCode::FORBIDDEN));
        assert!(!is_refusal(StatusCode::NOT_FOUND));
        assert!(!is_refusal(StatusCode::METHOD_NOT_ALLOWED));
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        assert!(matches!(endpoint_url("not a url"), Err(BdayCalError::Config(_))));
    }
}
