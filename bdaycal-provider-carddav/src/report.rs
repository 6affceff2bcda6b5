//! Bulk contact query against one address book.

use bdaycal_core::contact::RawContact;
use bdaycal_core::error::BdayCalResult;
use reqwest::Url;
use tracing::debug;

use crate::carddav::DavSession;
use crate::xml;

/// Every contact carrying at least one date-bearing property.
const ADDRESSBOOK_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<card:addressbook-query xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">
  <d:prop>
    <d:getetag/>
    <card:address-data/>
  </d:prop>
  <card:filter test="anyof">
    <card:prop-filter name="BDAY"/>
    <card:prop-filter name="ANNIVERSARY"/>
    <card:prop-filter name="X-ABDATE"/>
  </card:filter>
</card:addressbook-query>"#;

pub async fn query_contacts(session: &DavSession<'_>, collection: &Url) -> BdayCalResult<Vec<RawContact>> {
    let reply = session.report(collection.clone(), ADDRESSBOOK_QUERY).await?;
    reply.ensure_success()?;

    let contacts: Vec<RawContact> = xml::contact_resources(&reply.body)?
        .into_iter()
        .map(|resource| RawContact {
            href: resource.href,
            etag: resource.etag,
            data: resource.data,
        })
        .collect();

    debug!(%collection, count = contacts.len(), "Fetched contacts");
    Ok(contacts)
}
