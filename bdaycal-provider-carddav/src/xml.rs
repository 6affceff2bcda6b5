//! Reading WebDAV multistatus bodies.
//!
//! Elements are matched by local name (and namespace where two vocabularies
//! share a name), so any prefix a server picks works.

use bdaycal_core::error::{BdayCalError, BdayCalResult};
use roxmltree::{Document, Node};

use crate::constants::CARDDAV_NS;

/// One contact resource from an addressbook-query REPORT.
#[derive(Debug)]
pub struct ContactResource {
    pub href: String,
    pub etag: Option<String>,
    pub data: String,
}

/// One member of a Depth 1 PROPFIND listing.
#[derive(Debug, PartialEq, Eq)]
pub struct CollectionMember {
    pub href: String,
    pub is_address_book: bool,
}

fn parse(body: &str) -> BdayCalResult<Document<'_>> {
    Document::parse(body).map_err(|e| BdayCalError::Discovery(format!("Malformed XML: {}", e)))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The `href` inside the first `property` element, e.g. the principal URL
/// inside `current-user-principal`.
pub fn property_href(body: &str, property: &str) -> BdayCalResult<Option<String>> {
    let doc = parse(body)?;

    let href = doc
        .root_element()
        .descendants()
        .filter(|n| n.tag_name().name() == property)
        .find_map(|n| child_text(n, "href"))
        .map(str::to_string);

    Ok(href)
}

/// Members of a collection with whether each one is an address book.
pub fn collection_members(body: &str) -> BdayCalResult<Vec<CollectionMember>> {
    let doc = parse(body)?;

    let members = doc
        .root_element()
        .descendants()
        .filter(|n| n.tag_name().name() == "response")
        .filter_map(|response| {
            let href = child_text(response, "href")?.to_string();
            let is_address_book = response
                .descendants()
                .filter(|n| n.tag_name().name() == "resourcetype")
                .flat_map(|n| n.children())
                .any(|n| n.tag_name().name() == "addressbook" && n.tag_name().namespace() == Some(CARDDAV_NS));
            Some(CollectionMember { href, is_address_book })
        })
        .collect();

    Ok(members)
}

/// Contact resources from a REPORT response. Responses without address data
/// (e.g. a 404 propstat) are left out.
pub fn contact_resources(body: &str) -> BdayCalResult<Vec<ContactResource>> {
    let doc = parse(body)?;

    let mut resources = Vec::new();

    for response in doc
        .root_element()
        .descendants()
        .filter(|n| n.tag_name().name() == "response")
    {
        let Some(href) = child_text(response, "href") else { continue };

        let etag = child_text(response, "getetag").map(str::to_string);

        // Text and CDATA chunks arrive as separate nodes
        let data: String = response
            .descendants()
            .filter(|n| n.tag_name().name() == "address-data")
            .flat_map(|n| n.children())
            .filter_map(|n| n.text())
            .collect();

        if data.trim().is_empty() {
            continue;
        }

        resources.push(ContactResource {
            href: href.to_string(),
            etag,
            data,
        });
    }

    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCIPAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<multistatus xmlns="DAV:">
  <response>
    <href>/</href>
    <propstat>
      <prop>
        <current-user-principal><href>/1234567/principal/</href></current-user-principal>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

    #[test]
    fn test_property_href_default_namespace() {
        assert_eq!(
            property_href(PRINCIPAL, "current-user-principal").unwrap().as_deref(),
            Some("/1234567/principal/")
        );
        assert_eq!(property_href(PRINCIPAL, "addressbook-home-set").unwrap(), None);
    }

    #[test]
    fn test_property_href_prefixed() {
        let body = r#"<d:multistatus xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">
  <d:response>
    <d:href>/principals/me/</d:href>
    <d:propstat><d:prop>
      <card:addressbook-home-set><d:href> https://p12-contacts.icloud.com/1234567/carddavhome/ </d:href></card:addressbook-home-set>
    </d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

        assert_eq!(
            property_href(body, "addressbook-home-set").unwrap().as_deref(),
            Some("https://p12-contacts.icloud.com/1234567/carddavhome/")
        );
    }

    #[test]
    fn test_malformed_xml_is_discovery_error() {
        assert!(matches!(
            property_href("<multistatus><response>", "current-user-principal"),
            Err(BdayCalError::Discovery(_))
        ));
    }

    #[test]
    fn test_collection_members() {
        let body = r#"<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:carddav" xmlns:cs="http://calendarserver.org/ns/">
  <d:response>
    <d:href>/home/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/home/card/</d:href>
    <d:propstat><d:prop>
      <d:resourcetype><d:collection/><c:addressbook/></d:resourcetype>
      <d:displayname>Contacts</d:displayname>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/home/other/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/><cs:addressbook/></d:resourcetype></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

        let members = collection_members(body).unwrap();
        assert_eq!(members.len(), 3);
        assert!(!members[0].is_address_book);
        assert_eq!(
            members[1],
            CollectionMember {
                href: "/home/card/".into(),
                is_address_book: true
            }
        );
        assert!(!members[2].is_address_book);
    }

    #[test]
    fn test_contact_resources() {
        let body = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">
  <d:response>
    <d:href>/home/card/john.vcf</d:href>
    <d:propstat><d:prop>
      <d:getetag>"abc"</d:getetag>
      <card:address-data>BEGIN:VCARD&#13;
VERSION:3.0&#13;
FN:John &amp; Co&#13;
END:VCARD&#13;
</card:address-data>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/home/card/cdata.vcf</d:href>
    <d:propstat><d:prop>
      <card:address-data><![CDATA[BEGIN:VCARD
FN:<Ana>
END:VCARD]]></card:address-data>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/home/card/gone.vcf</d:href>
    <d:propstat><d:prop><card:address-data/></d:prop><d:status>HTTP/1.1 404 Not Found</d:status></d:propstat>
  </d:response>
</d:multistatus>"#;

        let resources = contact_resources(body).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].href, "/home/card/john.vcf");
        assert_eq!(resources[0].etag.as_deref(), Some("\"abc\""));
        assert!(resources[0].data.contains("FN:John & Co\r\n"));
        assert!(resources[1].data.contains("FN:<Ana>"));
        assert_eq!(resources[1].etag, None);
    }
}
