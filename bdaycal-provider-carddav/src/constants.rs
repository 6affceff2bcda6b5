pub const CARDDAV_NS: &str = "urn:ietf:params:xml:ns:carddav";

pub const WELL_KNOWN_PATH: &str = "/.well-known/carddav";

/// Header iCloud sets on the well-known response to name the user's shard.
pub const PARTITION_HEADER: &str = "x-apple-user-partition";

/// `{partition}` is replaced by the header value.
pub const ICLOUD_PARTITION_TEMPLATE: &str = "https://p{partition}-contacts.icloud.com";

pub const MAX_REDIRECTS: usize = 10;

pub const USER_AGENT: &str = concat!("bdaycal/", env!("CARGO_PKG_VERSION"));
