//! The seam between the refresh pipeline and a contact server.

use std::time::Duration;

use crate::contact::RawContact;
use crate::credentials::Credentials;
use crate::error::BdayCalResult;

/// Something that can fetch every contact record of an account.
///
/// Implementations must fail with `Connect`, `Auth` or `Discovery` only, and
/// must give up once `timeout` has elapsed.
#[allow(async_fn_in_trait)]
pub trait AddressBook {
    async fn fetch(
        &self,
        credentials: Credentials,
        timeout: Duration,
    ) -> BdayCalResult<Vec<RawContact>>;
}
