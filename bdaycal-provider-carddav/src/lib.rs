//! CardDAV address-book source for bdaycal.
//!
//! Implements [`bdaycal_core::AddressBook`] against any CardDAV server,
//! including iCloud's partitioned contact hosts.

mod carddav;
mod client;
pub mod constants;
mod discovery;
mod report;
mod xml;

pub use client::CardDavClient;
pub use discovery::Discovered;
