//! ICS file generation.
//!
//! Writes projected events as an RFC 5545 calendar for hosts that consume
//! `.ics` feeds.

mod generate;

pub use generate::generate_ics;
