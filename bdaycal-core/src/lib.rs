//! Core of bdaycal: turns contact records into yearly birthday events.
//!
//! This crate is transport-agnostic. A contact server is reached through the
//! [`AddressBook`] trait (see `bdaycal-provider-carddav`); everything after
//! the fetch lives here:
//! - `contact` parses vCards into [`DateEntry`] values
//! - `occurrence` computes the next date each entry falls on
//! - `event` projects entries into recurring all-day [`CalendarEvent`]s
//! - `refresh` runs the pipeline and owns the published [`CachedResult`]

pub mod attributes;
pub mod config;
pub mod constants;
pub mod contact;
pub mod credentials;
pub mod error;
pub mod event;
pub mod ics;
pub mod occurrence;
pub mod refresh;
pub mod source;

pub use attributes::{AttributeSet, BirthdayAttributes};
pub use config::BdayCalConfig;
pub use contact::{DateEntry, DateKind, RawContact};
pub use credentials::Credentials;
pub use error::{BdayCalError, BdayCalResult, ErrorKind};
pub use event::{CalendarEvent, Language, TitleOptions};
pub use occurrence::{LeapDayPolicy, Occurrence};
pub use refresh::{CachedResult, Diagnostics, RefreshOptions, RefreshOrchestrator, RefreshState};
pub use source::AddressBook;
