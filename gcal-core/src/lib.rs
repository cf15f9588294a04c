//! Core types for gcal-cli.
//!
//! This crate holds everything that does not touch the network:
//! - `Event` and related wire types for the Calendar v3 event resource
//! - `AccessRule` types for calendar ACLs
//! - the pure merge/overlay logic used by partial updates
//! - the error taxonomy shared by the client and the CLI

pub mod acl;
pub mod calendar;
pub mod error;
pub mod event;
pub mod merge;

pub use acl::{AccessRule, AclRole, AclScope};
pub use calendar::CalendarListEntry;
pub use error::{CalendarError, CalendarResult};
pub use event::{Attendee, Event, EventDateTime, EventDraft, EventPatch};
