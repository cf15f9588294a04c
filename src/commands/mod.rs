pub mod acl;
pub mod auth;
pub mod calendars;
pub mod events;
