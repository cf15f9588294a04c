//! gcal-cli: a command-line client for Google Calendar.
//!
//! The binary in `main.rs` wires clap subcommands to the modules here:
//! - [`client`] — the Calendar v3 REST client (merge-and-update, pagination)
//! - [`session`] / [`config`] — OAuth token storage, refresh and app credentials
//! - [`commands`] — one module per command group
//! - [`render`] — console output

pub mod client;
pub mod commands;
pub mod config;
pub mod render;
pub mod session;
