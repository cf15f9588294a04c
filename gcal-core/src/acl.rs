//! Access-control rule types for calendar ACLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// A permission grant binding a principal to a role on a calendar.
///
/// Like events, rules are owned by the service: the identifier is assigned
/// on insert and a locally held rule is a transient copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub scope: AclScope,
    pub role: AclRole,
}

impl AccessRule {
    /// A new rule granting `role` to the user with the given email.
    pub fn for_user(email: impl Into<String>, role: AclRole) -> Self {
        AccessRule {
            id: None,
            scope: AclScope::user(email),
            role,
        }
    }
}

/// The principal a rule applies to: a type plus an optional value
/// (e.g. type "user" with an email address).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclScope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AclScope {
    pub fn user(email: impl Into<String>) -> Self {
        AclScope {
            kind: "user".to_string(),
            value: Some(email.into()),
        }
    }
}

impl fmt::Display for AclScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{}", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// The enumerated permission levels the service accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AclRole {
    #[default]
    None,
    FreeBusyReader,
    Reader,
    Writer,
    Owner,
}

impl AclRole {
    /// The role's name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclRole::None => "none",
            AclRole::FreeBusyReader => "freeBusyReader",
            AclRole::Reader => "reader",
            AclRole::Writer => "writer",
            AclRole::Owner => "owner",
        }
    }
}

impl fmt::Display for AclRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclRole {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AclRole::None),
            "freeBusyReader" => Ok(AclRole::FreeBusyReader),
            "reader" => Ok(AclRole::Reader),
            "writer" => Ok(AclRole::Writer),
            "owner" => Ok(AclRole::Owner),
            other => Err(CalendarError::Validation(format!(
                "unknown role '{}' (expected none, freeBusyReader, reader, writer or owner)",
                other
            ))),
        }
    }
}
