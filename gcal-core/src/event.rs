//! Event wire types for the Calendar v3 API.
//!
//! `Event` mirrors the service's event resource. The service is the sole
//! source of truth for an event's state: a locally held `Event` is only a
//! transient read, used to compute an update body or an import body. Fields
//! we do not model (iCalUID, organizer, reminders, ...) are kept in `extra`
//! so that a fetched record round-trips through update and import intact.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as the service represents it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Opaque identifier, assigned by the service on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Version tag. Stripped before re-inserting a record via import.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    /// RRULE lines for recurring events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Fields we do not model, preserved for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// The assigned identifier, or "" for a record that was never stored.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn summary_str(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    pub fn attendee_emails(&self) -> Vec<&str> {
        self.attendees.iter().map(|a| a.email.as_str()).collect()
    }
}

/// Start or end of an event: either a timed `dateTime` or an all-day `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// An absolute, offset-qualified timestamp in UTC.
    pub fn utc(dt: DateTime<Utc>) -> Self {
        EventDateTime {
            date: None,
            date_time: Some(dt.fixed_offset()),
            time_zone: Some("UTC".to_string()),
        }
    }
}

impl std::fmt::Display for EventDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(dt) = &self.date_time {
            write!(f, "{}", dt.to_rfc3339())
        } else if let Some(d) = &self.date {
            write!(f, "{}", d)
        } else {
            Ok(())
        }
    }
}

/// An event attendee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attendee {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// "accepted", "declined", "tentative" or "needsAction".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Attendee {
            email: email.into(),
            display_name: None,
            response_status: None,
        }
    }
}

/// Expand a recurrence keyword into RRULE lines.
///
/// Only "daily" (2 occurrences) and "monthly" (12 occurrences, same
/// day-of-month) are recognized. Anything else yields no rule; callers log a
/// warning but otherwise proceed, matching the long-standing behavior.
pub fn expand_recurrence(keyword: &str) -> Option<Vec<String>> {
    match keyword {
        "daily" => Some(vec!["RRULE:FREQ=DAILY;COUNT=2".to_string()]),
        "monthly" => Some(vec!["RRULE:FREQ=MONTHLY;COUNT=12".to_string()]),
        _ => None,
    }
}

/// Caller-supplied fields for a new event.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_emails: Vec<String>,
    /// Optional recurrence keyword ("daily" or "monthly").
    pub recurrence: Option<String>,
}

impl EventDraft {
    /// Build the insert body: bare attendee emails become attendee records
    /// and the recurrence keyword (if any) expands into RRULE lines.
    pub fn into_event(self) -> Event {
        let recurrence = self.recurrence.as_deref().and_then(expand_recurrence);

        Event {
            summary: Some(self.summary),
            description: Some(self.description),
            start: Some(EventDateTime::utc(self.start)),
            end: Some(EventDateTime::utc(self.end)),
            attendees: self
                .attendee_emails
                .into_iter()
                .map(Attendee::new)
                .collect(),
            recurrence,
            ..Event::default()
        }
    }
}

/// A partial update to an event.
///
/// Unset fields are back-filled from the current remote record before the
/// update body is submitted; see [`crate::merge::merge_patch`].
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub attendee_emails: Vec<String>,
    /// When set, the attendee list above acts as a removal set instead of an
    /// addition; see [`crate::merge::merge_attendees`].
    pub remove_attendees: bool,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.attendee_emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // --- recurrence keywords ---

    #[test]
    fn daily_keyword_expands_to_two_occurrences() {
        assert_eq!(
            expand_recurrence("daily"),
            Some(vec!["RRULE:FREQ=DAILY;COUNT=2".to_string()])
        );
    }

    #[test]
    fn monthly_keyword_expands_to_twelve_occurrences() {
        assert_eq!(
            expand_recurrence("monthly"),
            Some(vec!["RRULE:FREQ=MONTHLY;COUNT=12".to_string()])
        );
    }

    #[test]
    fn unknown_keyword_yields_no_rule() {
        assert_eq!(expand_recurrence("weekly"), None);
        assert_eq!(expand_recurrence(""), None);
    }

    // --- draft expansion ---

    #[test]
    fn draft_expands_emails_into_attendee_records() {
        let draft = EventDraft {
            summary: "Standup".to_string(),
            description: "Daily sync".to_string(),
            start: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2030, 1, 1, 9, 15, 0).unwrap(),
            attendee_emails: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            recurrence: Some("daily".to_string()),
        };

        let event = draft.into_event();
        assert_eq!(event.id, None);
        assert_eq!(event.attendee_emails(), vec!["a@example.com", "b@example.com"]);
        assert_eq!(
            event.recurrence,
            Some(vec!["RRULE:FREQ=DAILY;COUNT=2".to_string()])
        );
        assert_eq!(event.start.unwrap().time_zone.as_deref(), Some("UTC"));
    }

    // --- wire format ---

    #[test]
    fn unset_fields_are_omitted_from_the_wire() {
        let event = Event {
            summary: Some("Lunch".to_string()),
            ..Event::default()
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "summary": "Lunch" }));
    }

    #[test]
    fn unmodeled_fields_round_trip() {
        let wire = serde_json::json!({
            "id": "abc123",
            "summary": "Lunch",
            "iCalUID": "abc123@google.com",
            "sequence": 3,
            "start": { "dateTime": "2030-01-01T12:00:00+01:00" },
        });

        let event: Event = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(event.id.as_deref(), Some("abc123"));
        assert_eq!(event.extra["iCalUID"], "abc123@google.com");

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back, wire);
    }

    // --- patch emptiness ---

    #[test]
    fn a_default_patch_is_empty() {
        assert!(EventPatch::default().is_empty());

        // Flipping the removal flag alone changes nothing either.
        let patch = EventPatch {
            remove_attendees: true,
            ..EventPatch::default()
        };
        assert!(patch.is_empty());
    }

    #[test]
    fn any_set_field_makes_a_patch_non_empty() {
        let base = EventPatch::default;

        let patches = [
            EventPatch {
                summary: Some("New title".to_string()),
                ..base()
            },
            EventPatch {
                description: Some("New notes".to_string()),
                ..base()
            },
            EventPatch {
                start: Some(Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap()),
                ..base()
            },
            EventPatch {
                end: Some(Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap()),
                ..base()
            },
            EventPatch {
                attendee_emails: vec!["a@example.com".to_string()],
                ..base()
            },
        ];

        for patch in &patches {
            assert!(!patch.is_empty(), "{:?}", patch);
        }
    }
}
