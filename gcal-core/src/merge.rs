//! Pure merge logic for partial updates.
//!
//! An update sent to the service must be a fully populated record: the
//! service replaces the stored event with the body wholesale, so any field
//! the caller left unset has to be back-filled from a fresh fetch of the
//! same record. Keeping that merge here, away from the network, is what
//! makes it testable.

use chrono::{DateTime, Duration, Utc};

use crate::event::{Attendee, Event, EventDateTime, EventPatch};

/// Overlay `patch` onto a freshly fetched `current` record, producing the
/// full update body. Patch timestamps are normalized to offset-qualified
/// UTC; everything the patch leaves unset comes from `current`.
pub fn merge_patch(current: &Event, patch: &EventPatch) -> Event {
    let mut merged = current.clone();

    if let Some(summary) = &patch.summary {
        merged.summary = Some(summary.clone());
    }
    if let Some(description) = &patch.description {
        merged.description = Some(description.clone());
    }
    if let Some(start) = patch.start {
        merged.start = Some(EventDateTime::utc(start));
    }
    if let Some(end) = patch.end {
        merged.end = Some(EventDateTime::utc(end));
    }
    merged.attendees = merge_attendees(
        &current.attendees,
        &patch.attendee_emails,
        patch.remove_attendees,
    );

    merged
}

/// Combine the current attendee list with a patch list.
///
/// The patch list is appended to the current list; then, if `remove` is
/// set, every attendee whose email appears in the patch list is dropped
/// from the combined result. With `remove` set the patch list therefore
/// acts as a removal set, and the net result is `current \ patch` — a
/// deliberate inversion preserved for compatibility with existing callers.
pub fn merge_attendees(current: &[Attendee], patch_emails: &[String], remove: bool) -> Vec<Attendee> {
    let mut combined: Vec<Attendee> = current.to_vec();
    combined.extend(patch_emails.iter().cloned().map(Attendee::new));

    if remove {
        combined.retain(|attendee| !patch_emails.contains(&attendee.email));
    }

    combined
}

/// Overlay a patch onto one occurrence of a recurring event.
///
/// Only summary, description and attendees are overlaid; the occurrence
/// keeps its own start and end. A non-empty patch attendee list replaces
/// the occurrence's list outright.
pub fn overlay_instance(instance: &Event, patch: &EventPatch) -> Event {
    let mut updated = instance.clone();

    if let Some(summary) = &patch.summary {
        updated.summary = Some(summary.clone());
    }
    if let Some(description) = &patch.description {
        updated.description = Some(description.clone());
    }
    if !patch.attendee_emails.is_empty() {
        updated.attendees = patch
            .attendee_emails
            .iter()
            .cloned()
            .map(Attendee::new)
            .collect();
    }

    updated
}

/// Build an independent copy of `source` shifted to `new_start`, suitable
/// for the import endpoint: identifier and version tag are stripped so the
/// service stores it as a new record. A missing end defaults to one hour
/// after the start.
pub fn shifted_copy(
    source: &Event,
    new_start: DateTime<Utc>,
    new_end: Option<DateTime<Utc>>,
) -> Event {
    let new_end = new_end.unwrap_or(new_start + Duration::hours(1));

    let mut copy = source.clone();
    copy.id = None;
    copy.etag = None;
    copy.start = Some(EventDateTime::utc(new_start));
    copy.end = Some(EventDateTime::utc(new_end));
    copy
}

/// Case-insensitive substring scan over event summaries, preserving input
/// order and stopping once `max` matches are collected.
pub fn filter_by_summary(events: Vec<Event>, needle: &str, max: usize) -> Vec<Event> {
    let needle = needle.to_lowercase();
    let mut matches = Vec::new();

    for event in events {
        if event.summary_str().to_lowercase().contains(&needle) {
            matches.push(event);
            if matches.len() >= max {
                break;
            }
        }
    }

    matches
}
