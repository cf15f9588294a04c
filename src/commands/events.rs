//! Event subcommands.
//!
//! Each function translates parsed CLI arguments into one client call and
//! renders the result. A missing record is reported on the console rather
//! than propagated; transport failures bubble up as errors.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gcal_core::{CalendarError, EventDraft, EventPatch};
use owo_colors::OwoColorize;
use tracing::warn;

use crate::client::{BulkOutcome, CalendarClient};
use crate::render;

pub async fn list(client: &CalendarClient, max_results: u32) -> Result<()> {
    let events = client.list_upcoming(max_results).await?;
    render::events_table(&events);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    client: &CalendarClient,
    summary: String,
    description: String,
    start: &str,
    end: &str,
    attendees: Vec<String>,
    recurrence: Option<String>,
) -> Result<()> {
    if let Some(keyword) = recurrence.as_deref() {
        if gcal_core::event::expand_recurrence(keyword).is_none() {
            // Unrecognized keywords are ignored rather than rejected;
            // the event is created without a rule.
            warn!(keyword, "unrecognized recurrence keyword, ignoring");
        }
    }

    let draft = EventDraft {
        summary,
        description,
        start: parse_datetime(start)?,
        end: parse_datetime(end)?,
        attendee_emails: attendees,
        recurrence,
    };

    let created = client.create(draft).await?;
    render::event_details(&created);
    Ok(())
}

pub async fn get(client: &CalendarClient, event_id: &str) -> Result<()> {
    match client.get_by_id(event_id).await {
        Ok(event) => render::event_details(&event),
        Err(e) if e.is_not_found() => print_not_found(event_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn update(
    client: &CalendarClient,
    event_id: &str,
    summary: Option<String>,
    description: Option<String>,
    start: Option<String>,
    end: Option<String>,
    attendees: Vec<String>,
    remove_attendees: bool,
) -> Result<()> {
    let patch = EventPatch {
        summary,
        description,
        start: start.as_deref().map(parse_datetime).transpose()?,
        end: end.as_deref().map(parse_datetime).transpose()?,
        attendee_emails: attendees,
        remove_attendees,
    };

    // No flags means no change; skip the fetch-and-put round trip.
    if patch.is_empty() {
        println!("{}", "Nothing to update".dimmed());
        return Ok(());
    }

    match client.update(event_id, &patch).await {
        Ok(updated) => render::event_details(&updated),
        Err(e) if e.is_not_found() => print_not_found(event_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn delete(client: &CalendarClient, event_id: &str) -> Result<()> {
    match client.delete(event_id).await {
        Ok(()) => println!("{}", format!("Deleted event {}", event_id).green()),
        Err(e) if e.is_not_found() => print_not_found(event_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn find(client: &CalendarClient, needle: &str, max_results: usize) -> Result<()> {
    let matches = client.find_by_summary(needle, max_results).await?;
    render::events_table(&matches);
    Ok(())
}

pub async fn delete_by_summary(client: &CalendarClient, needle: &str) -> Result<()> {
    let outcomes = client.delete_by_summary(needle).await?;
    print_outcomes(&outcomes, "deleted");
    Ok(())
}

pub async fn import(
    client: &CalendarClient,
    event_id: &str,
    start: &str,
    end: Option<String>,
) -> Result<()> {
    let new_start = parse_datetime(start)?;
    let new_end = end.as_deref().map(parse_datetime).transpose()?;

    match client.import_shifted(event_id, new_start, new_end).await {
        Ok(imported) => render::event_details(&imported),
        Err(e) if e.is_not_found() => print_not_found(event_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn instances(client: &CalendarClient, event_id: &str) -> Result<()> {
    let mut pages = client.instances(event_id);
    let mut total = 0;

    loop {
        let batch = match pages.next_page().await {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(e) if e.is_not_found() => {
                print_not_found(event_id);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        total += batch.len();
        render::events_table(&batch);
    }

    println!("{}", format!("{} instances", total).dimmed());
    Ok(())
}

pub async fn update_instances(
    client: &CalendarClient,
    event_id: &str,
    summary: Option<String>,
    description: Option<String>,
    attendees: Vec<String>,
) -> Result<()> {
    let patch = EventPatch {
        summary,
        description,
        attendee_emails: attendees,
        ..EventPatch::default()
    };

    match client.update_instances(event_id, &patch).await {
        Ok(outcomes) => print_outcomes(&outcomes, "updated"),
        Err(e) if e.is_not_found() => print_not_found(event_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Parse an RFC 3339 timestamp (e.g. "2030-01-01T09:00:00Z").
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .map_err(|e| CalendarError::Validation(format!("invalid timestamp '{}': {}", s, e)))
        .context("Timestamps must be RFC 3339, e.g. 2030-01-01T09:00:00Z")?;
    Ok(parsed.with_timezone(&Utc))
}

fn print_not_found(event_id: &str) {
    println!("{}", format!("Event not found: {}", event_id).red());
}

/// Report per-item outcomes of a bulk operation.
fn print_outcomes(outcomes: &[BulkOutcome], verb: &str) {
    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    println!(
        "{}",
        format!("{} of {} events {}", succeeded, outcomes.len(), verb).green()
    );

    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            println!("{}", format!("  {}: {}", outcome.id, e).red());
        }
    }
}
