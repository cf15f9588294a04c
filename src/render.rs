//! Console rendering for events, access rules and calendars.
//!
//! Tabular output with computed column widths; ids are dimmed, headers
//! bold. Long fields are clipped so rows stay on one line.

use gcal_core::{AccessRule, CalendarListEntry, Event};
use owo_colors::OwoColorize;

const MAX_FIELD_WIDTH: usize = 40;

/// Print a table of events: id, summary, description, start, end,
/// attendee emails.
pub fn events_table(events: &[Event]) {
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return;
    }

    let headers = ["ID", "Summary", "Description", "Start", "End", "Attendees"];
    let rows: Vec<[String; 6]> = events
        .iter()
        .map(|event| {
            [
                event.id_str().to_string(),
                clip(event.summary_str()),
                clip(event.description.as_deref().unwrap_or("")),
                event.start.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                event.end.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                clip(&event.attendee_emails().join(", ")),
            ]
        })
        .collect();

    print_table(&headers, &rows);
}

/// Print one event with every field on its own line.
pub fn event_details(event: &Event) {
    println!("{}  {}", "ID:".bold(), event.id_str().dimmed());
    println!("{}  {}", "Summary:".bold(), event.summary_str());
    if let Some(description) = &event.description {
        println!("{}  {}", "Description:".bold(), description);
    }
    if let Some(start) = &event.start {
        println!("{}  {}", "Start:".bold(), start);
    }
    if let Some(end) = &event.end {
        println!("{}  {}", "End:".bold(), end);
    }
    if !event.attendees.is_empty() {
        println!(
            "{}  {}",
            "Attendees:".bold(),
            event.attendee_emails().join(", ")
        );
    }
    if let Some(recurrence) = &event.recurrence {
        println!("{}  {}", "Recurrence:".bold(), recurrence.join(" "));
    }
    if let Some(link) = &event.html_link {
        println!("{}  {}", "Link:".bold(), link.dimmed());
    }
}

/// Print a table of access rules: id, scope, role.
pub fn acl_table(rules: &[AccessRule]) {
    if rules.is_empty() {
        println!("{}", "No access rules found".dimmed());
        return;
    }

    let headers = ["Rule ID", "Scope", "Role"];
    let rows: Vec<[String; 3]> = rules
        .iter()
        .map(|rule| {
            [
                rule.id.clone().unwrap_or_default(),
                rule.scope.to_string(),
                rule.role.to_string(),
            ]
        })
        .collect();

    print_table(&headers, &rows);
}

/// Print the account's calendar list.
pub fn calendars_table(calendars: &[CalendarListEntry]) {
    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return;
    }

    for calendar in calendars {
        let marker = if calendar.primary { " (primary)" } else { "" };
        println!(
            "{}{}  {}",
            calendar.summary.bold(),
            marker,
            calendar.id.dimmed()
        );
    }
}

fn print_table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) {
    let mut widths: [usize; N] = [0; N];
    for (i, header) in headers.iter().enumerate() {
        widths[i] = header.len();
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header_line.bold());
    println!("{}", "-".repeat(header_line.len()).dimmed());

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line);
    }
}

fn clip(s: &str) -> String {
    if s.chars().count() <= MAX_FIELD_WIDTH {
        s.to_string()
    } else {
        let clipped: String = s.chars().take(MAX_FIELD_WIDTH - 1).collect();
        format!("{}…", clipped)
    }
}
