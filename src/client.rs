//! Calendar v3 REST client.
//!
//! Every method is one synchronous round-trip to the service: build a
//! request, await the response, map it into typed results. There is no
//! retry, no cache and no coordination between overlapping invocations, so
//! the fetch-then-submit update is subject to the usual read-modify-write
//! race against concurrent writers.

use gcal_core::merge::{filter_by_summary, merge_patch, overlay_instance, shifted_copy};
use gcal_core::{
    AccessRule, AclRole, CalendarError, CalendarListEntry, CalendarResult, Event, EventDraft,
    EventPatch,
};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::session::Session;

pub const DEFAULT_CALENDAR_ID: &str = "primary";

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Page size used by the summary search. The search is a client-side scan
/// over the upcoming-events list, bounded by the largest page the service
/// will return, not a remote-side query.
pub const SEARCH_SCAN_LIMIT: u32 = 2500;

/// Outcome of one item in a bulk operation (instance fan-out,
/// delete-by-summary). Bulk operations report per item instead of a single
/// aggregate status; a failure is recorded and the loop keeps going.
#[derive(Debug)]
pub struct BulkOutcome {
    pub id: String,
    pub result: CalendarResult<()>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<Event>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RulesPage {
    #[serde(default)]
    items: Vec<AccessRule>,
}

#[derive(Debug, Deserialize)]
struct CalendarsPage {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

pub struct CalendarClient {
    http: reqwest::Client,
    session: Session,
    calendar_id: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(session: Session, calendar_id: impl Into<String>) -> Self {
        CalendarClient {
            http: reqwest::Client::new(),
            session,
            calendar_id: calendar_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API endpoint. Tests use this to talk
    /// to a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), event_id)
    }

    fn acl_url(&self) -> String {
        format!("{}/calendars/{}/acl", self.base_url, self.calendar_id)
    }

    // --- events ---

    /// Create a new event. The service assigns the identifier; the returned
    /// record is the server-confirmed state.
    pub async fn create(&self, draft: EventDraft) -> CalendarResult<Event> {
        let body = draft.into_event();

        let resp = self
            .http
            .post(self.events_url())
            .bearer_auth(self.session.access_token())
            .json(&body)
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let created: Event = expect_json(resp, "event").await?;
        info!(
            id = created.id_str(),
            link = created.html_link.as_deref().unwrap_or(""),
            "event created"
        );
        Ok(created)
    }

    /// Fetch one event. A missing identifier surfaces as
    /// [`CalendarError::NotFound`] so callers can branch on absence.
    pub async fn get_by_id(&self, event_id: &str) -> CalendarResult<Event> {
        let resp = self
            .http
            .get(self.event_url(event_id))
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(CalendarError::transport)?;

        expect_json(resp, event_id).await
    }

    /// Read-modify-write update: fetch the current record, back-fill every
    /// field the patch leaves unset, submit the fully populated body.
    pub async fn update(&self, event_id: &str, patch: &EventPatch) -> CalendarResult<Event> {
        let current = self.get_by_id(event_id).await?;
        let merged = merge_patch(&current, patch);

        let updated = self.put_event(event_id, &merged).await?;
        info!(id = event_id, "event updated");
        Ok(updated)
    }

    /// Delete one event. Unknown (or already gone) identifiers map to
    /// [`CalendarError::NotFound`].
    pub async fn delete(&self, event_id: &str) -> CalendarResult<()> {
        let resp = self
            .http
            .delete(self.event_url(event_id))
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(CalendarError::transport)?;

        expect_ok(resp, event_id).await?;
        info!(id = event_id, "event deleted");
        Ok(())
    }

    /// Upcoming events: start time >= now (UTC), ascending by start time,
    /// recurring events expanded to single occurrences, at most
    /// `max_results` entries. An empty calendar yields an empty vec.
    pub async fn list_upcoming(&self, max_results: u32) -> CalendarResult<Vec<Event>> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = max_results.to_string();

        let resp = self
            .http
            .get(self.events_url())
            .bearer_auth(self.session.access_token())
            .query(&[
                ("timeMin", now.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let page: EventsPage = expect_json(resp, "event list").await?;
        info!(count = page.items.len(), "fetched upcoming events");
        Ok(page.items)
    }

    /// Case-insensitive substring match over summaries, in upcoming-events
    /// order, stopping at `max_results` matches. This scans up to
    /// [`SEARCH_SCAN_LIMIT`] events client-side.
    pub async fn find_by_summary(
        &self,
        needle: &str,
        max_results: usize,
    ) -> CalendarResult<Vec<Event>> {
        let all = self.list_upcoming(SEARCH_SCAN_LIMIT).await?;
        Ok(filter_by_summary(all, needle, max_results))
    }

    /// Delete every upcoming event whose summary contains `needle`. One
    /// failed delete is recorded and logged; the remaining matches are
    /// still processed.
    pub async fn delete_by_summary(&self, needle: &str) -> CalendarResult<Vec<BulkOutcome>> {
        let matches = self
            .find_by_summary(needle, SEARCH_SCAN_LIMIT as usize)
            .await?;

        let mut outcomes = Vec::with_capacity(matches.len());
        for event in matches {
            let id = match event.id {
                Some(id) => id,
                None => continue,
            };

            let result = self.delete(&id).await;
            if let Err(e) = &result {
                warn!(id = id.as_str(), error = %e, "failed to delete event");
            }
            outcomes.push(BulkOutcome { id, result });
        }

        Ok(outcomes)
    }

    /// Copy an existing event to a new start time as an independent record.
    ///
    /// The source's identifier and version tag are stripped and the copy is
    /// inserted through the import endpoint, which skips creation side
    /// effects such as invitation emails. A missing end defaults to one
    /// hour after the new start.
    pub async fn import_shifted(
        &self,
        event_id: &str,
        new_start: DateTime<Utc>,
        new_end: Option<DateTime<Utc>>,
    ) -> CalendarResult<Event> {
        let source = self.get_by_id(event_id).await?;
        let body = shifted_copy(&source, new_start, new_end);

        let resp = self
            .http
            .post(format!("{}/import", self.events_url()))
            .bearer_auth(self.session.access_token())
            .json(&body)
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let imported: Event = expect_json(resp, event_id).await?;
        info!(
            source = event_id,
            id = imported.id_str(),
            link = imported.html_link.as_deref().unwrap_or(""),
            "event imported"
        );
        Ok(imported)
    }

    /// Page through the occurrences of a recurring event. Each call starts
    /// a fresh pagination.
    pub fn instances<'a>(&'a self, event_id: &str) -> InstancePages<'a> {
        InstancePages {
            client: self,
            event_id: event_id.to_string(),
            next_token: None,
            done: false,
        }
    }

    /// Apply a patch to every occurrence of a recurring event: summary,
    /// description and attendees are overlaid, each occurrence keeps its
    /// own start and end.
    ///
    /// This is a fan-out of N writes with no atomicity: a failure partway
    /// through leaves earlier occurrences updated, and nothing is rolled
    /// back. The returned outcomes report each occurrence individually.
    pub async fn update_instances(
        &self,
        event_id: &str,
        patch: &EventPatch,
    ) -> CalendarResult<Vec<BulkOutcome>> {
        let mut pages = self.instances(event_id);
        let mut outcomes = Vec::new();

        while let Some(batch) = pages.next_page().await? {
            for instance in batch {
                let id = match instance.id.clone() {
                    Some(id) => id,
                    None => continue,
                };

                let updated = overlay_instance(&instance, patch);
                let result = self.put_event(&id, &updated).await.map(|_| ());
                if let Err(e) = &result {
                    warn!(id = id.as_str(), error = %e, "failed to update instance");
                }
                outcomes.push(BulkOutcome { id, result });
            }
        }

        info!(id = event_id, count = outcomes.len(), "updated instances");
        Ok(outcomes)
    }

    async fn put_event(&self, event_id: &str, body: &Event) -> CalendarResult<Event> {
        let resp = self
            .http
            .put(self.event_url(event_id))
            .bearer_auth(self.session.access_token())
            .json(body)
            .send()
            .await
            .map_err(CalendarError::transport)?;

        expect_json(resp, event_id).await
    }

    // --- access rules ---

    pub async fn list_acl_rules(&self) -> CalendarResult<Vec<AccessRule>> {
        let resp = self
            .http
            .get(self.acl_url())
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let page: RulesPage = expect_json(resp, "acl list").await?;
        Ok(page.items)
    }

    pub async fn insert_acl_rule(
        &self,
        user_email: &str,
        role: AclRole,
    ) -> CalendarResult<AccessRule> {
        let body = AccessRule::for_user(user_email, role);

        let resp = self
            .http
            .post(self.acl_url())
            .bearer_auth(self.session.access_token())
            .json(&body)
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let rule: AccessRule = expect_json(resp, user_email).await?;
        info!(
            id = rule.id.as_deref().unwrap_or(""),
            scope = %rule.scope,
            role = %rule.role,
            "acl rule inserted"
        );
        Ok(rule)
    }

    pub async fn delete_acl_rule(&self, rule_id: &str) -> CalendarResult<()> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.acl_url(), rule_id))
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(CalendarError::transport)?;

        expect_ok(resp, rule_id).await?;
        info!(id = rule_id, "acl rule deleted");
        Ok(())
    }

    // --- calendar list ---

    pub async fn list_calendars(&self) -> CalendarResult<Vec<CalendarListEntry>> {
        let resp = self
            .http
            .get(format!("{}/users/me/calendarList", self.base_url))
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(CalendarError::transport)?;

        let page: CalendarsPage = expect_json(resp, "calendar list").await?;
        Ok(page.items)
    }
}

/// Pager over the occurrences of a recurring event, driven by the opaque
/// continuation token the service returns. Exhausted when a page comes
/// back without a token.
pub struct InstancePages<'a> {
    client: &'a CalendarClient,
    event_id: String,
    next_token: Option<String>,
    done: bool,
}

impl InstancePages<'_> {
    pub async fn next_page(&mut self) -> CalendarResult<Option<Vec<Event>>> {
        if self.done {
            return Ok(None);
        }

        let mut req = self
            .client
            .http
            .get(format!(
                "{}/instances",
                self.client.event_url(&self.event_id)
            ))
            .bearer_auth(self.client.session.access_token());

        if let Some(token) = &self.next_token {
            req = req.query(&[("pageToken", token.as_str())]);
        }

        let resp = req.send().await.map_err(CalendarError::transport)?;
        let page: EventsPage = expect_json(resp, &self.event_id).await?;

        self.next_token = page.next_page_token;
        if self.next_token.is_none() {
            self.done = true;
        }

        Ok(Some(page.items))
    }
}

/// Map a response to the error taxonomy and parse its JSON body.
async fn expect_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    target: &str,
) -> CalendarResult<T> {
    let resp = check_status(resp, target).await?;
    resp.json().await.map_err(CalendarError::transport)
}

/// Map a response to the error taxonomy, ignoring any body.
async fn expect_ok(resp: reqwest::Response, target: &str) -> CalendarResult<()> {
    check_status(resp, target).await.map(|_| ())
}

async fn check_status(resp: reqwest::Response, target: &str) -> CalendarResult<reqwest::Response> {
    let status = resp.status();

    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(CalendarError::NotFound(target.to_string()));
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(CalendarError::Transport(format!(
            "{}: HTTP {}: {}",
            target, status, body
        )));
    }

    Ok(resp)
}
