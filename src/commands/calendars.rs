//! `gcal calendars`: list the calendars attached to the account.

use anyhow::Result;

use crate::client::CalendarClient;
use crate::render;

pub async fn list(client: &CalendarClient) -> Result<()> {
    let calendars = client.list_calendars().await?;
    render::calendars_table(&calendars);
    Ok(())
}
