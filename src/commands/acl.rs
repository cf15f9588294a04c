//! Access-rule subcommands: direct call-throughs to the ACL endpoints.

use anyhow::Result;
use gcal_core::AclRole;
use owo_colors::OwoColorize;

use crate::client::CalendarClient;
use crate::render;

pub async fn list(client: &CalendarClient) -> Result<()> {
    let rules = client.list_acl_rules().await?;
    render::acl_table(&rules);
    Ok(())
}

pub async fn insert(client: &CalendarClient, user_email: &str, role: &str) -> Result<()> {
    let role: AclRole = role.parse()?;

    let rule = client.insert_acl_rule(user_email, role).await?;
    println!(
        "{}",
        format!(
            "Inserted rule {} ({} -> {})",
            rule.id.as_deref().unwrap_or("?"),
            rule.scope,
            rule.role
        )
        .green()
    );
    Ok(())
}

pub async fn delete(client: &CalendarClient, rule_id: &str) -> Result<()> {
    match client.delete_acl_rule(rule_id).await {
        Ok(()) => println!("{}", format!("Deleted rule {}", rule_id).green()),
        Err(e) if e.is_not_found() => {
            println!("{}", format!("Rule not found: {}", rule_id).red());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
