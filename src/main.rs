use anyhow::Result;
use clap::{Parser, Subcommand};

use gcal_cli::client::{CalendarClient, DEFAULT_CALENDAR_ID};
use gcal_cli::commands;
use gcal_cli::config::Credentials;
use gcal_cli::session::Session;

#[derive(Parser)]
#[command(name = "gcal")]
#[command(about = "Manage events and access rules on a Google Calendar")]
struct Cli {
    /// Calendar to operate on
    #[arg(long, global = true, default_value = DEFAULT_CALENDAR_ID)]
    calendar: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store an OAuth session
    Auth,
    /// Event operations
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Access-rule operations
    Acl {
        #[command(subcommand)]
        command: AclCommands,
    },
    /// List the account's calendars
    Calendars,
}

#[derive(Subcommand)]
enum EventCommands {
    /// List upcoming events
    List {
        /// Maximum number of events to show
        #[arg(long, default_value_t = 10)]
        max: u32,
    },
    /// Create a new event
    Create {
        summary: String,
        description: String,
        /// Start timestamp (RFC 3339, e.g. 2030-01-01T09:00:00Z)
        start: String,
        /// End timestamp (RFC 3339)
        end: String,
        /// Attendee email (repeatable)
        #[arg(long = "attendee")]
        attendees: Vec<String>,
        /// Recurrence keyword: daily or monthly
        #[arg(long)]
        recurrence: Option<String>,
    },
    /// Show one event
    Get { id: String },
    /// Update an event; unset fields keep their current values
    Update {
        id: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New start timestamp (RFC 3339)
        #[arg(long)]
        start: Option<String>,
        /// New end timestamp (RFC 3339)
        #[arg(long)]
        end: Option<String>,
        /// Attendee email (repeatable)
        #[arg(long = "attendee")]
        attendees: Vec<String>,
        /// Treat the attendee list as a removal set instead of an addition
        #[arg(long)]
        remove_attendees: bool,
    },
    /// Delete an event
    Delete { id: String },
    /// Find upcoming events whose summary contains a substring
    Find {
        needle: String,
        /// Maximum number of matches to show
        #[arg(long, default_value_t = 5)]
        max: usize,
    },
    /// Delete every upcoming event whose summary contains a substring
    DeleteBySummary { needle: String },
    /// Copy an event to a new start time as an independent record
    Import {
        id: String,
        /// New start timestamp (RFC 3339)
        start: String,
        /// New end timestamp; defaults to one hour after the start
        #[arg(long)]
        end: Option<String>,
    },
    /// List all occurrences of a recurring event
    Instances { id: String },
    /// Update every occurrence of a recurring event
    UpdateInstances {
        id: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Attendee email (repeatable); replaces each occurrence's list
        #[arg(long = "attendee")]
        attendees: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AclCommands {
    /// List the calendar's access rules
    List,
    /// Grant a role to a user
    Insert {
        user_email: String,
        /// One of: none, freeBusyReader, reader, writer, owner
        role: String,
    },
    /// Delete an access rule
    Delete { rule_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Auth = cli.command {
        return commands::auth::run().await;
    }

    let creds = Credentials::load()?;
    let session = Session::load_valid(&creds).await?;
    let client = CalendarClient::new(session, &cli.calendar);

    match cli.command {
        Commands::Auth => unreachable!(),
        Commands::Events { command } => match command {
            EventCommands::List { max } => commands::events::list(&client, max).await,
            EventCommands::Create {
                summary,
                description,
                start,
                end,
                attendees,
                recurrence,
            } => {
                commands::events::create(
                    &client,
                    summary,
                    description,
                    &start,
                    &end,
                    attendees,
                    recurrence,
                )
                .await
            }
            EventCommands::Get { id } => commands::events::get(&client, &id).await,
            EventCommands::Update {
                id,
                summary,
                description,
                start,
                end,
                attendees,
                remove_attendees,
            } => {
                commands::events::update(
                    &client,
                    &id,
                    summary,
                    description,
                    start,
                    end,
                    attendees,
                    remove_attendees,
                )
                .await
            }
            EventCommands::Delete { id } => commands::events::delete(&client, &id).await,
            EventCommands::Find { needle, max } => {
                commands::events::find(&client, &needle, max).await
            }
            EventCommands::DeleteBySummary { needle } => {
                commands::events::delete_by_summary(&client, &needle).await
            }
            EventCommands::Import { id, start, end } => {
                commands::events::import(&client, &id, &start, end).await
            }
            EventCommands::Instances { id } => commands::events::instances(&client, &id).await,
            EventCommands::UpdateInstances {
                id,
                summary,
                description,
                attendees,
            } => {
                commands::events::update_instances(&client, &id, summary, description, attendees)
                    .await
            }
        },
        Commands::Acl { command } => match command {
            AclCommands::List => commands::acl::list(&client).await,
            AclCommands::Insert { user_email, role } => {
                commands::acl::insert(&client, &user_email, &role).await
            }
            AclCommands::Delete { rule_id } => commands::acl::delete(&client, &rule_id).await,
        },
        Commands::Calendars => commands::calendars::list(&client).await,
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
