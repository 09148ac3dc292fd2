//! Read one merged portfolio entity and print it as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use portfolio::domain::{ContestId, EventId, GetUsersArgs, GroupId, ProjectId, UserId};
use portfolio::settings::PortfolioSettings;
use portfolio::state::{Repositories, build_repositories};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `portfolio-inspect` command arguments.
///
/// Connection settings come from `PORTFOLIO_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portfolio-inspect",
    about = "Print merged portfolio entities from the local store and remote services",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    target: Target,
}

#[derive(Debug, Clone, Subcommand)]
enum Target {
    /// List users known to both the presence service and the local store.
    Users {
        /// Include suspended users.
        #[arg(long = "include-suspended", conflicts_with = "name")]
        include_suspended: Option<bool>,
        /// Restrict to an exact user name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one user with accounts, projects, contests and groups.
    User { id: UserId },
    /// Show one project with its members.
    Project { id: ProjectId },
    /// Show one contest with its teams.
    Contest { id: ContestId },
    /// Show one group with its leader and members.
    Group { id: GroupId },
    /// Show one calendar event with its visibility level.
    Event { id: EventId },
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> io::Result<()> {
    let settings = PortfolioSettings::load_from_env()
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let state = build_repositories(&settings)
        .await
        .map_err(|error| io::Error::other(format!("wire repositories: {error}")))?;

    let json = render(&state.repositories, args.target).await?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")
}

async fn render(repositories: &Repositories, target: Target) -> io::Result<String> {
    match target {
        Target::Users {
            include_suspended,
            name,
        } => {
            let args = GetUsersArgs {
                include_suspended,
                name,
            };
            to_json("users", repositories.users.get_users(&args).await)
        }
        Target::User { id } => to_json("user", repositories.users.get_user(&id).await),
        Target::Project { id } => to_json("project", repositories.projects.get_project(&id).await),
        Target::Contest { id } => to_json("contest", repositories.contests.get_contest(&id).await),
        Target::Group { id } => to_json("group", repositories.groups.get_group(&id).await),
        Target::Event { id } => to_json("event", repositories.events.get_event(&id).await),
    }
}

fn to_json<T: Serialize>(
    what: &str,
    result: Result<T, portfolio::domain::Error>,
) -> io::Result<String> {
    let value = result.map_err(|error| {
        io::Error::other(format!(
            "read {what} failed ({:?}): {}",
            error.code(),
            error.message()
        ))
    })?;
    serde_json::to_string_pretty(&value)
        .map_err(|error| io::Error::other(format!("encode {what}: {error}")))
}
