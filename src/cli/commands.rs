// Command handlers. Each returns the process exit code:
//   0 = success, 1 = the lookup failed (cached data is still shown), 2 = bad input

use anyhow::{Context, Result};

use super::args::Commands;
use super::render;
use crate::core::github::{GithubClient, SearchOutcome, UserSearchService};
use crate::core::storage::LocalStore;

pub async fn dispatch<C, S>(service: &UserSearchService<C, S>, command: Commands) -> Result<i32>
where
    C: GithubClient,
    S: LocalStore,
{
    match command {
        Commands::Search { username, json } => search(service, &username, json).await,
        Commands::Show { json } => show(service, json).await,
        Commands::Clear => clear(service).await,
    }
}

async fn search<C, S>(service: &UserSearchService<C, S>, username: &str, json: bool) -> Result<i32>
where
    C: GithubClient,
    S: LocalStore,
{
    match service.search(username).await {
        SearchOutcome::Updated => {
            render::print_snapshot(&service.snapshot().await, json)?;
            Ok(0)
        }
        SearchOutcome::Skipped => {
            eprintln!("Nothing to search for: the username is empty");
            Ok(2)
        }
        SearchOutcome::Failed | SearchOutcome::Superseded => {
            eprintln!("⚠️  Could not load GitHub user `{}`", username.trim());
            let snapshot = service.snapshot().await;
            if !snapshot.is_empty() {
                eprintln!("Showing the last known data instead.\n");
                render::print_snapshot(&snapshot, json)?;
            }
            Ok(1)
        }
    }
}

async fn show<C, S>(service: &UserSearchService<C, S>, json: bool) -> Result<i32>
where
    C: GithubClient,
    S: LocalStore,
{
    let snapshot = service.snapshot().await;
    if snapshot.is_empty() && !json {
        println!("No cached GitHub user. Run `git-user-explorer search <username>` first.");
        return Ok(0);
    }
    render::print_snapshot(&snapshot, json)?;
    Ok(0)
}

async fn clear<C, S>(service: &UserSearchService<C, S>) -> Result<i32>
where
    C: GithubClient,
    S: LocalStore,
{
    service
        .clear()
        .await
        .context("Failed to remove cached GitHub user data")?;
    println!("🧹 Cached GitHub user data removed");
    Ok(0)
}
