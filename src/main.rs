// Entry point of git-user-explorer.
//
// **Architecture Overview:**
// - `core/` = Business logic (user search state, retries, storage port)
// - `infra/` = Implementations of core traits (GitHub HTTP API, local storage)
// - `cli/` = Command line adapter (arguments, handlers, terminal output)
//
// This file's job is to:
// 1. Parse arguments and set up logging
// 2. Load configuration
// 3. Wire the services together
// 4. Run the requested command and exit with its code

#[path = "cli/cli_layer.rs"]
mod cli;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{commands, Cli};
use crate::config::AppConfig;
use crate::core::github::UserSearchService;
use crate::infra::github::github_client::GithubApiClient;
use crate::infra::storage::{InMemoryStore, JsonFileStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, command output to stdout.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "git-user-explorer failed");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let client = GithubApiClient::new(config.github_token.clone(), &config.api_url, config.timeout)
        .context("Failed to create GitHub API client")?;
    tracing::debug!(
        api_url = %config.api_url,
        authenticated = config.github_token.is_some(),
        "GitHub client ready"
    );

    if cli.no_cache {
        let service = UserSearchService::new(client, InMemoryStore::new(), config.retry).await;
        commands::dispatch(&service, cli.command).await
    } else {
        let store = JsonFileStore::open(config.storage_path()).await;
        tracing::debug!(path = %store.path().display(), "Using local storage file");
        let service = UserSearchService::new(client, store, config.retry).await;
        commands::dispatch(&service, cli.command).await
    }
}
