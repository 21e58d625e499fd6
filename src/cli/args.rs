use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "git-user-explorer",
    version,
    about = "Look up a GitHub user's profile, followers, gists and repositories",
    long_about = "git-user-explorer fetches a GitHub user's profile together with their followers, \
                  gists and repositories, and caches the last result locally so it can be shown offline."
)]
pub struct Cli {
    /// Directory holding the local storage file (overrides GIT_USER_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep results in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(short = 'l', long = "log-level", global = true, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a user and cache the result
    ///
    /// Example: git-user-explorer search octocat
    Search {
        /// GitHub login to look up
        username: String,

        /// Print the result as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Print the cached user without touching the network
    Show {
        /// Print the result as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Forget the cached user
    Clear,
}
