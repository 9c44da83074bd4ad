//! CLI commands and argument parsing

use crate::types::AutomapFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BeatSaver API client CLI
#[derive(Parser, Debug)]
#[command(name = "beatsaver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Instance base URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Application name sent in the User-Agent
    #[arg(long, global = true, default_value = "beatsaver-cli")]
    pub app_name: String,

    /// Application version sent in the User-Agent
    #[arg(long, global = true, default_value = crate::VERSION)]
    pub app_version: String,

    /// Sleep until the rate limit resets instead of failing on HTTP 429
    #[arg(long, global = true)]
    pub handle_rate_limits: bool,

    /// Disable ETag caching
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a beatmap by key
    Key {
        /// Hex key
        key: String,
    },

    /// Fetch a beatmap by hash
    Hash {
        /// SHA1 hash
        hash: String,

        /// Only fetch name, description and stats
        #[arg(long)]
        stats: bool,
    },

    /// Fetch a user, optionally with their uploads
    User {
        /// User ID
        id: String,

        /// List the user's uploaded beatmaps
        #[arg(long)]
        uploads: bool,

        /// Maximum number of uploads to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// List beatmaps from a feed
    Feed {
        /// Feed ordering
        #[arg(value_enum)]
        feed: Feed,

        /// Page to start from
        #[arg(long, default_value = "0")]
        page: u32,

        /// Maximum number of beatmaps to list
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Automapped beatmap filter
        #[arg(long, value_enum, default_value = "include")]
        automaps: AutomapArg,
    },

    /// Search beatmaps
    Search {
        /// Search query
        query: String,

        /// Use Lucene syntax (advanced search)
        #[arg(long)]
        advanced: bool,

        /// Page to start from
        #[arg(long, default_value = "0")]
        page: u32,

        /// Maximum number of beatmaps to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Download a beatmap zip or its cover art
    Download {
        /// Hex key
        key: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Use the direct download URL (skips the download counter)
        #[arg(long)]
        direct: bool,

        /// Download the cover art instead of the zip
        #[arg(long)]
        cover: bool,
    },
}

/// Map feed orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Feed {
    /// Ordered by upload date
    Latest,
    /// Ordered by heat
    Hot,
    /// Ordered by rating
    Rating,
    /// Ordered by download count
    Downloads,
}

/// Automapped beatmap filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AutomapArg {
    /// Include automapped beatmaps
    Include,
    /// Exclude automapped beatmaps
    Exclude,
    /// Only automapped beatmaps
    Only,
}

impl From<AutomapArg> for AutomapFilter {
    fn from(arg: AutomapArg) -> Self {
        match arg {
            AutomapArg::Include => AutomapFilter::Include,
            AutomapArg::Exclude => AutomapFilter::Exclude,
            AutomapArg::Only => AutomapFilter::Only,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
