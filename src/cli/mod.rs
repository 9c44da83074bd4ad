//! CLI module
//!
//! Command-line interface for querying the BeatSaver API.
//!
//! # Commands
//!
//! - `key` - Fetch a beatmap by key
//! - `hash` - Fetch a beatmap (or just its stats) by hash
//! - `user` - Fetch a user and their uploads
//! - `feed` - List the latest, hot, top rated or most downloaded beatmaps
//! - `search` - Text or advanced search
//! - `download` - Save a beatmap zip or cover art

mod commands;
mod runner;

pub use commands::{AutomapArg, Cli, Commands, Feed, OutputFormat};
pub use runner::Runner;
