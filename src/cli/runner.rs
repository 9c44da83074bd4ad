//! CLI runner - executes commands

use crate::cli::commands::{AutomapArg, Cli, Commands, Feed, OutputFormat};
use crate::client::BeatSaver;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::Beatmap;
use crate::pagination::{PageStream, PagedRequestOptions, RequestOptions, SearchRequestOptions};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = BeatSaver::new(self.client_config()?)?;

        match &self.cli.command {
            Commands::Key { key } => self.key(&client, key).await,
            Commands::Hash { hash, stats } => self.hash(&client, hash, *stats).await,
            Commands::User { id, uploads, limit } => self.user(&client, id, *uploads, *limit).await,
            Commands::Feed {
                feed,
                page,
                limit,
                automaps,
            } => self.feed(&client, *feed, *page, *limit, *automaps).await,
            Commands::Search {
                query,
                advanced,
                page,
                limit,
            } => self.search(&client, query, *advanced, *page, *limit).await,
            Commands::Download {
                key,
                output,
                direct,
                cover,
            } => self.download(&client, key, output, *direct, *cover).await,
        }
    }

    /// Build the client config from the config file and command-line overrides
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match self.cli.config {
            Some(ref path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new(&self.cli.app_name, &self.cli.app_version),
        };

        if let Some(ref base_url) = self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if self.cli.handle_rate_limits {
            config.handle_rate_limits = true;
        }
        if self.cli.no_cache {
            config.disable_caching = true;
        }

        config.validate()?;
        Ok(config)
    }

    async fn key(&self, client: &BeatSaver, key: &str) -> Result<()> {
        match client.beatmap_by_key(key, &RequestOptions::default()).await? {
            Some(map) => self.output(&map),
            None => {
                warn!(key, "No beatmap with this key");
                self.output_value(&Value::Null);
            }
        }
        Ok(())
    }

    async fn hash(&self, client: &BeatSaver, hash: &str, stats: bool) -> Result<()> {
        let options = RequestOptions::default();
        let map = if stats {
            client.beatmap_stats_by_hash(hash, &options).await?
        } else {
            client.beatmap_by_hash(hash, &options).await?
        };

        match map {
            Some(map) => self.output(&map),
            None => {
                warn!(hash, "No beatmap with this hash");
                self.output_value(&Value::Null);
            }
        }
        Ok(())
    }

    async fn user(&self, client: &BeatSaver, id: &str, uploads: bool, limit: usize) -> Result<()> {
        let Some(user) = client.user(id, &RequestOptions::default()).await? else {
            warn!(id, "No user with this ID");
            self.output_value(&Value::Null);
            return Ok(());
        };

        self.output(&user);
        if uploads {
            let stream = user.beatmaps_stream(PagedRequestOptions::default());
            self.drain(stream, limit).await?;
        }
        Ok(())
    }

    async fn feed(
        &self,
        client: &BeatSaver,
        feed: Feed,
        page: u32,
        limit: usize,
        automaps: AutomapArg,
    ) -> Result<()> {
        let options = PagedRequestOptions::new().page(page).automaps(automaps.into());
        let stream = match feed {
            Feed::Latest => client.latest_stream(options),
            Feed::Hot => client.hot_stream(options),
            Feed::Rating => client.rating_stream(options),
            Feed::Downloads => client.downloads_stream(options),
        };
        self.drain(stream, limit).await
    }

    async fn search(
        &self,
        client: &BeatSaver,
        query: &str,
        advanced: bool,
        page: u32,
        limit: usize,
    ) -> Result<()> {
        let options = SearchRequestOptions::new(query).page(page);
        if !advanced {
            return self.drain(client.search_stream(options), limit).await;
        }

        // Advanced search is walked page by page
        let mut current = client.search_advanced(options).await?;
        let mut emitted = 0;
        loop {
            for map in &current.items {
                if emitted == limit {
                    return Ok(());
                }
                self.output(map);
                emitted += 1;
            }
            if !current.has_next() {
                return Ok(());
            }
            current = current.next(None).await?;
        }
    }

    async fn download(
        &self,
        client: &BeatSaver,
        key: &str,
        output: &Path,
        direct: bool,
        cover: bool,
    ) -> Result<()> {
        let mut map = Beatmap::partial(client, Some(key), None)?;
        map.populate(&RequestOptions::default()).await?;

        let last_quarter = Arc::new(AtomicU8::new(0));
        let options = RequestOptions::new().on_progress(move |progress| {
            let quarter = (progress * 4.0).floor() as u8;
            if last_quarter.fetch_max(quarter, Ordering::Relaxed) < quarter {
                info!(percent = u32::from(quarter) * 25, "Downloading");
            }
        });

        let bytes = if cover {
            map.cover_image_bytes(&options).await?
        } else {
            map.zip_bytes(direct, &options).await?
        };

        tokio::fs::write(output, &bytes).await?;
        debug!(path = %output.display(), bytes = bytes.len(), "Wrote file");

        self.output_value(&json!({
            "key": map.key,
            "name": map.name,
            "path": output.display().to_string(),
            "bytes": bytes.len(),
        }));
        Ok(())
    }

    /// Print up to `limit` beatmaps from a stream
    async fn drain(&self, mut stream: PageStream<Beatmap>, limit: usize) -> Result<()> {
        let mut emitted = 0;
        while emitted < limit {
            match stream.next().await {
                Some(Ok(map)) => {
                    self.output(&map);
                    emitted += 1;
                }
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }
        debug!(emitted, "Listing finished");
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.output_value(&value),
            Err(e) => warn!(error = %Error::from(e), "Failed to serialize output"),
        }
    }

    fn output_value(&self, value: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::parse_from(args.iter().copied()))
    }

    #[test]
    fn test_client_config_from_flags() {
        let runner = runner(&[
            "beatsaver",
            "--app-name",
            "Tester",
            "--app-version",
            "9",
            "--base-url",
            "http://localhost:9000",
            "--handle-rate-limits",
            "--no-cache",
            "key",
            "2144",
        ]);
        let config = runner.client_config().unwrap();

        assert_eq!(config.application.name, "Tester");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(config.handle_rate_limits);
        assert!(!config.caching_enabled());
    }

    #[test]
    fn test_client_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "application:\n  name: from-file\n  version: '2'\nmax_rate_limit_retries: 3").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let runner = runner(&["beatsaver", "--config", &path, "key", "2144"]);
        let config = runner.client_config().unwrap();

        assert_eq!(config.application.name, "from-file");
        assert_eq!(config.max_rate_limit_retries, Some(3));
        assert!(!config.handle_rate_limits);
    }

    #[test]
    fn test_client_config_rejects_blank_app() {
        let runner = runner(&["beatsaver", "--app-name", "", "key", "2144"]);
        assert!(matches!(runner.client_config(), Err(Error::Config { .. })));
    }
}
