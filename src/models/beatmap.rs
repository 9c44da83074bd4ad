//! Beatmap entity and its nested records

use super::user::User;
use crate::client::{Attach, BeatSaver, ClientHandle};
use crate::error::{Error, Result};
use crate::pagination::RequestOptions;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// Beatmap
// ============================================================================

/// A beatmap.
///
/// Beatmaps built from only a key or hash are partial; call
/// [`populate`](Beatmap::populate) to fetch the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beatmap {
    /// Unique ID
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Hex key
    pub key: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Uploader
    pub uploader: Option<User>,
    /// Upload time
    pub uploaded: Option<DateTime<Utc>>,
    /// Song and difficulty metadata
    pub metadata: Option<Metadata>,
    /// Play and vote statistics
    pub stats: Option<Stats>,
    /// Download URL that skips the download counter
    pub direct_download: Option<String>,
    /// Download URL
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    /// Cover art URL
    #[serde(rename = "coverURL")]
    pub cover_url: Option<String>,
    /// SHA1 hash of the map files
    pub hash: Option<String>,

    #[serde(skip)]
    client: ClientHandle,
}

impl Beatmap {
    /// Create a partial beatmap from a key and/or hash.
    ///
    /// Blank identifiers count as missing; at least one must be present.
    pub fn partial(client: &BeatSaver, key: Option<&str>, hash: Option<&str>) -> Result<Self> {
        let key = non_blank(key);
        let hash = non_blank(hash);
        if key.is_none() && hash.is_none() {
            return Err(Error::InvalidPartial);
        }

        Ok(Self {
            key,
            hash,
            client: client.handle(),
            ..Self::default()
        })
    }

    /// Set a display name on a partial beatmap
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether some fields still need to be fetched
    pub fn is_partial(&self) -> bool {
        self.id.is_none() || self.name.is_none() || self.cover_url.is_none()
    }

    /// File name of the cover art
    pub fn cover_filename(&self) -> Option<&str> {
        let url = self.cover_url.as_deref()?;
        let path = url.split(['?', '#']).next().unwrap_or(url);
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Fill in every field of a partial beatmap.
    ///
    /// Looks up by hash when one is known, else by key. Complete beatmaps are
    /// left untouched.
    pub async fn populate(&mut self, options: &RequestOptions) -> Result<()> {
        if !self.is_partial() {
            return Ok(());
        }
        let client = self.client.upgrade()?;

        let fetched = match (&self.hash, &self.key) {
            (Some(hash), _) => client
                .beatmap_by_hash(hash, options)
                .await?
                .ok_or_else(|| Error::InvalidPartialHash { hash: hash.clone() })?,
            (None, Some(key)) => client
                .beatmap_by_key(key, options)
                .await?
                .ok_or_else(|| Error::InvalidPartialKey { key: key.clone() })?,
            (None, None) => return Err(Error::InvalidPartial),
        };

        debug!(key = ?fetched.key, hash = ?fetched.hash, "Populated partial beatmap");
        *self = fetched;
        Ok(())
    }

    /// Refresh name, description and stats
    pub async fn refresh(&mut self, options: &RequestOptions) -> Result<()> {
        if let Some(latest) = self.fetch_stats(options).await? {
            self.name = latest.name;
            self.description = latest.description;
            self.stats = latest.stats;
        }
        Ok(())
    }

    /// Refresh stats only
    pub async fn refresh_stats(&mut self, options: &RequestOptions) -> Result<()> {
        if let Some(latest) = self.fetch_stats(options).await? {
            self.stats = latest.stats;
        }
        Ok(())
    }

    async fn fetch_stats(&self, options: &RequestOptions) -> Result<Option<Beatmap>> {
        let client = self.client.upgrade()?;
        let hash = self.hash.as_deref().ok_or_else(|| Error::invalid_argument("hash"))?;
        client.beatmap_stats_by_hash(hash, options).await
    }

    /// Download the map zip; `direct` skips the download counter
    pub async fn zip_bytes(&self, direct: bool, options: &RequestOptions) -> Result<Bytes> {
        let (name, url) = if direct {
            ("direct_download", &self.direct_download)
        } else {
            ("download_url", &self.download_url)
        };
        let url = url.as_deref().ok_or_else(|| Error::invalid_argument(name))?;

        let client = self.client.upgrade()?;
        client.fetch_asset(url, options).await
    }

    /// Download the cover art
    pub async fn cover_image_bytes(&self, options: &RequestOptions) -> Result<Bytes> {
        let url = self
            .cover_url
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("cover_url"))?;

        let client = self.client.upgrade()?;
        client.fetch_asset(url, options).await
    }
}

impl Attach for Beatmap {
    fn attach(&mut self, client: &ClientHandle) {
        self.client = client.clone();
        if let Some(ref mut uploader) = self.uploader {
            uploader.attach(client);
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

// ============================================================================
// Nested Records
// ============================================================================

/// Song and difficulty metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Song title
    pub song_name: String,
    /// Song subtitle
    pub song_sub_name: String,
    /// Song artist
    pub song_author_name: String,
    /// Mapper credited in the level
    pub level_author_name: String,
    /// Song duration in seconds
    pub duration: i64,
    /// Beats per minute
    pub bpm: f64,
    /// Automapper that generated the map, if any
    pub automapper: Option<String>,
    /// Standard difficulties present
    pub difficulties: Difficulties,
    /// Per-characteristic difficulty details
    pub characteristics: Vec<Characteristic>,
}

/// Which standard difficulties are present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Difficulties {
    /// Easy
    pub easy: bool,
    /// Normal
    pub normal: bool,
    /// Hard
    pub hard: bool,
    /// Expert
    pub expert: bool,
    /// Expert+
    pub expert_plus: bool,
}

/// A characteristic (Standard, OneSaber, ...) and its difficulties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characteristic {
    /// Characteristic name
    pub name: String,
    /// Difficulty name to details; absent difficulties are `None`
    pub difficulties: BTreeMap<String, Option<CharacteristicDifficulty>>,
}

/// Details of one difficulty of a characteristic
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacteristicDifficulty {
    /// Length in beats
    pub duration: f64,
    /// Length in seconds
    pub length: i64,
    /// Bomb count
    pub bombs: i64,
    /// Note count
    pub notes: i64,
    /// Wall count
    pub obstacles: i64,
    /// Note jump speed
    pub njs: f64,
    /// Note jump speed offset
    pub njs_offset: f64,
}

/// Play and vote statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    /// Download count
    pub downloads: i64,
    /// Play count
    pub plays: i64,
    /// Upvotes
    pub up_votes: i64,
    /// Downvotes
    pub down_votes: i64,
    /// Rating in `0.0..=1.0`
    pub rating: f64,
    /// Heat score used by the hot feed
    pub heat: f64,
}
