//! User entity

use super::beatmap::Beatmap;
use crate::client::{Attach, ClientHandle};
use crate::error::{Error, Result};
use crate::pagination::{Page, PageStream, PagedRequestOptions};
use serde::{Deserialize, Serialize};

/// A BeatSaver user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Unique ID
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Display name
    pub username: Option<String>,

    #[serde(skip)]
    client: ClientHandle,
}

impl User {
    /// Whether some fields are missing
    pub fn is_partial(&self) -> bool {
        self.id.is_none() || self.username.is_none()
    }

    /// A page of beatmaps uploaded by this user
    pub async fn beatmaps(&self, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        let id = self.id.as_deref().ok_or_else(|| Error::invalid_argument("id"))?;
        let client = self.client.upgrade()?;
        client.uploads(id, options).await
    }

    /// Stream of every beatmap uploaded by this user
    pub fn beatmaps_stream(&self, options: PagedRequestOptions) -> PageStream<Beatmap> {
        let user = self.clone();
        PageStream::lazy(async move { user.beatmaps(options).await })
    }
}

impl Attach for User {
    fn attach(&mut self, client: &ClientHandle) {
        self.client = client.clone();
    }
}
