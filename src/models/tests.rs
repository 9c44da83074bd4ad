//! Tests for the entity records

use super::*;
use crate::client::{Attach, BeatSaver, ClientHandle};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::pagination::{PagedRequestOptions, RequestOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

fn client() -> BeatSaver {
    BeatSaver::new(ClientConfig::new("TestApp", "1.0")).unwrap()
}

fn beatmap_json() -> serde_json::Value {
    json!({
        "_id": "5cff620e48229f7d88fc63e4",
        "key": "2144",
        "name": "Overkill",
        "description": "Expert+ only",
        "uploader": {"_id": "5cff0b7298cc5a672c84e98d", "username": "mapper"},
        "uploaded": "2019-06-11T08:35:26.776Z",
        "metadata": {
            "songName": "Overkill",
            "songSubName": "",
            "songAuthorName": "RIOT",
            "levelAuthorName": "Nuketime",
            "duration": 245,
            "bpm": 174.5,
            "automapper": null,
            "difficulties": {"easy": false, "normal": false, "hard": true, "expert": true, "expertPlus": true},
            "characteristics": [{
                "name": "Standard",
                "difficulties": {
                    "easy": null,
                    "expertPlus": {
                        "duration": 712.5,
                        "length": 245,
                        "bombs": 12,
                        "notes": 1530,
                        "obstacles": 40,
                        "njs": 18.0,
                        "njsOffset": -0.25
                    }
                }
            }]
        },
        "stats": {"downloads": 10, "plays": 2, "upVotes": 5, "downVotes": 1, "rating": 0.83, "heat": 1200.5},
        "directDownload": "/cdn/2144/abc.zip",
        "downloadURL": "/api/download/key/2144",
        "coverURL": "/cdn/2144/abc.jpg",
        "hash": "abc"
    })
}

#[test]
fn test_beatmap_decodes() {
    let map: Beatmap = serde_json::from_value(beatmap_json()).unwrap();

    assert_eq!(map.key.as_deref(), Some("2144"));
    assert_eq!(map.uploader.as_ref().unwrap().username.as_deref(), Some("mapper"));
    assert_eq!(map.uploaded.unwrap().timestamp(), 1_560_242_126);
    assert!(!map.is_partial());

    let metadata = map.metadata.as_ref().unwrap();
    assert_eq!(metadata.song_author_name, "RIOT");
    assert_eq!(metadata.duration, 245);
    assert!(metadata.automapper.is_none());
    assert!(metadata.difficulties.expert_plus);
    assert!(!metadata.difficulties.easy);

    let standard = &metadata.characteristics[0];
    assert_eq!(standard.name, "Standard");
    assert_eq!(standard.difficulties["easy"], None);
    let expert_plus = standard.difficulties["expertPlus"].unwrap();
    assert_eq!(expert_plus.notes, 1530);
    assert_eq!(expert_plus.njs_offset, -0.25);

    let stats = map.stats.unwrap();
    assert_eq!(stats.up_votes, 5);
    assert_eq!(stats.down_votes, 1);
}

#[test]
fn test_beatmap_missing_fields_is_partial() {
    let map: Beatmap = serde_json::from_value(json!({"key": "2144"})).unwrap();
    assert!(map.is_partial());
    assert!(map.metadata.is_none());
}

#[test]
fn test_beatmap_serializes_wire_names() {
    let map: Beatmap = serde_json::from_value(beatmap_json()).unwrap();
    let value = serde_json::to_value(&map).unwrap();

    assert_eq!(value["_id"], "5cff620e48229f7d88fc63e4");
    assert_eq!(value["downloadURL"], "/api/download/key/2144");
    assert_eq!(value["coverURL"], "/cdn/2144/abc.jpg");
    assert_eq!(value["directDownload"], "/cdn/2144/abc.zip");
    assert!(value.get("client").is_none());
}

#[test]
fn test_cover_filename() {
    let map: Beatmap = serde_json::from_value(beatmap_json()).unwrap();
    assert_eq!(map.cover_filename(), Some("abc.jpg"));

    let map: Beatmap = serde_json::from_value(json!({"coverURL": "/cdn/x/cover.png?v=2"})).unwrap();
    assert_eq!(map.cover_filename(), Some("cover.png"));

    assert_eq!(Beatmap::default().cover_filename(), None);
}

#[test]
fn test_partial_constructor() {
    let client = client();

    let map = Beatmap::partial(&client, Some("2144"), None).unwrap().with_name("Overkill");
    assert!(map.is_partial());
    assert_eq!(map.key.as_deref(), Some("2144"));
    assert_eq!(map.name.as_deref(), Some("Overkill"));
    assert!(map.hash.is_none());

    let err = Beatmap::partial(&client, Some(""), Some("  ")).unwrap_err();
    assert!(matches!(err, Error::InvalidPartial));
}

#[tokio::test]
async fn test_populate_complete_map_is_noop() {
    // No client attached, but nothing needs fetching
    let mut map: Beatmap = serde_json::from_value(beatmap_json()).unwrap();
    map.populate(&RequestOptions::default()).await.unwrap();
    assert_eq!(map.name.as_deref(), Some("Overkill"));
}

#[tokio::test]
async fn test_partial_with_dropped_client_is_detached() {
    let client = client();
    let mut map = Beatmap::partial(&client, None, Some("abc")).unwrap();
    drop(client);

    let err = map.populate(&RequestOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Detached));
}

#[tokio::test]
async fn test_asset_without_url_is_invalid_argument() {
    let client = client();
    let map = Beatmap::partial(&client, Some("2144"), None).unwrap();

    let err = map.zip_bytes(true, &RequestOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { ref name } if name == "direct_download"));

    let err = map.cover_image_bytes(&RequestOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { ref name } if name == "cover_url"));
}

#[test]
fn test_user_decodes() {
    let user: User = serde_json::from_value(json!({"_id": "u1", "username": "mapper"})).unwrap();
    assert!(!user.is_partial());

    let partial: User = serde_json::from_value(json!({"username": "mapper"})).unwrap();
    assert!(partial.is_partial());
}

#[tokio::test]
async fn test_user_without_client_is_detached() {
    let user: User = serde_json::from_value(json!({"_id": "u1", "username": "mapper"})).unwrap();
    let err = user.beatmaps(PagedRequestOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Detached));
}

#[test]
fn test_attach_reaches_uploader() {
    let client = client();
    let mut map: Beatmap = serde_json::from_value(beatmap_json()).unwrap();
    map.attach(&client.handle());

    let debug = format!("{:?}", map.uploader.unwrap());
    assert!(debug.contains("attached: true"));

    let mut detached = Beatmap::default();
    detached.attach(&ClientHandle::detached());
    assert!(format!("{detached:?}").contains("attached: false"));
}
