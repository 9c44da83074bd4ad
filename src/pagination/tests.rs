//! Tests for pagination module

use super::*;
use crate::client::BeatSaver;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::RequestDescriptor;
use crate::types::AutomapFilter;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BeatSaver {
    let config = ClientConfig::builder("TestApp", "1.0")
        .base_url(server.uri())
        .build()
        .unwrap();
    BeatSaver::new(config).unwrap()
}

fn envelope(docs: Value, total: u64, last: i64, prev: Option<u32>, next: Option<u32>) -> Value {
    json!({
        "docs": docs,
        "totalDocs": total,
        "lastPage": last,
        "prevPage": prev,
        "nextPage": next
    })
}

async fn mount_page(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Three pages of sizes 2, 2 and 1 under `/api/maps/latest`
async fn mount_three_pages(server: &MockServer) {
    mount_page(
        server,
        "/api/maps/latest/0",
        envelope(json!([{"n": 1}, {"n": 2}]), 5, 2, None, Some(1)),
    )
    .await;
    mount_page(
        server,
        "/api/maps/latest/1",
        envelope(json!([{"n": 3}, {"n": 4}]), 5, 2, Some(0), Some(2)),
    )
    .await;
    mount_page(
        server,
        "/api/maps/latest/2",
        envelope(json!([{"n": 5}]), 5, 2, Some(1), None),
    )
    .await;
}

async fn first_page(client: &BeatSaver, options: PagedRequestOptions) -> Page<Value> {
    client.fetch_page("maps/latest", Arc::new(options)).await.unwrap()
}

// ============================================================================
// Options Tests
// ============================================================================

#[test]
fn test_paged_options_descriptor() {
    let options = PagedRequestOptions::new().page(3);
    let request = options.descriptor("maps/latest").unwrap();
    assert_eq!(request.uri(), "maps/latest/3?automapper=1");

    let options = PagedRequestOptions::new().automaps(AutomapFilter::Only);
    assert_eq!(options.descriptor("maps/hot").unwrap().uri(), "maps/hot/0?automapper=-1");

    let options = PagedRequestOptions::new().automaps(AutomapFilter::Exclude);
    assert_eq!(options.descriptor("maps/hot/").unwrap().uri(), "maps/hot/0");
}

#[test]
fn test_search_options_descriptor() {
    let options = SearchRequestOptions::new("name:overcooked").page(2);
    let request = options.descriptor("search/advanced").unwrap();
    assert_eq!(request.uri(), "search/advanced/2?q=name%3Aovercooked");

    let err = SearchRequestOptions::new("  ").descriptor("search/text").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_clone_for_page_keeps_filters() {
    let token = CancellationToken::new();
    let options = PagedRequestOptions::new()
        .automaps(AutomapFilter::Only)
        .request(RequestOptions::new().cancel_token(token.clone()).header("X-Trace", "1"));

    let clone = options.clone_for_page(4, None);
    assert_eq!(clone.page(), 4);
    assert!(clone.request_options().cancel.is_some());
    assert_eq!(clone.descriptor("maps/hot").unwrap().uri(), "maps/hot/4?automapper=-1");

    let overrides = RequestOptions::new();
    let clone = options.clone_for_page(5, Some(&overrides));
    assert!(clone.request_options().cancel.is_none());
    assert!(clone.request_options().headers.is_empty());

    let search = SearchRequestOptions::new("ghost").clone_for_page(1, None);
    assert_eq!(search.descriptor("search/text").unwrap().uri(), "search/text/1?q=ghost");
}

#[test]
fn test_request_options_apply() {
    let token = CancellationToken::new();
    token.cancel();
    let options = RequestOptions::new()
        .cancel_token(token)
        .on_progress(|_| {})
        .header("X-One", "1");

    let request: RequestDescriptor = options.descriptor("maps/detail/abc");
    assert!(request.is_cancelled());
    assert_eq!(request.header_list(), [("X-One".to_string(), "1".to_string())]);
    assert!(format!("{options:?}").contains("has_progress: true"));
}

// ============================================================================
// Page Envelope Tests
// ============================================================================

#[test]
fn test_page_decodes_envelope() {
    let body = envelope(json!([1, 2, 3]), 30, 9, Some(3), Some(5));
    let page: Page<u32> = serde_json::from_value(body).unwrap();

    assert_eq!(page.items, vec![1, 2, 3]);
    assert_eq!(page.total_count, 30);
    assert_eq!(page.last_index, 9);
    assert_eq!(page.previous_index, Some(3));
    assert_eq!(page.next_index, Some(5));
    assert!(page.context().is_none());
}

#[test]
fn test_page_decodes_alias_names() {
    let body = json!({
        "items": ["a"],
        "totalCount": 1,
        "lastIndex": 0,
        "previousIndex": null,
        "nextIndex": null
    });
    let page: Page<String> = serde_json::from_value(body).unwrap();

    assert_eq!(page.items, vec!["a".to_string()]);
    assert!(!page.has_next());
    assert!(!page.has_previous());
}

#[test]
fn test_empty_listing_last_index_clamped() {
    let body = envelope(json!([]), 0, -1, None, None);
    let page: Page<u32> = serde_json::from_value(body).unwrap();

    assert!(page.is_empty());
    assert_eq!(page.last_index, 0);
}

// ============================================================================
// Cursor Tests
// ============================================================================

#[tokio::test]
async fn test_manual_page_is_detached() {
    let page: Page<Value> = Page::new(vec![json!(1)], 2, 0, 1, None, Some(1));

    assert!(matches!(page.next(None).await, Err(Error::Detached)));
    assert!(matches!(page.at(0, None).await, Err(Error::Detached)));
}

#[tokio::test]
async fn test_boundaries() {
    let page: Page<Value> = Page::new(vec![], 0, 0, 0, None, None);

    assert!(matches!(page.next(None).await, Err(Error::NoNextPage)));
    assert!(matches!(page.previous(None).await, Err(Error::NoPreviousPage)));
}

#[tokio::test]
async fn test_next_lands_on_next_index() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;
    let client = client(&server);

    let page = first_page(&client, PagedRequestOptions::default()).await;
    assert_eq!(page.current_index, 0);
    assert_eq!(page.context().unwrap().path(), "maps/latest");

    let next = page.next(None).await.unwrap();
    assert_eq!(Some(next.current_index), page.next_index);
    assert_eq!(next.items, vec![json!({"n": 3}), json!({"n": 4})]);

    let last = next.next(None).await.unwrap();
    assert_eq!(last.current_index, 2);
    assert_eq!(last.current_index, last.last_index);
    assert!(matches!(last.next(None).await, Err(Error::NoNextPage)));

    let back = last.previous(None).await.unwrap();
    assert_eq!(back.current_index, 1);

    let jumped = back.at(0, None).await.unwrap();
    assert_eq!(jumped.current_index, 0);
    assert!(jumped.previous_index.is_none());
}

#[tokio::test]
async fn test_next_keeps_query_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/maps/hot/0"))
        .and(query_param("automapper", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]), 2, 1, None, Some(1))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/maps/hot/1"))
        .and(query_param("automapper", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]), 2, 1, Some(0), None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let options = PagedRequestOptions::new().automaps(AutomapFilter::Only);
    let page: Page<Value> = client.fetch_page("maps/hot", Arc::new(options)).await.unwrap();

    let next = page.next(None).await.unwrap();
    assert_eq!(next.current_index, 1);
}

#[tokio::test]
async fn test_next_after_client_dropped_is_detached() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;
    let client = client(&server);

    let page = first_page(&client, PagedRequestOptions::default()).await;
    drop(client);

    assert!(matches!(page.next(None).await, Err(Error::Detached)));
}

#[tokio::test]
async fn test_next_with_cancelled_override() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;
    let client = client(&server);
    let page = first_page(&client, PagedRequestOptions::default()).await;

    let token = CancellationToken::new();
    token.cancel();
    let overrides = RequestOptions::new().cancel_token(token);

    assert!(matches!(page.next(Some(&overrides)).await, Err(Error::Cancelled)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Stream Tests
// ============================================================================

#[tokio::test]
async fn test_stream_yields_all_items_in_order() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;
    let client = client(&server);

    let page = first_page(&client, PagedRequestOptions::default()).await;
    let items: Vec<Value> = page
        .into_stream()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let numbers: Vec<i64> = items.iter().map(|v| v["n"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_stream_over_manual_page() {
    let page: Page<Value> = Page::new(vec![json!("a"), json!("b")], 2, 0, 0, None, None);
    let items: Vec<_> = page.into_stream().collect().await;
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_stream_error_ends_stream() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/api/maps/latest/0",
        envelope(json!([{"n": 1}]), 2, 1, None, Some(1)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/maps/latest/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);
    let page = first_page(&client, PagedRequestOptions::default()).await;
    let results: Vec<_> = page.into_stream().collect().await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::HttpStatus { status: 500, .. })));
}

#[tokio::test]
async fn test_stream_cancellation_reaches_page_fetch() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;
    let client = client(&server);

    let token = CancellationToken::new();
    let options = PagedRequestOptions::new().request(RequestOptions::new().cancel_token(token.clone()));
    let mut stream = first_page(&client, options).await.into_stream();

    assert!(stream.next().await.unwrap().is_ok());
    assert!(stream.next().await.unwrap().is_ok());
    token.cancel();

    assert!(matches!(stream.next().await, Some(Err(Error::Cancelled))));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_lazy_stream_surfaces_first_page_error() {
    let stream: PageStream<Value> = PageStream::lazy(async { Err(Error::NoNextPage) });
    let results: Vec<_> = stream.collect().await;

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::NoNextPage)));
}
