//! Integration tests for Readwise Display
//!
//! These tests run the real HTTP source and sampler against a local mockito
//! server standing in for the Readwise API.

use mockito::{Matcher, Mock, Server, ServerGuard};
use readwise_display::board::{BoardStatus, QuoteBoard, RefreshTrigger};
use readwise_display::models::{Credential, UNKNOWN_AUTHOR, UNKNOWN_SOURCE};
use readwise_display::sources::{HighlightSource, ReadwiseSource, SourceError};
use readwise_display::QuoteSampler;
use std::sync::Arc;

const KEY: &str = "test-token";

fn count_query() -> Matcher {
    Matcher::UrlEncoded("page_size".into(), "1".into())
}

fn page_query(page: u64) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), page.to_string()),
        Matcher::UrlEncoded("page_size".into(), "20".into()),
    ])
}

fn sampler_for(server: &ServerGuard, key: &str) -> QuoteSampler {
    let source = ReadwiseSource::with_base_url(&server.url());
    QuoteSampler::new(Arc::new(source), key)
}

/// Listing and page fetch for a library of `count` highlights on page 1
async fn mock_single_page(server: &mut ServerGuard, count: u64, results: &str) -> Vec<Mock> {
    let count_mock = server
        .mock("GET", "/highlights/")
        .match_query(count_query())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"count": {}, "results": []}}"#, count))
        .create_async()
        .await;

    let page_mock = server
        .mock("GET", "/highlights/")
        .match_query(page_query(1))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"count": {}, "results": {}}}"#, count, results))
        .create_async()
        .await;

    vec![count_mock, page_mock]
}

#[tokio::test]
async fn test_list_sends_token_header_and_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/highlights/")
        .match_header("authorization", "Token test-token")
        .match_query(page_query(3))
        .with_status(200)
        .with_body(r#"{"count": 61, "next": null, "results": [{"text": "Hi", "title": null, "author": null, "book_id": 12}]}"#)
        .create_async()
        .await;

    let source = ReadwiseSource::with_base_url(&server.url());
    let page = source
        .list_highlights(&Credential::new(KEY), Some(3), 20)
        .await
        .unwrap();

    assert_eq!(page.count, 61);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].book_id, Some(12));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_book_decodes_details() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/books/12/")
        .match_header("authorization", "Token test-token")
        .with_status(200)
        .with_body(r#"{"id": 12, "title": "Meditations", "author": "Marcus Aurelius", "category": "books"}"#)
        .create_async()
        .await;

    let source = ReadwiseSource::with_base_url(&server.url());
    let book = source.get_book(&Credential::new(KEY), 12).await.unwrap();

    assert_eq!(book.title, "Meditations");
    assert_eq!(book.author, "Marcus Aurelius");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_classification() {
    let mut server = Server::new_async().await;
    let _highlights = server
        .mock("GET", "/highlights/")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;
    let _book = server
        .mock("GET", "/books/1/")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let source = ReadwiseSource::with_base_url(&server.url());
    let credential = Credential::new(KEY);

    let err = source.list_highlights(&credential, None, 1).await.unwrap_err();
    assert_eq!(err, SourceError::CredentialInvalid { status: 403 });

    let err = source.get_book(&credential, 1).await.unwrap_err();
    assert!(matches!(err, SourceError::Transport { status: Some(503), .. }));
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _highlights = server
        .mock("GET", "/highlights/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"total": 3}"#)
        .create_async()
        .await;

    let source = ReadwiseSource::with_base_url(&server.url());
    let err = source
        .list_highlights(&Credential::new(KEY), None, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let source = ReadwiseSource::with_base_url("http://127.0.0.1:9");
    let err = source
        .list_highlights(&Credential::new(KEY), None, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Transport { status: None, .. }));
}

#[tokio::test]
async fn test_random_quote_with_book_fallback() {
    let mut server = Server::new_async().await;
    let _listing = mock_single_page(
        &mut server,
        1,
        r#"[{"text": "The obstacle is the way.", "title": null, "author": "Original Author", "book_id": 5}]"#,
    )
    .await;
    let book = server
        .mock("GET", "/books/5/")
        .with_status(200)
        .with_body(r#"{"title": "T", "author": "A"}"#)
        .create_async()
        .await;

    let sampler = sampler_for(&server, KEY);
    let quote = sampler.fetch_random_quote().await.unwrap();

    assert_eq!(quote.text, "The obstacle is the way.");
    assert_eq!(quote.author, "Original Author");
    assert_eq!(quote.source, "T");
    book.assert_async().await;
}

#[tokio::test]
async fn test_book_not_found_uses_placeholders() {
    let mut server = Server::new_async().await;
    let _listing = mock_single_page(
        &mut server,
        1,
        r#"[{"text": "Orphan", "title": null, "author": null, "book_id": 404}]"#,
    )
    .await;
    let _book = server
        .mock("GET", "/books/404/")
        .with_status(404)
        .with_body(r#"{"detail": "Not found."}"#)
        .create_async()
        .await;

    let sampler = sampler_for(&server, KEY);
    let quote = sampler.fetch_random_quote().await.unwrap();

    assert_eq!(quote.author, UNKNOWN_AUTHOR);
    assert_eq!(quote.source, UNKNOWN_SOURCE);
}

#[tokio::test]
async fn test_count_fetched_once() {
    let mut server = Server::new_async().await;
    let count = server
        .mock("GET", "/highlights/")
        .match_query(count_query())
        .with_status(200)
        .with_body(r#"{"count": 2, "results": []}"#)
        .expect(1)
        .create_async()
        .await;
    let _page = server
        .mock("GET", "/highlights/")
        .match_query(page_query(1))
        .with_status(200)
        .with_body(r#"{"count": 2, "results": [{"text": "a", "title": "b", "author": "c", "book_id": null}]}"#)
        .expect(2)
        .create_async()
        .await;

    let sampler = sampler_for(&server, KEY);
    sampler.fetch_random_quote().await.unwrap();
    sampler.fetch_random_quote().await.unwrap();

    count.assert_async().await;
}

#[tokio::test]
async fn test_page_unauthorized_regardless_of_body() {
    let mut server = Server::new_async().await;
    let _count = server
        .mock("GET", "/highlights/")
        .match_query(count_query())
        .with_status(200)
        .with_body(r#"{"count": 5, "results": []}"#)
        .create_async()
        .await;
    let _page = server
        .mock("GET", "/highlights/")
        .match_query(page_query(1))
        .with_status(401)
        .with_body(r#"{"count": 5, "results": [{"text": "looks valid"}]}"#)
        .create_async()
        .await;

    let sampler = sampler_for(&server, KEY);
    let err = sampler.fetch_random_quote().await.unwrap_err();
    assert_eq!(err, SourceError::CredentialInvalid { status: 401 });
}

#[tokio::test]
async fn test_empty_library() {
    let mut server = Server::new_async().await;
    let _count = server
        .mock("GET", "/highlights/")
        .match_query(count_query())
        .with_status(200)
        .with_body(r#"{"count": 0, "results": []}"#)
        .create_async()
        .await;

    let sampler = sampler_for(&server, KEY);
    let quote = sampler.fetch_random_quote().await.unwrap();

    assert!(!quote.text.is_empty());
    assert!(quote.author.is_empty());
    assert!(quote.source.is_empty());
}

#[tokio::test]
async fn test_board_with_blank_key_needs_key() {
    let server = Server::new_async().await;
    let mut board = QuoteBoard::new(sampler_for(&server, "  "));

    let status = board.refresh(RefreshTrigger::Initial).await;
    assert!(matches!(status, BoardStatus::NeedsKey(_)));
    assert!(board.current().is_none());
}
