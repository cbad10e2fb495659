use super::*;
use crate::error::{CatalogError, ErrorKind};
use crate::query::CatalogQuery;
use crate::response::CatalogResponse;
use crate::trailer::{resolve_trailer, TrailerResolution};
use crate::traits::CatalogApi;
use mockito::{Matcher, Server};
use serde_json::json;

fn paged_body(page: u32, ids: &[u64], total_pages: u32) -> String {
    let results: Vec<_> = ids
        .iter()
        .map(|id| json!({
            "id": id,
            "title": format!("Movie {}", id),
            "overview": "overview",
            "release_date": "2010-07-16",
            "poster_path": format!("/{}.jpg", id)
        }))
        .collect();
    json!({ "page": page, "results": results, "total_pages": total_pages, "total_results": 40 }).to_string()
}

#[tokio::test]
async fn test_discover_sends_sort_and_page() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("sort_by".into(), "vote_count.desc".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(paged_body(2, &[3, 4], 3))
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    let response = client.fetch_page(&CatalogQuery::Discover { page: 2 }).await.unwrap();

    mock.assert_async().await;
    let CatalogResponse::PagedResult(paged) = response else {
        panic!("expected paged result, got {:?}", response);
    };
    assert_eq!(paged.page, 2);
    assert_eq!(paged.results.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(paged.next_page(), Some(3));
}

#[tokio::test]
async fn test_search_sends_query_term() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "forrest gump".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(paged_body(1, &[13], 1))
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    let query = CatalogQuery::new(Some("forrest gump"), 1);
    let response = client.fetch_page(&query).await.unwrap();

    mock.assert_async().await;
    assert!(matches!(response, CatalogResponse::PagedResult(ref p) if p.next_page().is_none()));
}

#[tokio::test]
async fn test_http_error_status_is_network_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status_code":7,"status_message":"Invalid API key"}"#)
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "bad-key");
    let err = client.fetch_page(&CatalogQuery::Discover { page: 1 }).await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    let err = client.fetch_page(&CatalogQuery::Discover { page: 1 }).await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}

#[tokio::test]
async fn test_unexpected_body_is_malformed_not_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    let response = client.fetch_page(&CatalogQuery::Discover { page: 1 }).await.unwrap();
    assert!(response.is_malformed());
}

#[tokio::test]
async fn test_trailer_resolution_through_detail_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/13")
        .match_query(Matcher::UrlEncoded("append_to_response".into(), "videos".into()))
        .with_status(200)
        .with_body(
            json!({
                "id": 13,
                "title": "Forrest Gump",
                "videos": { "results": [
                    { "type": "Featurette", "key": "feat" },
                    { "type": "Trailer", "key": "bLvqoHBptjg" }
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    let resolution = resolve_trailer(&client, 13).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resolution, TrailerResolution::Found("bLvqoHBptjg".to_string()));
}

#[tokio::test]
async fn test_detail_without_videos_has_no_trailer() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/movie/99")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id":99,"title":"Obscure"}"#)
        .create_async()
        .await;

    let client = TmdbClient::new(server.url(), "test-key");
    assert_eq!(resolve_trailer(&client, 99).await.unwrap(), TrailerResolution::NoTrailer);
}

#[test]
fn test_from_config_requires_api_key() {
    let config = catalog_config::CatalogConfig::default();
    let err = TmdbClient::from_config(&config).err().unwrap();
    assert!(matches!(err, CatalogError::NotConfigured(_)));
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}
