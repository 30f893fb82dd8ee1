mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use healthy::search::{QueryBuilder, SearchBackend, SearchClient, SearchError, SearchRequest};

const SAMPLE: &str =
    r#"{"hits":{"total":2,"hits":[{"_source":{"message":"a"}},{"_source":{"message":"b"}}]}}"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
}

#[tokio::test]
async fn test_default_query_is_get_with_filter() {
    let (fake, port) = common::spawn_search(StatusCode::OK, SAMPLE).await;
    let client = SearchClient::new("127.0.0.1", port).unwrap();

    let result = client.search(&SearchRequest::Default, date()).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.messages, vec!["a", "b"]);

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].index, "logstash-2024.03.07");
    assert_eq!(requests[0].query.as_deref(), Some("q=response:5*"));
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_template_query_is_post_with_body() {
    let (fake, port) = common::spawn_search(StatusCode::OK, SAMPLE).await;
    let client = SearchClient::new("127.0.0.1", port).unwrap();

    let request = QueryBuilder::new("15m")
        .build_from_source(r#"{"query":{"range":{"@timestamp":{"gte":"now-{{.Interval}}"}}}}"#)
        .unwrap();

    // The same request is reused on every tick
    client.search(&request, date()).await.unwrap();
    client.search(&request, date().succ_opt().unwrap()).await.unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    for recorded in &requests {
        assert_eq!(recorded.method, Method::POST);
        assert_eq!(recorded.query, None);
        assert_eq!(recorded.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            recorded.body,
            r#"{"query":{"range":{"@timestamp":{"gte":"now-15m"}}}}"#
        );
    }
    assert_eq!(requests[0].index, "logstash-2024.03.07");
    assert_eq!(requests[1].index, "logstash-2024.03.08");
}

#[tokio::test]
async fn test_non_200_is_status_error() {
    let (_fake, port) = common::spawn_search(
        StatusCode::NOT_FOUND,
        r#"{"error":"index_not_found_exception"}"#,
    )
    .await;
    let client = SearchClient::new("127.0.0.1", port).unwrap();

    let err = client.search(&SearchRequest::Default, date()).await.unwrap_err();

    match err {
        SearchError::Status { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("index_not_found_exception"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (_fake, port) = common::spawn_search(StatusCode::OK, "not json").await;
    let client = SearchClient::new("127.0.0.1", port).unwrap();

    let err = client.search(&SearchRequest::Default, date()).await.unwrap_err();
    assert!(matches!(err, SearchError::Decode(_)));
}
