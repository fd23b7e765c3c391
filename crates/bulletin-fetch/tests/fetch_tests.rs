//! HTTP behavior tests against a local mock server.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bulletin_config::FetchSettings;
use bulletin_fetch::FetchClient;
use bulletin_types::CrawlError;

fn test_settings() -> FetchSettings {
    FetchSettings {
        timeout: 5,
        user_agent: "bulletin-test/1.0".to_string(),
    }
}

#[tokio::test]
async fn fetches_utf8_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notice/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html><body>장학금 신청 안내</body></html>"),
        )
        .mount(&server)
        .await;

    let client = FetchClient::new(&test_settings()).unwrap();
    let html = client
        .fetch_html(&format!("{}/notice/list", server.uri()))
        .await
        .unwrap();
    assert!(html.contains("장학금 신청 안내"));
}

#[tokio::test]
async fn decodes_euc_kr_from_header() {
    let (body, _, _) = encoding_rs::EUC_KR.encode("<html><body>수강신청 일정 공지</body></html>");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/board"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=EUC-KR")
                .set_body_bytes(body.into_owned()),
        )
        .mount(&server)
        .await;

    let client = FetchClient::new(&test_settings()).unwrap();
    let html = client
        .fetch_html(&format!("{}/board", server.uri()))
        .await
        .unwrap();
    assert!(html.contains("수강신청 일정 공지"));
}

#[tokio::test]
async fn sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "bulletin-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = FetchClient::new(&test_settings()).unwrap();
    client.fetch_html(&server.uri()).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = FetchClient::new(&test_settings()).unwrap();
    let err = client
        .fetch_html(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Fetch { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn connection_refused_is_a_fetch_error() {
    let client = FetchClient::new(&test_settings()).unwrap();
    let err = client
        .fetch_html("http://127.0.0.1:1/never")
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Fetch { .. }));
}
