//! Integration tests for error handling and retry over HTTP

use crate::integration::mock_server::{MockServerFixture, TEST_KEY};
use simple_infer::transport::{HttpTransport, TransportSession};
use simple_infer::{call_llm, try_call_llm, CallOutcome, CallParameters, Message, RetryPolicy};

#[tokio::test]
async fn test_call_llm_returns_completion_text() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_completion("Hello", "Hi there").await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    let out = call_llm(&transport, &[Message::user("Hello")], &params).await;

    assert_eq!(out, "Hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_null_content_is_empty_without_retry() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", crate::integration::mock_server::COMPLETIONS_PATH)
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    let out = try_call_llm(&transport, &[Message::user("anything")], &params).await;

    assert_eq!(out, CallOutcome::Completed(String::new()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempt_budget() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error_response(
            "busy",
            429,
            r#"{"error":{"message":"Rate limit exceeded","type":"rate_limit_error"}}"#,
            3,
        )
        .await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    match try_call_llm(&transport, &[Message::user("busy")], &params).await {
        CallOutcome::Failed { attempts, reason } => {
            assert_eq!(attempts, 3);
            assert!(reason.contains("429"));
            assert!(reason.contains("rate_limited"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_errors_are_retried_like_any_other() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error_response("denied", 401, r#"{"error":{"message":"bad key"}}"#, 3)
        .await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    let out = call_llm(&transport, &[Message::user("denied")], &params).await;

    assert_eq!(out, "");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", crate::integration::mock_server::COMPLETIONS_PATH)
        .with_status(200)
        .with_body("this is not json")
        .expect(3)
        .create_async()
        .await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    let out = call_llm(&transport, &[Message::user("x")], &params).await;

    assert_eq!(out, "");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_raw("nothing", r#"{"choices":[]}"#).await;

    let params = fixture.params(1);
    let transport = HttpTransport::new(&params, Some(TEST_KEY.into())).unwrap();
    match try_call_llm(&transport, &[Message::user("nothing")], &params).await {
        CallOutcome::Failed { reason, .. } => assert!(reason.contains("no choices")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_degrades_to_empty() {
    let params = CallParameters::new("gpt-4.1-nano")
        .with_base_url("http://127.0.0.1:9/v1")
        .with_retry(RetryPolicy::immediate(2));
    let factory = simple_infer::transport::HttpTransportFactory::new().with_api_key(TEST_KEY);
    let session = TransportSession::open(&factory, &params).unwrap();

    let out = call_llm(session.transport(), &[Message::user("hi")], &params).await;
    session.close().await;

    assert_eq!(out, "");
}
