//! Batch dispatch over the real HTTP transport

use crate::integration::mock_server::MockServerFixture;
use simple_infer::{Conversation, InferenceJob, Message};

fn user(text: &str) -> Conversation {
    Conversation::new(vec![Message::user(text)])
}

#[tokio::test]
async fn test_batch_execution_order_preserving() {
    let mut fixture = MockServerFixture::new().await;
    let mut mocks = Vec::new();
    for i in 0..6 {
        mocks.push(
            fixture
                .mock_completion(&format!("question {i}"), &format!("answer {i}"))
                .await,
        );
    }

    let convs: Vec<Conversation> = (0..6).map(|i| user(&format!("question {i}"))).collect();
    let out = fixture
        .engine()
        .run(&convs, &fixture.params(3))
        .await
        .expect("batch should start");

    let expected: Vec<String> = (0..6).map(|i| format!("answer {i}")).collect();
    assert_eq!(out, expected);
    for m in mocks {
        m.assert_async().await;
    }
}

#[tokio::test]
async fn test_batch_with_partial_failures() {
    let mut fixture = MockServerFixture::new().await;
    let _ok1 = fixture.mock_completion("first", "ok1").await;
    let bad = fixture
        .mock_error_response(
            "second",
            500,
            r#"{"error":{"message":"Internal server error"}}"#,
            3,
        )
        .await;
    let _ok3 = fixture.mock_completion("third", "ok3").await;

    let job = InferenceJob::new(vec![user("first"), user("second"), user("third")])
        .with_base_url(&fixture.base_url)
        .with_model("gpt-4.1-nano");
    let params = fixture.params(job.max_concurrent);
    let responses = fixture
        .engine()
        .run(job.to_conversations(), &params)
        .await
        .unwrap();
    let summary = simple_infer::InferenceResult::from_responses(responses, job);

    assert_eq!(summary.responses, vec!["ok1", "", "ok3"]);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 1);
    bad.assert_async().await;
}

#[tokio::test]
async fn test_optional_params_reach_the_wire_only_when_set() {
    let mut fixture = MockServerFixture::new().await;
    let with_temp = fixture
        .server
        .mock("POST", crate::integration::mock_server::COMPLETIONS_PATH)
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4.1-nano",
            "temperature": 0.5
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"warm"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let params = fixture.params(1).with_temperature(0.5);
    let out = fixture
        .engine()
        .run(&[user("hello")], &params)
        .await
        .unwrap();
    assert_eq!(out, vec!["warm"]);
    with_temp.assert_async().await;

    let no_temp = fixture
        .server
        .mock("POST", crate::integration::mock_server::COMPLETIONS_PATH)
        .match_body(mockito::Matcher::Regex("temperature".into()))
        .expect(0)
        .create_async()
        .await;
    let _fallback = fixture.mock_completion("plain", "cool").await;
    let out = fixture
        .engine()
        .run(&[user("plain")], &fixture.params(1))
        .await
        .unwrap();
    assert_eq!(out, vec!["cool"]);
    no_temp.assert_async().await;
}
