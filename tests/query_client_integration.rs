/// Integration tests for `QueryClient` retry and validation behavior.
///
/// The remote call and the sleeper are replaced by test doubles, so these tests
/// run offline and without waiting for real backoff delays.
mod common;

use common::{RecordingSleeper, ScriptedGenerator, client, secs};
use gemini_ask::query::{FAILED_AFTER_RETRIES, NO_RESPONSE_GENERATED};
use gemini_ask::{GenerateError, QueryClientBuilder, QueryError};

#[test]
fn success_returns_text_without_sleeping() {
    let generator = ScriptedGenerator::always(Ok("hello".to_string()));
    let sleeper = RecordingSleeper::new();

    let answer = client(generator.clone(), sleeper.clone()).ask("hi").unwrap();

    assert_eq!(answer, "hello");
    assert_eq!(generator.calls(), 1);
    assert!(sleeper.delays().is_empty());
}

#[test]
fn empty_text_returns_no_response_sentinel() {
    let generator = ScriptedGenerator::always(Ok(String::new()));
    let sleeper = RecordingSleeper::new();

    let answer = client(generator.clone(), sleeper.clone())
        .ask("anything")
        .unwrap();

    assert_eq!(answer, "No response generated.");
    assert_eq!(answer, NO_RESPONSE_GENERATED);
    assert_eq!(generator.calls(), 1);
    assert!(sleeper.delays().is_empty());
}

#[test]
fn persistent_quota_errors_sleep_one_two_four_then_fail() {
    let generator = ScriptedGenerator::always(Err(GenerateError::quota_exhausted(
        "429 Resource has been exhausted",
    )));
    let sleeper = RecordingSleeper::new();

    let answer = client(generator.clone(), sleeper.clone()).ask("hi").unwrap();

    assert_eq!(answer, "Failed after retries.");
    assert_eq!(answer, FAILED_AFTER_RETRIES);
    assert_eq!(generator.calls(), 3);
    assert_eq!(sleeper.delays(), secs(&[1, 2, 4]));
}

#[test]
fn persistent_api_errors_return_detail_on_final_attempt() {
    let generator = ScriptedGenerator::always(Err(GenerateError::api("boom")));
    let sleeper = RecordingSleeper::new();

    let answer = client(generator.clone(), sleeper.clone()).ask("hi").unwrap();

    assert_eq!(answer, "API Error: boom");
    assert_eq!(generator.calls(), 3);
    assert_eq!(sleeper.delays(), secs(&[1, 2]));
}

#[test]
fn two_api_errors_then_success_returns_text() {
    let generator = ScriptedGenerator::new(vec![
        Err(GenerateError::api("503 unavailable")),
        Err(GenerateError::api("503 unavailable")),
        Ok("ok".to_string()),
    ]);
    let sleeper = RecordingSleeper::new();

    let answer = client(generator.clone(), sleeper.clone()).ask("hi").unwrap();

    assert_eq!(answer, "ok");
    assert_eq!(generator.calls(), 3);
    assert_eq!(sleeper.delays(), secs(&[1, 2]));
}

#[test]
fn quota_error_then_success_sleeps_once() {
    let generator = ScriptedGenerator::new(vec![
        Err(GenerateError::quota_exhausted("429")),
        Ok("recovered".to_string()),
    ]);
    let sleeper = RecordingSleeper::new();

    let answer = client(generator, sleeper.clone()).ask("hi").unwrap();

    assert_eq!(answer, "recovered");
    assert_eq!(sleeper.delays(), secs(&[1]));
}

#[test]
fn invalid_questions_never_reach_the_remote() {
    let generator = ScriptedGenerator::always(Ok("unused".to_string()));
    let sleeper = RecordingSleeper::new();
    let client = client(generator.clone(), sleeper.clone());

    assert!(matches!(client.ask(""), Err(QueryError::EmptyQuestion)));
    assert!(matches!(client.ask("   "), Err(QueryError::EmptyQuestion)));
    assert!(matches!(
        client.ask(&"x".repeat(10_001)),
        Err(QueryError::QuestionTooLong { .. })
    ));

    assert_eq!(generator.calls(), 0);
    assert!(sleeper.delays().is_empty());
}

#[test]
fn validate_accepts_boundary_length() {
    let client = client(
        ScriptedGenerator::always(Ok("unused".to_string())),
        RecordingSleeper::new(),
    );

    assert!(client.validate("x").is_ok());
    assert!(client.validate(&"x".repeat(10_000)).is_ok());
    assert!(client.validate(&"x".repeat(10_001)).is_err());
}

#[test]
fn question_and_model_are_forwarded_unchanged() {
    let generator = ScriptedGenerator::always(Ok("answer".to_string()));
    let client = QueryClientBuilder::new()
        .api_key("test-key")
        .model("gemini-2.5-pro")
        .generator(generator.clone())
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();

    client.ask("  What is Rust?  ").unwrap();

    assert_eq!(
        generator.prompts(),
        vec![("gemini-2.5-pro".to_string(), "  What is Rust?  ".to_string())]
    );
}

#[test]
fn construction_without_credential_fails_before_any_call() {
    let generator = ScriptedGenerator::always(Ok("unused".to_string()));

    let result = QueryClientBuilder::new()
        .fallback_api_key(None)
        .generator(generator.clone())
        .build();

    let error = result.unwrap_err();
    assert!(matches!(error, QueryError::MissingApiKey));
    assert!(error.is_configuration());
    assert_eq!(generator.calls(), 0);
}

#[test]
fn client_can_be_shared_across_threads() {
    let generator = ScriptedGenerator::always(Ok("shared".to_string()));
    let client = std::sync::Arc::new(client(generator.clone(), RecordingSleeper::new()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || client.ask(&format!("question {i}")).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "shared");
    }
    assert_eq!(generator.calls(), 4);
}
