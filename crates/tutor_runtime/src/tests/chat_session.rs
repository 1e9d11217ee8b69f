use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tutor_core::conversation::BASE_TURNS;
use tutor_core::Role;

use super::{latest_student_message, session_with, Script, ScriptedProvider};
use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

#[tokio::test]
async fn test_first_turn_appends_human_then_assistant() {
    let provider = Arc::new(
        ScriptedProvider::new().on("why does it crash?", Script::reply("What is 1 divided by 0?", 0)),
    );
    let session = session_with(provider.clone());

    let reply = session.respond("why does it crash?").await.unwrap();

    assert_eq!(reply, "What is 1 divided by 0?");
    assert_eq!(session.turn_count().await, BASE_TURNS + 2);

    let transcript = session.transcript().await;
    assert_eq!(transcript[2].role(), Role::Human);
    assert!(transcript[2].text().contains("why does it crash?"));
    assert_eq!(transcript[3].role(), Role::Assistant);
    assert_eq!(transcript[3].text(), reply);
    assert_eq!(transcript[3].token_usage().unwrap().total(), 110);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4");
    assert_eq!(requests[0].temperature, Some(0.0));
    let human = &requests[0].messages[1].content;
    assert!(human.contains("def f(): return 1/0"));
    assert!(human.contains("ZeroDivisionError"));
    assert!(human.contains("Student: why does it crash?"));
}

#[tokio::test]
async fn test_later_turns_carry_the_transcript() {
    let provider = Arc::new(ScriptedProvider::new());
    let session = session_with(provider.clone());

    session.respond("why does it crash?").await.unwrap();
    session.respond("because of zero?").await.unwrap();

    let requests = provider.requests();
    assert!(requests[1].messages[1].content.contains(
        "Student: why does it crash?\n\nTutor: reply to why does it crash?\n\nStudent: because of zero?"
    ));
    // The base prompt is never rewritten.
    assert_eq!(requests[0].messages[0], requests[1].messages[0]);
}

#[tokio::test]
async fn test_concurrent_calls_are_served_in_call_order() {
    // Earlier messages answer slower; order must still follow submission.
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("a", Script::reply("reply-a", 80))
            .on("b", Script::reply("reply-b", 40))
            .on("c", Script::reply("reply-c", 0)),
    );
    let session = session_with(provider.clone());

    let replies = join_all(vec![
        session.respond("a"),
        session.respond("b"),
        session.respond("c"),
    ])
    .await;
    let replies: Vec<String> = replies.into_iter().map(Result::unwrap).collect();
    assert_eq!(replies, vec!["reply-a", "reply-b", "reply-c"]);

    let texts: Vec<String> = session
        .transcript()
        .await
        .iter()
        .skip(BASE_TURNS)
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(texts, vec!["a", "reply-a", "b", "reply-b", "c", "reply-c"]);

    // Each request saw every earlier exchange.
    let seen: Vec<String> = provider.requests().iter().map(latest_student_message).collect();
    assert_eq!(seen, vec!["a", "b", "c"]);
    assert!(provider.requests()[2].messages[1]
        .content
        .contains("Tutor: reply-b\n\nStudent: c"));
}

#[tokio::test]
async fn test_provider_failure_appends_nothing() {
    let provider = Arc::new(ScriptedProvider::new().on("boom", Script::Fail { status: 503 }));
    let session = session_with(provider);

    let err = session.respond("boom").await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderFailed(_)));
    assert!(err.to_string().contains("provider unavailable"));
    assert_eq!(session.turn_count().await, BASE_TURNS);

    // Session stays usable.
    session.respond("again").await.unwrap();
    assert_eq!(session.turn_count().await, BASE_TURNS + 2);
}

#[tokio::test]
async fn test_request_timeout() {
    let provider = Arc::new(ScriptedProvider::new().on("slow", Script::Hang));
    let session = session_with(provider).with_request_timeout(Duration::from_millis(50));

    let err = session.respond("slow").await.unwrap_err();
    assert!(matches!(err, RuntimeError::Timeout(_)));
    assert_eq!(session.turn_count().await, BASE_TURNS);
}

#[tokio::test]
async fn test_with_config_sets_model() {
    let provider = Arc::new(ScriptedProvider::new());
    let config = RuntimeConfig::new("sk-test")
        .with_model("gpt-4o-mini")
        .with_temperature(0.3);
    let session = session_with(provider.clone()).with_config(&config);

    session.respond("hi").await.unwrap();

    let request = &provider.requests()[0];
    assert_eq!(session.model(), "gpt-4o-mini");
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.temperature, Some(0.3));
}
