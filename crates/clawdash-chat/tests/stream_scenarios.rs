//! End-to-end turns over scripted response bodies.

mod common;

use clawdash_chat::{ChatSession, TurnOutcome, NO_RESPONSE_FALLBACK};
use clawdash_core::{ClawdashError, Role};
use common::{completed, delta, ChunkTransport, FailingTransport};

fn session(transport: ChunkTransport) -> ChatSession<ChunkTransport> {
    ChatSession::new(transport, "openclaw:astrologer", "dashboard-user")
}

fn final_content<T: clawdash_chat::ResponseTransport>(session: &ChatSession<T>) -> String {
    let messages = session.messages();
    let last = messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(!last.is_streaming);
    last.content.clone()
}

#[tokio::test]
async fn test_frame_split_mid_json() {
    let s = session(ChunkTransport::new([
        "data: {\"typ",
        "e\":\"response.output_text.delta\",\"delta\":\"Hel",
        "lo\"}\n",
    ]));
    let outcome = s.send("Namaste").await.unwrap();
    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(final_content(&s), "Hello");
}

#[tokio::test]
async fn test_two_frames_in_one_chunk() {
    let body = format!("{}{}", delta("A"), delta("B"));
    let s = session(ChunkTransport::new([body]));
    s.send("hi").await.unwrap();
    assert_eq!(final_content(&s), "AB");
}

#[tokio::test]
async fn test_completed_replaces_deltas() {
    let s = session(ChunkTransport::new([
        delta("H"),
        delta("i"),
        completed(&["Hello", " there"]),
    ]));
    s.send("hi").await.unwrap();
    assert_eq!(final_content(&s), "Hello there");
}

#[tokio::test]
async fn test_done_and_noise_never_mutate() {
    let s = session(ChunkTransport::new([
        ": keep-alive\n".to_string(),
        delta("ok"),
        "data: not json\n".to_string(),
        "data: {\"type\":\"response.in_progress\"}\n".to_string(),
        "data: [DONE]\n".to_string(),
        "\n".to_string(),
    ]));
    let outcome = s.send("hi").await.unwrap();
    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(final_content(&s), "ok");
}

#[tokio::test]
async fn test_done_does_not_end_stream() {
    let s = session(ChunkTransport::new([
        delta("before"),
        "data: [DONE]\n".to_string(),
        delta(" after"),
    ]));
    s.send("hi").await.unwrap();
    assert_eq!(final_content(&s), "before after");
}

#[tokio::test]
async fn test_empty_body_commits_fallback() {
    let s = session(ChunkTransport::new(Vec::<Vec<u8>>::new()));
    let outcome = s.send("hi").await.unwrap();
    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(final_content(&s), NO_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn test_only_noise_commits_fallback() {
    let s = session(ChunkTransport::new(["data: [DONE]\n", ": ping\n"]));
    s.send("hi").await.unwrap();
    assert_eq!(final_content(&s), NO_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn test_status_error_becomes_message() {
    let s = ChatSession::new(
        FailingTransport(|| ClawdashError::Status {
            status: 503,
            body: "upstream down".to_string(),
        }),
        "m",
        "u",
    );
    let outcome = s.send("hi").await.unwrap();
    let content = final_content(&s);
    assert!(content.starts_with("Error: "));
    assert!(content.contains("503"));
    assert_eq!(
        outcome,
        TurnOutcome::Failed {
            message: content.clone()
        }
    );
    assert!(!s.is_busy());
}

#[tokio::test]
async fn test_read_error_replaces_partial_content() {
    let s = session(ChunkTransport::new([delta("partial")]).then_fail("connection reset"));
    let outcome = s.send("hi").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    let content = final_content(&s);
    assert_eq!(content, "Error: HTTP error: connection reset");
}

#[tokio::test]
async fn test_request_carries_trimmed_input() {
    let s = session(ChunkTransport::new([delta("x")]));
    s.send("  Meri Kundli dekho \n").await.unwrap();

    let messages = s.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Meri Kundli dekho");

    let requests = s.transport().requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input, "Meri Kundli dekho");
    assert_eq!(requests[0].model, "openclaw:astrologer");
    assert_eq!(requests[0].user, "dashboard-user");
    assert!(requests[0].stream);
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_io() {
    let s = session(ChunkTransport::new([delta("x")]));
    let err = s.send("   \n").await.unwrap_err();
    assert!(matches!(err, ClawdashError::Session(_)));
    assert!(s.messages().is_empty());
    assert!(s.transport().requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_accepts_next_turn_after_failure() {
    let s = session(ChunkTransport::new([delta("x")]).then_fail("reset"));
    let first = s.send("one").await.unwrap();
    assert!(matches!(first, TurnOutcome::Failed { .. }));
    assert!(!s.is_busy());

    let second = s.send("two").await.unwrap();
    assert!(matches!(second, TurnOutcome::Failed { .. }));
    assert_eq!(s.messages().len(), 4);
    assert!(s.messages().iter().all(|m| !m.is_streaming));
}

#[tokio::test]
async fn test_split_inside_multibyte_character() {
    let body = format!("{}{}", delta("नमस्ते "), delta("🪷"));
    let bytes = body.as_bytes();
    let expected = "नमस्ते 🪷";

    for cut in 1..bytes.len() {
        let s = session(ChunkTransport::new([&bytes[..cut], &bytes[cut..]]));
        s.send("hi").await.unwrap();
        assert_eq!(final_content(&s), expected, "cut at byte {cut}");
    }
}

#[tokio::test]
async fn test_byte_by_byte_delivery() {
    let body = format!("{}{}{}", delta("Hi"), delta(" ✨"), completed(&["Hello ", "there ✨"]));
    let chunks: Vec<Vec<u8>> = body.bytes().map(|b| vec![b]).collect();
    let s = session(ChunkTransport::new(chunks));
    s.send("hi").await.unwrap();
    assert_eq!(final_content(&s), "Hello there ✨");
}
