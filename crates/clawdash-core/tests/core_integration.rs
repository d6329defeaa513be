//! Integration tests for clawdash-core public types.

use clawdash_core::{ClawdashError, ClawdashResult, Message, Role};

fn fails_with_status() -> ClawdashResult<()> {
    Err(ClawdashError::Status {
        status: 500,
        body: "boom".to_string(),
    })
}

#[test]
fn test_error_display_for_chat_content() {
    let err = fails_with_status().unwrap_err();
    let rendered = format!("Error: {err}");
    assert_eq!(rendered, "Error: API Error 500: boom");
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: ClawdashError = io.into();
    assert!(err.to_string().starts_with("IO error:"));
}

#[test]
fn test_role_wire_names() {
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        "\"assistant\""
    );
}

#[test]
fn test_messages_get_distinct_ids() {
    let a = Message::user("a");
    let b = Message::assistant_placeholder();
    assert_ne!(a.id, b.id);
    assert!(b.timestamp >= a.timestamp);
}
