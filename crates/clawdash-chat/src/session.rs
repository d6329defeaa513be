//! Chat session: owns the message list and drives one turn at a time.

use crate::config::GatewayConfig;
use crate::projector::NO_RESPONSE_FALLBACK;
use crate::reader::read_response;
use crate::transport::{GatewayClient, ResponseRequest, ResponseTransport};
use clawdash_core::{ClawdashError, ClawdashResult, Message};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

const UPDATE_CAPACITY: usize = 256;

/// Where the session is in its current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// No turn in progress; `send` is accepted.
    Idle,
    /// Request issued, waiting for the response status.
    Sending,
    /// Response body is being read.
    Streaming,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream ended normally.
    Completed,
    /// The request or the body read failed.
    Failed {
        /// The `Error: ...` text committed to the message.
        message: String,
    },
    /// The turn was dropped before it finished.
    Abandoned,
}

/// Change notification for presentation layers.
#[derive(Debug, Clone)]
pub enum ChatUpdate {
    /// A user message and its assistant placeholder were appended.
    Appended {
        /// The trimmed user message.
        user: Message,
        /// The empty placeholder that will receive the reply.
        assistant: Message,
    },
    /// The streaming message's content changed.
    Content {
        /// Assistant message id.
        id: Uuid,
        /// Full content so far.
        content: String,
    },
    /// The streaming message was finalized and is no longer streaming.
    Finalized {
        /// Assistant message id.
        id: Uuid,
        /// Committed content.
        content: String,
        /// How the turn ended.
        outcome: TurnOutcome,
    },
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<Message>,
    phase: ChatPhase,
}

/// A chat conversation against one gateway agent.
///
/// At most one turn runs at a time: [`ChatSession::send`] refuses to start
/// while a previous turn's assistant message is still streaming. Dropping the
/// `send` future abandons the turn; the placeholder is released so the
/// session accepts new sends, and nothing else is written into it.
pub struct ChatSession<T> {
    id: Uuid,
    transport: T,
    model: String,
    user_tag: String,
    state: Mutex<SessionState>,
    updates: broadcast::Sender<ChatUpdate>,
}

impl ChatSession<GatewayClient> {
    /// Creates a session talking to the configured gateway.
    pub fn from_config(config: GatewayConfig) -> ClawdashResult<Self> {
        let model = config.model_name();
        let user_tag = config.user_tag.clone();
        Ok(Self::new(GatewayClient::new(config)?, model, user_tag))
    }
}

impl<T: ResponseTransport> ChatSession<T> {
    /// Creates an idle session with an empty message list.
    pub fn new(transport: T, model: impl Into<String>, user_tag: impl Into<String>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            transport,
            model: model.into(),
            user_tag: user_tag.into(),
            state: Mutex::new(SessionState {
                messages: Vec::new(),
                phase: ChatPhase::Idle,
            }),
            updates,
        }
    }

    /// Identifier used in log records for this session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The transport this session sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Receives every state change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.updates.subscribe()
    }

    /// Snapshot of the message list.
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().messages.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> ChatPhase {
        self.state.lock().phase
    }

    /// Whether a turn is in progress. Submit controls should be disabled
    /// while this is true.
    pub fn is_busy(&self) -> bool {
        self.phase() != ChatPhase::Idle
    }

    /// Runs one turn: appends the user message and a streaming placeholder,
    /// streams the response into the placeholder, and finalizes it.
    ///
    /// Transport failures do not return `Err`; they end the turn with
    /// [`TurnOutcome::Failed`] and an `Error: ...` message. `Err` means the
    /// turn was never started (empty input, or another turn is active).
    pub async fn send(&self, input: &str) -> ClawdashResult<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ClawdashError::Session(
                "Cannot send an empty message".to_string(),
            ));
        }

        let assistant_id = self.begin_turn(input)?;
        let mut turn = ActiveTurn {
            session: self,
            id: assistant_id,
            finished: false,
        };

        info!(session_id = %self.id, message_id = %assistant_id, "Sending chat turn");

        let request = ResponseRequest::streaming(&self.model, input, &self.user_tag);
        let result = match self.transport.open_stream(&request).await {
            Ok(body) => {
                self.set_phase(ChatPhase::Streaming);
                read_response(body, |text| self.update_content(assistant_id, text)).await
            }
            Err(e) => Err(e),
        };

        let (content, outcome) = match result {
            Ok(text) if text.is_empty() => (NO_RESPONSE_FALLBACK.to_string(), TurnOutcome::Completed),
            Ok(text) => (text, TurnOutcome::Completed),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Chat turn failed");
                let message = format!("Error: {e}");
                (message.clone(), TurnOutcome::Failed { message })
            }
        };

        turn.finish(content, outcome.clone());
        Ok(outcome)
    }

    fn begin_turn(&self, input: &str) -> ClawdashResult<Uuid> {
        let user = Message::user(input);
        let assistant = Message::assistant_placeholder();
        let assistant_id = assistant.id;

        {
            let mut state = self.state.lock();
            if state.phase != ChatPhase::Idle || state.messages.iter().any(|m| m.is_streaming) {
                return Err(ClawdashError::Session(
                    "A response is still streaming".to_string(),
                ));
            }
            state.messages.push(user.clone());
            state.messages.push(assistant.clone());
            state.phase = ChatPhase::Sending;
        }

        let _ = self.updates.send(ChatUpdate::Appended { user, assistant });
        Ok(assistant_id)
    }

    fn set_phase(&self, phase: ChatPhase) {
        self.state.lock().phase = phase;
    }

    fn update_content(&self, id: Uuid, content: &str) {
        let updated = {
            let mut state = self.state.lock();
            match state.messages.iter_mut().find(|m| m.id == id && m.is_streaming) {
                Some(message) => {
                    message.content.clear();
                    message.content.push_str(content);
                    true
                }
                None => false,
            }
        };

        if updated {
            let _ = self.updates.send(ChatUpdate::Content {
                id,
                content: content.to_string(),
            });
        }
    }

    /// Stops the stream on message `id`. `content: None` keeps whatever was
    /// accumulated, falling back to the no-response marker if empty.
    fn finalize(&self, id: Uuid, content: Option<String>, outcome: TurnOutcome) {
        let committed = {
            let mut state = self.state.lock();
            state.phase = ChatPhase::Idle;
            let message = state
                .messages
                .iter_mut()
                .find(|m| m.id == id && m.is_streaming);
            match message {
                Some(message) => {
                    match content {
                        Some(content) => message.content = content,
                        None if message.content.is_empty() => {
                            message.content = NO_RESPONSE_FALLBACK.to_string();
                        }
                        None => {}
                    }
                    message.is_streaming = false;
                    Some(message.content.clone())
                }
                None => None,
            }
        };

        if let Some(content) = committed {
            info!(session_id = %self.id, message_id = %id, outcome = ?outcome, "Chat turn finalized");
            let _ = self.updates.send(ChatUpdate::Finalized {
                id,
                content,
                outcome,
            });
        }
    }
}

/// Releases the placeholder if a turn is dropped before it finishes.
struct ActiveTurn<'a, T: ResponseTransport> {
    session: &'a ChatSession<T>,
    id: Uuid,
    finished: bool,
}

impl<T: ResponseTransport> ActiveTurn<'_, T> {
    fn finish(&mut self, content: String, outcome: TurnOutcome) {
        self.finished = true;
        self.session.finalize(self.id, Some(content), outcome);
    }
}

impl<T: ResponseTransport> Drop for ActiveTurn<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(session_id = %self.session.id, message_id = %self.id, "Chat turn abandoned");
            self.session.finalize(self.id, None, TurnOutcome::Abandoned);
        }
    }
}
