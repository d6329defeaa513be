use clawdash_chat::{ChatSession, ChatUpdate, ResponseTransport, TurnOutcome};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Renders streamed content to a terminal, printing only what is new.
#[derive(Debug, Default)]
struct Renderer {
    printed: String,
}

impl Renderer {
    /// Text to write so the terminal shows `content`. A replacement that
    /// does not extend what was printed starts on a fresh line.
    fn advance(&mut self, content: &str) -> String {
        let out = match content.strip_prefix(self.printed.as_str()) {
            Some(rest) => rest.to_string(),
            None => format!("\n{content}"),
        };
        self.printed = content.to_string();
        out
    }

    fn handle(&mut self, update: ChatUpdate, out: &mut impl Write) -> std::io::Result<()> {
        match update {
            ChatUpdate::Appended { .. } => {}
            ChatUpdate::Content { content, .. } => {
                write!(out, "{}", self.advance(&content))?;
                out.flush()?;
            }
            ChatUpdate::Finalized { content, .. } => {
                writeln!(out, "{}", self.advance(&content))?;
                self.printed.clear();
            }
        }
        Ok(())
    }
}

/// Sends one message and streams the reply to stdout.
pub async fn run_turn<T: ResponseTransport>(
    session: &ChatSession<T>,
    updates: &mut broadcast::Receiver<ChatUpdate>,
    input: &str,
) -> anyhow::Result<TurnOutcome> {
    let mut renderer = Renderer::default();
    let mut stdout = std::io::stdout();

    let send = session.send(input);
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            update = updates.recv() => match update {
                Ok(update) => renderer.handle(update, &mut stdout)?,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break (&mut send).await,
            },
        }
    };

    loop {
        match updates.try_recv() {
            Ok(update) => renderer.handle(update, &mut stdout)?,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    Ok(result?)
}

/// Reads messages from stdin, one per line, until EOF or `/quit`.
pub async fn repl<T: ResponseTransport>(session: &ChatSession<T>) -> anyhow::Result<()> {
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if !line.is_empty() {
            run_turn(session, &mut updates, line).await?;
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
