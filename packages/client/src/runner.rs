//! Client execution loop.
//!
//! One task owns the [`SessionCoordinator`] and feeds it transport events,
//! create/join outcomes, typed lines and keystrokes in arrival order.
//! Lines are read on a dedicated thread because rustyline blocks.

use std::thread::JoinHandle;

use rustyline::{Editor, error::ReadlineError, history::DefaultHistory};
use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};

use crate::{
    config::ClientConfig,
    error::ClientError,
    session::{RoomOutcome, SessionCoordinator},
    transport::{Transport, TransportEvent, WebSocketTransport},
    ui::{KeystrokeHelper, TerminalView, TypingIndicator, prompt::prompt},
};

/// A line typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Leave,
    Retry,
    Message(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    match line {
        "/leave" | "/quit" => Command::Leave,
        "/retry" => Command::Retry,
        text => Command::Message(text),
    }
}

/// Run one room session until the user leaves or the connection closes.
///
/// There is no reconnection; the transport is torn down on every exit path.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let nickname = config.target.nickname().to_string();
    tracing::info!("Connecting to {} as '{}'", config.url, nickname);

    let (transport, mut events) = WebSocketTransport::connect(config.transport_config());
    let view = TerminalView::stdout(nickname.clone(), config.target.room_id().cloned());
    let (mut coordinator, mut outcomes) = SessionCoordinator::new(view, config.target.clone());
    coordinator.attach(transport);

    let (line_tx, mut lines) = mpsc::unbounded_channel();
    let (keystroke_tx, mut keystrokes) = mpsc::unbounded_channel();
    let _readline_handle = spawn_readline(nickname.clone(), line_tx, keystroke_tx);

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Type /leave or press Ctrl+C to exit.\n",
        nickname
    );

    let mut typing = TypingIndicator::new(config.typing_idle);
    let result = session_loop(
        &mut coordinator,
        &mut events,
        &mut outcomes,
        &mut lines,
        &mut keystrokes,
        &mut typing,
    )
    .await;

    coordinator.teardown();
    result
}

async fn session_loop<T: Transport + ?Sized>(
    coordinator: &mut SessionCoordinator<T, TerminalView>,
    events: &mut mpsc::UnboundedReceiver<TransportEvent>,
    outcomes: &mut mpsc::UnboundedReceiver<RoomOutcome>,
    lines: &mut mpsc::UnboundedReceiver<String>,
    keystrokes: &mut mpsc::UnboundedReceiver<()>,
    typing: &mut TypingIndicator,
) -> Result<(), ClientError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_error = None;

    loop {
        let deadline = typing.deadline();

        tokio::select! {
            event = events.recv() => match event {
                Some(TransportEvent::Closed) | None => {
                    coordinator.on_closed();
                    tracing::info!("Connection closed");
                    return Err(last_error.map_or(ClientError::ConnectionClosed, ClientError::ConnectionError));
                }
                Some(TransportEvent::Error(message)) => {
                    tracing::warn!("Transport error: {}", message);
                    coordinator.handle_transport_event(TransportEvent::Error(message.clone()));
                    last_error = Some(message);
                }
                Some(event) => coordinator.handle_transport_event(event),
            },
            Some(outcome) = outcomes.recv() => coordinator.handle_outcome(outcome),
            line = lines.recv() => {
                let Some(line) = line else {
                    tracing::info!("Input closed; leaving room");
                    return Ok(());
                };
                match parse_command(&line) {
                    Command::Leave => {
                        tracing::info!("Leaving room");
                        return Ok(());
                    }
                    Command::Retry => coordinator.retry(),
                    Command::Message(text) => {
                        if coordinator.state().is_active() {
                            coordinator.send_message(text);
                            if let Some(state) = typing.on_send() {
                                coordinator.set_typing(state);
                            }
                        } else {
                            tracing::warn!("Not in a room yet ({}); message dropped", coordinator.state());
                        }
                    }
                }
            },
            Some(()) = keystrokes.recv() => {
                if coordinator.state().is_active()
                    && let Some(state) = typing.on_keystroke(Instant::now())
                {
                    coordinator.set_typing(state);
                }
            },
            _ = typing_deadline(deadline) => {
                if let Some(state) = typing.poll(Instant::now()) {
                    coordinator.set_typing(state);
                }
            },
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                return Ok(());
            },
        }
    }
}

/// Resolves when the typing deadline passes; never while idle.
async fn typing_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Spawn a blocking thread for rustyline (synchronous readline).
///
/// Dropping `lines` on Ctrl+C or EOF ends the session loop.
fn spawn_readline(
    nickname: String,
    lines: mpsc::UnboundedSender<String>,
    keystrokes: mpsc::UnboundedSender<()>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match Editor::<KeystrokeHelper, DefaultHistory>::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };
        rl.set_helper(Some(KeystrokeHelper::new(keystrokes)));

        let prompt = prompt(&nickname);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if lines.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    })
}
