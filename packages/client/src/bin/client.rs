//! Terminal chat room client.
//!
//! Creates or joins a room on a real-time messaging service, prints the
//! room history followed by live messages, and shows who else is typing.
//! Type /leave or press Ctrl+C to exit. The client does not reconnect.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chanoma-client -- --nickname Alice --create
//! cargo run --bin chanoma-client -- -n Bob -r <room-id>
//! ```

use std::time::Duration;

use clap::Parser;

use chanoma_client::{ClientConfig, LobbyForm, config::DEFAULT_URL, run_client};
use chanoma_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "chanoma-client")]
#[command(about = "Terminal chat room client with typing presence", long_about = None)]
struct Args {
    /// Nickname shown to other participants
    #[arg(short = 'n', long)]
    nickname: String,

    /// Avatar image URL sent with the profile
    #[arg(short = 'a', long)]
    avatar_url: Option<String>,

    /// Room to join
    #[arg(short = 'r', long, conflicts_with = "create")]
    room_id: Option<String>,

    /// Create a new room instead of joining one
    #[arg(short = 'c', long)]
    create: bool,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = DEFAULT_URL)]
    url: String,

    /// Milliseconds without a keystroke before typing stops
    #[arg(long, default_value_t = 1000)]
    typing_idle_ms: u64,

    /// Seconds to wait for a create/join response
    #[arg(long, default_value_t = 10)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let form = LobbyForm {
        nickname: args.nickname,
        avatar_url: args.avatar_url,
        room_id: args.room_id,
        create: args.create,
    };
    let config = match ClientConfig::from_lobby(args.url, form) {
        Ok(config) => config
            .with_typing_idle(Duration::from_millis(args.typing_idle_ms))
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs)),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
