//! Terminal user interface: formatting, prompt and local typing state.

pub mod formatter;
pub mod prompt;
pub mod typing;
pub mod view;

pub use formatter::MessageFormatter;
pub use prompt::{KeystrokeHelper, redisplay_prompt};
pub use typing::{DEFAULT_TYPING_IDLE, TypingIndicator};
pub use view::TerminalView;
