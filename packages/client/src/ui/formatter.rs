//! Message formatting utilities for terminal display.

use crate::domain::{ChatEntry, PresenceSnapshot, RoomId, UNKNOWN_PARTICIPANT};

/// Sender label for user entries that carry no display name
const UNNAMED_USER: &str = "User";

const RULE: &str = "============================================================";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one message-stream entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The entry to display
    /// * `local_nickname` - The local participant's nickname (to mark as "me")
    pub fn format_entry(entry: &ChatEntry, local_nickname: &str) -> String {
        match entry {
            ChatEntry::System {
                display_name, body, ..
            } => format!(
                "{} {}",
                display_name.as_deref().unwrap_or(UNKNOWN_PARTICIPANT),
                body
            ),
            ChatEntry::User {
                display_name, body, ..
            } => {
                let name = display_name.as_deref().unwrap_or(UNNAMED_USER);
                let me_suffix = if name == local_nickname { " (me)" } else { "" };
                format!("@{}{}: {}", name, me_suffix, body)
            }
        }
    }

    /// Format the typing line, or `None` when nobody is typing
    pub fn format_presence(typing: &PresenceSnapshot) -> Option<String> {
        if typing.is_empty() {
            return None;
        }
        Some(format!("{} typing...", typing.names().join(", ")))
    }

    /// Format the room header; the id is unknown until create resolves
    pub fn format_room_header(room_id: Option<&RoomId>) -> String {
        match room_id {
            Some(room_id) => format!("Room: {}", room_id),
            None => "Room: ...".to_string(),
        }
    }

    /// Format the whole stream under the room header
    pub fn format_history(
        entries: &[ChatEntry],
        room_id: Option<&RoomId>,
        local_nickname: &str,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("{}\n", Self::format_room_header(room_id)));
        output.push_str(&format!("{}\n", RULE));

        if entries.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for entry in entries {
                output.push_str(&Self::format_entry(entry, local_nickname));
                output.push('\n');
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a blocking notification (create/join or connect failure)
    pub fn format_alert(message: &str) -> String {
        format!("\n! {}\n  Type /retry to try again or /leave to exit.\n", message)
    }

    pub fn format_closed() -> String {
        "\nDisconnected from room.\n".to_string()
    }
}
