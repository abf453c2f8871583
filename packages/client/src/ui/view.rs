//! Terminal rendering of a room session.

use std::io::{Stdout, Write};

use crate::{
    domain::{MessageStream, PresenceSnapshot, RoomId},
    session::RoomView,
};

use super::{formatter::MessageFormatter, prompt::redisplay_prompt};

/// [`RoomView`] that prints to a terminal.
///
/// Only entries appended since the last render are printed. Once the join
/// history is seeded the whole stream is reprinted under the room header,
/// and the typing line is printed only when the snapshot changes.
pub struct TerminalView<W: Write = Stdout> {
    out: W,
    local_nickname: String,
    room_id: Option<RoomId>,
    /// Number of stream entries already on screen
    printed: usize,
    seeded: bool,
    presence: PresenceSnapshot,
}

impl TerminalView<Stdout> {
    pub fn stdout(local_nickname: impl Into<String>, room_id: Option<RoomId>) -> Self {
        Self::new(std::io::stdout(), local_nickname, room_id)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, local_nickname: impl Into<String>, room_id: Option<RoomId>) -> Self {
        Self {
            out,
            local_nickname: local_nickname.into(),
            room_id,
            printed: 0,
            seeded: false,
            presence: PresenceSnapshot::empty(),
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, text: &str) {
        write!(self.out, "{}", text).ok();
        redisplay_prompt(&mut self.out, &self.local_nickname);
    }
}

impl<W: Write> RoomView for TerminalView<W> {
    fn render(&mut self, messages: &MessageStream, typing: &PresenceSnapshot) {
        let mut output = String::new();

        if messages.is_seeded() && !self.seeded {
            self.seeded = true;
            output.push_str(&MessageFormatter::format_history(
                messages.entries(),
                self.room_id.as_ref(),
                &self.local_nickname,
            ));
        } else {
            if messages.len() < self.printed {
                self.printed = 0;
            }
            for entry in &messages.entries()[self.printed..] {
                output.push('\n');
                output.push_str(&MessageFormatter::format_entry(entry, &self.local_nickname));
            }
            if !output.is_empty() {
                output.push('\n');
            }
        }
        self.printed = messages.len();

        if *typing != self.presence {
            self.presence = typing.clone();
            if let Some(line) = MessageFormatter::format_presence(typing) {
                output.push_str(&format!("\n({})\n", line));
            }
        }

        if !output.is_empty() {
            self.emit(&output);
        }
    }

    fn alert(&mut self, message: &str) {
        self.emit(&MessageFormatter::format_alert(message));
    }

    fn room_assigned(&mut self, room_id: &RoomId) {
        self.room_id = Some(room_id.clone());
        let header = format!("\n{}\n", MessageFormatter::format_room_header(Some(room_id)));
        self.emit(&header);
    }

    fn closed(&mut self) {
        write!(self.out, "{}", MessageFormatter::format_closed()).ok();
        self.out.flush().ok();
    }
}
