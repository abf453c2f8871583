//! Prompt and line-editor helpers for the client.

use std::{cell::RefCell, io::Write};

use rustyline::{
    Context, Helper, completion::Completer, highlight::Highlighter, hint::Hinter,
    validate::Validator,
};
use tokio::sync::mpsc;

pub fn prompt(nickname: &str) -> String {
    format!("{}> ", nickname)
}

/// Redisplay the prompt after printing incoming output
pub fn redisplay_prompt<W: Write>(out: &mut W, nickname: &str) {
    write!(out, "{}", prompt(nickname)).ok();
    out.flush().ok();
}

/// Line-editor helper that reports edits of the current line as keystrokes.
///
/// rustyline asks the hinter on every refresh of the line, so cursor
/// movement is filtered out by comparing against the last seen contents.
pub struct KeystrokeHelper {
    keystrokes: mpsc::UnboundedSender<()>,
    last_line: RefCell<String>,
}

impl KeystrokeHelper {
    pub fn new(keystrokes: mpsc::UnboundedSender<()>) -> Self {
        Self {
            keystrokes,
            last_line: RefCell::new(String::new()),
        }
    }

    /// Returns true when `line` is a non-empty edit and a keystroke was reported.
    fn observe(&self, line: &str) -> bool {
        let mut last_line = self.last_line.borrow_mut();
        if *last_line == line {
            return false;
        }
        line.clone_into(&mut last_line);
        if line.is_empty() {
            return false;
        }
        // Receiver gone means the session is shutting down
        self.keystrokes.send(()).is_ok()
    }
}

impl Completer for KeystrokeHelper {
    type Candidate = String;
}

impl Hinter for KeystrokeHelper {
    type Hint = String;

    fn hint(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.observe(line);
        None
    }
}

impl Highlighter for KeystrokeHelper {}

impl Validator for KeystrokeHelper {}

impl Helper for KeystrokeHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redisplay_prompt() {
        // テスト項目: ニックネーム付きのプロンプトが出力される
        // given (前提条件):
        let mut out = Vec::new();

        // when (操作):
        redisplay_prompt(&mut out, "alice");

        // then (期待する結果):
        assert_eq!(String::from_utf8(out).unwrap(), "alice> ");
    }

    #[test]
    fn test_edits_are_reported_as_keystrokes() {
        // テスト項目: 行が変化したときだけキー入力として通知される
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let helper = KeystrokeHelper::new(tx);

        // when (操作):
        let typed = helper.observe("h");
        let cursor_move = helper.observe("h");
        let edited = helper.observe("he");

        // then (期待する結果):
        assert!(typed);
        assert!(!cursor_move);
        assert!(edited);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cleared_line_is_not_a_keystroke() {
        // テスト項目: 送信後に行が空になっても入力とはみなされない
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let helper = KeystrokeHelper::new(tx);
        helper.observe("hello");
        rx.try_recv().unwrap();

        // when (操作):
        let cleared = helper.observe("");

        // then (期待する結果):
        assert!(!cleared);
        assert!(rx.try_recv().is_err());
    }
}
