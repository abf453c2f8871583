//! Local typing state derived from keystrokes.
//!
//! Typing starts on the first keystroke after being idle and stops once no
//! keystroke arrives for the idle duration, or when the line is sent.

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_TYPING_IDLE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct TypingIndicator {
    idle: Duration,
    /// When typing stops if no further keystroke arrives; `None` while idle
    deadline: Option<Instant>,
}

impl TypingIndicator {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            deadline: None,
        }
    }

    /// Record a keystroke. Returns `Some(true)` when typing just started.
    pub fn on_keystroke(&mut self, now: Instant) -> Option<bool> {
        let started = self.deadline.is_none();
        self.deadline = Some(now + self.idle);
        started.then_some(true)
    }

    /// Returns `Some(false)` once the idle deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<bool> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(false)
            }
            _ => None,
        }
    }

    /// A line was sent; typing always stops.
    pub fn on_send(&mut self) -> Option<bool> {
        self.deadline = None;
        Some(false)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_typing(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_keystroke_starts_typing() {
        // テスト項目: アイドル状態からの最初のキー入力で入力開始が通知される
        // given (前提条件):
        let mut indicator = TypingIndicator::default();
        let now = Instant::now();

        // when (操作):
        let first = indicator.on_keystroke(now);
        let second = indicator.on_keystroke(now + Duration::from_millis(100));

        // then (期待する結果):
        assert_eq!(first, Some(true));
        assert_eq!(second, None);
        assert!(indicator.is_typing());
    }

    #[test]
    fn test_keystroke_rearms_deadline() {
        // テスト項目: キー入力のたびに締め切りが延長される
        // given (前提条件):
        let mut indicator = TypingIndicator::new(Duration::from_millis(500));
        let now = Instant::now();
        indicator.on_keystroke(now);

        // when (操作):
        indicator.on_keystroke(now + Duration::from_millis(400));

        // then (期待する結果):
        assert_eq!(indicator.poll(now + Duration::from_millis(600)), None);
        assert_eq!(
            indicator.deadline(),
            Some(now + Duration::from_millis(900))
        );
    }

    #[test]
    fn test_poll_stops_typing_after_idle() {
        // テスト項目: 締め切りを過ぎると 1 度だけ入力終了が通知される
        // given (前提条件):
        let mut indicator = TypingIndicator::new(Duration::from_millis(500));
        let now = Instant::now();
        indicator.on_keystroke(now);

        // when (操作):
        let stopped = indicator.poll(now + Duration::from_millis(500));
        let again = indicator.poll(now + Duration::from_millis(900));

        // then (期待する結果):
        assert_eq!(stopped, Some(false));
        assert_eq!(again, None);
        assert_eq!(indicator.deadline(), None);
    }

    #[test]
    fn test_send_always_stops_typing() {
        // テスト項目: 送信時は入力中でなくても入力終了が通知される
        // given (前提条件):
        let mut indicator = TypingIndicator::default();

        // when (操作):
        let idle_send = indicator.on_send();
        indicator.on_keystroke(Instant::now());
        let typing_send = indicator.on_send();

        // then (期待する結果):
        assert_eq!(idle_send, Some(false));
        assert_eq!(typing_send, Some(false));
        assert!(!indicator.is_typing());
    }

    #[tokio::test]
    async fn test_deadline_elapses_with_paused_clock() {
        // テスト項目: 一時停止した時計を進めると締め切り到達後に入力終了となる
        // given (前提条件):
        tokio::time::pause();
        let mut indicator = TypingIndicator::default();
        indicator.on_keystroke(Instant::now());
        let deadline = indicator.deadline().unwrap();

        // when (操作):
        tokio::time::sleep_until(deadline).await;

        // then (期待する結果):
        assert_eq!(indicator.poll(Instant::now()), Some(false));
    }
}
