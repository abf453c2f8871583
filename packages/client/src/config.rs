//! Client configuration.

use std::time::Duration;

use crate::{
    error::LobbyError,
    session::RoomTarget,
    transport::{TransportConfig, websocket::DEFAULT_REQUEST_TIMEOUT},
    ui::DEFAULT_TYPING_IDLE,
};

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Identifiers entered before starting a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbyForm {
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub room_id: Option<String>,
    /// Create a new room instead of joining `room_id`
    pub create: bool,
}

impl LobbyForm {
    /// Validate the form into a room target.
    pub fn into_target(self) -> Result<RoomTarget, LobbyError> {
        let avatar_url = self.avatar_url.as_deref();
        if self.create {
            RoomTarget::create(&self.nickname, avatar_url)
        } else {
            let room_id = self.room_id.as_deref().unwrap_or_default();
            RoomTarget::join(&self.nickname, room_id, avatar_url)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the messaging service
    pub url: String,
    pub target: RoomTarget,
    /// Keystroke silence after which typing stops
    pub typing_idle: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, target: RoomTarget) -> Self {
        Self {
            url: url.into(),
            target,
            typing_idle: DEFAULT_TYPING_IDLE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_lobby(url: impl Into<String>, form: LobbyForm) -> Result<Self, LobbyError> {
        Ok(Self::new(url, form.into_target()?))
    }

    pub fn with_typing_idle(mut self, typing_idle: Duration) -> Self {
        self.typing_idle = typing_idle;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            url: self.url.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RoomMode;

    #[test]
    fn test_create_form_needs_only_nickname() {
        // テスト項目: 作成モードではルーム ID が無くても設定が作られる
        // given (前提条件):
        let form = LobbyForm {
            nickname: "alice".to_string(),
            create: true,
            ..Default::default()
        };

        // when (操作):
        let config = ClientConfig::from_lobby(DEFAULT_URL, form).unwrap();

        // then (期待する結果):
        assert_eq!(config.target.mode, RoomMode::Create);
        assert_eq!(config.typing_idle, DEFAULT_TYPING_IDLE);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_create_form_without_nickname_fails() {
        // テスト項目: 作成モードでニックネームが空の場合、"Enter a nickname first" になる
        // given (前提条件):
        let form = LobbyForm {
            nickname: "  ".to_string(),
            create: true,
            ..Default::default()
        };

        // when (操作):
        let result = ClientConfig::from_lobby(DEFAULT_URL, form);

        // then (期待する結果):
        let err = result.unwrap_err();
        assert_eq!(err, LobbyError::MissingNickname);
        assert_eq!(err.to_string(), "Enter a nickname first");
    }

    #[test]
    fn test_join_form_without_room_id_fails() {
        // テスト項目: 参加モードでルーム ID が無い場合、"Enter nickname and room ID" になる
        // given (前提条件):
        let form = LobbyForm {
            nickname: "bob".to_string(),
            ..Default::default()
        };

        // when (操作):
        let result = ClientConfig::from_lobby(DEFAULT_URL, form);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err().to_string(),
            "Enter nickname and room ID"
        );
    }

    #[test]
    fn test_transport_config_carries_timeout() {
        // テスト項目: リクエストのタイムアウトが接続設定に引き継がれる
        // given (前提条件):
        let form = LobbyForm {
            nickname: "bob".to_string(),
            room_id: Some("room-1".to_string()),
            avatar_url: Some("".to_string()),
            create: false,
        };
        let config = ClientConfig::from_lobby("ws://localhost:9000/ws", form)
            .unwrap()
            .with_request_timeout(Duration::from_secs(3))
            .with_typing_idle(Duration::from_millis(250));

        // when (操作):
        let transport = config.transport_config();

        // then (期待する結果):
        assert_eq!(transport.url, "ws://localhost:9000/ws");
        assert_eq!(transport.request_timeout, Duration::from_secs(3));
        assert_eq!(config.typing_idle, Duration::from_millis(250));
        assert_eq!(config.target.profile.avatar_url(), None);
    }
}
