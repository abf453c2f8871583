//! Wire frames exchanged with the messaging service.
//!
//! Every frame is a JSON text message. Requests carry a `callbackId` and the
//! service answers with a frame echoing it; frames without a `callbackId` are
//! pushed events (chat messages, typing presence, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    domain::{ChatEntry, ConnectionId, Envelope, Profile, RoomId, TYPING_PRESENCE_TAG},
    error::ClientError,
};

use super::JoinedRoom;

/// Outbound message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    CreateSession,
    JoinSession,
    SendMessage,
    SetTypingPresence,
}

impl MessageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSession => "createSession",
            Self::JoinSession => "joinSession",
            Self::SendMessage => "sendMessage",
            Self::SetTypingPresence => TYPING_PRESENCE_TAG,
        }
    }
}

impl std::fmt::Display for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    #[serde(rename = "type")]
    pub tag: &'static str,
    pub data: Value,
    pub callback_id: String,
}

impl OutboundFrame {
    pub fn new(tag: MessageTag, data: Value, callback_id: String) -> Self {
        Self {
            tag: tag.as_str(),
            data,
            callback_id,
        }
    }

    pub fn to_json(&self) -> Result<String, ClientError> {
        serde_json::to_string(self)
            .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize frame: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    #[serde(rename = "type", default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub callback_id: Option<String>,
}

impl InboundFrame {
    pub fn into_envelope(self) -> Envelope {
        Envelope {
            tag: self.tag,
            data: self.data,
        }
    }
}

fn user_settings(profile: &Profile) -> Value {
    let mut settings = json!({ "userNickname": profile.nickname.as_str() });
    if let Some(icon) = profile.avatar_url() {
        settings["userIcon"] = Value::String(icon.to_string());
    }
    settings
}

pub fn create_session_payload(profile: &Profile) -> Value {
    json!({ "userSettings": user_settings(profile) })
}

pub fn join_session_payload(profile: &Profile, room_id: &RoomId) -> Value {
    json!({
        "sessionId": room_id.as_str(),
        "userSettings": user_settings(profile),
    })
}

pub fn chat_payload(body: &str) -> Value {
    json!({ "body": body })
}

pub fn typing_payload(typing: bool) -> Value {
    json!({ "typing": typing })
}

/// Error message carried by a response, if the service rejected the request.
pub fn response_error(data: &Value) -> Option<String> {
    data.get("errorMessage").map(|message| match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinedSession {
    #[serde(default)]
    messages: Option<Vec<Value>>,
    #[serde(default)]
    perm_id: Option<String>,
}

/// Room id from a `createSession` response.
///
/// Accepts `{"sessionId": "..."}` or a bare string.
pub fn parse_created_room(data: Value) -> Result<RoomId, ClientError> {
    let session_id = match data {
        Value::String(session_id) => session_id,
        other => {
            serde_json::from_value::<CreatedSession>(other)
                .map_err(|e| ClientError::MalformedResponse(format!("createSession: {}", e)))?
                .session_id
        }
    };

    RoomId::new(session_id)
        .map_err(|e| ClientError::MalformedResponse(format!("createSession: {}", e)))
}

/// History and local identity from a `joinSession` response.
pub fn parse_joined_room(data: Value) -> Result<JoinedRoom, ClientError> {
    let joined = match data {
        Value::Null => JoinedSession {
            messages: None,
            perm_id: None,
        },
        other => serde_json::from_value::<JoinedSession>(other)
            .map_err(|e| ClientError::MalformedResponse(format!("joinSession: {}", e)))?,
    };

    let messages = joined
        .messages
        .unwrap_or_default()
        .iter()
        .map(ChatEntry::from_payload)
        .collect();
    let local_connection_id = joined.perm_id.and_then(|id| ConnectionId::new(id).ok());

    Ok(JoinedRoom {
        messages,
        local_connection_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Nickname;

    fn profile(avatar: Option<&str>) -> Profile {
        Profile::new(
            Nickname::new("alice".to_string()).unwrap(),
            avatar.map(str::to_string),
        )
    }

    #[test]
    fn test_outbound_frame_layout() {
        // テスト項目: 送信フレームは type / data / callbackId を持つ
        // given (前提条件):
        let frame = OutboundFrame::new(
            MessageTag::SendMessage,
            chat_payload("hello"),
            "cb-1".to_string(),
        );

        // when (操作):
        let json: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            json!({"type": "sendMessage", "data": {"body": "hello"}, "callbackId": "cb-1"})
        );
    }

    #[test]
    fn test_inbound_frame_without_callback_is_event() {
        // テスト項目: callbackId を持たないフレームはエンベロープに変換される
        // given (前提条件):
        let text = r#"{"type":"setTypingPresence","data":{"anyoneTyping":false}}"#;

        // when (操作):
        let frame: InboundFrame = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(frame.callback_id, None);
        let envelope = frame.into_envelope();
        assert_eq!(envelope.tag.as_deref(), Some("setTypingPresence"));
        assert_eq!(envelope.data, json!({"anyoneTyping": false}));
    }

    #[test]
    fn test_user_settings_omit_missing_avatar() {
        // テスト項目: アバター未指定の場合、userIcon は送信されない
        // given (前提条件):
        let without_icon = profile(None);
        let with_icon = profile(Some("https://example.com/a.png"));

        // when (操作):
        let payloads = (
            create_session_payload(&without_icon),
            create_session_payload(&with_icon),
        );

        // then (期待する結果):
        assert_eq!(payloads.0, json!({"userSettings": {"userNickname": "alice"}}));
        assert_eq!(
            payloads.1,
            json!({"userSettings": {"userNickname": "alice", "userIcon": "https://example.com/a.png"}})
        );
    }

    #[test]
    fn test_join_session_payload() {
        // テスト項目: 参加リクエストにはルーム ID とユーザー設定が含まれる
        // given (前提条件):
        let room_id = RoomId::new("room-1".to_string()).unwrap();

        // when (操作):
        let payload = join_session_payload(&profile(None), &room_id);

        // then (期待する結果):
        assert_eq!(
            payload,
            json!({"sessionId": "room-1", "userSettings": {"userNickname": "alice"}})
        );
    }

    #[test]
    fn test_response_error_extracts_message() {
        // テスト項目: errorMessage を持つレスポンスはエラーとして読み取られる
        // given (前提条件):
        let data = json!({"errorMessage": "Session not found"});

        // when (操作):
        let error = response_error(&data);

        // then (期待する結果):
        assert_eq!(error.as_deref(), Some("Session not found"));
        assert_eq!(response_error(&json!({"sessionId": "x"})), None);
    }

    #[test]
    fn test_parse_created_room_accepts_object_and_string() {
        // テスト項目: 作成レスポンスはオブジェクト形式と文字列形式の両方を受け付ける
        // given (前提条件):
        let object = json!({"sessionId": "abc"});
        let bare = json!("def");

        // when (操作):
        let results = (parse_created_room(object), parse_created_room(bare));

        // then (期待する結果):
        assert_eq!(results.0.unwrap().as_str(), "abc");
        assert_eq!(results.1.unwrap().as_str(), "def");
    }

    #[test]
    fn test_parse_created_room_rejects_missing_id() {
        // テスト項目: sessionId の無い作成レスポンスは不正なレスポンスとして扱われる
        // given (前提条件):
        let data = json!({"ok": true});

        // when (操作):
        let result = parse_created_room(data);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_joined_room_reads_history_and_perm_id() {
        // テスト項目: 参加レスポンスから履歴と自分の接続 ID が読み取られる
        // given (前提条件):
        let data = json!({
            "messages": [
                {"body": "m1", "permId": "u1", "userNickname": "Bob"},
                {"isSystemMessage": true, "userNickname": "Carol", "body": "joined"}
            ],
            "permId": "u7"
        });

        // when (操作):
        let joined = parse_joined_room(data).unwrap();

        // then (期待する結果):
        assert_eq!(
            joined.messages,
            vec![
                ChatEntry::user(ConnectionId::new("u1".to_string()).unwrap(), "Bob", "m1"),
                ChatEntry::system("Carol", "joined"),
            ]
        );
        assert_eq!(
            joined.local_connection_id,
            Some(ConnectionId::new("u7".to_string()).unwrap())
        );
    }

    #[test]
    fn test_parse_joined_room_without_messages() {
        // テスト項目: messages が無い、または null の場合は空の履歴になる
        // given (前提条件):
        let missing = json!({});
        let null = json!({"messages": null});

        // when (操作):
        let results = (parse_joined_room(missing), parse_joined_room(null));

        // then (期待する結果):
        assert!(results.0.unwrap().messages.is_empty());
        assert!(results.1.unwrap().messages.is_empty());
        assert!(parse_joined_room(Value::Null).unwrap().messages.is_empty());
    }
}
