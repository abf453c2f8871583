//! Which room to enter and as whom.

use crate::{
    domain::{Nickname, Profile, RoomId},
    error::LobbyError,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomMode {
    /// Create a new room, then join it
    Create,
    /// Join an existing room
    Join(RoomId),
}

/// The (mode, room id, nickname, avatar) tuple a session enters a room with.
///
/// Create/join fires at most once per distinct target within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomTarget {
    pub mode: RoomMode,
    pub profile: Profile,
}

impl RoomTarget {
    /// Target for creating a room. Requires a nickname.
    pub fn create(nickname: &str, avatar_url: Option<&str>) -> Result<Self, LobbyError> {
        let nickname =
            Nickname::new(nickname.to_string()).map_err(|_| LobbyError::MissingNickname)?;
        Ok(Self {
            mode: RoomMode::Create,
            profile: Profile::new(nickname, avatar_url.map(str::to_string)),
        })
    }

    /// Target for joining `room_id`. Requires a nickname and a room id.
    pub fn join(nickname: &str, room_id: &str, avatar_url: Option<&str>) -> Result<Self, LobbyError> {
        let nickname = Nickname::new(nickname.to_string())
            .map_err(|_| LobbyError::MissingNicknameOrRoomId)?;
        let room_id =
            RoomId::new(room_id.to_string()).map_err(|_| LobbyError::MissingNicknameOrRoomId)?;
        Ok(Self {
            mode: RoomMode::Join(room_id),
            profile: Profile::new(nickname, avatar_url.map(str::to_string)),
        })
    }

    pub fn nickname(&self) -> &Nickname {
        &self.profile.nickname
    }

    /// Room id supplied up front (join mode only).
    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.mode {
            RoomMode::Create => None,
            RoomMode::Join(room_id) => Some(room_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_nickname() {
        // テスト項目: ニックネーム無しではルームを作成できない
        // given (前提条件):
        let nickname = "  ";

        // when (操作):
        let result = RoomTarget::create(nickname, None);

        // then (期待する結果):
        assert_eq!(result, Err(LobbyError::MissingNickname));
    }

    #[test]
    fn test_join_requires_nickname_and_room_id() {
        // テスト項目: ニックネームとルーム ID の両方が無いと参加できない
        // given (前提条件):
        let cases = [("", "room-1"), ("alice", ""), ("", "")];

        for (nickname, room_id) in cases {
            // when (操作):
            let result = RoomTarget::join(nickname, room_id, None);

            // then (期待する結果):
            assert_eq!(result, Err(LobbyError::MissingNicknameOrRoomId));
        }
    }

    #[test]
    fn test_join_target_exposes_room_id() {
        // テスト項目: 参加モードのターゲットはルーム ID を持つ
        // given (前提条件):
        let target = RoomTarget::join("alice", " room-1 ", Some("")).unwrap();

        // when (操作):
        let room_id = target.room_id();

        // then (期待する結果):
        assert_eq!(room_id.map(RoomId::as_str), Some("room-1"));
        assert_eq!(target.nickname().as_str(), "alice");
        assert_eq!(target.profile.avatar_url(), None);
    }

    #[test]
    fn test_targets_differ_by_avatar() {
        // テスト項目: アバターだけが異なるターゲットは別のターゲットとして扱われる
        // given (前提条件):
        let plain = RoomTarget::create("alice", None).unwrap();

        // when (操作):
        let with_avatar = RoomTarget::create("alice", Some("https://example.com/a.png")).unwrap();

        // then (期待する結果):
        assert_ne!(plain, with_avatar);
        assert_eq!(plain.room_id(), None);
    }
}
