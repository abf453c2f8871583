//! Local participant profile sent with create/join requests.

use super::value_object::Nickname;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    pub nickname: Nickname,
    /// Avatar image URL; `None` when the user left it blank
    pub avatar_url: Option<String>,
}

impl Profile {
    pub fn new(nickname: Nickname, avatar_url: Option<String>) -> Self {
        let avatar_url = avatar_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Self {
            nickname,
            avatar_url,
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_avatar_is_treated_as_none() {
        // テスト項目: 空白だけのアバター URL は未指定として扱われる
        // given (前提条件):
        let nickname = Nickname::new("alice".to_string()).unwrap();

        // when (操作):
        let profile = Profile::new(nickname, Some("   ".to_string()));

        // then (期待する結果):
        assert_eq!(profile.avatar_url(), None);
    }

    #[test]
    fn test_avatar_is_trimmed() {
        // テスト項目: アバター URL の前後の空白は取り除かれる
        // given (前提条件):
        let nickname = Nickname::new("alice".to_string()).unwrap();

        // when (操作):
        let profile = Profile::new(nickname, Some(" https://example.com/a.png ".to_string()));

        // then (期待する結果):
        assert_eq!(profile.avatar_url(), Some("https://example.com/a.png"));
    }
}
