//! Identity Registry: connection id → display name.

use std::collections::HashMap;

use super::value_object::ConnectionId;

/// Display name used when a connection id has no registered name.
pub const UNKNOWN_PARTICIPANT: &str = "Someone";

/// Mapping from connection-scoped ids to display names.
///
/// Bindings are first-write-wins: once an id is bound, later claims for the
/// same id are ignored for the rest of the session.
#[derive(Debug, Default, Clone)]
pub struct IdentityRegistry {
    names: HashMap<ConnectionId, String>,
    /// Registration order, oldest first
    order: Vec<ConnectionId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `connection_id` to `display_name` unless it is already bound.
    ///
    /// Returns `true` when a new binding was inserted.
    pub fn register(&mut self, connection_id: ConnectionId, display_name: impl Into<String>) -> bool {
        if self.names.contains_key(&connection_id) {
            return false;
        }

        let display_name = display_name.into();
        tracing::debug!(
            "Registered participant '{}' as '{}'",
            connection_id,
            display_name
        );
        self.order.push(connection_id.clone());
        self.names.insert(connection_id, display_name);
        true
    }

    /// Display name for `connection_id`, or [`UNKNOWN_PARTICIPANT`].
    pub fn resolve(&self, connection_id: &ConnectionId) -> &str {
        self.get(connection_id).unwrap_or(UNKNOWN_PARTICIPANT)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.names.get(connection_id).map(String::as_str)
    }

    /// Connection id bound to `display_name`.
    ///
    /// When several ids share the name, the most recently registered one wins.
    pub fn reverse_lookup(&self, display_name: &str) -> Option<&ConnectionId> {
        self.order
            .iter()
            .rev()
            .find(|id| self.names.get(*id).is_some_and(|name| name == display_name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop every binding (session end).
    pub fn clear(&mut self) {
        self.names.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_register_is_first_write_wins() {
        // テスト項目: 同じ接続 ID への 2 回目の登録は無視される
        // given (前提条件):
        let mut registry = IdentityRegistry::new();
        registry.register(id("u1"), "A");

        // when (操作):
        let inserted = registry.register(id("u1"), "B");

        // then (期待する結果):
        assert!(!inserted);
        assert_eq!(registry.resolve(&id("u1")), "A");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_returns_placeholder() {
        // テスト項目: 未登録の接続 ID はプレースホルダー名に解決される
        // given (前提条件):
        let registry = IdentityRegistry::new();

        // when (操作):
        let name = registry.resolve(&id("ghost"));

        // then (期待する結果):
        assert_eq!(name, UNKNOWN_PARTICIPANT);
        assert!(registry.get(&id("ghost")).is_none());
    }

    #[test]
    fn test_reverse_lookup_finds_registered_name() {
        // テスト項目: 表示名から接続 ID を逆引きできる
        // given (前提条件):
        let mut registry = IdentityRegistry::new();
        registry.register(id("u1"), "Bob");
        registry.register(id("u2"), "Carol");

        // when (操作):
        let result = registry.reverse_lookup("Carol");

        // then (期待する結果):
        assert_eq!(result, Some(&id("u2")));
        assert_eq!(registry.reverse_lookup("Dan"), None);
    }

    #[test]
    fn test_reverse_lookup_collision_last_registered_wins() {
        // テスト項目: 同名の参加者が複数いる場合、最後に登録された ID が返される
        // given (前提条件):
        let mut registry = IdentityRegistry::new();
        registry.register(id("u1"), "Carol");
        registry.register(id("u2"), "Bob");
        registry.register(id("u3"), "Carol");

        // when (操作):
        let result = registry.reverse_lookup("Carol");

        // then (期待する結果):
        assert_eq!(result, Some(&id("u3")));
    }

    #[test]
    fn test_reverse_lookup_ignores_rejected_rebinding() {
        // テスト項目: 拒否された再登録の名前では逆引きされない
        // given (前提条件):
        let mut registry = IdentityRegistry::new();
        registry.register(id("u1"), "Alice");
        registry.register(id("u1"), "Mallory");

        // when (操作):
        let result = registry.reverse_lookup("Mallory");

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_clear_removes_all_bindings() {
        // テスト項目: セッション終了時に全ての対応付けが破棄される
        // given (前提条件):
        let mut registry = IdentityRegistry::new();
        registry.register(id("u1"), "Alice");

        // when (操作):
        registry.clear();

        // then (期待する結果):
        assert!(registry.is_empty());
        assert_eq!(registry.reverse_lookup("Alice"), None);
        assert!(registry.register(id("u1"), "Alicia"));
    }
}
