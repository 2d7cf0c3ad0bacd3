use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable user record. Every change produces a new value; an absent `id`
/// marks a user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
}

impl User {
    /// A not-yet-persisted user; the store assigns the id on first write.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Copy with the name replaced and the identity preserved.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_name_preserves_identity() {
        let alice = User::with_id(UserId("42".into()), "Alice");
        let bob = alice.with_name("Bob");
        assert_eq!(bob.id, Some(UserId("42".into())));
        assert_eq!(bob.name, "Bob");
        // original value untouched
        assert_eq!(alice.name, "Alice");
    }

    #[test]
    fn new_user_has_no_identity() {
        let carol = User::new("Carol");
        assert!(carol.id.is_none());
        assert_eq!(carol.name, "Carol");
    }
}
