//! Change-set identifiers.

use uuid::Uuid;

/// Length of the unique token appended to change-set ids.
pub const TOKEN_LEN: usize = 13;

/// Source of the unique tokens appended to change-set ids.
pub trait ChangeSetIdGenerator: Send {
    /// Produce a fresh token.
    fn next_token(&mut self) -> String;
}

/// Random tokens: the first 13 hex digits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl ChangeSetIdGenerator for UuidIdGenerator {
    fn next_token(&mut self) -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(TOKEN_LEN);
        token
    }
}

/// Deterministic tokens counting up from a start value.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    /// Start counting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }
}

impl ChangeSetIdGenerator for SequentialIdGenerator {
    fn next_token(&mut self) -> String {
        let token = format!("{:0width$x}", self.next, width = TOKEN_LEN);
        self.next += 1;
        token
    }
}

/// Replace `_` and `.` with `-` in a change-set slug.
pub fn sanitize_id(slug: &str) -> String {
    slug.replace(['_', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("create-table-app.user_roles"), "create-table-app-user-roles");
        assert_eq!(sanitize_id("drop-sequence-seq"), "drop-sequence-seq");
    }

    #[test]
    fn test_uuid_tokens_are_unique_hex() {
        let mut generator = UuidIdGenerator;
        let a = generator.next_token();
        let b = generator.next_token();

        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_tokens() {
        let mut generator = SequentialIdGenerator::starting_at(255);
        assert_eq!(generator.next_token(), "00000000000ff");
        assert_eq!(generator.next_token(), "0000000000100");
    }
}
