//! Identities of users and chats as seen by the shield

use serde::Deserialize;
use std::fmt;

/// Platform user id (numeric, stable)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform chat id (numeric)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Platform message id, used to thread replies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    /// Public handle, stored without the leading `@`
    pub handle: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Whether the account is automated
    pub is_bot: bool,
}

impl UserIdentity {
    /// Create a human user with only a given name
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            handle: None,
            first_name: first_name.into(),
            last_name: None,
            is_bot: false,
        }
    }

    /// Set the public handle (a leading `@` is stripped)
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        let handle = handle.into();
        self.handle = Some(handle.trim_start_matches('@').to_string());
        self
    }

    /// Set the family name
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Mark the account as automated
    pub fn as_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// Name shown in replies and matched against passes.
    ///
    /// `@handle` wins; otherwise `first last`, or just `first`.
    pub fn display_name(&self) -> String {
        match (&self.handle, &self.last_name) {
            (Some(handle), _) if !handle.is_empty() => format!("@{}", handle),
            (_, Some(last)) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// A chat (group, supergroup or private conversation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatIdentity {
    pub id: ChatId,
    /// Public handle, stored without the leading `@`
    pub handle: Option<String>,
    pub title: Option<String>,
}

impl ChatIdentity {
    /// Create a chat with no handle or title
    pub fn new(id: i64) -> Self {
        Self {
            id: ChatId(id),
            handle: None,
            title: None,
        }
    }

    /// Set the public handle (a leading `@` is stripped)
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        let handle = handle.into();
        self.handle = Some(handle.trim_start_matches('@').to_string());
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether this chat goes by `name`, either as handle or as title.
    ///
    /// A leading `@` on `name` is ignored so that watched-group handles
    /// can be compared directly.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim_start_matches('@');
        if name.is_empty() {
            return false;
        }
        self.handle.as_deref() == Some(name) || self.title.as_deref() == Some(name)
    }
}

/// Status of a user inside a group, as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    #[serde(other)]
    Unknown,
}

impl MembershipStatus {
    /// Whether the status makes the group a troll house for the user
    pub fn is_present(self) -> bool {
        matches!(
            self,
            MembershipStatus::Member | MembershipStatus::Creator | MembershipStatus::Administrator
        )
    }
}
