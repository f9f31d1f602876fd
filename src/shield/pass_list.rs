//! Single-use passes granted by admins
//!
//! A pass lets one upcoming join skip the troll-house check. Each entry is
//! spent by the first user it matches.

use crate::core::UserIdentity;

/// Ordered list of pass tokens. Not persisted across restarts.
#[derive(Debug, Clone, Default)]
pub struct PassList {
    tokens: Vec<String>,
}

impl PassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token`. Empty tokens are refused; duplicates are kept and
    /// spent independently.
    pub fn grant(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if token.is_empty() {
            return false;
        }
        tracing::info!("[PassList] Granted pass to {:?}", token);
        self.tokens.push(token);
        true
    }

    /// Spend the first pass that matches `user`.
    ///
    /// A token matches when it is a prefix of the display name or equals the
    /// given name exactly. The spent entry is swapped with the last one, so
    /// the order of the remaining passes is not kept.
    pub fn consume(&mut self, user: &UserIdentity) -> Option<String> {
        let display_name = user.display_name();
        let index = self
            .tokens
            .iter()
            .position(|token| display_name.starts_with(token.as_str()) || *token == user.first_name)?;

        let token = self.tokens.swap_remove(index);
        tracing::info!("[PassList] {} used pass {:?}", display_name, token);
        Some(token)
    }

    /// Passes not spent yet
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
