//! Chat gateway
//!
//! The shield never talks to the platform directly. Everything it needs from
//! the remote side goes through the `ChatGateway` trait:
//! - membership queries (used by the probe)
//! - removals, replies and leaving chats (used by the event loop)
//!
//! `TelegramGateway` implements it over the Telegram Bot API.

pub mod telegram;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::core::{ChatId, MembershipStatus, MessageId, ShieldResult, UserId};

pub use telegram::TelegramGateway;

/// Longest removal the platform still treats as temporary (366 days)
pub const MAX_BAN_HOURS: i64 = 366 * 24;

/// How long a removal lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanDuration {
    /// The user may come back after this long
    Temporary(Duration),
    /// The user may never come back
    Permanent,
}

impl BanDuration {
    /// A temporary removal lasting `hours`, capped at `MAX_BAN_HOURS`
    pub fn hours(hours: u64) -> Self {
        let hours = i64::try_from(hours).map_or(MAX_BAN_HOURS, |h| h.min(MAX_BAN_HOURS));
        BanDuration::Temporary(Duration::hours(hours))
    }

    /// The moment the removal expires, counted from `now`.
    ///
    /// `None` means it never expires.
    pub fn until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            BanDuration::Temporary(duration) => Some(now + *duration),
            BanDuration::Permanent => None,
        }
    }
}

/// Operations the shield consumes from the remote platform
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Query the status of `user_id` inside the group with handle `group`
    async fn fetch_membership_status(
        &self,
        group: &str,
        user_id: UserId,
    ) -> ShieldResult<MembershipStatus>;

    /// Remove `user_id` from `chat_id` for `ban`
    async fn remove_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        ban: BanDuration,
    ) -> ShieldResult<()>;

    /// Send `text` to `chat_id`, threaded under `reply_to` when given
    async fn send_reply(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> ShieldResult<()>;

    /// Make the bot leave `chat_id`
    async fn leave_chat(&self, chat_id: ChatId) -> ShieldResult<()>;
}
