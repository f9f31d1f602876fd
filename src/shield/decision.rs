//! Moderation policy
//!
//! `DecisionEngine` owns the mutable moderation state (passes and the kill
//! counter) and decides what happens to each joining user. Branches are
//! evaluated in strict priority order:
//!
//! 1. a matching pass lets the user in (no probe is made)
//! 2. membership in a watched group gets the user removed for a while
//! 3. humans joining the primary group are welcomed
//! 4. anything else is ignored
//!
//! Leaving blacklisted chats is decided separately, see
//! [`DecisionEngine::must_leave_on_join`] and
//! [`DecisionEngine::must_leave_on_message`].

use crate::core::{ChatIdentity, UserIdentity};
use crate::gateway::BanDuration;

use super::kill_counter::KillCounter;
use super::pass_list::PassList;
use super::probe::MembershipProbe;

/// Default length of a troll-house removal
pub const DEFAULT_BAN_HOURS: u64 = 24;

/// What to do with one joining user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A pass was spent; welcome the user and announce the pass use
    Passed { token: String },

    /// The user belongs to troll houses and must be removed
    Remove {
        /// Comma-joined troll houses
        houses: String,
        ban: BanDuration,
    },

    /// Welcome the user with the rules
    Welcome,

    /// Nothing to do
    Ignore,
}

/// Moderation policy and the state it owns
pub struct DecisionEngine {
    /// The bot's own account
    me: UserIdentity,
    passes: PassList,
    kills: KillCounter,
    watched_groups: Vec<String>,
    primary_group: String,
    ban: BanDuration,
}

impl DecisionEngine {
    /// Create an engine for the bot account `me`
    pub fn new(
        me: UserIdentity,
        watched_groups: Vec<String>,
        primary_group: impl Into<String>,
        kills: KillCounter,
    ) -> Self {
        Self {
            me,
            passes: PassList::new(),
            kills,
            watched_groups,
            primary_group: primary_group.into(),
            ban: BanDuration::hours(DEFAULT_BAN_HOURS),
        }
    }

    /// Set how long troll-house removals last
    pub fn with_ban(mut self, ban: BanDuration) -> Self {
        self.ban = ban;
        self
    }

    /// The bot's own account
    pub fn me(&self) -> &UserIdentity {
        &self.me
    }

    pub fn passes(&self) -> &PassList {
        &self.passes
    }

    /// Grant a single-use pass
    pub fn grant_pass(&mut self, token: impl Into<String>) -> bool {
        self.passes.grant(token)
    }

    /// Current number of successful removals
    pub fn kills(&self) -> u64 {
        self.kills.value()
    }

    /// Count a successful removal and persist the new value
    pub fn record_removal(&mut self) -> u64 {
        let kills = self.kills.increment();
        tracing::info!("[DecisionEngine] Kill count is now {}", kills);
        kills
    }

    /// Decide what happens to `user` joining `chat`
    pub async fn decide_join(
        &mut self,
        chat: &ChatIdentity,
        user: &UserIdentity,
        probe: &MembershipProbe,
    ) -> JoinOutcome {
        if let Some(token) = self.passes.consume(user) {
            return JoinOutcome::Passed { token };
        }

        let houses = probe.probe(user.id).await;
        if !houses.is_empty() {
            return JoinOutcome::Remove {
                houses,
                ban: self.ban,
            };
        }

        if chat.matches(&self.primary_group) && !user.is_bot {
            return JoinOutcome::Welcome;
        }

        JoinOutcome::Ignore
    }

    /// Whether `chat` is one of the watched groups
    pub fn is_watched(&self, chat: &ChatIdentity) -> bool {
        self.watched_groups.iter().any(|group| chat.matches(group))
    }

    /// The bot itself joined a watched group
    pub fn must_leave_on_join(&self, chat: &ChatIdentity, member: &UserIdentity) -> bool {
        member.id == self.me.id && self.is_watched(chat)
    }

    /// A message arrived from a watched group
    pub fn must_leave_on_message(&self, chat: &ChatIdentity) -> bool {
        self.is_watched(chat)
    }
}
