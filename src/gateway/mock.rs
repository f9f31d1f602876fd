//! Scripted gateway for tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{BanDuration, ChatGateway};
use crate::core::{ChatId, MembershipStatus, MessageId, ShieldError, ShieldResult, UserId};

/// A call the shield made against the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    FetchStatus { group: String, user_id: UserId },
    Remove { chat_id: ChatId, user_id: UserId, ban: BanDuration },
    Reply { chat_id: ChatId, reply_to: Option<MessageId>, text: String },
    Leave { chat_id: ChatId },
}

/// Gateway answering from a script and recording every call.
///
/// Membership queries without a scripted status fail, like a user the
/// platform does not know.
#[derive(Default)]
pub struct MockGateway {
    statuses: HashMap<(String, UserId), MembershipStatus>,
    delays: HashMap<String, Duration>,
    failing_removals: HashSet<UserId>,
    failing_leaves: HashSet<ChatId>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, group: &str, user_id: i64, status: MembershipStatus) -> Self {
        self.statuses.insert((group.to_string(), UserId(user_id)), status);
        self
    }

    pub fn with_delay(mut self, group: &str, delay: Duration) -> Self {
        self.delays.insert(group.to_string(), delay);
        self
    }

    pub fn failing_removal(mut self, user_id: i64) -> Self {
        self.failing_removals.insert(UserId(user_id));
        self
    }

    pub fn failing_leave(mut self, chat_id: i64) -> Self {
        self.failing_leaves.insert(ChatId(chat_id));
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<(ChatId, UserId, BanDuration)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Remove { chat_id, user_id, ban } => Some((chat_id, user_id, ban)),
                _ => None,
            })
            .collect()
    }

    pub fn leaves(&self) -> Vec<ChatId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Leave { chat_id } => Some(chat_id),
                _ => None,
            })
            .collect()
    }

    pub fn status_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::FetchStatus { group, .. } => Some(group),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn fetch_membership_status(
        &self,
        group: &str,
        user_id: UserId,
    ) -> ShieldResult<MembershipStatus> {
        self.record(GatewayCall::FetchStatus {
            group: group.to_string(),
            user_id,
        });

        if let Some(delay) = self.delays.get(group) {
            tokio::time::sleep(*delay).await;
        }

        self.statuses
            .get(&(group.to_string(), user_id))
            .copied()
            .ok_or_else(|| ShieldError::api(400, "Bad Request: user not found"))
    }

    async fn remove_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        ban: BanDuration,
    ) -> ShieldResult<()> {
        self.record(GatewayCall::Remove { chat_id, user_id, ban });
        if self.failing_removals.contains(&user_id) {
            return Err(ShieldError::api(400, "Bad Request: not enough rights"));
        }
        Ok(())
    }

    async fn send_reply(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> ShieldResult<()> {
        self.record(GatewayCall::Reply {
            chat_id,
            reply_to,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn leave_chat(&self, chat_id: ChatId) -> ShieldResult<()> {
        self.record(GatewayCall::Leave { chat_id });
        if self.failing_leaves.contains(&chat_id) {
            return Err(ShieldError::api(400, "Bad Request: chat not found"));
        }
        Ok(())
    }
}
