//! The event loop
//!
//! Events are handled one at a time, in arrival order. Each event is
//! classified and handed to the command router or the decision engine, and
//! the resulting actions are issued against the gateway. Failed actions are
//! logged and never stop the loop.

use std::sync::Arc;

use futures::stream::{Stream, StreamExt};

use crate::core::{ChatIdentity, Event, MessageId, UserIdentity};
use crate::gateway::ChatGateway;

use super::commands::CommandRouter;
use super::decision::{DecisionEngine, JoinOutcome};
use super::probe::MembershipProbe;

/// Drives the shield over a sequential stream of events
pub struct ShieldLoop {
    gateway: Arc<dyn ChatGateway>,
    probe: MembershipProbe,
    engine: DecisionEngine,
    router: CommandRouter,
    rules_link: Option<String>,
}

impl ShieldLoop {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        probe: MembershipProbe,
        engine: DecisionEngine,
        router: CommandRouter,
    ) -> Self {
        Self {
            gateway,
            probe,
            engine,
            router,
            rules_link: None,
        }
    }

    /// Link appended to welcome messages
    pub fn with_rules_link(mut self, rules_link: Option<String>) -> Self {
        self.rules_link = rules_link;
        self
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Handle events until the source is closed
    pub async fn run<S>(&mut self, events: S)
    where
        S: Stream<Item = Event>,
    {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            self.run_once(event).await;
        }
        tracing::info!("[ShieldLoop] Event source closed");
    }

    /// Handle a single event
    pub async fn run_once(&mut self, event: Event) {
        match event {
            Event::Message {
                message_id,
                from,
                chat,
                text,
            } => self.handle_message(message_id, &from, &chat, &text).await,
            Event::MembershipChange {
                message_id,
                chat,
                members,
            } => self.handle_join(message_id, &chat, &members).await,
            Event::Unrecognized => tracing::trace!("[ShieldLoop] Skipping unrecognized event"),
        }
    }

    async fn handle_message(
        &mut self,
        message_id: MessageId,
        from: &UserIdentity,
        chat: &ChatIdentity,
        text: &str,
    ) {
        if self.engine.must_leave_on_message(chat) {
            self.leave(chat).await;
            return;
        }

        if !text.starts_with('/') {
            return;
        }

        let bot_handle = self.engine.me().handle.clone().unwrap_or_default();
        if let Some(reply) = self.router.route(&bot_handle, from, text, &mut self.engine) {
            self.reply(chat, Some(message_id), &reply).await;
        }
    }

    async fn handle_join(
        &mut self,
        message_id: MessageId,
        chat: &ChatIdentity,
        members: &[UserIdentity],
    ) {
        for member in members {
            // Added to a watched group: leave without probing ourselves
            if self.engine.must_leave_on_join(chat, member) {
                self.leave(chat).await;
                continue;
            }

            let outcome = self.engine.decide_join(chat, member, &self.probe).await;
            tracing::debug!(
                "[ShieldLoop] {} joined chat {}: {:?}",
                member.display_name(),
                chat.id,
                outcome
            );
            self.apply(message_id, chat, member, outcome).await;
        }
    }

    async fn apply(
        &mut self,
        message_id: MessageId,
        chat: &ChatIdentity,
        member: &UserIdentity,
        outcome: JoinOutcome,
    ) {
        match outcome {
            JoinOutcome::Passed { token } => {
                self.welcome(message_id, chat, member).await;
                let notice = format!(
                    "{} entered with a pass. Pass {} is now spent.",
                    member.display_name(),
                    token
                );
                self.reply(chat, Some(message_id), &notice).await;
            }
            JoinOutcome::Remove { houses, ban } => {
                match self.gateway.remove_member(chat.id, member.id, ban).await {
                    Ok(()) => {
                        self.engine.record_removal();
                        let notice = format!(
                            "{} was banned for being a member of: {}. Goodbye.",
                            member.display_name(),
                            houses
                        );
                        self.reply(chat, Some(message_id), &notice).await;
                    }
                    Err(e) => tracing::warn!(
                        "[ShieldLoop] Removing {} from chat {} did not work: {}",
                        member.display_name(),
                        chat.id,
                        e
                    ),
                }
            }
            JoinOutcome::Welcome => self.welcome(message_id, chat, member).await,
            JoinOutcome::Ignore => {}
        }
    }

    async fn welcome(&self, message_id: MessageId, chat: &ChatIdentity, member: &UserIdentity) {
        let text = match &self.rules_link {
            Some(link) => format!(
                "Welcome, {}! Please read the group rules: {}",
                member.display_name(),
                link
            ),
            None => format!(
                "Welcome, {}! Please read the group rules in the pinned message.",
                member.display_name()
            ),
        };
        self.reply(chat, Some(message_id), &text).await;
    }

    async fn reply(&self, chat: &ChatIdentity, reply_to: Option<MessageId>, text: &str) {
        if let Err(e) = self.gateway.send_reply(chat.id, reply_to, text).await {
            tracing::warn!("[ShieldLoop] Send to chat {} failed: {}", chat.id, e);
        }
    }

    async fn leave(&self, chat: &ChatIdentity) {
        tracing::info!(
            "[ShieldLoop] Leaving watched chat {} ({:?})",
            chat.id,
            chat.handle.as_deref().or(chat.title.as_deref())
        );
        if let Err(e) = self.gateway.leave_chat(chat.id).await {
            tracing::warn!("[ShieldLoop] Leaving chat {} failed: {}", chat.id, e);
        }
    }
}
