//! Inbound events delivered by the chat gateway

use super::identity::{ChatIdentity, MessageId, UserIdentity};

/// Events the shield reacts to
#[derive(Debug, Clone)]
pub enum Event {
    /// An ordinary message (text may be empty for media)
    Message {
        message_id: MessageId,
        from: UserIdentity,
        chat: ChatIdentity,
        text: String,
    },

    /// One or more users joined a chat
    MembershipChange {
        message_id: MessageId,
        chat: ChatIdentity,
        /// Joining users, in the order the platform listed them
        members: Vec<UserIdentity>,
    },

    /// Anything else the platform sent
    Unrecognized,
}
