//! Telegram Bot API gateway
//!
//! A direct HTTP client for the Telegram Bot API. It implements `ChatGateway`
//! for the shield and additionally:
//! - identifies the bot account (`getMe`)
//! - publishes the command menu (`setMyCommands`)
//! - long-polls `getUpdates` and yields `Event`s as an async stream
//!
//! ```ignore
//! let gateway = Arc::new(TelegramGateway::new(token));
//! let me = gateway.get_me().await?;
//! let events = gateway.clone().updates();
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::Stream;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{BanDuration, ChatGateway};
use crate::core::{
    ChatId, ChatIdentity, Event, MembershipStatus, MessageId, ShieldError, ShieldResult, UserId,
    UserIdentity,
};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-poll window for `getUpdates`
const POLL_TIMEOUT_SECS: u64 = 60;

/// Pause before polling again after a failed `getUpdates`
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
    #[serde(default)]
    is_bot: bool,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

impl From<TgUser> for UserIdentity {
    fn from(user: TgUser) -> Self {
        UserIdentity {
            id: UserId(user.id),
            handle: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_bot: user.is_bot,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
    username: Option<String>,
    title: Option<String>,
}

impl From<TgChat> for ChatIdentity {
    fn from(chat: TgChat) -> Self {
        ChatIdentity {
            id: ChatId(chat.id),
            handle: chat.username,
            title: chat.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    from: Option<TgUser>,
    chat: TgChat,
    text: Option<String>,
    new_chat_members: Option<Vec<TgUser>>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
}

impl TgUpdate {
    fn into_event(self) -> Event {
        let Some(message) = self.message else {
            return Event::Unrecognized;
        };

        match message.new_chat_members {
            Some(members) if !members.is_empty() => Event::MembershipChange {
                message_id: MessageId(message.message_id),
                chat: message.chat.into(),
                members: members.into_iter().map(UserIdentity::from).collect(),
            },
            _ => match message.from {
                Some(from) => Event::Message {
                    message_id: MessageId(message.message_id),
                    from: from.into(),
                    chat: message.chat.into(),
                    text: message.text.unwrap_or_default(),
                },
                // Channel posts carry no sender
                None => Event::Unrecognized,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TgChatMember {
    status: MembershipStatus,
}

/// Entry of the command menu shown by Telegram clients
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into().trim_start_matches('/').to_string(),
            description: description.into(),
        }
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Telegram Bot API client for one bot account
#[derive(Clone)]
pub struct TelegramGateway {
    client: Client,
    token: String,
    api_base: String,
}

impl TelegramGateway {
    /// Create a gateway for the bot owning `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the gateway at a different API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Call a Bot API method and unwrap its `result`
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ShieldResult<T> {
        tracing::debug!("[Telegram] {} {}", method, params);

        let response = self
            .client
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await?;

        let body: ApiResponse<T> = response.json().await?;
        if !body.ok {
            return Err(ShieldError::api(
                body.error_code.unwrap_or(0),
                body.description.unwrap_or_else(|| format!("{} failed", method)),
            ));
        }

        body.result
            .ok_or_else(|| ShieldError::api(0, format!("{} returned no result", method)))
    }

    /// Identify the bot account behind the token
    pub async fn get_me(&self) -> ShieldResult<UserIdentity> {
        let me: TgUser = self.call("getMe", json!({})).await?;
        Ok(me.into())
    }

    /// Publish the command menu
    pub async fn set_commands(&self, commands: &[BotCommand]) -> ShieldResult<()> {
        let _: bool = self
            .call("setMyCommands", json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64) -> ShieldResult<Vec<TgUpdate>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Long-poll the platform and yield every update as an `Event`.
    ///
    /// Polling errors are logged and retried; the stream only ends when the
    /// consumer drops it.
    pub fn updates(self: Arc<Self>) -> impl Stream<Item = Event> + Send + 'static {
        let gateway = self;
        async_stream::stream! {
            let mut offset = 0;
            loop {
                match gateway.get_updates(offset).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            yield update.into_event();
                        }
                    }
                    Err(e) => {
                        tracing::warn!("[Telegram] getUpdates failed: {}", e);
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn fetch_membership_status(
        &self,
        group: &str,
        user_id: UserId,
    ) -> ShieldResult<MembershipStatus> {
        let group = format!("@{}", group.trim_start_matches('@'));
        let member: TgChatMember = self
            .call(
                "getChatMember",
                json!({ "chat_id": group, "user_id": user_id.0 }),
            )
            .await?;
        Ok(member.status)
    }

    async fn remove_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        ban: BanDuration,
    ) -> ShieldResult<()> {
        let mut params = json!({ "chat_id": chat_id.0, "user_id": user_id.0 });
        if let Some(until) = ban.until(Utc::now()) {
            params["until_date"] = json!(until.timestamp());
        }
        let _: bool = self.call("banChatMember", params).await?;
        Ok(())
    }

    async fn send_reply(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> ShieldResult<()> {
        let mut params = json!({ "chat_id": chat_id.0, "text": text });
        if let Some(reply_to) = reply_to {
            params["reply_to_message_id"] = json!(reply_to.0);
        }
        let _: serde_json::Value = self.call("sendMessage", params).await?;
        Ok(())
    }

    async fn leave_chat(&self, chat_id: ChatId) -> ShieldResult<()> {
        let _: bool = self
            .call("leaveChat", json!({ "chat_id": chat_id.0 }))
            .await?;
        Ok(())
    }
}
