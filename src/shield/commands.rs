//! Slash-command routing
//!
//! Commands accept Telegram's qualified syntax: `/kills@shield_bot` only
//! addresses the bot named `shield_bot`, while a bare `/kills` addresses
//! every bot in the chat.

use crate::core::UserIdentity;

use super::decision::DecisionEngine;

/// Default alias answering like `/ping`
pub const DEFAULT_PING_ALIAS: &str = "/lelerax";

/// A recognized command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Kills,
    /// Grant a pass; carries everything after the first space
    Pass(String),
}

/// Whether `text` invokes `command` for the bot named `bot_handle`.
///
/// When the text carries the qualified form `command@`, it must name this
/// bot exactly; otherwise a prefix match on the bare command is enough.
pub fn check_command(bot_handle: &str, text: &str, command: &str) -> bool {
    let qualified = format!("{}@", command);
    if text.contains(&qualified) {
        let addressed = format!("{}{}", qualified, bot_handle.trim_start_matches('@'));
        return match text.strip_prefix(&addressed) {
            Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
            None => false,
        };
    }
    text.starts_with(command)
}

/// Everything after the first space of a `/pass` command, trimmed
pub fn extract_pass_token(text: &str) -> &str {
    text.split_once(' ')
        .map(|(_, rest)| rest.trim())
        .unwrap_or("")
}

/// Reply to `/kills`; the wording depends on the parity of the count
pub fn report_kills(kills: u64) -> String {
    if kills % 2 == 0 {
        format!("{} trolls removed so far. An even score, for now.", kills)
    } else {
        format!("{} trolls removed so far. Odd number, someone must be next.", kills)
    }
}

/// Parses commands and applies them to the engine
#[derive(Debug, Clone)]
pub struct CommandRouter {
    /// Handles allowed to run privileged commands, without `@`
    admins: Vec<String>,
    ping_alias: Option<String>,
}

impl CommandRouter {
    pub fn new(admins: Vec<String>) -> Self {
        Self {
            admins: admins
                .into_iter()
                .map(|admin| admin.trim_start_matches('@').to_string())
                .collect(),
            ping_alias: Some(DEFAULT_PING_ALIAS.to_string()),
        }
    }

    /// Set the alias answering like `/ping` (`None` disables it)
    pub fn with_ping_alias(mut self, alias: Option<String>) -> Self {
        self.ping_alias = alias;
        self
    }

    /// Whether `sender` may run privileged commands
    pub fn is_admin(&self, sender: &UserIdentity) -> bool {
        match &sender.handle {
            Some(handle) => self.admins.iter().any(|admin| admin == handle),
            None => false,
        }
    }

    /// Recognize the command in `text`, if `sender` may run it.
    ///
    /// Unauthorized `/pass` attempts are not recognized at all.
    pub fn parse(&self, bot_handle: &str, sender: &UserIdentity, text: &str) -> Option<Command> {
        if !text.starts_with('/') {
            return None;
        }

        let is_ping = check_command(bot_handle, text, "/ping")
            || self
                .ping_alias
                .as_deref()
                .is_some_and(|alias| check_command(bot_handle, text, alias));
        if is_ping {
            return Some(Command::Ping);
        }

        if check_command(bot_handle, text, "/kills") {
            return Some(Command::Kills);
        }

        if check_command(bot_handle, text, "/pass") {
            if !self.is_admin(sender) {
                tracing::info!(
                    "[CommandRouter] Ignoring /pass from non-admin {}",
                    sender.display_name()
                );
                return None;
            }
            return Some(Command::Pass(extract_pass_token(text).to_string()));
        }

        None
    }

    /// Run the command in `text` and return the reply to send, if any
    pub fn route(
        &self,
        bot_handle: &str,
        sender: &UserIdentity,
        text: &str,
        engine: &mut DecisionEngine,
    ) -> Option<String> {
        let command = self.parse(bot_handle, sender, text)?;
        tracing::debug!("[CommandRouter] {:?} from {}", command, sender.display_name());

        match command {
            Command::Ping => Some("I'm alive.".to_string()),
            Command::Kills => Some(report_kills(engine.kills())),
            Command::Pass(token) => {
                if !engine.grant_pass(token.as_str()) {
                    return None;
                }
                Some(format!(
                    "Pass granted to {}. It is valid for one join.",
                    token
                ))
            }
        }
    }
}
