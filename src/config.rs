//! Shield configuration
//!
//! Settings come from an optional JSON file (path in `TROLL_SHIELD_CONFIG`),
//! then individual environment variables override single fields. Every
//! field has a default, so an empty environment apart from the bot token is
//! a valid setup.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{ShieldError, ShieldResult};
use crate::gateway::{BanDuration, MAX_BAN_HOURS};
use crate::shield::commands::DEFAULT_PING_ALIAS;
use crate::shield::decision::DEFAULT_BAN_HOURS;
use crate::shield::kill_counter::KILLS_FILE;

/// Env var naming the JSON config file
pub const CONFIG_ENV: &str = "TROLL_SHIELD_CONFIG";

/// Env var holding the main bot token
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Env var holding the token of the silent probing account
pub const HIDDEN_TOKEN_ENV: &str = "TELEGRAM_BOT_HIDDEN_TOKEN";

/// Default log file
pub const LOG_FILE: &str = "troll-shield.log";

/// Groups whose members are removed on sight
const DEFAULT_WATCHED_GROUPS: &[&str] = &[
    "@ccppbrasil",
    "@vaicaraiooo",
    "@javascriptbr",
    "@frontendbr",
    "@GuiaDev",
    "@WebDevBR",
    "@mundojs",
    "@progclucb",
    "@progclube",
    "@commonlispbrofficial",
];

/// Runtime configuration of the shield
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Watched group handles, in probe order
    pub watched_groups: Vec<String>,

    /// Handles allowed to grant passes
    pub admins: Vec<String>,

    /// Group whose newcomers get a welcome message
    pub primary_group: String,

    /// Extra command answering like `/ping`
    pub ping_alias: Option<String>,

    /// Link appended to welcome messages
    pub rules_link: Option<String>,

    /// File holding the kill counter
    pub kills_file: PathBuf,

    /// Log file (appended to)
    pub log_file: PathBuf,

    /// How long troll-house removals last
    pub ban_hours: u64,

    /// Per-group probe timeout; none waits forever
    pub probe_timeout_secs: Option<u64>,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            watched_groups: DEFAULT_WATCHED_GROUPS.iter().map(|g| g.to_string()).collect(),
            admins: vec!["lerax".to_string()],
            primary_group: "commonlispbr".to_string(),
            ping_alias: Some(DEFAULT_PING_ALIAS.to_string()),
            rules_link: None,
            kills_file: PathBuf::from(KILLS_FILE),
            log_file: PathBuf::from(LOG_FILE),
            ban_hours: DEFAULT_BAN_HOURS,
            probe_timeout_secs: None,
        }
    }
}

impl ShieldConfig {
    /// Load from the config file (if any) and environment overrides
    pub fn load() -> ShieldResult<Self> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ShieldResult<Self> {
        let file = File::open(path.as_ref())?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Override single fields from `lookup` (normally the environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ShieldResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(groups) = lookup("TROLL_SHIELD_WATCHED_GROUPS") {
            self.watched_groups = split_list(&groups);
        }
        if let Some(admins) = lookup("TROLL_SHIELD_ADMINS") {
            self.admins = split_list(&admins);
        }
        if let Some(group) = lookup("TROLL_SHIELD_PRIMARY_GROUP") {
            self.primary_group = group.trim().to_string();
        }
        if let Some(path) = lookup("TROLL_SHIELD_KILLS_FILE") {
            self.kills_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("TROLL_SHIELD_LOG_FILE") {
            self.log_file = PathBuf::from(path);
        }
        if let Some(secs) = lookup("TROLL_SHIELD_PROBE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ShieldError::InvalidConfig(format!(
                    "TROLL_SHIELD_PROBE_TIMEOUT_SECS is not a number: {:?}",
                    secs
                ))
            })?;
            self.probe_timeout_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }

    /// Reject settings the shield cannot run with
    pub fn validate(&self) -> ShieldResult<()> {
        if self.watched_groups.iter().any(|g| g.trim_start_matches('@').is_empty()) {
            return Err(ShieldError::InvalidConfig(
                "watched group handles must not be empty".into(),
            ));
        }
        if self.ban_hours == 0 || self.ban_hours > MAX_BAN_HOURS as u64 {
            return Err(ShieldError::InvalidConfig(format!(
                "ban_hours must be between 1 and {}, got {}",
                MAX_BAN_HOURS, self.ban_hours
            )));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    pub fn ban(&self) -> BanDuration {
        BanDuration::hours(self.ban_hours)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bot tokens
#[derive(Clone)]
pub struct BotCredentials {
    pub token: String,
    /// Account used only for membership probes
    pub hidden_token: Option<String>,
}

impl BotCredentials {
    /// Read tokens from the environment; the main token is required
    pub fn from_env() -> ShieldResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> ShieldResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ShieldError::MissingEnv(TOKEN_ENV.to_string()))?;
        let hidden_token = lookup(HIDDEN_TOKEN_ENV).filter(|t| !t.is_empty());
        Ok(Self {
            token,
            hidden_token,
        })
    }
}

impl fmt::Debug for BotCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotCredentials")
            .field("token", &"<redacted>")
            .field("hidden_token", &self.hidden_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShieldConfig::default();
        assert_eq!(config.watched_groups.len(), 10);
        assert_eq!(config.watched_groups[0], "@ccppbrasil");
        assert_eq!(config.primary_group, "commonlispbr");
        assert_eq!(config.ban(), BanDuration::hours(24));
        assert!(config.probe_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ShieldConfig::default();
        config
            .apply_overrides(lookup(&[
                ("TROLL_SHIELD_WATCHED_GROUPS", "@a, @b,,@c"),
                ("TROLL_SHIELD_ADMINS", "lerax,manoel"),
                ("TROLL_SHIELD_PROBE_TIMEOUT_SECS", "5"),
                ("TROLL_SHIELD_KILLS_FILE", "/var/lib/shield/kills.txt"),
            ]))
            .unwrap();

        assert_eq!(config.watched_groups, vec!["@a", "@b", "@c"]);
        assert_eq!(config.admins, vec!["lerax", "manoel"]);
        assert_eq!(config.probe_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.kills_file, PathBuf::from("/var/lib/shield/kills.txt"));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut config = ShieldConfig::default();
        config
            .apply_overrides(lookup(&[("TROLL_SHIELD_PROBE_TIMEOUT_SECS", "0")]))
            .unwrap();
        assert!(config.probe_timeout().is_none());
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let mut config = ShieldConfig::default();
        let result =
            config.apply_overrides(lookup(&[("TROLL_SHIELD_PROBE_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ShieldError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_partial() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shield.json");
        std::fs::write(
            &path,
            r#"{"watched_groups": ["@x"], "rules_link": "https://example.org/rules", "ban_hours": 48}"#,
        )
        .unwrap();

        let config = ShieldConfig::from_file(&path).unwrap();
        assert_eq!(config.watched_groups, vec!["@x"]);
        assert_eq!(config.rules_link.as_deref(), Some("https://example.org/rules"));
        assert_eq!(config.ban(), BanDuration::hours(48));
        assert_eq!(config.admins, vec!["lerax"]);
    }

    #[test]
    fn test_validate_rejects_empty_group() {
        let config = ShieldConfig {
            watched_groups: vec!["@".to_string()],
            ..ShieldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ban_hours_bounds() {
        let with_ban = |ban_hours| ShieldConfig {
            ban_hours,
            ..ShieldConfig::default()
        };

        assert!(with_ban(1).validate().is_ok());
        assert!(with_ban(8784).validate().is_ok());
        for ban_hours in [0, 8785, 9600, 1 << 60, u64::MAX] {
            assert!(matches!(
                with_ban(ban_hours).validate(),
                Err(ShieldError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_credentials() {
        let creds = BotCredentials::from_lookup(lookup(&[(TOKEN_ENV, "123:abc")])).unwrap();
        assert_eq!(creds.token, "123:abc");
        assert!(creds.hidden_token.is_none());
        assert!(!format!("{:?}", creds).contains("123:abc"));

        let missing = BotCredentials::from_lookup(lookup(&[]));
        assert!(matches!(missing, Err(ShieldError::MissingEnv(_))));
    }
}
