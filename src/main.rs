use std::sync::Arc;

use anyhow::Context;
use troll_shield::config::{BotCredentials, ShieldConfig};
use troll_shield::gateway::telegram::BotCommand;
use troll_shield::gateway::{ChatGateway, TelegramGateway};
use troll_shield::logging;
use troll_shield::shield::{
    CommandRouter, DecisionEngine, KillCounter, MembershipProbe, ShieldLoop,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShieldConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so the log file gets flushed
    let _log_guard = logging::init_logging(&config.log_file)?;

    tracing::info!("=== Troll Shield Starting ===");

    let credentials = BotCredentials::from_env()?;
    let bot = Arc::new(TelegramGateway::new(&credentials.token));
    let me = bot
        .get_me()
        .await
        .context("Failed to authorize the bot account")?;
    tracing::info!("Authorized on account {}", me.display_name());

    let prober = probing_gateway(&bot, credentials.hidden_token.as_deref()).await;
    publish_commands(&bot, &config).await;

    let kills = KillCounter::load(&config.kills_file);
    tracing::info!("Current kill count: {}", kills.value());

    let probe = MembershipProbe::new(prober, config.watched_groups.clone())
        .with_timeout(config.probe_timeout());
    let engine = DecisionEngine::new(
        me,
        config.watched_groups.clone(),
        config.primary_group.clone(),
        kills,
    )
    .with_ban(config.ban());
    let router =
        CommandRouter::new(config.admins.clone()).with_ping_alias(config.ping_alias.clone());

    let mut shield = ShieldLoop::new(bot.clone(), probe, engine, router)
        .with_rules_link(config.rules_link.clone());

    tracing::info!(
        "Watching {} groups, welcoming in {}",
        config.watched_groups.len(),
        config.primary_group
    );

    tokio::select! {
        _ = shield.run(bot.clone().updates()) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    tracing::info!("=== Troll Shield Shutting Down ===");

    Ok(())
}

/// Gateway used for membership probes.
///
/// A hidden account can sit in watched groups without being noticed; when
/// it is not configured or fails to authorize, the main bot probes instead.
async fn probing_gateway(
    bot: &Arc<TelegramGateway>,
    hidden_token: Option<&str>,
) -> Arc<dyn ChatGateway> {
    if let Some(token) = hidden_token {
        let hidden = TelegramGateway::new(token);
        match hidden.get_me().await {
            Ok(account) => {
                tracing::info!("Probing through hidden account {}", account.display_name());
                return Arc::new(hidden);
            }
            Err(e) => tracing::warn!("Hidden account unavailable, probing with main bot: {}", e),
        }
    }
    bot.clone()
}

async fn publish_commands(bot: &TelegramGateway, config: &ShieldConfig) {
    let mut commands = vec![BotCommand::new("kills", "Number of trolls removed so far.")];
    if let Some(alias) = &config.ping_alias {
        commands.push(BotCommand::new(alias.as_str(), "Ping. Checks whether I am alive."));
    }
    commands.push(BotCommand::new(
        "pass",
        "/pass <@username>: lets one user join past the shield. Admins only.",
    ));

    if let Err(e) = bot.set_commands(&commands).await {
        tracing::warn!("Publishing the command menu failed: {}", e);
    }
}
