use anyhow::{Context, Result};
use odds_tips_bot::api::odds_api::OddsSource;
use odds_tips_bot::api::telegram::Messenger;
use odds_tips_bot::bot::{run_polling, Bot};
use odds_tips_bot::broadcast::{start_scheduler, DailyBroadcast};
use odds_tips_bot::server::{self, ServerState};
use odds_tips_bot::{BotConfig, JsonUserStore, OddsApiClient, TelegramClient, UserDirectory};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(BotConfig::load().context("Failed to load configuration")?);
    let token = config
        .bot_token
        .clone()
        .context("BOT_TOKEN is not set in config.json or the environment")?;

    if config.admin_ids.is_empty() {
        warn!("No ADMIN_IDS configured; payment screenshots will not be reviewed");
    }
    if config.odds_api_key.is_none() {
        warn!("No ODDS_API_KEY configured; tip commands will report the missing key");
    }

    let odds: Arc<dyn OddsSource> = Arc::new(
        OddsApiClient::new(config.odds_api_key.clone()).with_region(config.odds_region.clone()),
    );
    let telegram = Arc::new(TelegramClient::new(token));
    let messenger: Arc<dyn Messenger> = telegram.clone();
    let users = Arc::new(UserDirectory::new(Arc::new(JsonUserStore::new(
        config.users_file.clone(),
    ))));

    let mut bot = Bot::new(config.clone(), users, odds.clone(), messenger.clone());

    // Scheduled broadcast goes to BROADCAST_CHAT_ID, else the first admin
    let recipient = config
        .broadcast_chat_id
        .or_else(|| config.admin_ids.first().copied());
    let _scheduler = match recipient {
        Some(recipient) => {
            let broadcast = Arc::new(DailyBroadcast::new(odds, messenger, recipient));
            bot = bot.with_broadcast(broadcast.clone());
            Some(
                start_scheduler(broadcast, &config.broadcast_cron)
                    .await
                    .context("Failed to start broadcast scheduler")?,
            )
        }
        None => {
            warn!("No broadcast recipient configured; daily broadcast disabled");
            None
        }
    };

    let _self_ping = match config.self_ping_url.clone() {
        Some(url) => Some(
            server::start_self_ping(url)
                .await
                .context("Failed to start self-ping scheduler")?,
        ),
        None => None,
    };

    let state = Arc::new(ServerState::new());
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = server::serve(port, state).await {
            error!("Keep-alive server stopped: {:#}", e);
        }
    });

    info!("🤖 Bot started");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_polling(Arc::new(bot), telegram, shutdown).await;

    info!("Bot stopped");
    Ok(())
}
