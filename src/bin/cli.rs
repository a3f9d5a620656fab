use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use odds_tips_bot::bot::messages::expiry_text;
use odds_tips_bot::utils::formatter::{compose_daily_broadcast, compose_free_message, compose_vip_message};
use odds_tips_bot::utils::selection::DEFAULT_TIP_LIMIT;
use odds_tips_bot::{
    daily_tips, free_tips, vip_tips, BotConfig, JsonUserStore, OddsApiClient, UserDirectory,
    VipDuration,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Odds tips pipeline and VIP admin from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the free Premier League tips
    Tips {
        #[arg(short, long, default_value_t = DEFAULT_TIP_LIMIT)]
        limit: usize,
    },
    /// Print the daily broadcast built from rotating leagues
    Daily {
        #[arg(short, long, default_value_t = DEFAULT_TIP_LIMIT)]
        limit: usize,
        /// Seed the shuffles for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print VIP tips for matches in the coming week
    Vip {
        #[arg(short, long, default_value_t = DEFAULT_TIP_LIMIT)]
        limit: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the provider's remaining request quota
    Usage,
    /// Grant VIP access to a registered user
    Approve {
        user_id: i64,
        /// Number of days or "lifetime"
        #[arg(default_value = "30")]
        duration: VipDuration,
    },
    /// Remove VIP access from a user
    Revoke { user_id: i64 },
}

fn rng_from(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load().context("Failed to load configuration")?;
    let odds = OddsApiClient::new(config.odds_api_key.clone()).with_region(config.odds_region.clone());
    let users = UserDirectory::new(Arc::new(JsonUserStore::new(config.users_file.clone())));

    match cli.command {
        Commands::Tips { limit } => match free_tips(&odds, limit).await {
            Ok(tips) => println!("{}", compose_free_message(&tips)),
            Err(e) => println!("{}", e.user_message()),
        },
        Commands::Daily { limit, seed } => {
            match daily_tips(&odds, &mut rng_from(seed), limit).await {
                Ok(tips) => println!("{}", compose_daily_broadcast(&tips)),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        Commands::Vip { limit, seed } => {
            let result = vip_tips(
                &odds,
                &mut rng_from(seed),
                Utc::now(),
                limit,
                config.display_offset,
            )
            .await;
            match result {
                Ok(tips) => println!("{}", compose_vip_message(&tips)),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        Commands::Usage => {
            let usage = odds
                .check_usage()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!(
                "Requests remaining: {}\nRequests used: {}",
                usage.remaining.as_deref().unwrap_or("unknown"),
                usage.used.as_deref().unwrap_or("unknown")
            );
        }
        Commands::Approve { user_id, duration } => {
            match users.approve(user_id, duration, Utc::now(), false).await? {
                Some(user) => println!(
                    "✅ VIP access granted to user {} ({}), expires: {}",
                    user_id,
                    duration,
                    expiry_text(user.expires)
                ),
                None => println!("⚠️ User {} not found. They need to /start the bot first.", user_id),
            }
        }
        Commands::Revoke { user_id } => match users.revoke(user_id).await? {
            Some(_) => println!("✅ VIP access revoked from user {}", user_id),
            None => println!("⚠️ User {} not found.", user_id),
        },
    }

    Ok(())
}
