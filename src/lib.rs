pub mod api;
pub mod bot;
pub mod broadcast;
pub mod config;
pub mod models;
pub mod server;
pub mod subscriptions;
pub mod tips;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::odds_api::{FetchError, OddsApiClient, OddsSource};
pub use api::telegram::{Messenger, TelegramClient};
pub use bot::Bot;
pub use broadcast::{BroadcastOutcome, DailyBroadcast};
pub use config::BotConfig;
pub use models::*;
pub use subscriptions::{UserDirectory, VipDuration};
pub use tips::{daily_tips, free_tips, vip_tips, TipsError};
pub use utils::data::{JsonUserStore, UserRecord, UserStore};
