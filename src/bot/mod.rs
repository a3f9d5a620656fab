pub mod commands;
pub mod messages;

use crate::api::odds_api::OddsSource;
use crate::api::telegram::{CallbackQuery, Message, Messenger, TelegramClient, Update, User};
use crate::broadcast::{BroadcastOutcome, DailyBroadcast};
use crate::config::BotConfig;
use crate::subscriptions::UserDirectory;
use crate::tips::{free_tips, vip_tips};
use crate::utils::formatter::{compose_free_message, compose_vip_message};
use crate::utils::selection::DEFAULT_TIP_LIMIT;
use anyhow::Result;
use chrono::Utc;
use commands::{AdminAction, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Routes chat updates to the tip pipeline and the user directory
pub struct Bot {
    config: Arc<BotConfig>,
    users: Arc<UserDirectory>,
    odds: Arc<dyn OddsSource>,
    messenger: Arc<dyn Messenger>,
    broadcast: Option<Arc<DailyBroadcast>>,
}

impl Bot {
    pub fn new(
        config: Arc<BotConfig>,
        users: Arc<UserDirectory>,
        odds: Arc<dyn OddsSource>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            users,
            odds,
            messenger,
            broadcast: None,
        }
    }

    pub fn with_broadcast(mut self, broadcast: Arc<DailyBroadcast>) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub async fn handle_update(&self, update: Update) -> Result<()> {
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        debug!("Ignoring update {}", update.update_id);
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        let Some(from) = message.from.as_ref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if let Some(photo) = message.photo.as_ref().and_then(|sizes| sizes.last()) {
            return self.handle_photo(chat_id, from, &photo.file_id).await;
        }

        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return Ok(());
        };
        info!("Command {:?} from {}", command, from.id);

        if command.admin_only() && !self.config.is_admin(from.id) {
            let text = match command {
                Command::TestDaily => messages::admin_only_with_id(from.id),
                _ => messages::ADMIN_ONLY.to_string(),
            };
            return self.reply(chat_id, &text).await;
        }

        self.handle_command(chat_id, from, command).await
    }

    async fn handle_command(&self, chat_id: i64, from: &User, command: Command) -> Result<()> {
        match command {
            Command::Start { referrer } => {
                self.users
                    .register(from.id, from.display_name(), referrer)
                    .await?;
                self.reply(chat_id, &messages::welcome(&from.first_name)).await
            }
            Command::Help => self.reply(chat_id, messages::HELP).await,
            Command::Tips => {
                let text = match free_tips(self.odds.as_ref(), DEFAULT_TIP_LIMIT).await {
                    Ok(tips) => compose_free_message(&tips),
                    Err(e) => e.user_message(),
                };
                self.reply(chat_id, &text).await
            }
            Command::Refer => {
                let referrals = self.users.get(from.id).await?.map_or(0, |u| u.referrals);
                let text = messages::referral(
                    &self.config.bot_username,
                    from.id,
                    referrals,
                    self.config.referral_reward_url.as_deref(),
                );
                self.reply(chat_id, &text).await
            }
            Command::Vip => self.send_vip_tips(chat_id, from.id).await,
            Command::Subscribe => {
                let now = Utc::now();
                let text = match self.users.get(from.id).await? {
                    Some(user) if user.vip_active(now) => messages::already_vip(user.expires),
                    _ => messages::subscription(&self.config.payment),
                };
                self.reply(chat_id, &text).await
            }
            Command::Status => {
                let text = match self.users.get(from.id).await? {
                    Some(user) => {
                        let active = user.vip_active(Utc::now());
                        messages::status(&user, active)
                    }
                    None => messages::NOT_REGISTERED.to_string(),
                };
                self.reply(chat_id, &text).await
            }
            Command::Pending => self.reply(chat_id, messages::PENDING_INFO).await,
            Command::Approve(None) => self.reply(chat_id, messages::APPROVE_USAGE).await,
            Command::Approve(Some((user_id, duration))) => {
                let approved = self
                    .users
                    .approve(user_id, duration, Utc::now(), false)
                    .await?;
                if approved.is_none() {
                    return self.reply(chat_id, messages::USER_NOT_FOUND_FOR_APPROVAL).await;
                }
                info!("Admin {} approved user {} ({})", from.id, user_id, duration);
                self.notify(user_id, &messages::vip_activated(duration)).await;
                self.reply(chat_id, &messages::vip_granted(user_id, duration))
                    .await
            }
            Command::Revoke(None) => self.reply(chat_id, messages::REVOKE_USAGE).await,
            Command::Revoke(Some(user_id)) => {
                if self.users.revoke(user_id).await?.is_none() {
                    return self.reply(chat_id, messages::USER_NOT_FOUND).await;
                }
                info!("Admin {} revoked user {}", from.id, user_id);
                self.notify(user_id, messages::VIP_REVOKED).await;
                self.reply(chat_id, &messages::vip_revoked_for(user_id)).await
            }
            Command::TestDaily => self.test_broadcast(chat_id).await,
            Command::CronTest => {
                let running = self.broadcast.as_ref().is_some_and(|b| b.is_running());
                let text = messages::cron_status(
                    Utc::now(),
                    self.config.display_offset,
                    &self.config.broadcast_cron,
                    running,
                );
                self.reply(chat_id, &text).await
            }
            Command::Unknown(name) => {
                debug!("Unknown command /{} from {}", name, from.id);
                Ok(())
            }
        }
    }

    async fn send_vip_tips(&self, chat_id: i64, user_id: i64) -> Result<()> {
        let now = Utc::now();
        if !self.users.is_vip(user_id, now).await? {
            return self.reply(chat_id, messages::VIP_REQUIRED).await;
        }

        self.reply(chat_id, messages::VIP_ANALYZING).await?;

        let mut rng = StdRng::from_entropy();
        let text = match vip_tips(
            self.odds.as_ref(),
            &mut rng,
            now,
            DEFAULT_TIP_LIMIT,
            self.config.display_offset,
        )
        .await
        {
            Ok(tips) => compose_vip_message(&tips),
            Err(e) => e.user_message(),
        };
        self.reply(chat_id, &text).await
    }

    async fn test_broadcast(&self, chat_id: i64) -> Result<()> {
        let Some(broadcast) = self.broadcast.as_ref() else {
            return self
                .reply(chat_id, "⚠️ No broadcast recipient is configured.")
                .await;
        };

        self.reply(chat_id, "🧪 Testing daily tips broadcast...").await?;
        let text = match broadcast.run_once().await {
            BroadcastOutcome::Sent { .. } => {
                "✅ Test completed! Check if you received the tips message."
            }
            BroadcastOutcome::Apology => "⚠️ No tips were available; the apology message was sent.",
            BroadcastOutcome::Skipped => "⏳ A broadcast is already running, try again shortly.",
            BroadcastOutcome::Failed => "❌ The broadcast could not be delivered. Check the logs.",
        };
        self.reply(chat_id, text).await
    }

    /// Payment screenshots go to every admin with review buttons
    async fn handle_photo(&self, chat_id: i64, from: &User, file_id: &str) -> Result<()> {
        info!("Payment screenshot from user {}", from.id);
        self.reply(chat_id, messages::PHOTO_RECEIVED).await?;

        let caption = messages::payment_caption(from.display_name(), from.id);
        let keyboard = AdminAction::review_keyboard(from.id);
        for admin_id in &self.config.admin_ids {
            if let Err(e) = self
                .messenger
                .send_photo(*admin_id, file_id, &caption, &keyboard)
                .await
            {
                error!("Failed to notify admin {}: {:#}", admin_id, e);
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        let admin_id = query.from.id;
        if !self.config.is_admin(admin_id) {
            warn!("Callback from non-admin {}", admin_id);
            return self
                .messenger
                .answer_callback(&query.id, messages::NOT_AUTHORIZED)
                .await;
        }

        let Some(action) = query.data.as_deref().and_then(AdminAction::parse) else {
            return self
                .messenger
                .answer_callback(&query.id, messages::UNKNOWN_ACTION)
                .await;
        };

        let (answer, caption) = match action {
            AdminAction::Approve { user_id, duration } => {
                if let Err(e) = self
                    .users
                    .approve(user_id, duration, Utc::now(), true)
                    .await
                {
                    error!("Failed to approve user {}: {:#}", user_id, e);
                    self.messenger
                        .answer_callback(&query.id, messages::APPROVAL_FAILED)
                        .await?;
                    return Err(e.into());
                }
                info!("Admin {} approved user {} ({})", admin_id, user_id, duration);
                self.notify(user_id, &messages::vip_activated(duration)).await;
                (
                    "✅ User approved and VIP access granted!",
                    messages::approved_caption(user_id, duration, admin_id),
                )
            }
            AdminAction::Reject { user_id } => {
                info!("Admin {} rejected payment from user {}", admin_id, user_id);
                self.notify(user_id, messages::PAYMENT_REJECTED).await;
                (
                    "❌ Payment rejected",
                    messages::rejected_caption(user_id, admin_id),
                )
            }
        };

        self.messenger.answer_callback(&query.id, answer).await?;
        if let Some(message) = query.message.as_ref() {
            self.messenger
                .edit_caption(message.chat.id, message.message_id, &caption)
                .await?;
        }
        Ok(())
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.messenger.send_message(chat_id, text).await
    }

    /// Message a user outside the current conversation; failures are logged
    async fn notify(&self, user_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_message(user_id, text).await {
            error!("Failed to notify user {}: {:#}", user_id, e);
        }
    }
}

/// Long-poll Telegram and dispatch each update on its own task until
/// `shutdown` resolves.
pub async fn run_polling<F>(bot: Arc<Bot>, client: Arc<TelegramClient>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset = 0;
    info!("Polling for updates");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping update polling");
                break;
            }
            result = client.get_updates(offset) => match result {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let bot = bot.clone();
                        tokio::spawn(async move {
                            let update_id = update.update_id;
                            if let Err(e) = bot.handle_update(update).await {
                                error!("Failed to handle update {}: {:#}", update_id, e);
                            }
                        });
                    }
                }
                Err(e) => {
                    warn!("getUpdates failed: {:#}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }
}
