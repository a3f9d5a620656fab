//! Fixed chat texts. Messages go out as plain text, so no markup here.

use crate::config::PaymentDetails;
use crate::subscriptions::VipDuration;
use crate::utils::data::UserRecord;
use chrono::{DateTime, FixedOffset, Utc};

pub const HELP: &str = "📖 AVAILABLE COMMANDS

Free Features:
/start - Start the bot and register
/help - Show this help message
/tips - Get free daily betting tips with real odds
/refer - Get your referral link and invite friends

VIP Features:
/vip - Access premium VIP betting tips (requires VIP membership)
/subscribe - Subscribe to VIP membership for $10/month
/status - Check your VIP subscription status

Admin Commands:
/pending - View pending payment verifications
/approve - Approve a user's VIP subscription
/revoke - Revoke a user's VIP access
/testdaily - Test daily tips broadcast
/crontest - Check cron job status

About the Tips:
• All odds are fetched in real-time from bookmakers
• VIP tips include win percentages and confidence ratings
• Tips are for informational purposes - bet responsibly";

pub const VIP_REQUIRED: &str =
    "⚠️ You need VIP membership to access premium tips!\n\nUse /subscribe to get VIP access.";

pub const VIP_ANALYZING: &str =
    "💎 Analyzing upcoming matches and calculating best bets...\n\n⏳ Please wait...";

pub const NOT_REGISTERED: &str = "⚠️ You are not registered. Use /start to register.";

pub const ADMIN_ONLY: &str = "⚠️ This command is only available to administrators.";

pub const PENDING_INFO: &str = "📋 Check your messages above for pending payment verifications.\n\nNew payment screenshots will appear here automatically.";

pub const PHOTO_RECEIVED: &str = "📸 Payment screenshot received!\n\n⏳ Your payment is being reviewed by admin. You will be notified once your VIP access is activated.\n\n⏰ This usually takes up to 24 hours.";

pub const APPROVE_USAGE: &str =
    "Usage: /approve <user_id> [days]\n\nExample:\n/approve 123456789 30\n/approve 123456789 lifetime";

pub const REVOKE_USAGE: &str = "Usage: /revoke <user_id>\n\nExample: /revoke 123456789";

pub const USER_NOT_FOUND_FOR_APPROVAL: &str =
    "⚠️ User not found. They need to /start the bot first.";

pub const USER_NOT_FOUND: &str = "⚠️ User not found.";

pub const PAYMENT_REJECTED: &str = "❌ PAYMENT VERIFICATION FAILED\n\nYour payment could not be verified. Please ensure:\n\n1. You sent the correct amount ($10)\n2. Payment was made to the correct account\n3. Screenshot is clear and shows transaction details\n\nPlease contact admin if you believe this is an error.";

pub const VIP_REVOKED: &str =
    "❌ Your VIP subscription has been revoked.\n\nIf you believe this is an error, please contact admin.";

pub const NOT_AUTHORIZED: &str = "⚠️ You are not authorized to perform this action.";

pub const UNKNOWN_ACTION: &str = "⚠️ Unknown action.";
pub const APPROVAL_FAILED: &str = "⚠️ Could not save the approval. Please try again.";

pub fn welcome(first_name: &str) -> String {
    format!(
        "👋 Hello {first_name}!\n\n\
         Welcome to the VIP Betting Tips Bot! 🎯\n\n\
         Here's what you can do:\n\
         - Get free daily betting tips\n\
         - Upgrade to VIP for exclusive high-odds tips\n\
         - Track your VIP status\n\
         - Refer friends to earn free guides\n\n\
         💡 Tip: Type /help to see all available commands and how to use them!"
    )
}

/// "Lifetime" or the calendar date of expiry
pub fn expiry_text(expires: Option<DateTime<Utc>>) -> String {
    expires.map_or_else(
        || "Lifetime".to_string(),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}

pub fn referral(
    bot_username: &str,
    user_id: i64,
    referrals: u32,
    reward_url: Option<&str>,
) -> String {
    let mut message = format!(
        "🎯 Invite your friends to our VIP Betting Tips Bot!\n\n\
         🔗 Share your referral link:\nhttps://t.me/{bot_username}?start={user_id}\n\n"
    );
    match (referrals, reward_url) {
        (0, _) => message.push_str("📥 Invite at least one friend to unlock your free betting guide!"),
        (_, Some(url)) => {
            message.push_str("📥 Thank you for referring! Download your free betting guide here:\n");
            message.push_str(url);
        }
        (_, None) => message.push_str(
            "📥 Thank you for referring! Contact admin to receive your free betting guide.",
        ),
    }
    message
}

pub fn already_vip(expires: Option<DateTime<Utc>>) -> String {
    format!(
        "✅ You already have VIP access!\n\n📅 Expires: {}\n\nUse /vip to get premium tips.",
        expiry_text(expires)
    )
}

pub fn subscription(payment: &PaymentDetails) -> String {
    format!(
        "💎 VIP SUBSCRIPTION - $10/month\n\n\
         Benefits:\n\
         ✅ Exclusive premium tips from top leagues\n\
         ✅ Win probability calculations for each team\n\
         ✅ Smart over/under recommendations (Over 0.5, 1.5, 2.5+)\n\
         ✅ Confidence ratings (High/Good/Moderate)\n\
         ✅ Upcoming matches only (within 7 days)\n\n\
         Payment Instructions:\n\n\
         Bank Name: {}\n\
         Account Name: {}\n\
         Account Number: {}\n\
         Amount: $10 USD (or equivalent)\n\n\
         📸 After payment:\n\
         1. Take a screenshot of your payment confirmation\n\
         2. Send the screenshot to this bot\n\
         3. Admin will verify and activate your VIP access within 24 hours\n\n\
         ⏰ Your VIP access will be valid for 30 days from approval.",
        payment.bank_name, payment.account_name, payment.account_number
    )
}

pub fn status(user: &UserRecord, vip_active: bool) -> String {
    let mut message = format!(
        "📊 YOUR ACCOUNT STATUS\n\n👤 Username: {}\n🆔 User ID: {}\n👥 Referrals: {}\n\n",
        user.username, user.user_id, user.referrals
    );
    if vip_active {
        message.push_str(&format!(
            "💎 VIP Status: ACTIVE ✅\n📅 Expires: {}\n\nUse /vip to access premium tips!",
            expiry_text(user.expires)
        ));
    } else {
        message.push_str("💎 VIP Status: INACTIVE ❌\n\nUse /subscribe to upgrade to VIP!");
    }
    message
}

pub fn payment_caption(username: &str, user_id: i64) -> String {
    format!(
        "💳 NEW PAYMENT SUBMISSION\n\n👤 User: {username}\n🆔 User ID: {user_id}\n\n\
         📸 Payment screenshot attached.\n\nUse the buttons below to approve or reject."
    )
}

pub fn vip_activated(duration: VipDuration) -> String {
    let validity = match duration {
        VipDuration::Lifetime => "Lifetime access".to_string(),
        VipDuration::Days(days) => format!("Valid for {days} days"),
    };
    format!(
        "🎉 CONGRATULATIONS!\n\n✅ Your VIP subscription has been activated!\n\n📅 {validity}\n\n\
         💎 Use /vip to access premium betting tips now!"
    )
}

pub fn vip_granted(user_id: i64, duration: VipDuration) -> String {
    format!("✅ VIP access granted to user {user_id}\n📅 Duration: {duration}")
}

pub fn vip_revoked_for(user_id: i64) -> String {
    format!("✅ VIP access revoked from user {user_id}")
}

pub fn approved_caption(user_id: i64, duration: VipDuration, admin_id: i64) -> String {
    format!(
        "✅ APPROVED\n\n👤 User ID: {user_id}\n📅 Duration: {duration}\n👮 Approved by: Admin {admin_id}"
    )
}

pub fn rejected_caption(user_id: i64, admin_id: i64) -> String {
    format!("❌ REJECTED\n\n👤 User ID: {user_id}\n👮 Rejected by: Admin {admin_id}")
}

pub fn admin_only_with_id(user_id: i64) -> String {
    format!("{ADMIN_ONLY}\n\nYour User ID: {user_id}")
}

pub fn cron_status(
    now: DateTime<Utc>,
    display_offset: FixedOffset,
    schedule: &str,
    running: bool,
) -> String {
    let local = now.with_timezone(&display_offset);
    format!(
        "⏰ CRON STATUS\n\n🕐 Server Time (UTC): {}\n🌍 Local Time ({}): {}\n\n\
         ✅ Bot is running\n📅 Cron schedule (UTC): {}\n🔄 Broadcast in progress: {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        display_offset,
        local.format("%Y-%m-%d %H:%M:%S"),
        schedule,
        if running { "yes" } else { "no" }
    )
}
