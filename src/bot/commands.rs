use crate::api::telegram::InlineButton;
use crate::subscriptions::VipDuration;

/// A slash command sent by a chat user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { referrer: Option<i64> },
    Help,
    Tips,
    Refer,
    Vip,
    Subscribe,
    Status,
    Pending,
    /// None when the arguments are missing or malformed
    Approve(Option<(i64, VipDuration)>),
    Revoke(Option<i64>),
    TestDaily,
    CronTest,
    Unknown(String),
}

impl Command {
    /// Parse message text. Returns None when the text is not a command.
    /// A `@BotName` suffix on the command word is ignored.
    pub fn parse(text: &str) -> Option<Command> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;
        let name = head.split_once('@').map_or(head, |(name, _)| name);
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start {
                referrer: args.first().and_then(|a| a.parse().ok()),
            },
            "help" => Command::Help,
            "tips" => Command::Tips,
            "refer" => Command::Refer,
            "vip" => Command::Vip,
            "subscribe" => Command::Subscribe,
            "status" => Command::Status,
            "pending" => Command::Pending,
            "approve" => Command::Approve(parse_approve_args(&args)),
            "revoke" => Command::Revoke(args.first().and_then(|a| a.parse().ok())),
            "testdaily" => Command::TestDaily,
            "crontest" => Command::CronTest,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }

    pub fn admin_only(&self) -> bool {
        matches!(
            self,
            Command::Pending
                | Command::Approve(_)
                | Command::Revoke(_)
                | Command::TestDaily
                | Command::CronTest
        )
    }
}

fn parse_approve_args(args: &[&str]) -> Option<(i64, VipDuration)> {
    let user_id = args.first()?.parse().ok()?;
    let duration = match args.get(1) {
        Some(raw) => raw.parse().ok()?,
        None => VipDuration::default(),
    };
    Some((user_id, duration))
}

/// Decision carried by an admin review button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Approve { user_id: i64, duration: VipDuration },
    Reject { user_id: i64 },
}

impl AdminAction {
    /// Parse `approve_<id>_<days|lifetime>` or `reject_<id>`
    pub fn parse(data: &str) -> Option<AdminAction> {
        let mut parts = data.split('_');
        let action = parts.next()?;
        let user_id = parts.next()?.parse().ok()?;

        match (action, parts.next(), parts.next()) {
            ("approve", Some(duration), None) => Some(AdminAction::Approve {
                user_id,
                duration: duration.parse().ok()?,
            }),
            ("reject", None, None) => Some(AdminAction::Reject { user_id }),
            _ => None,
        }
    }

    pub fn callback_data(&self) -> String {
        match self {
            AdminAction::Approve {
                user_id,
                duration: VipDuration::Days(days),
            } => format!("approve_{user_id}_{days}"),
            AdminAction::Approve {
                user_id,
                duration: VipDuration::Lifetime,
            } => format!("approve_{user_id}_lifetime"),
            AdminAction::Reject { user_id } => format!("reject_{user_id}"),
        }
    }

    /// Buttons attached to a forwarded payment screenshot
    pub fn review_keyboard(user_id: i64) -> Vec<Vec<InlineButton>> {
        let approve_month = AdminAction::Approve {
            user_id,
            duration: VipDuration::default(),
        };
        let approve_lifetime = AdminAction::Approve {
            user_id,
            duration: VipDuration::Lifetime,
        };
        let reject = AdminAction::Reject { user_id };

        vec![
            vec![
                InlineButton::new("✅ Approve (30 days)", approve_month.callback_data()),
                InlineButton::new("❌ Reject", reject.callback_data()),
            ],
            vec![InlineButton::new(
                "✅ Approve (Lifetime)",
                approve_lifetime.callback_data(),
            )],
        ]
    }
}
