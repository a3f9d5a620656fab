use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_USERS_FILE: &str = "users.json";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BOT_USERNAME: &str = "OddsMaster_bot";
/// 10:00 in Africa/Lagos (UTC+1), six-field cron evaluated in UTC
pub const DEFAULT_BROADCAST_CRON: &str = "0 0 9 * * *";
pub const DEFAULT_DISPLAY_UTC_OFFSET_HOURS: i32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Keys accepted in the JSON config file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct FileConfig {
    bot_token: Option<String>,
    #[serde(default)]
    admin_ids: Vec<i64>,
    bank_name: Option<String>,
    account_name: Option<String>,
    account_number: Option<String>,
    odds_api_key: Option<String>,
}

/// Bank details shown in the subscription instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: Option<String>,
    pub admin_ids: Vec<i64>,
    pub payment: PaymentDetails,
    pub odds_api_key: Option<String>,
    pub odds_region: String,
    pub users_file: PathBuf,
    pub port: u16,
    pub bot_username: String,
    /// Link handed to users with at least one referral
    pub referral_reward_url: Option<String>,
    /// Recipient of the scheduled broadcast; None disables it
    pub broadcast_chat_id: Option<i64>,
    pub broadcast_cron: String,
    pub display_offset: FixedOffset,
    /// Own health URL pinged on a schedule so the host keeps the service awake
    pub self_ping_url: Option<String>,
}

impl BotConfig {
    /// Load `.env`, then the JSON config file named by `CONFIG_FILE`, then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        let path = vars
            .get("CONFIG_FILE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(Path::new(&path), &vars)
    }

    /// Build from an optional config file and a set of variables. A missing
    /// file is fine; a malformed one is an error.
    pub fn from_sources(
        path: &Path,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let file = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Loaded config from {}", path.display());
            serde_json::from_str(&json).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            warn!("{} not found, using environment only", path.display());
            FileConfig::default()
        };

        let var = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let admin_ids = match var("ADMIN_IDS") {
            Some(raw) => parse_id_list(&raw)?,
            None => file.admin_ids,
        };

        let offset_hours: i32 = parse_or(
            "DISPLAY_UTC_OFFSET_HOURS",
            var("DISPLAY_UTC_OFFSET_HOURS"),
            DEFAULT_DISPLAY_UTC_OFFSET_HOURS,
        )?;
        let display_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid {
                key: "DISPLAY_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            })?;

        Ok(Self {
            bot_token: var("BOT_TOKEN").or(file.bot_token),
            admin_ids,
            payment: PaymentDetails {
                bank_name: var("BANK_NAME").or(file.bank_name).unwrap_or_default(),
                account_name: var("ACCOUNT_NAME").or(file.account_name).unwrap_or_default(),
                account_number: var("ACCOUNT_NUMBER")
                    .or(file.account_number)
                    .unwrap_or_default(),
            },
            odds_api_key: var("ODDS_API_KEY").or(file.odds_api_key),
            odds_region: var("ODDS_REGION").unwrap_or_else(|| "eu".to_string()),
            users_file: var("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_FILE)),
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            bot_username: var("BOT_USERNAME").unwrap_or_else(|| DEFAULT_BOT_USERNAME.to_string()),
            referral_reward_url: var("REFERRAL_REWARD_URL"),
            broadcast_chat_id: var("BROADCAST_CHAT_ID")
                .map(|raw| parse_value("BROADCAST_CHAT_ID", &raw))
                .transpose()?,
            broadcast_cron: var("BROADCAST_CRON")
                .unwrap_or_else(|| DEFAULT_BROADCAST_CRON.to_string()),
            display_offset,
            self_ping_url: var("SELF_PING_URL"),
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_value("ADMIN_IDS", s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig::from_sources(&dir.path().join("missing.json"), &HashMap::new()).unwrap();

        assert!(config.bot_token.is_none());
        assert!(config.odds_api_key.is_none());
        assert!(config.admin_ids.is_empty());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.odds_region, "eu");
        assert_eq!(config.broadcast_cron, DEFAULT_BROADCAST_CRON);
        assert_eq!(config.display_offset.local_minus_utc(), 3600);
        assert!(config.broadcast_chat_id.is_none());
        assert!(config.referral_reward_url.is_none());
        assert!(config.self_ping_url.is_none());
    }

    #[test]
    fn test_file_then_env_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"BOT_TOKEN": "file-token", "ADMIN_IDS": [1, 2], "BANK_NAME": "Opay", "ODDS_API_KEY": "file-key"}"#,
        )
        .unwrap();

        let config = BotConfig::from_sources(
            &path,
            &vars(&[
                ("ODDS_API_KEY", "env-key"),
                ("PORT", "9000"),
                ("BROADCAST_CHAT_ID", "77"),
                ("SELF_PING_URL", " https://bot.example.com/health "),
            ]),
        )
        .unwrap();

        assert_eq!(config.bot_token.as_deref(), Some("file-token"));
        assert_eq!(config.odds_api_key.as_deref(), Some("env-key"));
        assert_eq!(config.admin_ids, vec![1, 2]);
        assert!(config.is_admin(2));
        assert!(!config.is_admin(3));
        assert_eq!(config.payment.bank_name, "Opay");
        assert_eq!(config.port, 9000);
        assert_eq!(config.broadcast_chat_id, Some(77));
        assert_eq!(config.self_ping_url.as_deref(), Some("https://bot.example.com/health"));
    }

    #[test]
    fn test_admin_ids_from_env() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig::from_sources(
            &dir.path().join("none.json"),
            &vars(&[("ADMIN_IDS", "10, 20,")]),
        )
        .unwrap();
        assert_eq!(config.admin_ids, vec![10, 20]);
    }

    #[test]
    fn test_invalid_values() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("none.json");

        let err = BotConfig::from_sources(&missing, &vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = BotConfig::from_sources(&missing, &vars(&[("ADMIN_IDS", "1,x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ADMIN_IDS", .. }));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        let err = BotConfig::from_sources(&path, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
