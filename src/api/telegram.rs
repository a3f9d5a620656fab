use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// Seconds the server may hold a getUpdates call open
pub const LONG_POLL_SECS: u64 = 30;

/// A button attached under a message; pressing it sends `callback_data` back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Re-send an already uploaded photo with a caption and button rows
    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: &[Vec<InlineButton>],
    ) -> Result<()>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<()>;

    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

impl User {
    /// Handle if set, otherwise first name
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: TELEGRAM_API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn call(&self, method: &str, body: Value, timeout: Duration) -> Result<Value> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("Telegram {} request failed", method))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("Telegram {} failed: {} — {}", method, status, text);
            anyhow::bail!("Telegram {} failed: {} — {}", method, status, text);
        }

        let parsed: ApiResponse = serde_json::from_str(&text).with_context(|| {
            format!(
                "Failed to parse Telegram {} response: {}",
                method,
                text.chars().take(200).collect::<String>()
            )
        })?;
        if !parsed.ok {
            anyhow::bail!(
                "Telegram {} rejected: {}",
                method,
                parsed.description.unwrap_or_default()
            );
        }
        Ok(parsed.result)
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": LONG_POLL_SECS,
            "allowed_updates": ["message", "callback_query"],
        });
        let result = self
            .call(
                "getUpdates",
                body,
                Duration::from_secs(LONG_POLL_SECS + 10),
            )
            .await?;
        let updates: Vec<Update> =
            serde_json::from_value(result).context("Failed to parse getUpdates result")?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }
}

const SEND_TIMEOUT: Duration = Duration::from_secs(20);

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        self.call("sendMessage", body, SEND_TIMEOUT).await?;
        debug!("Message sent to {}", chat_id);
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: &[Vec<InlineButton>],
    ) -> Result<()> {
        let body = json!({
            "chat_id": chat_id,
            "photo": file_id,
            "caption": caption,
            "reply_markup": { "inline_keyboard": buttons },
        });
        self.call("sendPhoto", body, SEND_TIMEOUT).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<()> {
        let body = json!({ "callback_query_id": callback_id, "text": text });
        self.call("answerCallbackQuery", body, SEND_TIMEOUT).await?;
        Ok(())
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> Result<()> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "caption": caption,
        });
        self.call("editMessageCaption", body, SEND_TIMEOUT).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_message_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({"chat_id": 42, "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {"message_id": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN").with_base_url(server.uri());
        client.send_message(42, "hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_photo_includes_keyboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendPhoto"))
            .and(body_partial_json(json!({
                "photo": "file-1",
                "reply_markup": {"inline_keyboard": [[{"text": "Go", "callback_data": "go_1"}]]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN").with_base_url(server.uri());
        client
            .send_photo(1, "file-1", "caption", &[vec![InlineButton::new("Go", "go_1")]])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_call_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false, "description": "chat not found"})))
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN").with_base_url(server.uri());
        let err = client.send_message(1, "x").await.unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn test_get_updates_parses_messages_and_callbacks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/getUpdates"))
            .and(body_partial_json(json!({"offset": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    {"update_id": 10, "message": {
                        "message_id": 5,
                        "chat": {"id": 99},
                        "from": {"id": 99, "first_name": "Ada"},
                        "text": "/tips"
                    }},
                    {"update_id": 11, "callback_query": {
                        "id": "cb1",
                        "from": {"id": 1, "first_name": "Admin", "username": "boss"},
                        "data": "approve_99_30"
                    }}
                ]
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN").with_base_url(server.uri());
        let updates = client.get_updates(10).await.unwrap();

        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.text.as_deref(), Some("/tips"));
        assert_eq!(message.from.as_ref().unwrap().display_name(), "Ada");

        let callback = updates[1].callback_query.as_ref().unwrap();
        assert_eq!(callback.from.display_name(), "boss");
        assert_eq!(callback.data.as_deref(), Some("approve_99_30"));
    }

    #[tokio::test]
    async fn test_non_json_body_with_multibyte_text_is_error() {
        let server = MockServer::start().await;
        let body = format!("{}é and more text", "a".repeat(199));
        Mock::given(method("POST"))
            .and(path("/botTOKEN/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN").with_base_url(server.uri());
        let err = client.get_updates(0).await.unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse Telegram getUpdates response"));
        assert!(message.contains("é"));
    }
}
