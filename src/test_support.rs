//! In-memory doubles for the odds provider and the chat transport.

use crate::api::odds_api::{FetchError, OddsSource};
use crate::api::telegram::{InlineButton, Messenger};
use crate::models::{Event, MarketKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Odds source answering from a fixed table. Leagues that were never
/// registered return an empty list.
#[derive(Default)]
pub struct StubOddsSource {
    responses: HashMap<String, Option<Vec<Event>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubOddsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, league: &str, events: Vec<Event>) -> Self {
        self.responses.insert(league.to_string(), Some(events));
        self
    }

    /// The league answers with a 500
    pub fn with_error(mut self, league: &str) -> Self {
        self.responses.insert(league.to_string(), None);
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (league, joined markets) per fetch, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OddsSource for StubOddsSource {
    async fn fetch_events(
        &self,
        league: &str,
        markets: &[MarketKey],
    ) -> Result<Vec<Event>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((league.to_string(), MarketKey::join(markets)));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(league) {
            Some(Some(events)) => Ok(events.clone()),
            Some(None) => Err(FetchError::Status(500)),
            None => Ok(Vec::new()),
        }
    }
}

pub fn named_event(home: &str, away: &str) -> Event {
    Event {
        home_team: Some(home.to_string()),
        away_team: Some(away.to_string()),
        ..Event::default()
    }
}

pub fn event_at(home: &str, at: DateTime<Utc>) -> Event {
    Event {
        commence_time: Some(at.to_rfc3339()),
        ..named_event(home, "Away FC")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
    },
    Photo {
        chat_id: i64,
        file_id: String,
        caption: String,
        buttons: Vec<Vec<InlineButton>>,
    },
    CallbackAnswer {
        callback_id: String,
        text: String,
    },
    Caption {
        chat_id: i64,
        message_id: i64,
        caption: String,
    },
}

/// Messenger that records everything it is asked to send
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails without recording
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to one chat, in order
    pub fn messages_to(&self, chat: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Message { chat_id, text } if chat_id == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("chat unreachable");
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.record(Sent::Message {
            chat_id,
            text: text.to_string(),
        })
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: &[Vec<InlineButton>],
    ) -> anyhow::Result<()> {
        self.record(Sent::Photo {
            chat_id,
            file_id: file_id.to_string(),
            caption: caption.to_string(),
            buttons: buttons.to_vec(),
        })
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> anyhow::Result<()> {
        self.record(Sent::CallbackAnswer {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        })
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> anyhow::Result<()> {
        self.record(Sent::Caption {
            chat_id,
            message_id,
            caption: caption.to_string(),
        })
    }
}
