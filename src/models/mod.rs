use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder rendered wherever an odds-derived field could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// Market keys understood by the odds provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKey {
    H2h,
    Totals,
}

impl MarketKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKey::H2h => "h2h",
            MarketKey::Totals => "totals",
        }
    }

    /// Comma-joined form used in the provider's `markets` query parameter
    pub fn join(keys: &[MarketKey]) -> String {
        keys.iter()
            .map(MarketKey::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A league as the provider names it, plus the label shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct League {
    pub key: &'static str,
    pub label: &'static str,
}

impl League {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// League used for free tips
pub const FREE_LEAGUE: League = League::new("soccer_epl", "🏴 Premier League");

/// Leagues sampled by the scheduled daily broadcast
pub const ROTATION_LEAGUES: [League; 5] = [
    League::new("soccer_spain_la_liga", "🇪🇸 La Liga"),
    League::new("soccer_italy_serie_a", "🇮🇹 Serie A"),
    League::new("soccer_germany_bundesliga", "🇩🇪 Bundesliga"),
    League::new("soccer_france_ligue_one", "🇫🇷 Ligue 1"),
    League::new("soccer_brazil_campeonato", "🇧🇷 Brasileirão"),
];

/// Leagues merged for VIP tips
pub const VIP_LEAGUES: [League; 5] = [
    League::new("soccer_uefa_champs_league", "🏆 Champions League"),
    League::new("soccer_uefa_europa_league", "🏆 Europa League"),
    League::new("soccer_epl", "🏴 Premier League"),
    League::new("soccer_spain_la_liga", "🇪🇸 La Liga"),
    League::new("soccer_italy_serie_a", "🇮🇹 Serie A"),
];

/// A single fixture as returned by the odds provider.
///
/// Every field is optional: the provider omits data freely and a partial
/// record must still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sport_title: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    #[serde(default)]
    pub bookmakers: Option<Vec<Bookmaker>>,
}

impl Event {
    /// Build an event from an arbitrary JSON value, degrading to an empty
    /// event when the value is not shaped like one.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("Unreadable event record, using placeholders: {}", e);
                Event::default()
            }
        }
    }

    pub fn home(&self) -> &str {
        non_empty(self.home_team.as_deref()).unwrap_or("Home")
    }

    pub fn away(&self) -> &str {
        non_empty(self.away_team.as_deref()).unwrap_or("Away")
    }

    /// Raw start time text, or "TBD"
    pub fn commence(&self) -> &str {
        non_empty(self.commence_time.as_deref()).unwrap_or("TBD")
    }

    pub fn commence_at(&self) -> Option<DateTime<Utc>> {
        let raw = non_empty(self.commence_time.as_deref())?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn bookmakers(&self) -> &[Bookmaker] {
        self.bookmakers.as_deref().unwrap_or_default()
    }
}

/// One bookmaker's quotes for an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub markets: Option<Vec<Market>>,
}

impl Bookmaker {
    pub fn markets(&self) -> &[Market] {
        self.markets.as_deref().unwrap_or_default()
    }

    /// First market carrying the given key
    pub fn market(&self, key: MarketKey) -> Option<&Market> {
        self.markets()
            .iter()
            .find(|m| m.key.as_deref() == Some(key.as_str()))
    }
}

/// A market (e.g. h2h, totals) offered by a bookmaker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub outcomes: Option<Vec<Outcome>>,
}

impl Market {
    pub fn outcomes(&self) -> &[Outcome] {
        self.outcomes.as_deref().unwrap_or_default()
    }
}

/// A priced outcome within a market
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub point: Option<Value>,
}

impl Outcome {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Decimal price, if present and non-zero. Negative prices are passed
    /// through so probability conversion can reject them.
    pub fn price(&self) -> Option<f64> {
        number(self.price.as_ref()).filter(|p| *p != 0.0)
    }

    /// Goal line for totals markets
    pub fn point(&self) -> Option<f64> {
        number(self.point.as_ref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Read a finite number from a JSON number or numeric string
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
