use crate::models::{Bookmaker, Event, Market, MarketKey, NOT_AVAILABLE};
use crate::utils::probability::{format_percent, format_price, implied_probability_value};
use crate::utils::scoring::{GoalLine, OverCandidate};

/// Head-to-head prices for an event. `None` means "not found" and renders as
/// "N/A".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct H2hPrices {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl H2hPrices {
    pub fn home_display(&self) -> String {
        format_price(self.home)
    }

    pub fn draw_display(&self) -> String {
        format_price(self.draw)
    }

    pub fn away_display(&self) -> String {
        format_price(self.away)
    }
}

/// Read h2h prices by position from the first bookmaker.
///
/// Outcome 0 is the home price and the last outcome the away price; the
/// middle outcome is the draw only when there are exactly three. Fewer than
/// two outcomes leaves everything unset.
pub fn parse_h2h_positional(event: &Event) -> H2hPrices {
    let Some(market) = event.bookmakers().first().and_then(h2h_market) else {
        return H2hPrices::default();
    };

    match market.outcomes() {
        [home, draw, away] => H2hPrices {
            home: home.price(),
            draw: draw.price(),
            away: away.price(),
        },
        [home, .., away] => H2hPrices {
            home: home.price(),
            draw: None,
            away: away.price(),
        },
        _ => H2hPrices::default(),
    }
}

/// The bookmaker's h2h market. A market that carries no key at all is taken
/// as the h2h market when nothing is keyed "h2h".
fn h2h_market(bookmaker: &Bookmaker) -> Option<&Market> {
    bookmaker.market(MarketKey::H2h).or_else(|| {
        bookmaker
            .markets()
            .first()
            .filter(|m| m.key.as_deref().map_or(true, str::is_empty))
    })
}

/// Read h2h prices by matching outcome names against the teams.
///
/// Bookmakers are scanned in order; later bookmakers overwrite earlier values
/// until one has supplied both home and away prices.
pub fn parse_h2h_named(event: &Event) -> H2hPrices {
    let home = event.home().to_lowercase();
    let away = event.away().to_lowercase();
    let mut prices = H2hPrices::default();

    for bookmaker in event.bookmakers() {
        let Some(market) = bookmaker.market(MarketKey::H2h) else {
            continue;
        };
        for outcome in market.outcomes() {
            let name = outcome.name().to_lowercase();
            if name == home {
                prices.home = outcome.price();
            } else if name == "draw" {
                prices.draw = outcome.price();
            } else if name == away {
                prices.away = outcome.price();
            }
        }
        if prices.home.is_some() && prices.away.is_some() {
            break;
        }
    }

    prices
}

/// Win percentage for a price, to one decimal, or "N/A"
pub fn win_percent(price: Option<f64>) -> String {
    price
        .and_then(implied_probability_value)
        .map(|p| format_percent(p, 1))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Collect every "over" outcome on a canonical line across all bookmakers'
/// totals markets, in encounter order.
pub fn collect_over_candidates(event: &Event) -> Vec<OverCandidate> {
    event
        .bookmakers()
        .iter()
        .filter_map(|bm| bm.market(MarketKey::Totals))
        .flat_map(Market::outcomes)
        .filter(|o| o.name().to_lowercase().contains("over"))
        .filter_map(|o| {
            let line = o.point().and_then(GoalLine::from_point)?;
            let price = o.price().filter(|p| *p > 0.0)?;
            Some(OverCandidate { line, price })
        })
        .collect()
}
