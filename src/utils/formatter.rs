use crate::models::{Event, League};
use crate::utils::parser::{collect_over_candidates, parse_h2h_named, win_percent, H2hPrices};
use crate::utils::probability::{format_percent, format_price, implied_probability};
use crate::utils::scoring::{select_best_over, BestOverBet};
use chrono::FixedOffset;

const VIP_SEPARATOR_WIDTH: usize = 40;

/// Everything a VIP tip shows for one event. Built per formatting call and
/// then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTip {
    pub home: String,
    pub away: String,
    pub commence: String,
    pub prices: H2hPrices,
    pub home_win_percent: String,
    pub draw_percent: String,
    pub away_win_percent: String,
    pub best_over: Option<BestOverBet>,
}

impl DerivedTip {
    /// Name-matched h2h prices, one-decimal win percentages and the best
    /// scored over bet. The start time is shown in `display_offset`.
    pub fn from_event(event: &Event, display_offset: FixedOffset) -> Self {
        let prices = parse_h2h_named(event);
        Self {
            home: event.home().to_string(),
            away: event.away().to_string(),
            commence: format_kickoff(event, display_offset),
            prices,
            home_win_percent: win_percent(prices.home),
            draw_percent: win_percent(prices.draw),
            away_win_percent: win_percent(prices.away),
            best_over: select_best_over(&collect_over_candidates(event)),
        }
    }
}

/// Kick-off as "Jan 1, 04:00 PM" in the given offset, or the raw text when it
/// does not parse
pub fn format_kickoff(event: &Event, offset: FixedOffset) -> String {
    match event.commence_at() {
        Some(at) => at.with_timezone(&offset).format("%b %-d, %I:%M %p").to_string(),
        None => event.commence().to_string(),
    }
}

pub fn format_free_tip(event: &Event, prices: &H2hPrices) -> String {
    let (home, away) = (event.home(), event.away());
    format!(
        "⚽ {home} vs {away}\n• Start: {}\n• Odds — Home: {} | Away: {}\n• 🧮 Win Chances — {home}: {} | {away}: {}",
        event.commence(),
        prices.home_display(),
        prices.away_display(),
        implied_probability(prices.home),
        implied_probability(prices.away),
    )
}

pub fn format_daily_tip(league: &League, event: &Event, prices: &H2hPrices) -> String {
    let (home, away) = (event.home(), event.away());
    format!(
        "{}\n⚽ {home} vs {away}\n• Start: {}\n• Odds — Home: {} | Draw: {} | Away: {}\n• 🧮 Win Chances — {home}: {} | {away}: {}",
        league.label,
        event.commence(),
        prices.home_display(),
        prices.draw_display(),
        prices.away_display(),
        implied_probability(prices.home),
        implied_probability(prices.away),
    )
}

pub fn format_vip_tip(tip: &DerivedTip) -> String {
    let mut text = format!(
        "💎 VIP PREMIUM TIP\n\n⚽ {} vs {}\n📅 {}\n\n🎯 WIN PROBABILITIES:\n• {}: {} (Odds: {})\n• Draw: {} (Odds: {})\n• {}: {} (Odds: {})\n\n",
        tip.home,
        tip.away,
        tip.commence,
        tip.home,
        tip.home_win_percent,
        tip.prices.home_display(),
        tip.draw_percent,
        tip.prices.draw_display(),
        tip.away,
        tip.away_win_percent,
        tip.prices.away_display(),
    );

    match &tip.best_over {
        Some(bet) => {
            text.push_str(&format!(
                "🔥 RECOMMENDED BET:\n• {} Goals\n• Odds: {}\n• Probability: {}\n• {} {}\n\n💡 This bet offers the best value based on odds analysis!",
                bet.recommendation(),
                format_price(Some(bet.price)),
                format_percent(bet.probability, 1),
                bet.label.emoji(),
                bet.label,
            ));
        }
        None => {
            // Compares the rendered percentage strings, not the numbers
            let favored = if tip.home_win_percent > tip.away_win_percent {
                &tip.home
            } else {
                &tip.away
            };
            text.push_str(&format!("💡 {} is favored to win", favored));
        }
    }

    text
}

pub fn compose_free_message(tips: &[String]) -> String {
    format!(
        "📊 REAL UPCOMING MATCHES & ODDS\n\n{}\n\n💡 Want premium VIP tips? Use /subscribe\n\n⚠️ These probabilities are *implied* from odds, not guaranteed outcomes.",
        tips.join("\n\n")
    )
}

pub fn compose_vip_message(tips: &[String]) -> String {
    let separator = format!("\n\n{}\n\n", "─".repeat(VIP_SEPARATOR_WIDTH));
    format!(
        "🏆 VIP PREMIUM BETTING ANALYSIS\n\n{}\n\n📊 Tips are based on odds analysis and probability calculations.\n⚠️ Always bet responsibly!",
        tips.join(&separator)
    )
}

pub fn compose_daily_broadcast(tips: &[String]) -> String {
    format!(
        "📊 YOUR DAILY BETTING TIPS\n\n🌍 Today's picks from Europe's top leagues:\n\n{}\n\n💡 These are different from /tips command - enjoy the variety!\n\n⚠️ Bet responsibly!",
        tips.join("\n\n")
    )
}
