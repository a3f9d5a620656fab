use crate::api::odds_api::{FetchError, OddsSource, WARNING_MARKER};
use crate::models::{MarketKey, FREE_LEAGUE, ROTATION_LEAGUES, VIP_LEAGUES};
use crate::utils::formatter::{format_daily_tip, format_free_tip, format_vip_tip, DerivedTip};
use crate::utils::parser::parse_h2h_positional;
use crate::utils::selection::{select_free, select_rotation, select_vip};
use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TipsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Could not parse odds, try again later.")]
    NoFreeTips,

    #[error("Could not fetch daily tips from other leagues.")]
    NoDailyTips,

    #[error("VIP odds unavailable right now.")]
    NoVipTips,
}

impl TipsError {
    /// Text shown to the chat user in place of tips
    pub fn user_message(&self) -> String {
        match self {
            TipsError::Fetch(e) => e.user_message(),
            other => format!("{} {}", WARNING_MARKER, other),
        }
    }
}

/// Free tips: the first `limit` fixtures of the free league
pub async fn free_tips(source: &dyn OddsSource, limit: usize) -> Result<Vec<String>, TipsError> {
    let events = source
        .fetch_events(FREE_LEAGUE.key, &[MarketKey::H2h])
        .await?;

    let tips: Vec<String> = select_free(&events, limit)
        .iter()
        .map(|event| format_free_tip(event, &parse_h2h_positional(event)))
        .collect();

    if tips.is_empty() {
        return Err(TipsError::NoFreeTips);
    }
    Ok(tips)
}

/// Daily broadcast tips: one random fixture from each of up to `limit`
/// randomly ordered leagues
pub async fn daily_tips<R>(
    source: &dyn OddsSource,
    rng: &mut R,
    limit: usize,
) -> Result<Vec<String>, TipsError>
where
    R: Rng + ?Sized + Send,
{
    let picked = select_rotation(source, &ROTATION_LEAGUES, limit, rng).await;

    let tips: Vec<String> = picked
        .iter()
        .map(|(league, event)| format_daily_tip(league, event, &parse_h2h_positional(event)))
        .collect();

    if tips.is_empty() {
        return Err(TipsError::NoDailyTips);
    }
    info!("Built {} daily tips", tips.len());
    Ok(tips)
}

/// VIP tips: merge the VIP leagues, keep matches within the next week and
/// render each with its best over bet
pub async fn vip_tips<R>(
    source: &dyn OddsSource,
    rng: &mut R,
    now: DateTime<Utc>,
    limit: usize,
    display_offset: FixedOffset,
) -> Result<Vec<String>, TipsError>
where
    R: Rng + ?Sized + Send,
{
    let mut all_events = Vec::new();
    for league in VIP_LEAGUES {
        match source
            .fetch_events(league.key, &[MarketKey::Totals, MarketKey::H2h])
            .await
        {
            Ok(events) => all_events.extend(events),
            Err(e) => warn!("VIP fetch failed for {}: {}", league.key, e),
        }
    }

    if all_events.is_empty() {
        return Err(TipsError::NoVipTips);
    }

    let tips: Vec<String> = select_vip(all_events, now, limit, rng)
        .iter()
        .map(|event| format_vip_tip(&DerivedTip::from_event(event, display_offset)))
        .collect();

    if tips.is_empty() {
        return Err(TipsError::NoVipTips);
    }
    info!("Built {} VIP tips", tips.len());
    Ok(tips)
}
