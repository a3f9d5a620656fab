use crate::api::odds_api::OddsSource;
use crate::models::{Event, League, MarketKey};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

pub const DEFAULT_TIP_LIMIT: usize = 3;

/// How many of the soonest VIP matches are kept before shuffling
pub const VIP_CANDIDATE_POOL: usize = 10;

/// VIP tips only cover matches starting within this many days
pub const VIP_WINDOW_DAYS: i64 = 7;

/// Free tier: the first `limit` events in provider order
pub fn select_free(events: &[Event], limit: usize) -> &[Event] {
    &events[..events.len().min(limit)]
}

/// Uniformly shuffled copy (Fisher-Yates)
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(rng);
    items
}

/// Rotation policy: visit leagues in random order and take one random event
/// from each until `limit` events are collected. Leagues that fail or return
/// nothing are skipped. Fetches run one league at a time.
pub async fn select_rotation<R>(
    source: &dyn OddsSource,
    leagues: &[League],
    limit: usize,
    rng: &mut R,
) -> Vec<(League, Event)>
where
    R: Rng + ?Sized + Send,
{
    let mut picked = Vec::new();

    for league in shuffled(leagues, rng) {
        if picked.len() >= limit {
            break;
        }

        let mut events = match source.fetch_events(league.key, &[MarketKey::H2h]).await {
            Ok(events) if events.is_empty() => {
                debug!("No events for {}, skipping", league.key);
                continue;
            }
            Ok(events) => events,
            Err(e) => {
                warn!("Skipping {} in rotation: {}", league.key, e);
                continue;
            }
        };

        events.shuffle(rng);
        if let Some(event) = events.into_iter().next() {
            picked.push((league, event));
        }
    }

    picked
}

/// VIP policy: keep events starting within [now, now + 7 days], take the ten
/// soonest, shuffle those, then take `limit`.
pub fn select_vip<R: Rng + ?Sized>(
    events: Vec<Event>,
    now: DateTime<Utc>,
    limit: usize,
    rng: &mut R,
) -> Vec<Event> {
    let window_end = now + Duration::days(VIP_WINDOW_DAYS);

    let mut upcoming: Vec<(DateTime<Utc>, Event)> = events
        .into_iter()
        .filter_map(|event| {
            let at = event.commence_at()?;
            (at >= now && at <= window_end).then_some((at, event))
        })
        .collect();

    upcoming.sort_by_key(|(at, _)| *at);
    upcoming.truncate(VIP_CANDIDATE_POOL);
    upcoming.shuffle(rng);

    upcoming
        .into_iter()
        .take(limit)
        .map(|(_, event)| event)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROTATION_LEAGUES;
    use crate::test_support::{event_at, named_event, StubOddsSource};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_select_free_takes_first_in_order() {
        let events: Vec<Event> = (0..5).map(|i| named_event(&format!("H{i}"), "A")).collect();
        let picked = select_free(&events, 3);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].home(), "H0");
        assert_eq!(picked[2].home(), "H2");
        assert_eq!(select_free(&events[..1], 3).len(), 1);
    }

    #[test]
    fn test_shuffle_is_a_permutation_and_seeded() {
        let items: Vec<u32> = (0..20).collect();
        let a = shuffled(&items, &mut StdRng::seed_from_u64(7));
        let b = shuffled(&items, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, items);
    }

    fn stub_with_two_bad_leagues() -> StubOddsSource {
        StubOddsSource::new()
            .with_events(ROTATION_LEAGUES[0].key, vec![named_event("Betis", "Sevilla")])
            .with_error(ROTATION_LEAGUES[1].key)
            .with_events(ROTATION_LEAGUES[2].key, vec![named_event("Bayern", "Dortmund")])
            .with_events(ROTATION_LEAGUES[3].key, vec![])
            .with_events(
                ROTATION_LEAGUES[4].key,
                vec![named_event("Flamengo", "Santos"), named_event("Gremio", "Bahia")],
            )
    }

    #[tokio::test]
    async fn test_rotation_skips_bad_leagues_and_respects_limit() {
        let source = stub_with_two_bad_leagues();
        let bad = [ROTATION_LEAGUES[1].key, ROTATION_LEAGUES[3].key];

        for seed in 0..20 {
            for limit in 0..5 {
                let mut rng = StdRng::seed_from_u64(seed);
                let picked = select_rotation(&source, &ROTATION_LEAGUES, limit, &mut rng).await;
                assert!(picked.len() <= limit);
                assert_eq!(picked.len(), limit.min(3));
                assert!(picked.iter().all(|(league, _)| !bad.contains(&league.key)));
            }
        }
    }

    #[tokio::test]
    async fn test_rotation_takes_one_event_per_league() {
        let source = stub_with_two_bad_leagues();
        let mut rng = StdRng::seed_from_u64(3);
        let picked = select_rotation(&source, &ROTATION_LEAGUES, 10, &mut rng).await;

        let mut keys: Vec<&str> = picked.iter().map(|(l, _)| l.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), picked.len());
        assert_eq!(source.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_rotation_is_deterministic_for_a_seed() {
        let source = stub_with_two_bad_leagues();
        let a = select_rotation(&source, &ROTATION_LEAGUES, 2, &mut StdRng::seed_from_u64(11)).await;
        let b = select_rotation(&source, &ROTATION_LEAGUES, 2, &mut StdRng::seed_from_u64(11)).await;
        assert_eq!(a, b);
    }

    #[test]
    fn test_vip_window_and_pool() {
        let now = Utc::now();
        let mut events = vec![
            event_at("past", now - Duration::hours(1)),
            event_at("too-far", now + Duration::days(8)),
            Event::default(),
        ];
        for i in 0..12 {
            events.push(event_at(&format!("m{i:02}"), now + Duration::hours(i + 1)));
        }

        let picked = select_vip(events, now, 20, &mut StdRng::seed_from_u64(5));
        let mut homes: Vec<String> = picked.iter().map(|e| e.home().to_string()).collect();
        homes.sort();

        let expected: Vec<String> = (0..10).map(|i| format!("m{i:02}")).collect();
        assert_eq!(homes, expected);
    }

    #[test]
    fn test_vip_limit_and_determinism() {
        let now = Utc::now();
        let events: Vec<Event> = (0..6)
            .map(|i| event_at(&format!("m{i}"), now + Duration::hours(i + 1)))
            .collect();

        let a = select_vip(events.clone(), now, 3, &mut StdRng::seed_from_u64(9));
        let b = select_vip(events, now, 3, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }
}
