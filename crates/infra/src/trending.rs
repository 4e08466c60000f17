//! Trending-event ranking.
//!
//! Heuristic popularity score over a snapshot of per-event stats. The
//! constants are fixed product behavior carried over as-is; there is no
//! invariant beyond "higher score sorts first" and determinism for a given
//! snapshot.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const DEFAULT_TRENDING_LIMIT: usize = 3;

/// Aggregated stats for one published event at scoring time.
#[derive(Debug, Clone, FromRow)]
pub struct EventStats {
    pub event_id: i64,
    pub start_time: DateTime<Utc>,
    pub interested_count: i64,
    pub confirmed_count: i64,
    pub average_rating: f64,
    pub rating_count: i64,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct TrendingEvent {
    pub event_id: i64,
    pub score: f64,
}

pub fn trending_score(stats: &EventStats, now: DateTime<Utc>) -> f64 {
    let day_secs = 86_400.0;
    let delta_days = (now - stats.start_time).num_seconds() as f64 / day_secs;

    if delta_days > 0.0 {
        // Past event: decays with age, kept alive by ratings.
        let age_penalty = (100.0 - delta_days * 5.0).max(0.0);
        let rating_boost = stats.average_rating * stats.rating_count as f64 * 3.0;
        age_penalty + rating_boost
    } else {
        let days_until = -delta_days;
        let urgency_boost = if days_until <= 7.0 {
            50.0 - days_until * 7.0
        } else {
            0.0
        };
        let interest_boost = stats.interested_count as f64 * 2.0;
        let confirm_boost = stats.confirmed_count as f64 * 3.0;
        let rating_boost = stats.average_rating * stats.rating_count as f64;
        let availability_boost = match stats.capacity {
            None => 10.0,
            Some(cap) => {
                let filled = (stats.confirmed_count + stats.interested_count) as f64;
                let remaining_pct = ((cap as f64 - filled) / cap as f64).max(0.0);
                if remaining_pct == 0.0 {
                    -20.0
                } else if remaining_pct <= 0.2 {
                    15.0
                } else if remaining_pct <= 0.5 {
                    20.0
                } else {
                    10.0
                }
            }
        };
        urgency_boost + interest_boost + confirm_boost + rating_boost + availability_boost + 50.0
    }
}

/// Rank events by score, highest first. The sort is stable, so events with
/// equal scores keep their input order.
pub fn rank_trending(
    stats: &[EventStats],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<TrendingEvent> {
    let mut scored: Vec<TrendingEvent> = stats
        .iter()
        .map(|s| TrendingEvent {
            event_id: s.event_id,
            score: trending_score(s, now),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
