//! Stop ordering for one route segment.
//!
//! Small segments are ordered by exhaustive permutation search; larger ones
//! fall back to nearest-neighbor (no priorities) or a greedy one-stop
//! lookahead over the same scoring function (with priorities). Permutations
//! are enumerated in lexicographic index order and ties keep the earliest
//! candidate, which keeps the whole pipeline deterministic.

use std::sync::Arc;

use crate::geography::Geography;

use super::SolverConfig;

/// A stop candidate inside one segment: how many passengers leave the boat
/// there and how urgent they are.
#[derive(Debug, Clone)]
pub(crate) struct SeqStop {
    pub platform: Arc<str>,
    pub pax: u32,
    pub priority: u8,
}

/// Accumulated measurements over one sequenced segment.
#[derive(Debug, Clone, Default)]
pub(crate) struct LegMetrics {
    pub distance: f64,
    /// Sum of arrival minute x priority weight.
    pub priority_time: f64,
    /// Sum of arrival minute x passengers dropped.
    pub pax_arrival: f64,
    /// Onboard count integrated over travel minutes.
    pub comfort: f64,
    /// Radial decrease toward the segment start, NM.
    pub backtrack: f64,
    /// Non-P1 stops visited while a P1 stop was still ahead.
    pub p1_violations: u32,
    pub arrivals: Vec<(Arc<str>, u32)>,
    /// Clock after the last stop's overhead, minutes from segment start.
    pub end_minute: u32,
}

pub(crate) fn priority_weight(priority: u8) -> f64 {
    match priority {
        1 => 15.0,
        2 => 3.0,
        3 => 1.0,
        _ => 0.0,
    }
}

pub(crate) fn dist(geo: &Geography, cfg: &SolverConfig, from: &str, to: &str) -> f64 {
    geo.distance_entry(from, to)
        .map(|d| d.as_nm())
        .unwrap_or(cfg.sentinel_nm)
}

/// Travel + stop time over a fixed sequence, with the clock starting at
/// `start_minute` and `onboard` passengers on deck when the segment begins.
pub(crate) fn leg_metrics(
    geo: &Geography,
    cfg: &SolverConfig,
    start: &str,
    sequence: &[SeqStop],
    speed_kn: f64,
    aqua: bool,
    start_minute: u32,
    mut onboard: u32,
) -> LegMetrics {
    let mut metrics = LegMetrics {
        end_minute: start_minute,
        ..Default::default()
    };
    let mut prev: &str = start;
    for (i, stop) in sequence.iter().enumerate() {
        let leg = dist(geo, cfg, prev, &stop.platform);
        let minutes = crate::shared::Distance::from_nm(leg).travel_minutes(speed_kn);
        metrics.distance += leg;
        metrics.comfort += onboard as f64 * minutes as f64;
        metrics.end_minute += minutes;

        let arrival = metrics.end_minute;
        metrics.arrivals.push((stop.platform.clone(), arrival));
        metrics.priority_time += arrival as f64 * priority_weight(stop.priority);
        metrics.pax_arrival += arrival as f64 * stop.pax as f64;

        let radial_prev = dist(geo, cfg, start, prev);
        let radial_next = dist(geo, cfg, start, &stop.platform);
        metrics.backtrack += (radial_prev - radial_next).max(0.0);

        if stop.priority != 1
            && sequence[i + 1..].iter().any(|later| later.priority == 1)
        {
            metrics.p1_violations += 1;
        }

        metrics.end_minute += stop_minutes(cfg, stop.pax, aqua);
        onboard = onboard.saturating_sub(stop.pax);
        prev = &stop.platform;
    }
    metrics
}

pub(crate) fn stop_minutes(cfg: &SolverConfig, pax_moved: u32, aqua: bool) -> u32 {
    let mut minutes = pax_moved * cfg.pax_stop_minutes;
    if aqua {
        minutes += cfg.aqua_stop_minutes;
    }
    minutes
}

pub(crate) fn sequence_score(cfg: &SolverConfig, metrics: &LegMetrics) -> f64 {
    metrics.distance
        + metrics.priority_time * cfg.priority_time_weight
        + metrics.pax_arrival * cfg.pax_arrival_weight
        + metrics.comfort * cfg.comfort_weight
        + metrics.backtrack * cfg.backtrack_weight
        + metrics.p1_violations as f64 * cfg.p1_precedence_weight
}

/// Orders a set of stops starting from `start`.
pub(crate) fn order_stops(
    geo: &Geography,
    cfg: &SolverConfig,
    start: &str,
    stops: &[SeqStop],
    speed_kn: f64,
    aqua: bool,
) -> Vec<SeqStop> {
    if stops.len() <= 1 {
        return stops.to_vec();
    }
    let prioritized = stops.iter().any(|s| (1..=3).contains(&s.priority));
    if prioritized {
        if stops.len() <= cfg.priority_sequence_cutoff {
            best_permutation(stops, |sequence| {
                let onboard: u32 = sequence.iter().map(|s| s.pax).sum();
                let metrics = leg_metrics(geo, cfg, start, sequence, speed_kn, aqua, 0, onboard);
                sequence_score(cfg, &metrics)
            })
        } else {
            greedy_lookahead(geo, cfg, start, stops, speed_kn, aqua)
        }
    } else if stops.len() <= cfg.plain_sequence_cutoff {
        best_permutation(stops, |sequence| chain_distance(geo, cfg, start, sequence))
    } else {
        nearest_neighbor(geo, cfg, start, stops)
    }
}

fn chain_distance(geo: &Geography, cfg: &SolverConfig, start: &str, sequence: &[SeqStop]) -> f64 {
    let mut total = 0.0;
    let mut prev: &str = start;
    for stop in sequence {
        total += dist(geo, cfg, prev, &stop.platform);
        prev = &stop.platform;
    }
    total
}

/// Nearest-neighbor chain length over raw platform names, used for the
/// pre/post split cost estimate.
pub(crate) fn nn_chain(geo: &Geography, cfg: &SolverConfig, start: &str, platforms: &[Arc<str>]) -> f64 {
    let mut remaining: Vec<&Arc<str>> = platforms.iter().collect();
    let mut prev: &str = start;
    let mut total = 0.0;
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let d = dist(geo, cfg, prev, candidate);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        total += best_d;
        prev = remaining.remove(best);
    }
    total
}

fn nearest_neighbor(
    geo: &Geography,
    cfg: &SolverConfig,
    start: &str,
    stops: &[SeqStop],
) -> Vec<SeqStop> {
    let mut remaining: Vec<&SeqStop> = stops.iter().collect();
    let mut ordered = Vec::with_capacity(stops.len());
    let mut prev: String = start.to_string();
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let d = dist(geo, cfg, &prev, &candidate.platform);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        let chosen = remaining.remove(best);
        prev = chosen.platform.to_string();
        ordered.push(chosen.clone());
    }
    ordered
}

/// Greedy construction for large prioritized segments: at every step, the
/// candidate whose partial sequence scores lowest is appended next.
fn greedy_lookahead(
    geo: &Geography,
    cfg: &SolverConfig,
    start: &str,
    stops: &[SeqStop],
    speed_kn: f64,
    aqua: bool,
) -> Vec<SeqStop> {
    let onboard: u32 = stops.iter().map(|s| s.pax).sum();
    let mut remaining: Vec<&SeqStop> = stops.iter().collect();
    let mut ordered: Vec<SeqStop> = Vec::with_capacity(stops.len());
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_score = f64::INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let mut trial: Vec<SeqStop> = ordered.clone();
            trial.push((*candidate).clone());
            // Remaining P1 stops still count against the partial sequence.
            let pending_p1 = remaining
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.priority == 1);
            let metrics = leg_metrics(geo, cfg, start, &trial, speed_kn, aqua, 0, onboard);
            let mut score = sequence_score(cfg, &metrics);
            if pending_p1 {
                // With a P1 still outside the partial sequence, every non-P1
                // already placed is a violation; the metrics only saw the
                // ones followed by an in-sequence P1.
                let non_p1 = trial.iter().filter(|s| s.priority != 1).count() as u32;
                score += (non_p1 - metrics.p1_violations) as f64 * cfg.p1_precedence_weight;
            }
            if score < best_score {
                best_score = score;
                best = i;
            }
        }
        ordered.push(remaining.remove(best).clone());
    }
    ordered
}

fn best_permutation<F: FnMut(&[SeqStop]) -> f64>(stops: &[SeqStop], mut score: F) -> Vec<SeqStop> {
    let mut indices: Vec<usize> = (0..stops.len()).collect();
    let mut best: Option<(f64, Vec<usize>)> = None;
    loop {
        let sequence: Vec<SeqStop> = indices.iter().map(|&i| stops[i].clone()).collect();
        let s = score(&sequence);
        if best.as_ref().is_none_or(|(b, _)| s < *b) {
            best = Some((s, indices.clone()));
        }
        if !next_permutation(&mut indices) {
            break;
        }
    }
    let (_, order) = best.unwrap_or((0.0, (0..stops.len()).collect()));
    order.into_iter().map(|i| stops[i].clone()).collect()
}

/// Advances `items` to the next lexicographic permutation; false when the
/// sequence was the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}
