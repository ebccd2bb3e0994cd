//! Evaluation of one boat against one bundle of demands.
//!
//! Decides whether the route calls at the M9 hub, which TMIB drops happen
//! before it, sequences both segments and measures the result. Failure is a
//! [`Reject`] value the optimizer treats as an infeasible candidate, never
//! an error that propagates out of the solver.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    geography::{BoatKind, Geography, HUB, TMIB},
    plan::{Route, Stop},
    scenario::{Boat, Demand},
    shared::{Distance, Time},
};

use super::{
    SolverConfig,
    sequencer::{self, SeqStop},
};

/// One boat of the day's fleet, resolved against the geography tables.
#[derive(Debug, Clone)]
pub(crate) struct BoatSpec {
    pub name: String,
    pub kind: BoatKind,
    pub capacity: u32,
    pub speed_kn: f64,
    pub departure: Time,
}

impl BoatSpec {
    pub fn resolve(boat: &Boat, geo: &Geography) -> Self {
        Self {
            name: boat.name.clone(),
            kind: boat.kind(),
            capacity: boat.capacity(),
            speed_kn: boat.speed(geo),
            departure: boat.departure,
        }
    }

    pub fn is_aqua(&self) -> bool {
        self.kind == BoatKind::AquaHelix
    }
}

/// Passenger inventories that ride along hub routes opportunistically:
/// TMIB-pool passengers bound for the hub itself, and M9-pool passengers
/// riding home to the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct Pools {
    pub hub_drop: u32,
    pub ride_home: u32,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum Reject {
    #[error("no gangway at {0}")]
    Gangway(Arc<str>),
    #[error("capacity exceeded: {need} > {capacity}")]
    Capacity { need: u32, capacity: u32 },
    #[error("no feasible pre/post split")]
    NoSplit,
}

/// A valid route plus the measurements the optimizer ranks on.
#[derive(Debug, Clone)]
pub(crate) struct Evaluated {
    pub route: Route,
    pub distance: f64,
    pub priority_time: f64,
    pub pax_arrival: f64,
    pub comfort: f64,
    pub cluster_penalty: f64,
    pub touches_distant: bool,
    pub hub_drop_taken: u32,
    pub ride_home_taken: u32,
    /// Arrival minute per visited platform (hub included), from departure.
    pub arrivals: Vec<(Arc<str>, u32)>,
    /// Seats left under the binding load.
    pub spare: u32,
}

pub(crate) fn evaluate(
    geo: &Geography,
    cfg: &SolverConfig,
    boat: &BoatSpec,
    demands: &[Demand],
    pools: Pools,
) -> Result<Evaluated, Reject> {
    let merged = merge_duplicates(demands);

    if boat.is_aqua() {
        for demand in &merged {
            if !geo.is_gangway(&demand.platform) {
                return Err(Reject::Gangway(demand.platform.clone()));
            }
        }
    }

    let total_tmib: u32 = merged.iter().map(|d| d.tmib).sum();
    let m9_dest: u32 = merged.iter().map(|d| d.m9).sum();

    let hub_drop_taken = pools
        .hub_drop
        .min(boat.capacity.saturating_sub(total_tmib));

    let touches_distant = merged
        .iter()
        .any(|d| geo.cluster(&d.platform).is_distant());
    let uses_hub = m9_dest > 0 || hub_drop_taken > 0 || touches_distant;

    if uses_hub && boat.is_aqua() && !geo.is_gangway(HUB) {
        return Err(Reject::Gangway(Arc::from(HUB)));
    }

    let pre_load = total_tmib + hub_drop_taken;
    if pre_load > boat.capacity {
        return Err(Reject::Capacity {
            need: pre_load,
            capacity: boat.capacity,
        });
    }

    let (mut pre, mut post) = split_stops(geo, cfg, &merged, boat.capacity, m9_dest, uses_hub)?;
    if uses_hub {
        promote_p1(geo, cfg, &mut pre, &mut post);
    }

    let pre_dropped: u32 = pre.iter().map(Stop::tmib_drop).sum();
    let post_load_base = total_tmib - pre_dropped + m9_dest;
    let ride_home_taken = if uses_hub {
        pools
            .ride_home
            .min(boat.capacity.saturating_sub(post_load_base))
    } else {
        0
    };
    let m9_pickup = m9_dest + ride_home_taken;

    // Sequence each segment; the post segment starts at the hub unless the
    // route never calls there.
    let pre_seq = sequencer::order_stops(
        geo,
        cfg,
        TMIB,
        &to_seq_stops(&pre),
        boat.speed_kn,
        boat.is_aqua(),
    );
    let post_start = if uses_hub { HUB } else { TMIB };
    let post_seq = sequencer::order_stops(
        geo,
        cfg,
        post_start,
        &to_seq_stops(&post),
        boat.speed_kn,
        boat.is_aqua(),
    );
    let pre = reorder(pre, &pre_seq);
    let post = reorder(post, &post_seq);

    // Measure the whole route with a single running clock and load.
    let pre_metrics = sequencer::leg_metrics(
        geo,
        cfg,
        TMIB,
        &pre_seq,
        boat.speed_kn,
        boat.is_aqua(),
        0,
        pre_load,
    );
    let mut distance = pre_metrics.distance;
    let mut priority_time = pre_metrics.priority_time;
    let mut pax_arrival = pre_metrics.pax_arrival;
    let mut comfort = pre_metrics.comfort;
    let mut arrivals = pre_metrics.arrivals.clone();
    let mut clock = pre_metrics.end_minute;

    if uses_hub {
        let from: &str = pre_seq
            .last()
            .map(|s| &*s.platform)
            .unwrap_or(TMIB);
        let leg = sequencer::dist(geo, cfg, from, HUB);
        let minutes = Distance::from_nm(leg).travel_minutes(boat.speed_kn);
        let onboard = pre_load - pre_dropped;
        distance += leg;
        comfort += onboard as f64 * minutes as f64;
        clock += minutes;
        arrivals.push((Arc::from(HUB), clock));
        clock += sequencer::stop_minutes(cfg, hub_drop_taken + m9_pickup, boat.is_aqua());
    }

    let post_onboard = post_load_base + ride_home_taken;
    let post_metrics = sequencer::leg_metrics(
        geo,
        cfg,
        post_start,
        &post_seq,
        boat.speed_kn,
        boat.is_aqua(),
        clock,
        post_onboard,
    );
    distance += post_metrics.distance;
    priority_time += post_metrics.priority_time;
    pax_arrival += post_metrics.pax_arrival;
    comfort += post_metrics.comfort;
    arrivals.extend(post_metrics.arrivals.clone());

    let cluster_penalty = cluster_cohesion(geo, cfg, &pre, &post);
    let spare = boat.capacity - pre_load.max(post_onboard);

    let route = Route {
        boat: boat.name.clone(),
        departure: boat.departure,
        pre_stops: pre,
        uses_hub,
        post_stops: post,
        tmib_to_m9: hub_drop_taken,
        m9_pickup,
        distance: Distance::from_nm(distance),
    };

    Ok(Evaluated {
        route,
        distance,
        priority_time,
        pax_arrival,
        comfort,
        cluster_penalty,
        touches_distant,
        hub_drop_taken,
        ride_home_taken,
        arrivals,
        spare,
    })
}

/// Entries for the same platform are combined: counts add, priority is the
/// strongest of the two (1 beats 2 beats 3 beats 0).
fn merge_duplicates(demands: &[Demand]) -> Vec<Demand> {
    let mut merged: Vec<Demand> = Vec::with_capacity(demands.len());
    for demand in demands {
        if let Some(existing) = merged
            .iter_mut()
            .find(|d| d.platform == demand.platform)
        {
            existing.tmib += demand.tmib;
            existing.m9 += demand.m9;
            existing.priority = stronger_priority(existing.priority, demand.priority);
        } else {
            merged.push(demand.clone());
        }
    }
    merged
}

fn stronger_priority(a: u8, b: u8) -> u8 {
    match (a, b) {
        (0, b) => b,
        (a, 0) => a,
        (a, b) => a.min(b),
    }
}

/// Decides which TMIB drops happen before the hub call: everything stays
/// after the hub unless the post-hub load would not fit, in which case the
/// cheapest feasible subset moves forward.
fn split_stops(
    geo: &Geography,
    cfg: &SolverConfig,
    merged: &[Demand],
    capacity: u32,
    m9_dest: u32,
    uses_hub: bool,
) -> Result<(Vec<Stop>, Vec<Stop>), Reject> {
    let total_tmib: u32 = merged.iter().map(|d| d.tmib).sum();

    let all_post = |merged: &[Demand]| -> Vec<Stop> {
        merged
            .iter()
            .filter(|d| d.tmib > 0 || d.m9 > 0)
            .map(|d| Stop::Post {
                platform: d.platform.clone(),
                tmib_drop: d.tmib,
                m9_drop: d.m9,
                priority: d.priority,
            })
            .collect()
    };

    if !uses_hub || total_tmib + m9_dest <= capacity {
        return Ok((Vec::new(), all_post(merged)));
    }

    let needed = total_tmib + m9_dest - capacity;
    let movable: Vec<usize> = (0..merged.len()).filter(|&i| merged[i].tmib > 0).collect();

    let mut best: Option<(SplitRank, u32)> = None;
    for mask in 0..(1u32 << movable.len()) {
        let selected: Vec<usize> = movable
            .iter()
            .enumerate()
            .filter(|&(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &i)| i)
            .collect();
        let moved: u32 = selected.iter().map(|&i| merged[i].tmib).sum();
        if moved < needed {
            continue;
        }

        let loops = selected.iter().filter(|&&i| merged[i].m9 > 0).count();
        let pre_platforms: Vec<Arc<str>> =
            selected.iter().map(|&i| merged[i].platform.clone()).collect();
        let post_platforms: Vec<Arc<str>> = (0..merged.len())
            .filter(|&i| {
                if selected.contains(&i) {
                    // Moved forward; only a loop visit keeps it after the hub.
                    merged[i].m9 > 0
                } else {
                    merged[i].m9 > 0 || merged[i].tmib > 0
                }
            })
            .map(|i| merged[i].platform.clone())
            .collect();

        let estimate = sequencer::nn_chain(geo, cfg, TMIB, &pre_platforms)
            + sequencer::nn_chain(geo, cfg, HUB, &post_platforms)
            + loops as f64 * cfg.loop_visit_nm;
        let rank = SplitRank {
            estimate,
            loops,
            surplus: moved - needed,
            pre_count: selected.len(),
        };
        if best.as_ref().is_none_or(|(b, _)| rank.is_better_than(b)) {
            best = Some((rank, mask));
        }
    }

    let Some((_, mask)) = best else {
        return Err(Reject::NoSplit);
    };
    let selected: Vec<usize> = movable
        .iter()
        .enumerate()
        .filter(|&(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, &i)| i)
        .collect();

    let mut pre = Vec::new();
    let mut post = Vec::new();
    for (i, demand) in merged.iter().enumerate() {
        if selected.contains(&i) {
            pre.push(Stop::Pre {
                platform: demand.platform.clone(),
                tmib_drop: demand.tmib,
                priority: demand.priority,
            });
            if demand.m9 > 0 {
                // Loop visit: the M9-pool share still lands after the hub.
                post.push(Stop::Post {
                    platform: demand.platform.clone(),
                    tmib_drop: 0,
                    m9_drop: demand.m9,
                    priority: demand.priority,
                });
            }
        } else if demand.tmib > 0 || demand.m9 > 0 {
            post.push(Stop::Post {
                platform: demand.platform.clone(),
                tmib_drop: demand.tmib,
                m9_drop: demand.m9,
                priority: demand.priority,
            });
        }
    }
    Ok((pre, post))
}

#[derive(Debug, Clone, PartialEq)]
struct SplitRank {
    estimate: f64,
    loops: usize,
    surplus: u32,
    pre_count: usize,
}

impl SplitRank {
    fn is_better_than(&self, other: &Self) -> bool {
        (self.estimate, self.loops, self.surplus, self.pre_count)
            < (other.estimate, other.loops, other.surplus, other.pre_count)
    }
}

/// A post-hub TMIB-only stop with priority 1 moves before the hub when the
/// solo detour off the TMIB-M9 leg stays within the promotion threshold.
fn promote_p1(geo: &Geography, cfg: &SolverConfig, pre: &mut Vec<Stop>, post: &mut Vec<Stop>) {
    let direct = sequencer::dist(geo, cfg, TMIB, HUB);
    let mut i = 0;
    while i < post.len() {
        let stop = &post[i];
        let promotable = stop.priority() == 1 && stop.m9_drop() == 0 && stop.tmib_drop() > 0;
        if promotable {
            let platform = stop.platform().clone();
            let detour = sequencer::dist(geo, cfg, TMIB, &platform)
                + sequencer::dist(geo, cfg, &platform, HUB)
                - direct;
            if detour <= cfg.p1_promotion_detour_nm {
                let removed = post.remove(i);
                pre.push(Stop::Pre {
                    platform,
                    tmib_drop: removed.tmib_drop(),
                    priority: removed.priority(),
                });
                continue;
            }
        }
        i += 1;
    }
}

fn to_seq_stops(stops: &[Stop]) -> Vec<SeqStop> {
    stops
        .iter()
        .map(|s| SeqStop {
            platform: s.platform().clone(),
            pax: s.pax_moved(),
            priority: s.priority(),
        })
        .collect()
}

fn reorder(stops: Vec<Stop>, sequence: &[SeqStop]) -> Vec<Stop> {
    let mut remaining = stops;
    let mut ordered = Vec::with_capacity(remaining.len());
    for seq in sequence {
        let pos = remaining
            .iter()
            .position(|s| s.platform() == &seq.platform);
        if let Some(pos) = pos {
            ordered.push(remaining.remove(pos));
        }
    }
    ordered.extend(remaining);
    ordered
}

/// Penalty for routes hopping between clusters: nothing within one cluster,
/// a flat charge per switch (higher when the clusters are incompatible) and
/// a distance charge per long inter-cluster jump.
fn cluster_cohesion(geo: &Geography, cfg: &SolverConfig, pre: &[Stop], post: &[Stop]) -> f64 {
    let visited: Vec<&Stop> = pre.iter().chain(post.iter()).collect();
    let mut penalty = 0.0;
    for pair in visited.windows(2) {
        let a = geo.cluster(pair[0].platform());
        let b = geo.cluster(pair[1].platform());
        if a == b {
            continue;
        }
        penalty += if a.compatible(b) {
            cfg.cluster_switch_compatible
        } else {
            cfg.cluster_switch_incompatible
        };
        let jump = geo
            .distance(pair[0].platform(), pair[1].platform())
            .as_nm();
        penalty += cfg.cluster_jump_weight * (jump - cfg.cluster_jump_slack_nm).max(0.0);
    }
    penalty
}
