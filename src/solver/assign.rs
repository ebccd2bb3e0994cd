//! Package-to-boat assignment search.
//!
//! Every mapping of packages onto boats is enumerated as a base-(B+1)
//! counter (the extra digit parks a package as unserved), each candidate is
//! priced through the route evaluator and the best one is kept under a
//! lexicographic objective: served demand first, then the TMIB-to-M9
//! backlog, then total distance, then the weighted soft criteria. A cascade
//! of constraint relaxations retries the search when the strict pass has no
//! feasible candidate. Boats, packages and digits all advance in input
//! order, so ties resolve identically on every run.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{geography::Geography, scenario::Demand};

use super::{
    SolverConfig,
    evaluator::{self, BoatSpec, Evaluated, Pools},
    packages::Package,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Flags {
    pub require_zero_m9: bool,
    pub enforce_all: bool,
    pub enforce_distant: bool,
}

/// Relaxation cascade: drop `enforce_all`, then `enforce_distant`, then
/// `require_zero_m9` and repeat.
const CASCADE: [Flags; 6] = [
    Flags { require_zero_m9: true, enforce_all: true, enforce_distant: true },
    Flags { require_zero_m9: true, enforce_all: false, enforce_distant: true },
    Flags { require_zero_m9: true, enforce_all: false, enforce_distant: false },
    Flags { require_zero_m9: false, enforce_all: true, enforce_distant: true },
    Flags { require_zero_m9: false, enforce_all: false, enforce_distant: true },
    Flags { require_zero_m9: false, enforce_all: false, enforce_distant: false },
];

#[derive(Debug, Clone)]
pub(crate) struct Assignment {
    /// Per package: boat index, or `boats.len()` for unserved.
    pub digits: Vec<usize>,
    /// Per boat: the evaluated route, when the boat does anything at all.
    pub routes: Vec<Option<Evaluated>>,
    /// Per boat: the demands its packages contribute, in package order.
    pub bundles: Vec<Vec<Demand>>,
    pub unserved: Vec<usize>,
    pub pending_hub: u32,
    pub pending_home: u32,
    pub total_distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Key {
    unserved_pax: u32,
    pending_hub: u32,
    total_distance: f64,
    secondary: f64,
}

impl Key {
    fn better_than(&self, other: &Self) -> bool {
        (self.unserved_pax, self.pending_hub)
            .cmp(&(other.unserved_pax, other.pending_hub))
            .then(
                self.total_distance
                    .partial_cmp(&other.total_distance)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                self.secondary
                    .partial_cmp(&other.secondary)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .is_lt()
    }
}

type EvalCache = HashMap<(usize, u64, u32, u32), Result<Evaluated, evaluator::Reject>>;

struct Search<'a> {
    geo: &'a Geography,
    cfg: &'a SolverConfig,
    boats: &'a [BoatSpec],
    packages: &'a [Package],
    pools: Pools,
    cache: EvalCache,
}

/// One priced candidate, before it is compared against the cascade bests.
struct Scored {
    key: Key,
    full_service: bool,
    zero_hub_pending: bool,
    all_boats_used: bool,
    distant_ok: bool,
}

pub(crate) fn optimize(
    geo: &Geography,
    cfg: &SolverConfig,
    boats: &[BoatSpec],
    packages: &[Package],
    pools: Pools,
) -> Option<Assignment> {
    let mut search = Search {
        geo,
        cfg,
        boats,
        packages,
        pools,
        cache: HashMap::new(),
    };

    let space = ((boats.len() + 1) as u128).checked_pow(packages.len() as u32);
    let exhaustive = space.is_some_and(|s| s <= cfg.max_assignment_space as u128);
    let digits = if exhaustive {
        search.enumerate()?
    } else {
        warn!(
            boats = boats.len(),
            packages = packages.len(),
            "assignment space above cutoff, using greedy best-fit"
        );
        search.greedy()?
    };

    Some(search.rebuild(digits))
}

impl<'a> Search<'a> {
    /// Exhaustive pass. Returns the winning digits of the first cascade
    /// tier with a feasible candidate; full-service tiers come first, the
    /// serve-or-drop tiers only apply when demand cannot all be placed.
    fn enumerate(&mut self) -> Option<Vec<usize>> {
        let tiers = CASCADE.len() * 2;
        let mut best: Vec<Option<(Key, Vec<usize>)>> = vec![None; tiers];

        let base = self.boats.len() + 1;
        let mut digits = vec![0usize; self.packages.len()];
        loop {
            if let Some(scored) = self.score(&digits) {
                for (tier, flags) in CASCADE.iter().enumerate() {
                    if scored.satisfies(flags) {
                        update(&mut best[tier], &scored.key, &digits);
                    }
                    if scored.satisfies_with_drops(flags) {
                        update(&mut best[CASCADE.len() + tier], &scored.key, &digits);
                    }
                }
            }
            if !increment(&mut digits, base) {
                break;
            }
        }

        let (tier, winner) = best
            .iter()
            .enumerate()
            .find_map(|(i, slot)| slot.as_ref().map(|(_, d)| (i, d.clone())))?;
        debug!(tier, "assignment cascade settled");
        Some(winner)
    }

    /// Deterministic fallback above the enumeration cutoff: packages are
    /// placed one by one on whichever boat prices best, in input order.
    fn greedy(&mut self) -> Option<Vec<usize>> {
        let unassigned = self.boats.len();
        let mut digits = vec![unassigned; self.packages.len()];
        for p in 0..self.packages.len() {
            let mut choice: Option<(Key, usize)> = None;
            for b in 0..self.boats.len() {
                digits[p] = b;
                if let Some(scored) = self.score(&digits)
                    && choice.as_ref().is_none_or(|(k, _)| scored.key.better_than(k))
                {
                    choice = Some((scored.key, b));
                }
            }
            digits[p] = choice.map(|(_, b)| b).unwrap_or(unassigned);
        }
        self.score(&digits).map(|_| digits)
    }

    /// Prices one candidate; `None` when any bundle is rejected.
    fn score(&mut self, digits: &[usize]) -> Option<Scored> {
        let boat_count = self.boats.len();
        let mut masks = vec![0u64; boat_count];
        let mut unserved_pax = 0u32;
        for (p, &digit) in digits.iter().enumerate() {
            if digit == boat_count {
                unserved_pax += self.packages[p].pax_total();
            } else {
                masks[digit] |= 1 << p;
            }
        }

        let mut hub = self.pools.hub_drop;
        let mut home = self.pools.ride_home;
        let mut total_distance = 0.0;
        let mut priority_time = 0.0;
        let mut pax_arrival = 0.0;
        let mut comfort = 0.0;
        let mut cluster = 0.0;
        let mut distant_routes = 0usize;
        let mut evaluated: Vec<Option<Evaluated>> = Vec::with_capacity(boat_count);

        for b in 0..boat_count {
            match self.eval_boat(b, masks[b], hub, home) {
                Err(_) => return None,
                Ok(None) => evaluated.push(None),
                Ok(Some(result)) => {
                    hub -= result.hub_drop_taken;
                    home -= result.ride_home_taken;
                    total_distance += result.distance;
                    priority_time += result.priority_time;
                    pax_arrival += result.pax_arrival;
                    comfort += result.comfort;
                    cluster += result.cluster_penalty;
                    if result.touches_distant {
                        distant_routes += 1;
                    }
                    evaluated.push(Some(result));
                }
            }
        }

        let consolidation =
            distant_routes.saturating_sub(1) as f64 * self.cfg.distant_consolidation_weight;
        let mix = self.priority_mix_penalty(digits, &evaluated);
        let cluster_weight = if boat_count <= 2 { 1.0 } else { 0.0 };
        let secondary = consolidation
            + mix
            + priority_time * self.cfg.priority_time_weight
            + comfort * self.cfg.comfort_weight
            + pax_arrival * self.cfg.pax_arrival_weight
            + cluster * cluster_weight;

        Some(Scored {
            key: Key {
                unserved_pax,
                pending_hub: hub,
                total_distance,
                secondary,
            },
            full_service: unserved_pax == 0,
            zero_hub_pending: hub == 0,
            all_boats_used: masks.iter().all(|&m| m != 0),
            distant_ok: distant_routes <= self.cfg.max_distant_boats,
        })
    }

    fn eval_boat(
        &mut self,
        boat: usize,
        mask: u64,
        hub: u32,
        home: u32,
    ) -> Result<Option<Evaluated>, evaluator::Reject> {
        let key = (boat, mask, hub, home);
        if !self.cache.contains_key(&key) {
            let bundle = self.bundle(mask);
            let result = evaluator::evaluate(
                self.geo,
                self.cfg,
                &self.boats[boat],
                &bundle,
                Pools {
                    hub_drop: hub,
                    ride_home: home,
                },
            );
            self.cache.insert(key, result);
        }
        match &self.cache[&key] {
            Err(reject) => Err(reject.clone()),
            Ok(result) => {
                let route = &result.route;
                let idle = route.pre_stops.is_empty()
                    && route.post_stops.is_empty()
                    && route.tmib_to_m9 == 0
                    && route.m9_pickup == 0;
                Ok(if idle { None } else { Some(result.clone()) })
            }
        }
    }

    fn bundle(&self, mask: u64) -> Vec<Demand> {
        let mut demands = Vec::new();
        for (p, package) in self.packages.iter().enumerate() {
            if mask & (1 << p) != 0 {
                demands.extend(package.demands.iter().cloned());
            }
        }
        demands
    }

    /// The flat charge for stranding a P2/P3 package on a boat without any
    /// P1 load while a P1 boat still had the seats for it.
    fn priority_mix_penalty(&self, digits: &[usize], evaluated: &[Option<Evaluated>]) -> f64 {
        let boat_count = self.boats.len();
        let p1_boats: Vec<usize> = digits
            .iter()
            .enumerate()
            .filter(|&(p, &d)| d < boat_count && self.packages[p].priorities().any(|pr| pr == 1))
            .map(|(_, &d)| d)
            .collect();
        if p1_boats.is_empty() {
            return 0.0;
        }
        for (p, &digit) in digits.iter().enumerate() {
            if digit >= boat_count || p1_boats.contains(&digit) {
                continue;
            }
            let package = &self.packages[p];
            let is_p23 = package.priorities().any(|pr| pr == 2 || pr == 3)
                && package.priorities().all(|pr| pr != 1);
            if !is_p23 {
                continue;
            }
            let would_fit = p1_boats.iter().any(|&b| {
                evaluated[b]
                    .as_ref()
                    .is_some_and(|e| e.spare >= package.tmib_total())
            });
            if would_fit {
                return self.cfg.priority_mix_penalty;
            }
        }
        0.0
    }

    /// Re-prices the winning digits and packages the result.
    fn rebuild(&mut self, digits: Vec<usize>) -> Assignment {
        let boat_count = self.boats.len();
        let mut masks = vec![0u64; boat_count];
        let mut unserved = Vec::new();
        for (p, &digit) in digits.iter().enumerate() {
            if digit == boat_count {
                unserved.push(p);
            } else {
                masks[digit] |= 1 << p;
            }
        }

        let mut hub = self.pools.hub_drop;
        let mut home = self.pools.ride_home;
        let mut routes = Vec::with_capacity(boat_count);
        let mut bundles = Vec::with_capacity(boat_count);
        let mut total_distance = 0.0;
        for b in 0..boat_count {
            let result = self
                .eval_boat(b, masks[b], hub, home)
                .expect("winning assignment re-evaluation cannot fail");
            if let Some(evaluated) = &result {
                hub -= evaluated.hub_drop_taken;
                home -= evaluated.ride_home_taken;
                total_distance += evaluated.distance;
            }
            bundles.push(self.bundle(masks[b]));
            routes.push(result);
        }

        Assignment {
            digits,
            routes,
            bundles,
            unserved,
            pending_hub: hub,
            pending_home: home,
            total_distance,
        }
    }
}

impl Scored {
    fn satisfies(&self, flags: &Flags) -> bool {
        self.full_service && self.constraints(flags)
    }

    fn satisfies_with_drops(&self, flags: &Flags) -> bool {
        self.constraints(flags)
    }

    fn constraints(&self, flags: &Flags) -> bool {
        (!flags.require_zero_m9 || self.zero_hub_pending)
            && (!flags.enforce_all || self.all_boats_used)
            && (!flags.enforce_distant || self.distant_ok)
    }
}

fn update(slot: &mut Option<(Key, Vec<usize>)>, key: &Key, digits: &[usize]) {
    if slot.as_ref().is_none_or(|(best, _)| key.better_than(best)) {
        *slot = Some((*key, digits.to_vec()));
    }
}

/// Little-endian base-`base` counter; false once it wraps to all zeros.
fn increment(digits: &mut [usize], base: usize) -> bool {
    for digit in digits.iter_mut() {
        *digit += 1;
        if *digit < base {
            return true;
        }
        *digit = 0;
    }
    false
}
