//! The planning pipeline.
//!
//! Phases, in order: fixed-route subtraction, fleet partition, the Aqua
//! direct phase, the optional distant-dedication phase, the combinatorial
//! assignment over what remains, residual fill into spare seats, one final
//! sequencing pass and report assembly. The whole run is synchronous and
//! deterministic.

mod assign;
mod evaluator;
mod fixed;
mod packages;
mod residual;
mod sequencer;

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    geography::{BoatKind, Geography, HUB, TMIB},
    plan::{Plan, PlannedRoute, Warning},
    scenario::{Demand, Scenario},
    shared::Distance,
};

use evaluator::{BoatSpec, Pools};
use residual::Committed;
use sequencer::SeqStop;

/// Every constant the pipeline steers by, in one immutable value.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Substitute for absent distance-matrix entries, NM.
    pub sentinel_nm: f64,
    /// Stop overhead per passenger moved, minutes.
    pub pax_stop_minutes: u32,
    /// Extra approach overhead for Aqua-class boats, every stop.
    pub aqua_stop_minutes: u32,
    /// Largest unprioritized segment ordered by exhaustive search.
    pub plain_sequence_cutoff: usize,
    /// Largest prioritized segment ordered by exhaustive search.
    pub priority_sequence_cutoff: usize,
    pub priority_time_weight: f64,
    pub pax_arrival_weight: f64,
    pub comfort_weight: f64,
    pub backtrack_weight: f64,
    pub p1_precedence_weight: f64,
    /// Split-estimate charge per platform visited in both segments.
    pub loop_visit_nm: f64,
    /// Solo-detour ceiling for pulling a P1 stop before the hub.
    pub p1_promotion_detour_nm: f64,
    /// Charge per distant-cluster route beyond the first.
    pub distant_consolidation_weight: f64,
    pub priority_mix_penalty: f64,
    pub cluster_switch_compatible: f64,
    pub cluster_switch_incompatible: f64,
    pub cluster_jump_weight: f64,
    pub cluster_jump_slack_nm: f64,
    /// Routes allowed to touch distant clusters under the strict pass.
    pub max_distant_boats: usize,
    /// Reserve one boat for distant clusters up front. Off in production.
    pub distant_dedication: bool,
    /// Fleet size at or under which the scarcity split applies.
    pub scarcity_fleet_cutoff: usize,
    pub scarcity_split_min: u32,
    pub scarcity_split_head: u32,
    /// Assignment candidates beyond which the greedy fallback takes over.
    pub max_assignment_space: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sentinel_nm: 999.0,
            pax_stop_minutes: 1,
            aqua_stop_minutes: 25,
            plain_sequence_cutoff: 6,
            priority_sequence_cutoff: 7,
            priority_time_weight: 0.05,
            pax_arrival_weight: 0.10,
            comfort_weight: 0.02,
            backtrack_weight: 10.0,
            p1_precedence_weight: 250.0,
            loop_visit_nm: 2.0,
            p1_promotion_detour_nm: 1.5,
            distant_consolidation_weight: 5.0,
            priority_mix_penalty: 120.0,
            cluster_switch_compatible: 8.0,
            cluster_switch_incompatible: 24.0,
            cluster_jump_weight: 4.0,
            cluster_jump_slack_nm: 1.5,
            max_distant_boats: 2,
            distant_dedication: false,
            scarcity_fleet_cutoff: 2,
            scarcity_split_min: 12,
            scarcity_split_head: 4,
            max_assignment_space: 4_000_000,
        }
    }
}

/// The planner. Short-lived: borrow a [`Geography`], call
/// [`solve`](Solver::solve) per scenario.
pub struct Solver<'a> {
    geo: &'a Geography,
    config: SolverConfig,
}

impl<'a> Solver<'a> {
    pub fn new(geo: &'a Geography) -> Self {
        Self {
            geo,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solve(&self, scenario: &Scenario) -> Plan {
        let geo = self.geo;
        let cfg = &self.config;
        let mut warnings: Vec<Warning> = Vec::new();
        let mut routes: Vec<PlannedRoute> = Vec::new();

        // The hub and terminal rows are inventories, not destinations.
        let mut pools = Pools::default();
        let mut demands: Vec<Demand> = Vec::new();
        for demand in &scenario.demands {
            match &*demand.platform {
                HUB => pools.hub_drop += demand.tmib,
                TMIB => pools.ride_home += demand.m9,
                _ => demands.push(demand.clone()),
            }
        }
        let had_demand =
            !demands.is_empty() || pools.hub_drop > 0 || pools.ride_home > 0;

        // Fixed routes ship as written; their drops leave the demand board.
        for boat in &scenario.boats {
            if !boat.available {
                continue;
            }
            let Some(text) = &boat.fixed_route else {
                continue;
            };
            fixed::subtract_fixed(&boat.name, text, &mut demands, &mut pools, &mut warnings);
            routes.push(PlannedRoute::Fixed {
                boat: boat.name.clone(),
                departure: boat.departure,
                text: text.clone(),
            });
        }

        // Surfers first, Aquas after, each wave by departure.
        let mut surfers: Vec<BoatSpec> = Vec::new();
        let mut aquas: Vec<BoatSpec> = Vec::new();
        for boat in &scenario.boats {
            if !boat.available || boat.fixed_route.is_some() {
                continue;
            }
            let spec = BoatSpec::resolve(boat, geo);
            if spec.is_aqua() {
                aquas.push(spec);
            } else {
                surfers.push(spec);
            }
        }
        surfers.sort_by_key(|s| s.departure.as_minutes());
        aquas.sort_by_key(|s| s.departure.as_minutes());

        let mut committed: Vec<Committed> = Vec::new();
        let mut fleet = surfers;
        for aqua in aquas {
            match self.aqua_direct(&aqua, &mut demands) {
                Some(direct) => {
                    info!(boat = %aqua.name, "aqua direct route committed");
                    committed.push(direct);
                }
                None => fleet.push(aqua),
            }
        }

        if cfg.distant_dedication {
            self.dedicate_distant(&mut fleet, &mut demands, &mut pools, &mut committed);
        }

        // Combinatorial phase.
        let max_capacity = fleet.iter().map(|s| s.capacity).max().unwrap_or(0);
        let formed = packages::form_packages(geo, cfg, &demands, max_capacity, fleet.len());
        debug!(packages = formed.len(), boats = fleet.len(), "combinatorial phase");
        let mut leftovers: Vec<Demand> = Vec::new();
        if fleet.is_empty() {
            leftovers = demands.clone();
        } else {
            match assign::optimize(geo, cfg, &fleet, &formed, pools) {
                Some(assignment) => {
                    for (b, evaluated) in assignment.routes.iter().enumerate() {
                        if let Some(evaluated) = evaluated {
                            committed.push(Committed {
                                spec: fleet[b].clone(),
                                bundle: assignment.bundles[b].clone(),
                                evaluated: evaluated.clone(),
                            });
                        }
                    }
                    pools = Pools {
                        hub_drop: assignment.pending_hub,
                        ride_home: assignment.pending_home,
                    };
                    for &p in &assignment.unserved {
                        leftovers.extend(formed[p].demands.iter().cloned());
                    }
                }
                None => leftovers = demands.clone(),
            }
        }

        residual::fill(geo, cfg, &mut committed, &mut leftovers, &mut pools);

        // Final sequencing pass over every settled route.
        for entry in &mut committed {
            let taken = Pools {
                hub_drop: entry.evaluated.hub_drop_taken,
                ride_home: entry.evaluated.ride_home_taken,
            };
            if let Ok(evaluated) =
                evaluator::evaluate(geo, cfg, &entry.spec, &entry.bundle, taken)
            {
                entry.evaluated = evaluated;
            }
        }

        self.warn_missing_distances(&committed, &mut warnings);
        let serving: Vec<&str> = committed.iter().map(|c| c.spec.name.as_str()).collect();
        for boat in &scenario.boats {
            if boat.available
                && boat.fixed_route.is_none()
                && boat.kind() == BoatKind::AquaHelix
                && !serving.contains(&boat.name.as_str())
                && had_demand
            {
                warnings.push(Warning::AquaUnused {
                    boat: boat.name.clone(),
                });
            }
        }

        unmet_warnings(&leftovers, pools, &mut warnings);

        let total: Distance = committed
            .iter()
            .map(|c| c.evaluated.route.distance)
            .sum();
        routes.extend(
            committed
                .into_iter()
                .map(|c| PlannedRoute::Optimized(c.evaluated.route)),
        );
        routes.sort_by_key(|r| r.departure().as_minutes());

        Plan {
            routes,
            warnings,
            total,
            crew_change_m9: scenario.crew_change.then_some(scenario.crew_change_m9),
        }
    }

    /// An Aqua serving only gangway platforms may skip the hub entirely
    /// when the direct tour is shorter than going out through M9.
    fn aqua_direct(&self, aqua: &BoatSpec, demands: &mut Vec<Demand>) -> Option<Committed> {
        let geo = self.geo;
        let cfg = &self.config;
        let eligible: Vec<usize> = (0..demands.len())
            .filter(|&i| {
                let d = &demands[i];
                d.m9 == 0
                    && d.tmib > 0
                    && geo.is_gangway(&d.platform)
                    && !geo.cluster(&d.platform).is_distant()
            })
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let load: u32 = eligible.iter().map(|&i| demands[i].tmib).sum();
        if load > aqua.capacity {
            return None;
        }
        let bundle: Vec<Demand> = eligible.iter().map(|&i| demands[i].clone()).collect();
        let evaluated = evaluator::evaluate(geo, cfg, aqua, &bundle, Pools::default()).ok()?;

        // The alternative: out to the hub first, then the same stops.
        let stops: Vec<SeqStop> = bundle
            .iter()
            .map(|d| SeqStop {
                platform: d.platform.clone(),
                pax: d.tmib,
                priority: d.priority,
            })
            .collect();
        let via_seq = sequencer::order_stops(geo, cfg, HUB, &stops, aqua.speed_kn, true);
        let via = sequencer::dist(geo, cfg, TMIB, HUB)
            + sequencer::leg_metrics(geo, cfg, HUB, &via_seq, aqua.speed_kn, true, 0, load)
                .distance;
        if evaluated.distance >= via {
            return None;
        }

        let mut keep = 0usize;
        demands.retain(|_| {
            let retain = !eligible.contains(&keep);
            keep += 1;
            retain
        });
        Some(Committed {
            spec: aqua.clone(),
            bundle,
            evaluated,
        })
    }

    /// Feature-flagged: hand the whole distant board to the first boat
    /// that can carry it.
    fn dedicate_distant(
        &self,
        fleet: &mut Vec<BoatSpec>,
        demands: &mut Vec<Demand>,
        pools: &mut Pools,
        committed: &mut Vec<Committed>,
    ) {
        let geo = self.geo;
        let cfg = &self.config;
        let distant: Vec<Demand> = demands
            .iter()
            .filter(|d| geo.cluster(&d.platform).is_distant())
            .cloned()
            .collect();
        if distant.is_empty() {
            return;
        }
        for i in 0..fleet.len() {
            let Ok(evaluated) = evaluator::evaluate(geo, cfg, &fleet[i], &distant, *pools) else {
                continue;
            };
            pools.hub_drop -= evaluated.hub_drop_taken;
            pools.ride_home -= evaluated.ride_home_taken;
            demands.retain(|d| !geo.cluster(&d.platform).is_distant());
            let spec = fleet.remove(i);
            info!(boat = %spec.name, "distant clusters dedicated");
            committed.push(Committed {
                spec,
                bundle: distant,
                evaluated,
            });
            return;
        }
    }

    fn warn_missing_distances(&self, committed: &[Committed], warnings: &mut Vec<Warning>) {
        for entry in committed {
            let route = &entry.evaluated.route;
            let mut legs: Vec<Arc<str>> = vec![Arc::from(TMIB)];
            legs.extend(route.pre_stops.iter().map(|s| s.platform().clone()));
            if route.uses_hub {
                legs.push(Arc::from(HUB));
            }
            legs.extend(route.post_stops.iter().map(|s| s.platform().clone()));
            for pair in legs.windows(2) {
                if self.geo.distance_entry(&pair[0], &pair[1]).is_none() {
                    let warning = Warning::MissingDistance {
                        from: pair[0].clone(),
                        to: pair[1].clone(),
                    };
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
            }
        }
    }
}

/// One warning line per platform still owed passengers, in board order.
fn unmet_warnings(leftovers: &[Demand], pools: Pools, warnings: &mut Vec<Warning>) {
    let mut seen: Vec<Arc<str>> = Vec::new();
    for demand in leftovers {
        if seen.contains(&demand.platform) {
            continue;
        }
        seen.push(demand.platform.clone());
        let tmib: u32 = leftovers
            .iter()
            .filter(|d| d.platform == demand.platform)
            .map(|d| d.tmib)
            .sum();
        let m9: u32 = leftovers
            .iter()
            .filter(|d| d.platform == demand.platform)
            .map(|d| d.m9)
            .sum();
        if tmib > 0 {
            warnings.push(Warning::UnmetTmib {
                platform: demand.platform.clone(),
                count: tmib,
            });
        }
        if m9 > 0 {
            warnings.push(Warning::UnmetM9 {
                platform: demand.platform.clone(),
                count: m9,
            });
        }
    }
    if pools.hub_drop > 0 {
        warnings.push(Warning::UnmetHubDrop {
            count: pools.hub_drop,
        });
    }
    if pools.ride_home > 0 {
        warnings.push(Warning::UnmetRideHome {
            count: pools.ride_home,
        });
    }
}
