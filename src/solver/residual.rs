//! Residual demand fill.
//!
//! After the combinatorial phase, demand left on the quay is pushed into
//! committed routes with spare seats: candidate routes in departure order,
//! demands in scenario order, partial amounts allowed. Every insertion is
//! re-priced through the evaluator, which re-splits and re-sequences the
//! route and enforces gangway and capacity.

use crate::{geography::Geography, scenario::Demand};

use super::{
    SolverConfig,
    evaluator::{self, BoatSpec, Evaluated, Pools},
};

/// A route the pipeline has settled on, still tied to the bundle that
/// produced it so later phases can re-evaluate.
#[derive(Debug, Clone)]
pub(crate) struct Committed {
    pub spec: BoatSpec,
    pub bundle: Vec<Demand>,
    pub evaluated: Evaluated,
}

pub(crate) fn fill(
    geo: &Geography,
    cfg: &SolverConfig,
    committed: &mut [Committed],
    leftovers: &mut Vec<Demand>,
    pools: &mut Pools,
) {
    let mut order: Vec<usize> = (0..committed.len()).collect();
    order.sort_by_key(|&i| committed[i].spec.departure.as_minutes());

    for demand in leftovers.iter_mut() {
        for &i in &order {
            if demand.tmib == 0 && demand.m9 == 0 {
                break;
            }
            try_insert(geo, cfg, &mut committed[i], demand, pools);
        }
    }
    leftovers.retain(|d| d.tmib > 0 || d.m9 > 0);
}

fn try_insert(
    geo: &Geography,
    cfg: &SolverConfig,
    committed: &mut Committed,
    demand: &mut Demand,
    pools: &mut Pools,
) {
    if committed.spec.is_aqua() && !geo.is_gangway(&demand.platform) {
        return;
    }
    if !cluster_fits(geo, committed, &demand.platform) {
        return;
    }
    let spare = committed.evaluated.spare;
    if spare == 0 {
        return;
    }
    let take_tmib = demand.tmib.min(spare);
    let take_m9 = demand.m9.min(spare - take_tmib);
    if take_tmib + take_m9 == 0 {
        return;
    }

    let mut bundle = committed.bundle.clone();
    bundle.push(Demand {
        platform: demand.platform.clone(),
        m9: take_m9,
        tmib: take_tmib,
        priority: demand.priority,
    });
    // Re-offer exactly the pool share this route already carries; anything
    // the tighter load can no longer take flows back to the pools.
    let taken = Pools {
        hub_drop: committed.evaluated.hub_drop_taken,
        ride_home: committed.evaluated.ride_home_taken,
    };
    let Ok(evaluated) = evaluator::evaluate(geo, cfg, &committed.spec, &bundle, taken) else {
        return;
    };
    pools.hub_drop += taken.hub_drop - evaluated.hub_drop_taken;
    pools.ride_home += taken.ride_home - evaluated.ride_home_taken;
    demand.tmib -= take_tmib;
    demand.m9 -= take_m9;
    committed.bundle = bundle;
    committed.evaluated = evaluated;
}

/// The inserted platform must share a cluster with the route or be
/// compatible with one already visited. A route with no stops yet (a pure
/// hub shuttle) accepts anything.
fn cluster_fits(geo: &Geography, committed: &Committed, platform: &str) -> bool {
    let cluster = geo.cluster(platform);
    let route = &committed.evaluated.route;
    let mut any = false;
    for stop in route.pre_stops.iter().chain(route.post_stops.iter()) {
        any = true;
        let on_route = geo.cluster(stop.platform());
        if on_route == cluster || on_route.compatible(cluster) {
            return true;
        }
    }
    !any
}
