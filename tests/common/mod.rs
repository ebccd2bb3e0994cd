//! Shared fixtures for the integration suites.

use roteiro::{
    Geography, Plan,
    plan::{PlannedRoute, Route, Stop},
    scenario::{Boat, Demand, Scenario},
    shared::Time,
};
use std::collections::HashMap;

pub fn boat(name: &str, departure: &str) -> Boat {
    Boat::new(name, Time::from_hm(departure).unwrap())
}

/// The snapshot case: three Surfers, 80 PAX over nine platforms plus six
/// M9-pool passengers riding home.
pub fn scenario_a() -> Scenario {
    Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![
            boat("1905", "06:30"),
            boat("1870", "07:20"),
            boat("1930", "07:30"),
        ],
        demands: vec![
            Demand::new("PCM-06", 0, 2, 0),
            Demand::new("PCM-05", 0, 3, 0),
            Demand::new("PDO-01", 2, 13, 0),
            Demand::new("PCM-03", 1, 10, 0),
            Demand::new("PCM-07", 0, 9, 0),
            Demand::new("PCM-04", 4, 5, 0),
            Demand::new("PCM-02", 0, 15, 0),
            Demand::new("PCB-01", 0, 3, 0),
            Demand::new("PCB-04", 1, 4, 0),
            Demand::new("TMIB", 6, 0, 0),
        ],
    }
}

/// Geography for the snapshot case. The PCM-06/PCB-01 service pair is not
/// in force on this board; PCM-02/PCM-03 remains.
pub fn geography_a() -> Geography {
    Geography::sergipe().with_mandatory_pairs(&[("PCM-02", "PCM-03")])
}

pub fn optimized(plan: &Plan) -> Vec<&Route> {
    plan.routes
        .iter()
        .filter_map(|route| match route {
            PlannedRoute::Optimized(route) => Some(route),
            PlannedRoute::Fixed { .. } => None,
        })
        .collect()
}

pub fn route_platforms(route: &Route) -> Vec<&str> {
    route
        .pre_stops
        .iter()
        .chain(route.post_stops.iter())
        .map(|stop| &**stop.platform())
        .collect()
}

/// Total TMIB-pool drops per platform across the whole plan.
pub fn tmib_drops(plan: &Plan) -> HashMap<String, u32> {
    let mut drops: HashMap<String, u32> = HashMap::new();
    for route in optimized(plan) {
        for stop in route.pre_stops.iter().chain(route.post_stops.iter()) {
            *drops.entry(stop.platform().to_string()).or_default() += stop.tmib_drop();
        }
    }
    drops
}

/// Total M9-pool drops per platform across the whole plan.
pub fn m9_drops(plan: &Plan) -> HashMap<String, u32> {
    let mut drops: HashMap<String, u32> = HashMap::new();
    for route in optimized(plan) {
        for stop in &route.post_stops {
            *drops.entry(stop.platform().to_string()).or_default() += stop.m9_drop();
        }
    }
    drops
}

fn capacity_of(name: &str) -> u32 {
    let upper = name.to_uppercase();
    if upper.contains("AQUA") && upper.contains("HELIX") {
        100
    } else {
        24
    }
}

/// The plan-level invariants every valid output satisfies.
pub fn check_invariants(geo: &Geography, scenario: &Scenario, plan: &Plan) {
    let tmib = tmib_drops(plan);
    let m9 = m9_drops(plan);
    for demand in &scenario.demands {
        let platform: &str = &demand.platform;
        if platform == "TMIB" || platform == "PCM-09" {
            continue;
        }
        assert!(
            tmib.get(platform).copied().unwrap_or(0) <= demand.tmib,
            "TMIB drops at {platform} exceed demand"
        );
        assert!(
            m9.get(platform).copied().unwrap_or(0) <= demand.m9,
            "M9 drops at {platform} exceed demand"
        );
    }

    for route in optimized(plan) {
        let capacity = capacity_of(&route.boat);
        assert!(
            route.pre_load() <= capacity && route.post_load() <= capacity,
            "route {} overloaded",
            route.boat
        );
        let downstream: u32 = route.post_stops.iter().map(Stop::m9_drop).sum();
        if downstream > 0 {
            assert!(route.uses_hub, "M9 drops on {} without a hub call", route.boat);
            assert!(
                route.m9_pickup >= downstream,
                "hub pickup on {} below downstream drops",
                route.boat
            );
        }
        if capacity_of(&route.boat) == 100 {
            for stop in route.pre_stops.iter().chain(route.post_stops.iter()) {
                assert!(
                    geo.is_gangway(stop.platform()),
                    "aqua route stops at non-gangway {}",
                    stop.platform()
                );
            }
        }
        if !route.uses_hub {
            assert_eq!(route.m9_pickup, 0);
            assert_eq!(route.tmib_to_m9, 0);
        }
    }

    let departures: Vec<u32> = plan
        .routes
        .iter()
        .map(|route| route.departure().as_minutes())
        .collect();
    assert!(
        departures.windows(2).all(|w| w[0] <= w[1]),
        "routes not sorted by departure"
    );
}
