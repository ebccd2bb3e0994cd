mod common;

use common::*;
use roteiro::{
    Geography, Solver, SolverConfig,
    plan::{PlannedRoute, Warning},
    scenario::{Demand, Scenario},
};

#[test]
fn scenario_a_serves_everything_on_three_routes() {
    let geo = geography_a();
    let scenario = scenario_a();
    let plan = Solver::new(&geo).solve(&scenario);

    check_invariants(&geo, &scenario, &plan);
    let routes = optimized(&plan);
    assert_eq!(routes.len(), 3);
    assert!(plan.warnings.is_empty(), "warnings: {:?}", plan.warnings);

    // Every passenger delivered.
    let tmib = tmib_drops(&plan);
    let m9 = m9_drops(&plan);
    for demand in &scenario.demands {
        let platform: &str = &demand.platform;
        if platform == "TMIB" {
            continue;
        }
        assert_eq!(tmib.get(platform).copied().unwrap_or(0), demand.tmib);
        assert_eq!(m9.get(platform).copied().unwrap_or(0), demand.m9);
    }

    // All six ride-home passengers found hub pickups.
    let picked_up: u32 = routes.iter().map(|r| r.m9_pickup).sum();
    let m9_total: u32 = scenario.demands.iter().map(|d| d.m9).sum();
    assert_eq!(picked_up, m9_total);
}

#[test]
fn scenario_a_loops_m3_through_both_segments() {
    let geo = geography_a();
    let plan = Solver::new(&geo).solve(&scenario_a());

    let routes = optimized(&plan);
    let loop_route = routes
        .iter()
        .find(|route| {
            route
                .pre_stops
                .iter()
                .any(|s| &**s.platform() == "PCM-03")
        })
        .expect("a route drops PCM-03 before the hub");
    // TMIB share out on the way, M9 share on the way back.
    let pre = loop_route
        .pre_stops
        .iter()
        .find(|s| &**s.platform() == "PCM-03")
        .unwrap();
    assert_eq!(pre.tmib_drop(), 10);
    let post = loop_route
        .post_stops
        .iter()
        .find(|s| &**s.platform() == "PCM-03")
        .expect("PCM-03 appears again after the hub");
    assert_eq!(post.m9_drop(), 1);
    assert_eq!(post.tmib_drop(), 0);
}

#[test]
fn scenario_a_keeps_b_cluster_away_from_the_west_group() {
    let geo = geography_a();
    let plan = Solver::new(&geo).solve(&scenario_a());

    for route in optimized(&plan) {
        let platforms = route_platforms(route);
        let has_b = platforms
            .iter()
            .any(|p| *p == "PCB-01" || *p == "PCB-04");
        let has_west = platforms
            .iter()
            .any(|p| *p == "PCM-06" || *p == "PCM-05" || *p == "PDO-01");
        assert!(
            !(has_b && has_west),
            "B cluster shares a route with the west group: {platforms:?}"
        );
    }
}

#[test]
fn scenario_b_priority_ones_are_not_served_last() {
    let geo = geography_a();
    let mut scenario = scenario_a();
    for demand in &mut scenario.demands {
        if &*demand.platform == "PCM-07" || &*demand.platform == "PDO-01" {
            demand.priority = 1;
        }
    }
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);
    assert!(plan.warnings.is_empty());

    for target in ["PCM-07", "PDO-01"] {
        let route = optimized(&plan)
            .into_iter()
            .find(|route| route_platforms(route).contains(&target))
            .expect("priority demand is served");
        let platforms = route_platforms(&route);
        assert!(platforms.len() > 1, "{target} rides alone");
        assert_ne!(
            *platforms.last().unwrap(),
            target,
            "{target} was left for last: {platforms:?}"
        );
    }
}

#[test]
fn scenario_c_scarcity_split_and_capacity_warnings() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![
            Demand::new("PCM-02", 0, 16, 0),
            Demand::new("PCM-04", 0, 12, 0),
            Demand::new("PCM-05", 0, 12, 0),
            Demand::new("PCM-07", 0, 10, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);

    let routes = optimized(&plan);
    assert_eq!(routes.len(), 2);
    // Both boats leave full; two passengers stay on the quay.
    for route in &routes {
        assert_eq!(route.boarded_at_tmib(), 24, "{}", route.boat);
    }
    assert_eq!(
        plan.warnings,
        vec![Warning::UnmetTmib {
            platform: "PCM-02".into(),
            count: 2,
        }]
    );
    // The split put PCM-02 pax on both boats.
    let on_both = routes
        .iter()
        .filter(|route| route_platforms(route).contains(&"PCM-02"))
        .count();
    assert_eq!(on_both, 2);
    let tmib = tmib_drops(&plan);
    assert_eq!(tmib["PCM-02"], 14);
}

#[test]
fn scenario_d_fixed_route_is_verbatim_and_subtracted() {
    let geo = Geography::sergipe();
    let mut fixed_boat = boat("1905", "06:30");
    fixed_boat.fixed_route = Some("TMIB +10/M6 -4/M9 -6".to_string());
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![fixed_boat, boat("1870", "07:20")],
        demands: vec![
            Demand::new("PCM-06", 0, 10, 0),
            Demand::new("PCM-02", 0, 8, 0),
            Demand::new("PCM-09", 0, 6, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    assert!(plan.warnings.is_empty(), "warnings: {:?}", plan.warnings);

    match &plan.routes[0] {
        PlannedRoute::Fixed { boat, text, .. } => {
            assert_eq!(boat, "1905");
            assert_eq!(text, "TMIB +10/M6 -4/M9 -6");
        }
        other => panic!("expected the fixed route first, got {other:?}"),
    }

    // The other boat covers only the residue: 6 for PCM-06, 8 for PCM-02.
    let routes = optimized(&plan);
    assert_eq!(routes.len(), 1);
    let tmib = tmib_drops(&plan);
    assert_eq!(tmib["PCM-06"], 6);
    assert_eq!(tmib["PCM-02"], 8);
    // The hub backlog was fully covered by the fixed route.
    assert!(!routes[0].uses_hub);
}

#[test]
fn scenario_e_aqua_goes_direct_when_shorter() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("AQUA HELIX I", "06:30")],
        demands: vec![
            Demand::new("PCM-02", 0, 30, 0),
            Demand::new("PCM-04", 0, 20, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);
    assert!(plan.warnings.is_empty());

    let routes = optimized(&plan);
    assert_eq!(routes.len(), 1);
    let route = routes[0];
    assert!(!route.uses_hub, "direct tour should skip the hub");
    assert_eq!(route_platforms(route), ["PCM-02", "PCM-04"]);
    // TMIB -> M2 -> M4, not the 15 NM hub variant.
    assert!((route.distance.as_nm() - 11.0).abs() < 1e-9);
}

#[test]
fn scenario_f_routes_around_a_missing_distance_entry() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![
            Demand::new("PGA-07", 0, 5, 0),
            Demand::new("PDO-02", 0, 5, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);
    assert!(plan.warnings.is_empty(), "warnings: {:?}", plan.warnings);

    // One distant field per boat; the untabled PGA-07/PDO-02 leg is never
    // sailed.
    let routes = optimized(&plan);
    assert_eq!(routes.len(), 2);
    for route in &routes {
        let platforms = route_platforms(route);
        assert_eq!(platforms.len(), 1);
    }
    assert!(plan.total.as_nm() < 100.0);
}

#[test]
fn scenario_f_forced_onto_the_sentinel_edge() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30")],
        demands: vec![
            Demand::new("PGA-07", 0, 5, 0),
            Demand::new("PDO-02", 0, 5, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);

    let routes = optimized(&plan);
    assert_eq!(routes.len(), 1);
    assert_eq!(route_platforms(&routes[0]).len(), 2);
    // The sentinel leg shows up in the total and in a warning.
    assert!(plan.total.as_nm() > 999.0);
    assert!(
        plan.warnings
            .iter()
            .any(|w| matches!(w, Warning::MissingDistance { .. })),
        "warnings: {:?}",
        plan.warnings
    );
}

#[test]
fn greedy_fallback_still_serves_the_board() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![
            Demand::new("PCM-02", 0, 8, 0),
            Demand::new("PCM-03", 0, 6, 0),
            Demand::new("PCM-05", 0, 3, 0),
            Demand::new("PCM-06", 0, 2, 0),
        ],
    };
    let config = SolverConfig {
        max_assignment_space: 1,
        ..Default::default()
    };
    let plan = Solver::new(&geo).with_config(config).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);

    let tmib = tmib_drops(&plan);
    assert_eq!(tmib["PCM-02"], 8);
    assert_eq!(tmib["PCM-03"], 6);
    assert_eq!(tmib["PCM-05"], 3);
    assert_eq!(tmib["PCM-06"], 2);
}
