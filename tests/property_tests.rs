mod common;

use common::*;
use roteiro::{
    Geography, Solver,
    plan::Warning,
    scenario::{Demand, Scenario},
};

#[test]
fn identical_input_renders_byte_identical_output() {
    let geo = geography_a();
    let scenario = scenario_a();
    let first = Solver::new(&geo).solve(&scenario).render();
    let second = Solver::new(&geo).solve(&scenario).render();
    assert_eq!(first, second);
}

#[test]
fn zero_demand_is_a_bare_header() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    assert!(plan.routes.is_empty());
    assert!(plan.warnings.is_empty());
    assert_eq!(plan.render(), "DISTRIBUICAO DE PAX\n");
}

#[test]
fn single_boat_single_destination_goes_direct() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30")],
        demands: vec![Demand::new("PCM-03", 0, 8, 0)],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);

    let routes = optimized(&plan);
    assert_eq!(routes.len(), 1);
    let route = routes[0];
    assert!(!route.uses_hub);
    assert_eq!(route_platforms(route), ["PCM-03"]);
    assert_eq!(route.to_string(), "1905 06:30 TMIB +8/M3 -8");
}

#[test]
fn aqua_without_gangway_demand_stays_in_port() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("AQUA HELIX I", "06:30")],
        demands: vec![Demand::new("PCM-06", 0, 5, 0)],
    };
    let plan = Solver::new(&geo).solve(&scenario);

    assert!(optimized(&plan).is_empty());
    assert!(plan.warnings.contains(&Warning::AquaUnused {
        boat: "AQUA HELIX I".to_string(),
    }));
    assert!(plan.warnings.contains(&Warning::UnmetTmib {
        platform: "PCM-06".into(),
        count: 5,
    }));
}

#[test]
fn mandatory_pair_rides_the_same_boat() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![
            Demand::new("PCM-02", 0, 8, 0),
            Demand::new("PCM-06", 0, 5, 0),
            Demand::new("PCM-03", 0, 9, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    check_invariants(&geo, &scenario, &plan);
    assert!(plan.warnings.is_empty());

    let route_of = |platform: &str| {
        optimized(&plan)
            .into_iter()
            .position(|route| route_platforms(route).contains(&platform))
            .unwrap_or_else(|| panic!("{platform} unserved"))
    };
    assert_eq!(route_of("PCM-02"), route_of("PCM-03"));
}

#[test]
fn priority_mix_keeps_p2_with_p1_when_it_fits() {
    // Equilateral board: every grouping sails the same distance, so only
    // the soft criteria separate the candidates.
    let geo = Geography::new()
        .with_distance("TMIB", "ALFA", 5.0)
        .with_distance("TMIB", "BRAVO", 5.0)
        .with_distance("TMIB", "FOXTROT", 5.0)
        .with_distance("ALFA", "BRAVO", 10.0)
        .with_distance("ALFA", "FOXTROT", 10.0)
        .with_distance("BRAVO", "FOXTROT", 10.0);
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30"), boat("1870", "07:20")],
        demands: vec![
            Demand::new("ALFA", 0, 4, 1),
            Demand::new("BRAVO", 0, 4, 2),
            Demand::new("FOXTROT", 0, 8, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);

    let route_of = |platform: &str| {
        optimized(&plan)
            .into_iter()
            .position(|route| route_platforms(route).contains(&platform))
            .unwrap_or_else(|| panic!("{platform} unserved"))
    };
    assert_eq!(route_of("ALFA"), route_of("BRAVO"));
    assert_ne!(route_of("ALFA"), route_of("FOXTROT"));
}

#[test]
fn crew_change_line_rides_the_report() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: true,
        crew_change_m9: 18,
        boats: vec![boat("1905", "06:30")],
        demands: vec![Demand::new("PCM-03", 0, 4, 0)],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    let report = plan.render();
    assert!(report.starts_with("DISTRIBUICAO DE PAX\nTroca de turma: 18 PAX M9\n"));
}

#[test]
fn report_lists_routes_by_departure_time() {
    let geo = geography_a();
    let scenario = scenario_a();
    let plan = Solver::new(&geo).solve(&scenario);
    let report = plan.render();

    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "DISTRIBUICAO DE PAX");
    assert!(lines[1].starts_with("1905 06:30 TMIB +"));
    assert!(lines[2].starts_with("1870 07:20 TMIB +"));
    assert!(lines[3].starts_with("1930 07:30 TMIB +"));
    assert!(lines.last().unwrap().starts_with("TOTAL: "));
}

#[test]
fn ride_home_pool_without_a_hub_route_is_reported() {
    let geo = Geography::sergipe();
    let scenario = Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![boat("1905", "06:30")],
        demands: vec![
            Demand::new("PCM-03", 0, 4, 0),
            Demand::new("TMIB", 5, 0, 0),
        ],
    };
    let plan = Solver::new(&geo).solve(&scenario);
    // The only demand is TMIB-only, so no route calls at the hub and the
    // ride-home passengers wait for the next day.
    assert!(plan.warnings.contains(&Warning::UnmetRideHome { count: 5 }));
}
