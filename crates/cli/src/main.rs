use roteiro::{
    Geography, Solver,
    geography::{TableConfig, source},
    scenario,
};
use std::{env, process, time::Instant};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt().init();

    let mut args = env::args().skip(1);
    let Some(scenario_path) = args.next() else {
        eprintln!("usage: roteiro-cli <scenario.csv> [tables-dir]");
        process::exit(2);
    };

    let geo = match args.next() {
        Some(dir) => {
            info!("Loading basin tables from {dir}");
            match source::load_dir(Geography::sergipe(), &dir, &TableConfig::default()) {
                Ok(geo) => geo,
                Err(err) => {
                    error!("Failed loading basin tables: {err}");
                    process::exit(1);
                }
            }
        }
        None => Geography::sergipe(),
    };

    let scenario = match scenario::from_csv_path(&scenario_path) {
        Ok(scenario) => scenario,
        Err(err) => {
            error!("Failed loading scenario: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = scenario.validate(&geo) {
        error!("Scenario rejected: {err}");
        process::exit(1);
    }

    info!(
        boats = scenario.boats.len(),
        demands = scenario.demands.len(),
        "Planning..."
    );
    let now = Instant::now();
    let plan = Solver::new(&geo).solve(&scenario);
    info!("Planning took {:?}", now.elapsed());

    print!("{}", plan.render());
}
