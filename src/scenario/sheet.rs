//! Scenario sheet parsing.
//!
//! The operator keeps the daily scenario in a fixed-layout sheet; this
//! module reads its CSV export. Layout: `C4` crew-change flag, `C5` M9
//! crew-change headcount, boat rows from row 9 (name / availability /
//! departure / optional fixed route in columns B..E), one blank row, then
//! demand rows (platform / M9 count / TMIB count / priority).

use std::{fs, io::Read, path::Path};

use super::{Boat, Demand, Error, Scenario};
use crate::shared::{Time, names};

const COL_B: usize = 1;
const COL_C: usize = 2;
const COL_D: usize = 3;
const COL_E: usize = 4;
const FIRST_BOAT_ROW: usize = 9;

pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Scenario, Error> {
    from_csv(fs::File::open(path)?)
}

pub fn from_csv<R: Read>(reader: R) -> Result<Scenario, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    let crew_change = parse_flag(&grid, 4, COL_C)?;
    let crew_change_m9 = if crew_change {
        parse_count(&grid, 5, COL_C, "M9 headcount")?
    } else {
        0
    };

    let mut boats = Vec::new();
    let mut row = FIRST_BOAT_ROW;
    while !cell(&grid, row, COL_B).is_empty() {
        boats.push(parse_boat(&grid, row)?);
        row += 1;
    }
    if boats.is_empty() {
        return Err(Error::NoBoats);
    }

    // One blank row delimits the boat block from the demand block.
    row += 1;
    let mut demands = Vec::new();
    while !cell(&grid, row, COL_B).is_empty() {
        demands.push(parse_demand(&grid, row)?);
        row += 1;
    }

    Ok(Scenario {
        crew_change,
        crew_change_m9,
        boats,
        demands,
    })
}

fn cell(grid: &[Vec<String>], row: usize, col: usize) -> &str {
    grid.get(row - 1)
        .and_then(|cells| cells.get(col))
        .map(String::as_str)
        .unwrap_or("")
}

fn parse_flag(grid: &[Vec<String>], row: usize, col: usize) -> Result<bool, Error> {
    let value = cell(grid, row, col);
    match value.to_uppercase().as_str() {
        "SIM" => Ok(true),
        "NÃO" | "NAO" | "" => Ok(false),
        _ => Err(Error::InvalidCell {
            row,
            col: 'C',
            what: "flag",
            value: value.to_string(),
        }),
    }
}

fn parse_count(
    grid: &[Vec<String>],
    row: usize,
    col: usize,
    what: &'static str,
) -> Result<u32, Error> {
    let value = cell(grid, row, col);
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| Error::InvalidCell {
        row,
        col: (b'A' + col as u8) as char,
        what,
        value: value.to_string(),
    })
}

fn parse_boat(grid: &[Vec<String>], row: usize) -> Result<Boat, Error> {
    let name = cell(grid, row, COL_B).to_string();
    let available = parse_flag(grid, row, COL_C)?;
    let departure_cell = cell(grid, row, COL_D);
    let departure = Time::from_hm(departure_cell).ok_or_else(|| Error::InvalidCell {
        row,
        col: 'D',
        what: "departure time",
        value: departure_cell.to_string(),
    })?;
    let fixed = cell(grid, row, COL_E);
    Ok(Boat {
        name,
        available,
        departure,
        fixed_route: (!fixed.is_empty()).then(|| fixed.to_string()),
    })
}

fn parse_demand(grid: &[Vec<String>], row: usize) -> Result<Demand, Error> {
    let platform = names::canonical_name(cell(grid, row, COL_B));
    let m9 = parse_count(grid, row, COL_C, "M9 count")?;
    let tmib = parse_count(grid, row, COL_D, "TMIB count")?;
    let priority_cell = cell(grid, row, COL_E);
    let priority: u8 = if priority_cell.is_empty() {
        0
    } else {
        priority_cell.parse().map_err(|_| Error::InvalidCell {
            row,
            col: 'E',
            what: "priority",
            value: priority_cell.to_string(),
        })?
    };
    Ok(Demand {
        platform: platform.into(),
        m9,
        tmib,
        priority,
    })
}
