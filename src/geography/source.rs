//! CSV sources for the basin tables.
//!
//! Each table is a plain headered CSV file in one directory. Missing files
//! leave the corresponding table at its built-in default, so a deployment
//! can override only the distance matrix, or only the gangway list.

use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use tracing::info;

use super::{Cluster, Error, Geography};
use crate::shared::names;

pub struct TableConfig {
    pub distances_file_name: String,
    pub clusters_file_name: String,
    pub gangway_file_name: String,
    pub speeds_file_name: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            distances_file_name: "distances.csv".into(),
            clusters_file_name: "clusters.csv".into(),
            gangway_file_name: "gangway.csv".into(),
            speeds_file_name: "speeds.csv".into(),
        }
    }
}

#[derive(serde::Deserialize)]
struct DistanceRow {
    from: String,
    to: String,
    nm: f64,
}

#[derive(serde::Deserialize)]
struct ClusterRow {
    platform: String,
    cluster: Cluster,
}

/// Gangway rows use the short display form, matching the operator's sheet.
#[derive(serde::Deserialize)]
struct GangwayRow {
    platform: String,
}

#[derive(serde::Deserialize)]
struct SpeedRow {
    boat: String,
    kn: f64,
}

/// Loads basin tables from `dir` on top of `base`.
pub fn load_dir<P: AsRef<Path>>(
    base: Geography,
    dir: P,
    config: &TableConfig,
) -> Result<Geography, Error> {
    let dir = dir.as_ref();
    let mut geo = base;

    if let Some(rows) = read_rows::<DistanceRow>(&dir.join(&config.distances_file_name))? {
        info!("Loading {} distance entries", rows.len());
        for row in rows {
            geo = geo.with_distance(&row.from, &row.to, row.nm);
        }
    }
    if let Some(rows) = read_rows::<ClusterRow>(&dir.join(&config.clusters_file_name))? {
        for row in rows {
            geo = geo.with_cluster(&row.platform, row.cluster);
        }
    }
    if let Some(rows) = read_rows::<GangwayRow>(&dir.join(&config.gangway_file_name))? {
        for row in rows {
            geo = geo.with_gangway(&names::canonical_name(&row.platform));
        }
    }
    if let Some(rows) = read_rows::<SpeedRow>(&dir.join(&config.speeds_file_name))? {
        for row in rows {
            geo = geo.with_speed_override(&row.boat, row.kn);
        }
    }

    Ok(geo)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, Error> {
    if !path.exists() {
        return Ok(None);
    }
    let file = fs::File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: T = result?;
        rows.push(record);
    }
    Ok(Some(rows))
}
