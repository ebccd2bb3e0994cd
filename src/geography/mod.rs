mod cluster;
pub mod source;

pub use cluster::*;
pub use source::TableConfig;

use std::{
    collections::{HashMap, HashSet},
    io,
    sync::Arc,
};

use thiserror::Error;

use crate::shared::Distance;

/// The onshore terminal every route departs from.
pub const TMIB: &str = "TMIB";
/// The hub platform where TMIB-pool passengers are exchanged for M9-pool
/// passengers.
pub const HUB: &str = "PCM-09";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown boat speed table entry: {0}")]
    UnknownSpeedEntry(String),
}

/// Boat type, derived from the vessel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoatKind {
    /// High-capacity gangway vessel: 100 PAX, restricted docking, 25 min
    /// approach overhead at every stop.
    AquaHelix,
    /// Standard crew boat, 24 PAX.
    Surfer,
}

/// A read-only store of the static basin tables: the directed distance
/// matrix, platform clusters, the gangway allow-list, boat speeds and the
/// mandatory service pairs.
///
/// Built once (from the embedded basin tables or from CSV files, see
/// [`source`]) and then only queried. Distances are looked up as directed
/// edges with a fallback to the reverse edge; a missing pair yields the
/// sentinel distance, which effectively excludes that leg from any optimal
/// plan.
#[derive(Debug, Clone)]
pub struct Geography {
    distances: HashMap<Arc<str>, HashMap<Arc<str>, Distance>>,
    clusters: HashMap<Arc<str>, Cluster>,
    gangway: HashSet<Arc<str>>,
    surfer_speed: f64,
    aqua_speed: f64,
    speed_overrides: HashMap<String, f64>,
    mandatory_pairs: Vec<(Arc<str>, Arc<str>)>,
    sentinel: Distance,
}

impl Default for Geography {
    fn default() -> Self {
        Self {
            distances: HashMap::new(),
            clusters: HashMap::new(),
            gangway: HashSet::new(),
            surfer_speed: 23.0,
            aqua_speed: 18.0,
            speed_overrides: HashMap::new(),
            mandatory_pairs: Vec::new(),
            sentinel: Distance::from_nm(999.0),
        }
    }
}

impl Geography {
    /// An empty geography. Useful as a base for [`with_distance`] chains in
    /// tests and custom deployments.
    ///
    /// [`with_distance`]: Geography::with_distance
    pub fn new() -> Self {
        Default::default()
    }

    /// The Sergipe Basin tables the planner ships with.
    pub fn sergipe() -> Self {
        let mut geo = Self::new();
        for &(from, to, nm) in SERGIPE_DISTANCES {
            geo = geo.with_distance(from, to, nm);
        }
        for &(platform, cluster) in SERGIPE_CLUSTERS {
            geo = geo.with_cluster(platform, cluster);
        }
        for &platform in SERGIPE_GANGWAY {
            geo = geo.with_gangway(platform);
        }
        geo.with_mandatory_pairs(&[("PCM-02", "PCM-03"), ("PCM-06", "PCB-01")])
    }

    pub fn with_distance(mut self, from: &str, to: &str, nm: f64) -> Self {
        self.distances
            .entry(Arc::from(from))
            .or_default()
            .insert(Arc::from(to), Distance::from_nm(nm));
        self
    }

    pub fn with_cluster(mut self, platform: &str, cluster: Cluster) -> Self {
        self.clusters.insert(Arc::from(platform), cluster);
        self
    }

    /// Allows Aqua-class boats to dock at `platform` (canonical name).
    pub fn with_gangway(mut self, platform: &str) -> Self {
        self.gangway.insert(Arc::from(platform));
        self
    }

    pub fn with_speed_override(mut self, boat: &str, kn: f64) -> Self {
        self.speed_overrides.insert(boat.to_string(), kn);
        self
    }

    pub fn with_default_speeds(mut self, surfer_kn: f64, aqua_kn: f64) -> Self {
        self.surfer_speed = surfer_kn;
        self.aqua_speed = aqua_kn;
        self
    }

    pub fn with_mandatory_pairs(mut self, pairs: &[(&str, &str)]) -> Self {
        self.mandatory_pairs = pairs
            .iter()
            .map(|&(a, b)| (Arc::from(a), Arc::from(b)))
            .collect();
        self
    }

    pub fn with_sentinel(mut self, sentinel: Distance) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Directed lookup with reverse fallback. `None` when neither direction
    /// is tabled; [`Geography::distance`] substitutes the sentinel.
    pub fn distance_entry(&self, from: &str, to: &str) -> Option<Distance> {
        if from == to {
            return Some(Distance::ZERO);
        }
        if let Some(d) = self.distances.get(from).and_then(|row| row.get(to)) {
            return Some(*d);
        }
        self.distances
            .get(to)
            .and_then(|row| row.get(from))
            .copied()
    }

    pub fn distance(&self, from: &str, to: &str) -> Distance {
        self.distance_entry(from, to).unwrap_or(self.sentinel)
    }

    pub fn sentinel(&self) -> Distance {
        self.sentinel
    }

    pub fn cluster(&self, platform: &str) -> Cluster {
        self.clusters.get(platform).copied().unwrap_or(Cluster::Other)
    }

    pub fn is_gangway(&self, platform: &str) -> bool {
        self.gangway.contains(platform)
    }

    /// Cruising speed in knots: per-name override first, then the type
    /// default.
    pub fn speed(&self, kind: BoatKind, name: &str) -> f64 {
        if let Some(&kn) = self.speed_overrides.get(name) {
            return kn;
        }
        match kind {
            BoatKind::AquaHelix => self.aqua_speed,
            BoatKind::Surfer => self.surfer_speed,
        }
    }

    pub fn mandatory_pairs(&self) -> &[(Arc<str>, Arc<str>)] {
        &self.mandatory_pairs
    }
}

/// Directed distance table, NM. Stored one way; lookups fall back to the
/// reverse edge. The PGA-07/PDO-02 pair is genuinely absent from the survey
/// data and resolves to the sentinel.
const SERGIPE_DISTANCES: &[(&str, &str, f64)] = &[
    ("TMIB", "PCM-09", 10.0),
    // M2M3 corridor
    ("TMIB", "PCM-03", 5.0),
    ("PCM-03", "PCM-09", 5.5),
    ("TMIB", "PCM-02", 8.0),
    ("PCM-02", "PCM-09", 3.5),
    ("PCM-02", "PCM-03", 3.5),
    // M9 neighborhood
    ("TMIB", "PCM-04", 11.0),
    ("PCM-04", "PCM-09", 2.0),
    ("PCM-03", "PCM-04", 5.5),
    ("PCM-02", "PCM-04", 3.0),
    ("TMIB", "PCM-08", 11.5),
    ("PCM-08", "PCM-09", 2.5),
    ("PCM-04", "PCM-08", 1.5),
    ("TMIB", "PCM-10", 12.0),
    ("PCM-10", "PCM-09", 2.0),
    ("PCM-04", "PCM-10", 2.5),
    ("PCM-08", "PCM-10", 1.5),
    // M1/M7 field, east of the hub
    ("TMIB", "PCM-07", 16.0),
    ("PCM-07", "PCM-09", 7.0),
    ("PCM-07", "PCM-04", 6.0),
    ("PCM-07", "PCM-03", 8.0),
    ("PCM-07", "PCM-02", 7.0),
    ("TMIB", "PCM-01", 14.0),
    ("PCM-01", "PCM-09", 6.0),
    ("PCM-01", "PCM-07", 2.5),
    ("PCM-01", "PCM-04", 5.0),
    ("PCM-01", "PCM-03", 7.0),
    ("PCM-01", "PCM-02", 6.0),
    // M6 area, west
    ("TMIB", "PCM-06", 13.0),
    ("PCM-06", "PCM-09", 6.5),
    ("TMIB", "PCM-05", 12.0),
    ("PCM-05", "PCM-09", 7.2),
    ("PCM-05", "PCM-06", 2.0),
    ("PCM-05", "PCM-03", 8.0),
    ("PCM-06", "PCM-03", 8.5),
    ("PCM-06", "PCM-02", 7.0),
    ("PCM-05", "PCM-02", 7.5),
    ("PCM-06", "PCM-04", 8.0),
    ("PCM-05", "PCM-04", 8.5),
    ("PCM-06", "PCM-07", 13.0),
    ("PCM-05", "PCM-07", 13.5),
    ("PCM-06", "PCM-01", 12.0),
    ("PCM-05", "PCM-01", 12.5),
    // B cluster, east
    ("TMIB", "PCB-01", 13.0),
    ("PCB-01", "PCM-09", 5.0),
    ("TMIB", "PCB-02", 13.3),
    ("PCB-02", "PCM-09", 5.3),
    ("TMIB", "PCB-03", 13.6),
    ("PCB-03", "PCM-09", 5.6),
    ("TMIB", "PCB-04", 14.0),
    ("PCB-04", "PCM-09", 6.0),
    ("PCB-01", "PCB-02", 0.7),
    ("PCB-02", "PCB-03", 0.6),
    ("PCB-03", "PCB-04", 0.8),
    ("PCB-01", "PCB-03", 1.1),
    ("PCB-02", "PCB-04", 1.0),
    ("PCB-01", "PCB-04", 1.5),
    ("PCB-01", "PCM-02", 4.0),
    ("PCB-04", "PCM-02", 5.0),
    ("PCB-01", "PCM-03", 7.5),
    ("PCB-04", "PCM-03", 8.5),
    ("PCB-01", "PCM-04", 4.0),
    ("PCB-04", "PCM-04", 4.5),
    ("PCB-01", "PCM-07", 5.0),
    ("PCB-04", "PCM-07", 5.5),
    ("PCB-01", "PCM-01", 5.5),
    ("PCB-04", "PCM-01", 6.0),
    ("PCB-01", "PCM-06", 11.0),
    ("PCB-01", "PCM-05", 11.5),
    ("PCB-04", "PCM-06", 12.0),
    ("PCB-04", "PCM-05", 12.5),
    // PDO field, northwest beyond the hub
    ("TMIB", "PDO-01", 17.0),
    ("PDO-01", "PCM-09", 8.0),
    ("PDO-01", "PCM-06", 6.0),
    ("PDO-01", "PCM-05", 6.5),
    ("PDO-01", "PCM-03", 12.0),
    ("PDO-01", "PCM-02", 11.0),
    ("PDO-01", "PCM-04", 9.5),
    ("PDO-01", "PCB-01", 13.0),
    ("PDO-01", "PCB-04", 14.0),
    ("PDO-01", "PCM-07", 15.0),
    ("PDO-01", "PCM-01", 14.0),
    ("TMIB", "PDO-02", 17.5),
    ("PDO-02", "PCM-09", 8.5),
    ("PDO-01", "PDO-02", 1.0),
    ("TMIB", "PDO-03", 18.0),
    ("PDO-03", "PCM-09", 9.0),
    ("PDO-02", "PDO-03", 1.0),
    ("PDO-01", "PDO-03", 1.8),
    ("PDO-02", "PCM-06", 6.8),
    ("PDO-02", "PCM-05", 7.2),
    // PGA field, far northeast
    ("TMIB", "PGA-03", 20.0),
    ("PGA-03", "PCM-09", 11.0),
    ("TMIB", "PGA-07", 21.0),
    ("PGA-07", "PCM-09", 12.0),
    ("PGA-03", "PGA-07", 1.5),
    ("PGA-03", "PDO-02", 12.0),
    ("PGA-03", "PDO-01", 11.5),
    // PRB
    ("TMIB", "PRB-01", 22.0),
    ("PRB-01", "PCM-09", 13.0),
    ("PRB-01", "PGA-03", 4.0),
    ("PRB-01", "PGA-07", 4.5),
    ("PRB-01", "PDO-01", 11.0),
];

const SERGIPE_CLUSTERS: &[(&str, Cluster)] = &[
    ("PCM-05", Cluster::M6Area),
    ("PCM-06", Cluster::M6Area),
    ("PCB-01", Cluster::BCluster),
    ("PCB-02", Cluster::BCluster),
    ("PCB-03", Cluster::BCluster),
    ("PCB-04", Cluster::BCluster),
    ("PCM-02", Cluster::M2M3),
    ("PCM-03", Cluster::M2M3),
    ("PCM-04", Cluster::M9Near),
    ("PCM-08", Cluster::M9Near),
    ("PCM-09", Cluster::M9Near),
    ("PCM-10", Cluster::M9Near),
    ("PCM-01", Cluster::M1M7),
    ("PCM-07", Cluster::M1M7),
    ("PDO-01", Cluster::Pdo),
    ("PDO-02", Cluster::Pdo),
    ("PDO-03", Cluster::Pdo),
    ("PGA-03", Cluster::Pga),
    ("PGA-07", Cluster::Pga),
    ("PRB-01", Cluster::Prb),
];

const SERGIPE_GANGWAY: &[&str] = &[
    "PCM-09", "PCM-02", "PCM-03", "PCM-04", "PCM-08", "PCM-10", "PCB-01", "PCB-02",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_fallback() {
        let geo = Geography::sergipe();
        // Stored TMIB -> PCM-09 only.
        assert_eq!(geo.distance("PCM-09", "TMIB"), Distance::from_nm(10.0));
    }

    #[test]
    fn missing_pair_yields_sentinel() {
        let geo = Geography::sergipe();
        assert_eq!(geo.distance_entry("PGA-07", "PDO-02"), None);
        assert_eq!(geo.distance("PGA-07", "PDO-02"), Distance::from_nm(999.0));
    }

    #[test]
    fn self_distance_is_zero() {
        let geo = Geography::sergipe();
        assert_eq!(geo.distance("PCM-04", "PCM-04"), Distance::ZERO);
    }

    #[test]
    fn unknown_platform_is_other() {
        let geo = Geography::sergipe();
        assert_eq!(geo.cluster("PCM-99"), Cluster::Other);
        assert_eq!(geo.cluster("PDO-02"), Cluster::Pdo);
    }

    #[test]
    fn speed_override_beats_default() {
        let geo = Geography::sergipe().with_speed_override("1905", 26.0);
        assert_eq!(geo.speed(BoatKind::Surfer, "1905"), 26.0);
        assert_eq!(geo.speed(BoatKind::Surfer, "1870"), 23.0);
        assert_eq!(geo.speed(BoatKind::AquaHelix, "AQUA HELIX I"), 18.0);
    }
}
