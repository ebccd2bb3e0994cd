use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Geographic grouping of platforms around the basin.
///
/// Routing treats platforms of the same cluster as natural companions;
/// cross-cluster hops are scored through the compatibility relation below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "M6_AREA")]
    M6Area,
    #[serde(rename = "B_CLUSTER")]
    BCluster,
    #[serde(rename = "M2M3")]
    M2M3,
    #[serde(rename = "M9_NEAR")]
    M9Near,
    #[serde(rename = "M1M7")]
    M1M7,
    #[serde(rename = "PDO")]
    Pdo,
    #[serde(rename = "PGA")]
    Pga,
    #[serde(rename = "PRB")]
    Prb,
    #[serde(rename = "OTHER")]
    Other,
}

/// Cluster pairs a single route may serve without being treated as a
/// geographic detour. The relation is symmetric; same-cluster pairs are
/// implicitly compatible.
const COMPATIBLE: &[(Cluster, Cluster)] = &[
    (Cluster::M6Area, Cluster::BCluster),
    (Cluster::M6Area, Cluster::M1M7),
    (Cluster::M9Near, Cluster::M2M3),
    (Cluster::M2M3, Cluster::M1M7),
    (Cluster::M2M3, Cluster::M6Area),
    (Cluster::M2M3, Cluster::BCluster),
    (Cluster::BCluster, Cluster::M1M7),
    (Cluster::Pdo, Cluster::Pga),
];

impl Cluster {
    pub fn compatible(self, other: Self) -> bool {
        if self == other {
            return true;
        }
        COMPATIBLE
            .iter()
            .any(|&(a, b)| (a, b) == (self, other) || (b, a) == (self, other))
    }

    /// Clusters geographically isolated from the hub neighborhood; a route
    /// serving one of these always passes through M9.
    pub fn is_distant(self) -> bool {
        matches!(self, Cluster::Pdo | Cluster::Pga | Cluster::Prb)
    }
}

impl Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Cluster::M6Area => "M6_AREA",
            Cluster::BCluster => "B_CLUSTER",
            Cluster::M2M3 => "M2M3",
            Cluster::M9Near => "M9_NEAR",
            Cluster::M1M7 => "M1M7",
            Cluster::Pdo => "PDO",
            Cluster::Pga => "PGA",
            Cluster::Prb => "PRB",
            Cluster::Other => "OTHER",
        };
        f.write_str(name)
    }
}
