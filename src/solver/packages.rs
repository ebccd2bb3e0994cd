//! Demand packaging: the atomic units the assignment enumeration moves
//! between boats.

use crate::{
    geography::{Cluster, Geography},
    scenario::Demand,
};

use super::SolverConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PackageKind {
    Singleton,
    MandatoryPair,
    SplitPiece,
}

/// One or more demands that always travel on the same boat.
#[derive(Debug, Clone)]
pub(crate) struct Package {
    pub demands: Vec<Demand>,
    pub kind: PackageKind,
}

impl Package {
    fn singleton(demand: Demand) -> Self {
        Self {
            demands: vec![demand],
            kind: PackageKind::Singleton,
        }
    }

    pub fn tmib_total(&self) -> u32 {
        self.demands.iter().map(|d| d.tmib).sum()
    }

    pub fn m9_total(&self) -> u32 {
        self.demands.iter().map(|d| d.m9).sum()
    }

    pub fn pax_total(&self) -> u32 {
        self.tmib_total() + self.m9_total()
    }

    pub fn priorities(&self) -> impl Iterator<Item = u8> + '_ {
        self.demands.iter().map(|d| d.priority)
    }
}

/// Groups demands into packages: mandatory pairs are fused when both sides
/// have demand and the fused TMIB load still fits the largest boat; under
/// fleet scarcity one large TMIB-only demand is split so two boats can
/// share it.
pub(crate) fn form_packages(
    geo: &Geography,
    cfg: &SolverConfig,
    demands: &[Demand],
    max_capacity: u32,
    fleet_size: usize,
) -> Vec<Package> {
    let mut packages: Vec<Package> = Vec::with_capacity(demands.len());
    let mut consumed = vec![false; demands.len()];

    for (i, demand) in demands.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        let partner = geo
            .mandatory_pairs()
            .iter()
            .find_map(|(a, b)| {
                if demand.platform == *a {
                    Some(b)
                } else if demand.platform == *b {
                    Some(a)
                } else {
                    None
                }
            })
            .and_then(|partner_name| {
                demands
                    .iter()
                    .enumerate()
                    .find(|(j, d)| !consumed[*j] && d.platform == *partner_name && has_demand(d))
                    .map(|(j, _)| j)
            });

        if let Some(j) = partner
            && has_demand(demand)
            && demand.tmib + demands[j].tmib <= max_capacity
        {
            consumed[i] = true;
            consumed[j] = true;
            packages.push(Package {
                demands: vec![demand.clone(), demands[j].clone()],
                kind: PackageKind::MandatoryPair,
            });
            continue;
        }

        consumed[i] = true;
        if has_demand(demand) {
            packages.push(Package::singleton(demand.clone()));
        }
    }

    if fleet_size <= cfg.scarcity_fleet_cutoff {
        apply_scarcity_split(geo, cfg, &mut packages);
    }

    packages
}

fn has_demand(demand: &Demand) -> bool {
    demand.tmib > 0 || demand.m9 > 0
}

/// With two boats or fewer, one oversized TMIB-only demand is cut into a
/// head of four plus the remainder, preferring the corridor clusters and
/// then the largest count.
fn apply_scarcity_split(geo: &Geography, cfg: &SolverConfig, packages: &mut Vec<Package>) {
    let mut candidate: Option<(usize, usize, u32)> = None;
    for (i, package) in packages.iter().enumerate() {
        if package.kind != PackageKind::Singleton || package.demands.len() != 1 {
            continue;
        }
        let demand = &package.demands[0];
        if demand.m9 > 0 || demand.tmib < cfg.scarcity_split_min {
            continue;
        }
        let cluster_rank = match geo.cluster(&demand.platform) {
            Cluster::M2M3 | Cluster::M9Near => 0usize,
            _ => 1,
        };
        let better = match &candidate {
            None => true,
            Some((_, best_rank, best_tmib)) => {
                (cluster_rank, std::cmp::Reverse(demand.tmib))
                    < (*best_rank, std::cmp::Reverse(*best_tmib))
            }
        };
        if better {
            candidate = Some((i, cluster_rank, demand.tmib));
        }
    }

    let Some((index, _, _)) = candidate else {
        return;
    };
    let original = packages[index].demands[0].clone();
    let head = cfg.scarcity_split_head;
    let pieces = [head, original.tmib - head].map(|tmib| Package {
        demands: vec![Demand {
            platform: original.platform.clone(),
            m9: 0,
            tmib,
            priority: original.priority,
        }],
        kind: PackageKind::SplitPiece,
    });
    packages.splice(index..=index, pieces);
}
