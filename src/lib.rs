//! Daily PAX distribution planning for a crew-transfer fleet serving
//! offshore platforms from a single onshore terminal (TMIB).
//!
//! The library consumes a [`scenario::Scenario`] (boats + demand matrix),
//! queries a read-only [`geography::Geography`] (distances, clusters,
//! gangway and speed tables) and produces a [`plan::Plan`]: one route per
//! boat, maximizing delivered demand first and total nautical distance
//! second, with a weighted tiebreak over soft criteria.
//!
//! The whole pipeline is synchronous and single-threaded; for a fixed input
//! the rendered output is byte-identical across runs.

pub mod geography;
pub mod plan;
pub mod scenario;
pub mod solver;
pub mod shared;

pub use geography::Geography;
pub use plan::Plan;
pub use scenario::Scenario;
pub use solver::{Solver, SolverConfig};
