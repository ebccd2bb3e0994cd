mod sheet;

pub use sheet::*;

use std::{io, sync::Arc};

use thiserror::Error;

use crate::{
    geography::{BoatKind, Geography, HUB, TMIB},
    shared::Time,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: invalid {what} in column {col}: '{value}'")]
    InvalidCell {
        row: usize,
        col: char,
        what: &'static str,
        value: String,
    },
    #[error("Row {row}: unknown platform '{platform}'")]
    UnknownPlatform { row: usize, platform: String },
    #[error("Sheet has no boat rows")]
    NoBoats,
}

/// One crew-transfer vessel available on the operating day.
#[derive(Debug, Clone)]
pub struct Boat {
    pub name: String,
    pub available: bool,
    /// Departure from TMIB, minutes of day.
    pub departure: Time,
    /// Operator-dictated route, emitted verbatim and subtracted from demand.
    pub fixed_route: Option<String>,
}

impl Boat {
    pub fn new(name: &str, departure: Time) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            departure,
            fixed_route: None,
        }
    }

    pub fn kind(&self) -> BoatKind {
        let upper = self.name.to_uppercase();
        if upper.contains("AQUA") && upper.contains("HELIX") {
            BoatKind::AquaHelix
        } else {
            BoatKind::Surfer
        }
    }

    pub fn capacity(&self) -> u32 {
        match self.kind() {
            BoatKind::AquaHelix => 100,
            BoatKind::Surfer => 24,
        }
    }

    pub fn speed(&self, geo: &Geography) -> f64 {
        geo.speed(self.kind(), &self.name)
    }
}

/// Passengers owed to one destination platform, split by origin pool.
#[derive(Debug, Clone)]
pub struct Demand {
    pub platform: Arc<str>,
    /// Waiting at the M9 hub for this destination.
    pub m9: u32,
    /// Waiting at the TMIB terminal for this destination.
    pub tmib: u32,
    /// 0 = none, 1 = highest.
    pub priority: u8,
}

impl Demand {
    pub fn new(platform: &str, m9: u32, tmib: u32, priority: u8) -> Self {
        Self {
            platform: Arc::from(platform),
            m9,
            tmib,
            priority,
        }
    }
}

/// The input to one planning run: the fleet and the demand matrix, plus the
/// crew-change flag carried through to the report.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub crew_change: bool,
    pub crew_change_m9: u32,
    pub boats: Vec<Boat>,
    pub demands: Vec<Demand>,
}

impl Scenario {
    /// Input-shape validation: demand destinations must exist in the
    /// distance table (the TMIB and hub sentinels always pass) and
    /// priorities must be 0..=3.
    pub fn validate(&self, geo: &Geography) -> Result<(), Error> {
        for (i, demand) in self.demands.iter().enumerate() {
            let row = i + 1;
            let platform: &str = &demand.platform;
            if platform != TMIB
                && platform != HUB
                && geo.distance_entry(TMIB, platform).is_none()
                && geo.distance_entry(platform, HUB).is_none()
            {
                return Err(Error::UnknownPlatform {
                    row,
                    platform: platform.to_string(),
                });
            }
            if demand.priority > 3 {
                return Err(Error::InvalidCell {
                    row,
                    col: 'E',
                    what: "priority",
                    value: demand.priority.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boat_kind_from_name() {
        let aqua = Boat::new("AQUA HELIX I", Time::from_minutes(390));
        assert_eq!(aqua.kind(), BoatKind::AquaHelix);
        assert_eq!(aqua.capacity(), 100);

        let surfer = Boat::new("1905", Time::from_minutes(390));
        assert_eq!(surfer.kind(), BoatKind::Surfer);
        assert_eq!(surfer.capacity(), 24);

        // Both substrings are required.
        let not_aqua = Boat::new("Aqua Star", Time::from_minutes(390));
        assert_eq!(not_aqua.kind(), BoatKind::Surfer);
    }

    #[test]
    fn validate_rejects_unknown_platform() {
        let geo = Geography::sergipe();
        let scenario = Scenario {
            demands: vec![Demand::new("PCM-77", 0, 4, 0)],
            ..Default::default()
        };
        assert!(matches!(
            scenario.validate(&geo),
            Err(Error::UnknownPlatform { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_priority() {
        let geo = Geography::sergipe();
        let scenario = Scenario {
            demands: vec![Demand::new("PCM-02", 0, 4, 9)],
            ..Default::default()
        };
        assert!(matches!(
            scenario.validate(&geo),
            Err(Error::InvalidCell { col: 'E', .. })
        ));
    }
}
