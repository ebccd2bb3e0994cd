mod format;

pub use format::*;

use std::sync::Arc;

use crate::shared::{Distance, Time};

/// One visit on a route.
///
/// Pre-hub stops only ever unload TMIB-pool passengers; post-hub stops may
/// unload from either pool. A platform may appear once in each segment of
/// the same route (a loop visit) and in no other duplicated form.
#[derive(Debug, Clone)]
pub enum Stop {
    Pre {
        platform: Arc<str>,
        tmib_drop: u32,
        priority: u8,
    },
    Post {
        platform: Arc<str>,
        tmib_drop: u32,
        m9_drop: u32,
        priority: u8,
    },
}

impl Stop {
    pub fn platform(&self) -> &Arc<str> {
        match self {
            Stop::Pre { platform, .. } | Stop::Post { platform, .. } => platform,
        }
    }

    pub fn tmib_drop(&self) -> u32 {
        match self {
            Stop::Pre { tmib_drop, .. } | Stop::Post { tmib_drop, .. } => *tmib_drop,
        }
    }

    pub fn m9_drop(&self) -> u32 {
        match self {
            Stop::Pre { .. } => 0,
            Stop::Post { m9_drop, .. } => *m9_drop,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Stop::Pre { priority, .. } | Stop::Post { priority, .. } => *priority,
        }
    }

    /// Passengers moved at this stop, which drives the stop overhead.
    pub fn pax_moved(&self) -> u32 {
        self.tmib_drop() + self.m9_drop()
    }
}

/// A solved route for one boat.
#[derive(Debug, Clone)]
pub struct Route {
    pub boat: String,
    pub departure: Time,
    pub pre_stops: Vec<Stop>,
    pub uses_hub: bool,
    pub post_stops: Vec<Stop>,
    /// TMIB-pool passengers disembarked at the hub.
    pub tmib_to_m9: u32,
    /// M9-pool passengers boarded at the hub (destination drops plus
    /// ride-home passengers bound for TMIB).
    pub m9_pickup: u32,
    pub distance: Distance,
}

impl Route {
    /// Everyone boarded at the terminal.
    pub fn boarded_at_tmib(&self) -> u32 {
        self.pre_stops.iter().map(Stop::tmib_drop).sum::<u32>()
            + self.post_stops.iter().map(Stop::tmib_drop).sum::<u32>()
            + self.tmib_to_m9
    }

    /// Load on the TMIB -> hub leg.
    pub fn pre_load(&self) -> u32 {
        self.boarded_at_tmib()
    }

    /// Load right after the hub call.
    pub fn post_load(&self) -> u32 {
        self.pre_load()
            - self.tmib_to_m9
            - self.pre_stops.iter().map(Stop::tmib_drop).sum::<u32>()
            + self.m9_pickup
    }
}

/// A plan entry: either a solved route or an operator-fixed route carried
/// through verbatim.
#[derive(Debug, Clone)]
pub enum PlannedRoute {
    Optimized(Route),
    Fixed {
        boat: String,
        departure: Time,
        text: String,
    },
}

impl PlannedRoute {
    pub fn departure(&self) -> Time {
        match self {
            PlannedRoute::Optimized(route) => route.departure,
            PlannedRoute::Fixed { departure, .. } => *departure,
        }
    }

    pub fn boat(&self) -> &str {
        match self {
            PlannedRoute::Optimized(route) => &route.boat,
            PlannedRoute::Fixed { boat, .. } => boat,
        }
    }
}

/// Anything the operator should know about that did not stop the plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    UnmetTmib { platform: Arc<str>, count: u32 },
    UnmetM9 { platform: Arc<str>, count: u32 },
    UnmetHubDrop { count: u32 },
    UnmetRideHome { count: u32 },
    AquaUnused { boat: String },
    FixedUnparsed { boat: String, token: String },
    FixedOverSubtract { boat: String, platform: Arc<str> },
    MissingDistance { from: Arc<str>, to: Arc<str> },
}

/// The planner output: routes ordered by departure, warnings and the total
/// distance over the optimized routes.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub routes: Vec<PlannedRoute>,
    pub warnings: Vec<Warning>,
    pub total: Distance,
    /// M9 headcount for the crew-change line, when the flag is set.
    pub crew_change_m9: Option<u32>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
