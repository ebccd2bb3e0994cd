//! Route-string and report rendering.
//!
//! A route prints as `<BOAT> <HH:MM> TMIB +N/<stop>/<stop>/...` with
//! `-N` for TMIB-pool drops, `(-N)` for M9-pool drops and an `M9` hub stop
//! carrying the transfer terms. The report starts with the fixed header
//! line and ends with unmet-demand warnings and the fleet total.

use std::fmt::{Display, Write};

use super::{Plan, PlannedRoute, Route, Stop, Warning};
use crate::shared::names::short_name;

pub const REPORT_HEADER: &str = "DISTRIBUICAO DE PAX";

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} TMIB +{}",
            self.boat,
            self.departure,
            self.boarded_at_tmib()
        )?;
        for stop in &self.pre_stops {
            write!(f, "/{}", stop_term(stop))?;
        }
        if self.uses_hub {
            f.write_str("/M9")?;
            if self.tmib_to_m9 > 0 {
                write!(f, " -{}", self.tmib_to_m9)?;
            }
            if self.m9_pickup > 0 {
                write!(f, " +{}", self.m9_pickup)?;
            }
        }
        for stop in &self.post_stops {
            write!(f, "/{}", stop_term(stop))?;
        }
        Ok(())
    }
}

fn stop_term(stop: &Stop) -> String {
    let mut term = short_name(stop.platform());
    if stop.tmib_drop() > 0 {
        let _ = write!(term, " -{}", stop.tmib_drop());
    }
    if stop.m9_drop() > 0 {
        let _ = write!(term, " (-{})", stop.m9_drop());
    }
    term
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnmetTmib { platform, count } => {
                write!(
                    f,
                    "demanda nao atendida {}: {} PAX (TMIB)",
                    short_name(platform),
                    count
                )
            }
            Warning::UnmetM9 { platform, count } => {
                write!(
                    f,
                    "demanda nao atendida {}: {} PAX (M9)",
                    short_name(platform),
                    count
                )
            }
            Warning::UnmetHubDrop { count } => {
                write!(f, "demanda nao atendida M9: {count} PAX (TMIB)")
            }
            Warning::UnmetRideHome { count } => {
                write!(f, "demanda nao atendida TMIB: {count} PAX (M9)")
            }
            Warning::AquaUnused { boat } => {
                write!(f, "{boat} sem demanda compativel com gangway")
            }
            Warning::FixedUnparsed { boat, token } => {
                write!(f, "rota fixa {boat}: trecho nao reconhecido '{token}'")
            }
            Warning::FixedOverSubtract { boat, platform } => {
                write!(
                    f,
                    "rota fixa {boat}: desembarque acima da demanda em {}",
                    short_name(platform)
                )
            }
            Warning::MissingDistance { from, to } => {
                write!(
                    f,
                    "distancia nao cadastrada {} -> {}",
                    short_name(from),
                    short_name(to)
                )
            }
        }
    }
}

impl Plan {
    /// The full report text, byte-stable for a fixed input.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_HEADER);
        out.push('\n');
        if let Some(headcount) = self.crew_change_m9 {
            let _ = writeln!(out, "Troca de turma: {headcount} PAX M9");
        }
        for route in &self.routes {
            match route {
                PlannedRoute::Optimized(route) => {
                    let _ = writeln!(out, "{route}");
                }
                PlannedRoute::Fixed {
                    boat,
                    departure,
                    text,
                } => {
                    let _ = writeln!(out, "{boat} {departure} {text}");
                }
            }
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "AVISO: {warning}");
        }
        if !self.routes.is_empty() {
            let _ = writeln!(out, "TOTAL: {}", self.total);
        }
        out
    }
}
