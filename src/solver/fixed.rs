//! Operator-fixed routes.
//!
//! A fixed route string is emitted verbatim; this module only reads it back
//! to subtract the deliveries it already covers from the day's demand.
//! Recognized stop forms: the `TMIB +N` head, `X -N` (TMIB-pool drop),
//! `X (-N)` (M9-pool drop) and the `M9 -N +M` hub call. Anything else --
//! including transshipment braces -- is ignored for subtraction and
//! reported, never guessed at.

use tracing::warn;

use crate::{
    geography::{HUB, TMIB},
    plan::Warning,
    scenario::Demand,
    shared::names,
};

use super::evaluator::Pools;

pub(crate) fn subtract_fixed(
    boat: &str,
    text: &str,
    demands: &mut [Demand],
    pools: &mut Pools,
    warnings: &mut Vec<Warning>,
) {
    for token in text.split('/') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some(parsed) = parse_token(token) else {
            warn!(boat, token, "fixed route token not recognized");
            warnings.push(Warning::FixedUnparsed {
                boat: boat.to_string(),
                token: token.to_string(),
            });
            continue;
        };
        apply_token(boat, parsed, demands, pools, warnings);
    }
}

struct Token {
    platform: String,
    tmib_drop: u32,
    m9_drop: u32,
    boarded: u32,
}

fn parse_token(token: &str) -> Option<Token> {
    let mut words = token.split_whitespace();
    let name = words.next()?;
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return None;
    }
    let mut parsed = Token {
        platform: names::canonical_name(name),
        tmib_drop: 0,
        m9_drop: 0,
        boarded: 0,
    };
    for word in words {
        if let Some(count) = word.strip_prefix('-').and_then(|n| n.parse::<u32>().ok()) {
            parsed.tmib_drop += count;
        } else if let Some(count) = word
            .strip_prefix("(-")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|n| n.parse::<u32>().ok())
        {
            parsed.m9_drop += count;
        } else if let Some(count) = word.strip_prefix('+').and_then(|n| n.parse::<u32>().ok()) {
            parsed.boarded += count;
        } else {
            return None;
        }
    }
    Some(parsed)
}

fn apply_token(
    boat: &str,
    token: Token,
    demands: &mut [Demand],
    pools: &mut Pools,
    warnings: &mut Vec<Warning>,
) {
    if token.platform == TMIB {
        // The boarding head; nothing to subtract.
        return;
    }
    if token.platform == HUB {
        // `M9 -N` consumes the TMIB-to-M9 backlog. The `+M` pickup total is
        // already accounted for by the per-destination `(-N)` drops.
        if token.tmib_drop > pools.hub_drop {
            over_subtract(boat, &token.platform, warnings);
        }
        pools.hub_drop = pools.hub_drop.saturating_sub(token.tmib_drop);
        return;
    }

    let Some(demand) = demands.iter_mut().find(|d| *d.platform == token.platform) else {
        if token.tmib_drop > 0 || token.m9_drop > 0 {
            over_subtract(boat, &token.platform, warnings);
        }
        return;
    };
    if token.tmib_drop > demand.tmib || token.m9_drop > demand.m9 {
        over_subtract(boat, &demand.platform.to_string(), warnings);
    }
    demand.tmib = demand.tmib.saturating_sub(token.tmib_drop);
    demand.m9 = demand.m9.saturating_sub(token.m9_drop);
}

fn over_subtract(boat: &str, platform: &str, warnings: &mut Vec<Warning>) {
    warn!(boat, platform, "fixed route drops more than the open demand");
    warnings.push(Warning::FixedOverSubtract {
        boat: boat.to_string(),
        platform: platform.into(),
    });
}
