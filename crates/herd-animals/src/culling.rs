//! Health-cull scheduling at calving.
//!
//! A parity-indexed gate decides whether a future health cull is scheduled.
//! If it is, a second draw picks the reason from cumulative breakpoints and
//! the same draw is mapped through that reason's piecewise-linear inverse
//! CDF to a day offset.

use serde::{Deserialize, Serialize};

use herd_types::CullReason;

use crate::config::CullingParams;
use crate::draws::{DrawSource, whole_days};
use crate::error::AnimalError;

/// A health cull that will happen on a future day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCull {
    /// Reason recorded when the cull happens.
    pub reason: CullReason,
    /// Days-since-birth on which the animal is culled.
    pub day: u32,
}

/// Map a draw onto a day offset by linear interpolation between the pair
/// of cumulative breakpoints that bracket it.
///
/// Brackets are closed, so a draw exactly on a breakpoint returns that
/// breakpoint's offset. Returns `None` when no bracket contains the draw.
pub fn interpolate_cull_offset(cdf: &[f64], offsets: &[u32], draw: f64) -> Option<u32> {
    cdf.windows(2)
        .zip(offsets.windows(2))
        .find_map(|(probs, days)| match (probs, days) {
            (&[c_lo, c_hi], &[d_lo, d_hi]) if c_lo <= draw && draw <= c_hi && c_hi > c_lo => {
                let d_lo = f64::from(d_lo);
                let d_hi = f64::from(d_hi);
                Some(whole_days(d_lo + (d_hi - d_lo) / (c_hi - c_lo) * (draw - c_lo)))
            }
            _ => None,
        })
}

/// Pick the health reason for a draw.
pub fn health_reason(params: &CullingParams, draw: f64) -> CullReason {
    CullReason::HEALTH
        .into_iter()
        .zip(params.reason_breakpoints)
        .find_map(|(reason, breakpoint)| (draw < breakpoint).then_some(reason))
        .unwrap_or(CullReason::Unknown)
}

/// Decide at calving whether and when a health cull will happen.
pub fn schedule_health_cull(
    params: &CullingParams,
    parity: u32,
    today: u32,
    draws: &mut dyn DrawSource,
) -> Result<Option<ScheduledCull>, AnimalError> {
    let bucket = match parity {
        0 | 1 => 0,
        2 => 1,
        3 => 2,
        _ => 3,
    };
    let gate = params
        .parity_cull_probability
        .get(bucket)
        .copied()
        .unwrap_or_default();
    if !draws.chance(gate)? {
        return Ok(None);
    }

    let draw = draws.probability()?;
    let reason = health_reason(params, draw);
    let cdf = params.cdf_for(reason)?;
    let offset = interpolate_cull_offset(cdf, &params.cull_day_offsets, draw).ok_or_else(|| {
        AnimalError::UnsupportedDistribution {
            table: "cull day breakpoints covering the draw",
            tag: reason.tag().to_owned(),
        }
    })?;
    Ok(Some(ScheduledCull {
        reason,
        day: today.saturating_add(offset),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::draws::ScriptedDraws;

    #[test]
    fn draw_on_lower_breakpoint_yields_lower_offset() {
        assert_eq!(interpolate_cull_offset(&[0.2, 0.6], &[10, 50], 0.2), Some(10));
    }

    #[test]
    fn draw_on_upper_breakpoint_yields_upper_offset() {
        assert_eq!(interpolate_cull_offset(&[0.2, 0.6], &[10, 50], 0.6), Some(50));
    }

    #[test]
    fn midpoint_draw_yields_mean_offset() {
        assert_eq!(interpolate_cull_offset(&[0.2, 0.6], &[10, 50], 0.4), Some(30));
    }

    #[test]
    fn interior_breakpoint_is_exact() {
        let cdf = [0.0, 0.3, 0.7, 1.0];
        let days = [0, 30, 100, 400];
        assert_eq!(interpolate_cull_offset(&cdf, &days, 0.3), Some(30));
        assert_eq!(interpolate_cull_offset(&cdf, &days, 0.7), Some(100));
    }

    #[test]
    fn draw_outside_breakpoints_has_no_offset() {
        assert_eq!(interpolate_cull_offset(&[0.2, 0.6], &[10, 50], 0.1), None);
    }

    #[test]
    fn reason_follows_cumulative_breakpoints() {
        let params = CullingParams::default();
        assert_eq!(health_reason(&params, 0.0), CullReason::Lameness);
        assert_eq!(health_reason(&params, 0.1633), CullReason::Injury);
        assert_eq!(health_reason(&params, 0.5), CullReason::Mastitis);
        assert_eq!(health_reason(&params, 0.85), CullReason::Udder);
        assert_eq!(health_reason(&params, 0.95), CullReason::Unknown);
    }

    #[test]
    fn gate_failure_schedules_nothing() {
        let params = CullingParams::default();
        let mut draws = ScriptedDraws::new([0.9]);
        let scheduled = schedule_health_cull(&params, 1, 800, &mut draws).unwrap();
        assert!(scheduled.is_none());
        assert_eq!(draws.remaining_uniforms(), 0);
    }

    #[test]
    fn scheduled_cull_is_offset_from_today() {
        let params = CullingParams::default();
        // Gate passes for parity 4+, reason draw 0.0 is lameness at offset 0.
        let mut draws = ScriptedDraws::new([0.1, 0.0]);
        let scheduled = schedule_health_cull(&params, 6, 1_500, &mut draws)
            .unwrap()
            .unwrap();
        assert_eq!(scheduled.reason, CullReason::Lameness);
        assert_eq!(scheduled.day, 1_500);
    }

    #[test]
    fn scheduled_day_interpolates_reason_curve() {
        let params = CullingParams::default();
        // Lameness curve: 0.03 -> day 5, 0.08 -> day 15; 0.055 is halfway.
        let mut draws = ScriptedDraws::new([0.0, 0.055]);
        let scheduled = schedule_health_cull(&params, 2, 1_000, &mut draws)
            .unwrap()
            .unwrap();
        assert_eq!(scheduled.day, 1_010);
    }
}
