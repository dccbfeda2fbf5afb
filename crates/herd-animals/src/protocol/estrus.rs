//! Estrus scheduling and the detection/service sub-machine.

use herd_types::{AnimalRecord, EstrusNote, EventKind};

use crate::config::NormalParams;
use crate::draws::{DrawSource, whole_days};
use crate::error::AnimalError;
use crate::pregnancy::ReproState;

/// Result of observing an estrus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstrusOutcome {
    /// Detected and serviced; inseminate tomorrow.
    Serviced,
    /// The estrus went unnoticed.
    NotDetected,
    /// Detected but not serviced.
    NotServiced,
}

/// Schedule the next estrus after `from` by a sampled interval of at least
/// one day, logging it on the day it is expected.
pub fn schedule_estrus(
    record: &mut AnimalRecord,
    from: u32,
    interval: &NormalParams,
    note: EstrusNote,
    draws: &mut dyn DrawSource,
) -> Result<u32, AnimalError> {
    let days = whole_days(draws.normal(interval)?).max(1);
    let day = from.saturating_add(days);
    record.log_on(day, EventKind::Estrus(note));
    Ok(day)
}

/// Delay from a synchronizing injection to estrus: an absolute normal draw,
/// at least one day and below `cap`.
pub fn synchronized_delay(
    params: &NormalParams,
    cap: u32,
    draws: &mut dyn DrawSource,
) -> Result<u32, AnimalError> {
    let days = whole_days(draws.normal(params)?.abs());
    Ok(days.min(cap.saturating_sub(1)).max(1))
}

/// Count an estrus and run the detection then service draws.
pub fn observe_estrus(
    record: &mut AnimalRecord,
    repro: &mut ReproState,
    detection_rate: f64,
    service_rate: f64,
    draws: &mut dyn DrawSource,
) -> Result<EstrusOutcome, AnimalError> {
    repro.estrus_count = repro.estrus_count.saturating_add(1);
    if !draws.chance(detection_rate)? {
        record.log(EventKind::EstrusNotDetected);
        return Ok(EstrusOutcome::NotDetected);
    }
    if !draws.chance(service_rate)? {
        record.log(EventKind::EstrusNotServiced);
        return Ok(EstrusOutcome::NotServiced);
    }
    Ok(EstrusOutcome::Serviced)
}
