//! Day callback that logs periodic progress.
//!
//! Every `interval` days the callback emits one `info!` line with the herd
//! composition and the culls, calvings, and purchases since the last line.

use herd_core::herd::{DaySummary, Herd};
use herd_core::runner::DayCallback;
use tracing::info;

/// Callback that reports herd progress at a fixed interval.
pub struct ProgressCallback {
    interval: u32,
    culled: u32,
    calvings: u32,
    bought: u32,
}

impl ProgressCallback {
    /// Log every `interval` days; an interval of 0 is treated as 1.
    pub const fn new(interval: u32) -> Self {
        Self {
            interval: if interval == 0 { 1 } else { interval },
            culled: 0,
            calvings: 0,
            bought: 0,
        }
    }
}

impl DayCallback for ProgressCallback {
    fn on_day(&mut self, summary: &DaySummary, herd: &Herd) {
        self.culled = self.culled.saturating_add(summary.culled);
        self.calvings = self.calvings.saturating_add(summary.calvings);
        self.bought = self.bought.saturating_add(summary.bought);

        if summary.day.checked_rem(self.interval) != Some(0) {
            return;
        }
        let pregnant = herd
            .adults()
            .iter()
            .filter(|a| a.repro.is_pregnant())
            .count();
        info!(
            day = summary.day,
            calves = summary.calves,
            growing = summary.growing,
            breeding = summary.breeding,
            pre_calving = summary.pre_calving,
            adults = summary.adults,
            milking = summary.milking,
            pregnant,
            culled = self.culled,
            calvings = self.calvings,
            bought = self.bought,
            "Herd progress"
        );
        self.culled = 0;
        self.calvings = 0;
        self.bought = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use herd_core::config::SimulationConfig;
    use herd_types::IdIssuer;

    const SAMPLE: &str = include_str!("../../../herd-config.yaml");

    #[test]
    fn counters_reset_on_each_report() {
        let config = SimulationConfig::parse(SAMPLE).unwrap();
        let herd = Herd::new(&config.run, IdIssuer::new());
        let mut progress = ProgressCallback::new(10);
        let day = |day, culled| DaySummary {
            day,
            culled,
            ..DaySummary::default()
        };

        progress.on_day(&day(1, 2), &herd);
        progress.on_day(&day(2, 3), &herd);
        assert_eq!(progress.culled, 5);
        progress.on_day(&day(10, 1), &herd);
        assert_eq!(progress.culled, 0);
    }

    #[test]
    fn zero_interval_reports_daily() {
        let progress = ProgressCallback::new(0);
        assert_eq!(progress.interval, 1);
    }
}
