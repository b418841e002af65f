use crate::{
    bindings::{
        formatters::format_configuration_err_for_js, jsAnnounceEstimates, jsClearTimer,
        jsGetConnectionType, jsGetMaxDownlink, jsNow, jsPersistStats, jsRequestTimings,
        jsSendConfigurationError, jsTimer, TimerId, TimerReason,
    },
    estimator::{
        megabits_to_kilobytes, Estimates, EstimatorConfiguration, PersistedStats, TimingSample,
        PERSISTED_STATS_KEY,
    },
    Logger,
};

use super::Dispatcher;

/// Methods called internally by the `Dispatcher`'s exported methods.
impl Dispatcher {
    pub(super) fn add_timing(&mut self, sample: TimingSample) {
        let name = sample.name.clone();
        if let Err(rejection) = self.estimator.ingest(sample, &self.content_lengths) {
            Logger::lazy_debug(&|| format!("Filter: ignoring {name}: {rejection}"));
        }
    }

    pub(super) fn current_connection_type(&self) -> Option<String> {
        jsGetConnectionType()
    }

    pub(super) fn on_refresh_timer_ended(&mut self, id: TimerId) {
        if self.refresh_timer != Some(id) {
            return;
        }
        self.refresh_timer = None;
        self.refresh_estimates();
        self.schedule_next_refresh();
    }

    /// Recompute, announce and persist estimates, then ask the JavaScript-side for the timings
    /// of the resources loaded since.
    pub(super) fn refresh_estimates(&mut self) {
        let connection_type = self.current_connection_type();
        let (announced, to_persist) =
            self.compute_estimates(jsNow(), jsGetMaxDownlink(), connection_type.as_deref());
        jsAnnounceEstimates(announced.bandwidth, announced.rtt);
        if let Some(stats) = to_persist {
            jsPersistStats(
                PERSISTED_STATS_KEY,
                stats.bandwidth,
                stats.rtt,
                stats.connection_type.as_deref(),
            );
        }
        jsRequestTimings();
    }

    /// Refresh the estimator at `now`, returning the estimates to announce (seeded values
    /// included) and the stats to persist, if any.
    ///
    /// `max_downlink` is in megabits per second, as reported by the JavaScript-side.
    fn compute_estimates(
        &mut self,
        now: f64,
        max_downlink: Option<f64>,
        connection_type: Option<&str>,
    ) -> (Estimates, Option<PersistedStats>) {
        let max_downlink = max_downlink
            .filter(|mbps| mbps.is_finite() && *mbps > 0.)
            .map(megabits_to_kilobytes);
        self.estimator.refresh(now, max_downlink);
        let announced = Estimates {
            bandwidth: self.estimator.bandwidth(connection_type),
            rtt: self.estimator.rtt(connection_type),
        };
        Logger::lazy_debug(&|| {
            format!(
                "Dispatcher: announcing bandwidth: {:?}, rtt: {:?}",
                announced.bandwidth, announced.rtt
            )
        });
        (announced, self.estimator.stats_to_persist(connection_type))
    }

    pub(super) fn schedule_next_refresh(&mut self) {
        let interval = self.estimator.configuration().tick_interval();
        self.refresh_timer = Some(jsTimer(interval, TimerReason::EstimateRefresh));
    }

    pub(super) fn clear_refresh_timer(&mut self) {
        if let Some(id) = self.refresh_timer.take() {
            jsClearTimer(id);
        }
    }

    /// Apply `update` to a copy of the current configuration and use it if valid.
    ///
    /// An invalid configuration is reported to the JavaScript-side, and the current one is kept.
    pub(super) fn update_configuration(&mut self, update: impl FnOnce(&mut EstimatorConfiguration)) {
        let previous_interval = self.estimator.configuration().tick_interval();
        let mut config = self.estimator.configuration().clone();
        update(&mut config);
        match self.estimator.update_configuration(config) {
            Ok(()) => {
                let interval = self.estimator.configuration().tick_interval();
                if interval != previous_interval && self.refresh_timer.is_some() {
                    self.clear_refresh_timer();
                    self.schedule_next_refresh();
                }
            }
            Err(err) => {
                Logger::lazy_error(&|| format!("Dispatcher: configuration refused: {err}"));
                let (code, message) = format_configuration_err_for_js(&err);
                jsSendConfigurationError(code, Some(&message));
            }
        }
    }
}
