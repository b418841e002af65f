use crate::{
    bindings::jsNow,
    estimator::{ContentLengthRegistry, NetworkEstimator},
    utils::logger::LoggerLevel,
    wasm_bindgen, Logger,
};

use super::Dispatcher;

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl Dispatcher {
    /// Create a new `Dispatcher`, with the default configuration.
    ///
    /// Estimates are not refreshed until `start` is called.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Dispatcher {
            estimator: NetworkEstimator::with_default_configuration(jsNow()),
            content_lengths: ContentLengthRegistry::new(),
            refresh_timer: None,
        }
    }

    /// Start refreshing and announcing estimates periodically, the first time right away.
    ///
    /// Does nothing if estimates are already refreshed periodically.
    pub fn start(&mut self) {
        if self.refresh_timer.is_some() {
            return;
        }
        Logger::info("Dispatcher: starting estimate refreshes");
        self.refresh_estimates();
        self.schedule_next_refresh();
    }

    /// Stop refreshing estimates periodically.
    pub fn stop(&mut self) {
        Logger::info("Dispatcher: stopping estimate refreshes");
        self.clear_refresh_timer();
    }

    /// Forget all samples received and estimates produced until now.
    pub fn reset(&mut self) {
        Logger::info("Dispatcher: resetting estimates");
        self.estimator.reset();
        self.content_lengths.clear();
    }

    /// Last bandwidth estimate, in kilobytes per second, or `undefined` if not enough data has
    /// been collected yet.
    pub fn bandwidth(&self) -> Option<u32> {
        self.estimator
            .bandwidth(self.current_connection_type().as_deref())
    }

    /// Last RTT estimate, in milliseconds, or `undefined` if not enough data has been collected
    /// yet.
    pub fn rtt(&self) -> Option<u32> {
        self.estimator.rtt(self.current_connection_type().as_deref())
    }

    pub fn set_log_level(&self, level: LoggerLevel) {
        Logger::set_logger_level(level);
    }

    pub fn set_bucket_width(&mut self, width: f64) {
        self.update_configuration(|config| config.bucket_width = width);
    }

    /// Update the trailing windows, in seconds, for which estimates are computed.
    ///
    /// Windows have to be sent in ascending order, the first one being given the most weight.
    pub fn set_windows(&mut self, windows: &[f64]) {
        self.update_configuration(|config| config.windows = windows.to_vec());
    }

    pub fn set_weight_exponent(&mut self, exponent: f64) {
        self.update_configuration(|config| config.weight_exponent = exponent);
    }

    pub fn set_minimum_window_bytes(&mut self, bytes: f64) {
        self.update_configuration(|config| config.minimum_window_bytes = bytes);
    }

    pub fn set_cache_throughput_limit(&mut self, limit: f64) {
        self.update_configuration(|config| config.cache_throughput_limit = limit);
    }

    pub fn set_round_trip_noise_floor(&mut self, floor: f64) {
        self.update_configuration(|config| config.round_trip_noise_floor = floor);
    }

    pub fn set_minimum_rtt_samples(&mut self, minimum: u32) {
        self.update_configuration(|config| config.minimum_rtt_samples = minimum as usize);
    }

    pub fn set_bandwidth_percentile(&mut self, percentile: f64) {
        self.update_configuration(|config| config.bandwidth_percentile = percentile);
    }

    pub fn set_rtt_percentile(&mut self, percentile: f64) {
        self.update_configuration(|config| config.rtt_percentile = percentile);
    }

    /// Update the interval, in milliseconds, between two estimate refreshes.
    pub fn set_tick_interval(&mut self, interval: f64) {
        self.update_configuration(|config| config.tick_interval = interval);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
