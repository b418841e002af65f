use crate::{
    bindings::{TimerId, TimerReason},
    dispatcher::Dispatcher,
    estimator::{PersistedStats, TimingSample},
    wasm_bindgen, Logger,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Dispatcher {
    /// The JS code should call this method each time the timing information of a loaded
    /// resource is known.
    pub fn on_resource_timing(&mut self, timing: ResourceTiming) {
        self.add_timing(timing.into());
    }

    /// The JS code should call this method when receiving several resource timings at once,
    /// for example those collected by another execution context.
    pub fn on_resource_timings(&mut self, timings: Vec<ResourceTiming>) {
        Logger::lazy_debug(&|| format!("Dispatcher: received {} timings", timings.len()));
        for timing in timings {
            self.add_timing(timing.into());
        }
    }

    /// The JS code should call this method each time the size of a resource is known through
    /// means other than its resource timing.
    ///
    /// # Arguments
    ///
    /// * `url` - The final URL of the resource, as it will appear in its resource timing.
    ///
    /// * `size` - Size of the resource, in bytes.
    pub fn on_content_length(&mut self, url: &str, size: f64) {
        if size.is_finite() && size > 0. {
            self.content_lengths.add(url, size as u64);
        }
    }

    /// Same as `on_content_length`, but with the raw value of the `Content-Length` HTTP header.
    pub fn on_content_length_header(&mut self, url: &str, header_value: &str) {
        if !self.content_lengths.add_header_value(url, header_value) {
            Logger::lazy_debug(&|| {
                format!("Dispatcher: ignoring Content-Length \"{header_value}\" for {url}")
            });
        }
    }

    /// The JS code should call this method once estimates persisted by a previous session
    /// (through `jsPersistStats`) have been read back.
    pub fn on_persisted_stats(
        &mut self,
        bandwidth: Option<u32>,
        rtt: Option<u32>,
        connection_type: Option<String>,
    ) {
        self.estimator.seed(PersistedStats {
            bandwidth,
            rtt,
            connection_type,
        });
    }

    /// Method called once a timer started at the request of the Rust code
    /// is finished.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier given by `jsTimer` when the timer was started.
    ///
    /// * `reason` - The reason for which the timer was started.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        match reason {
            TimerReason::EstimateRefresh => self.on_refresh_timer_ended(id),
        }
    }
}

/// Timing information of a single loaded resource, as given by the JavaScript-side.
///
/// All timestamps are in milliseconds, on the clock returned by `jsNow`. Phases which are not
/// known should be set to `undefined`.
#[wasm_bindgen]
pub struct ResourceTiming {
    name: String,
    transfer_size: Option<f64>,
    domain_lookup_start: Option<f64>,
    domain_lookup_end: Option<f64>,
    connect_start: Option<f64>,
    connect_end: Option<f64>,
    request_start: Option<f64>,
    response_start: Option<f64>,
    response_end: Option<f64>,
}

#[wasm_bindgen]
impl ResourceTiming {
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(constructor)]
    pub fn new(
        name: String,
        transfer_size: Option<f64>,
        domain_lookup_start: Option<f64>,
        domain_lookup_end: Option<f64>,
        connect_start: Option<f64>,
        connect_end: Option<f64>,
        request_start: Option<f64>,
        response_start: Option<f64>,
        response_end: Option<f64>,
    ) -> Self {
        Self {
            name,
            transfer_size,
            domain_lookup_start,
            domain_lookup_end,
            connect_start,
            connect_end,
            request_start,
            response_start,
            response_end,
        }
    }
}

impl From<ResourceTiming> for TimingSample {
    fn from(timing: ResourceTiming) -> Self {
        TimingSample {
            name: timing.name,
            // A negative or non-numeric size is treated as unknown
            transfer_size: timing
                .transfer_size
                .filter(|size| size.is_finite() && *size >= 0.)
                .map(|size| size as u64),
            domain_lookup_start: timing.domain_lookup_start,
            domain_lookup_end: timing.domain_lookup_end,
            connect_start: timing.connect_start,
            connect_end: timing.connect_end,
            request_start: timing.request_start,
            response_start: timing.response_start,
            response_end: timing.response_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_timing_conversion() {
        let timing = ResourceTiming::new(
            String::from("https://example.com/a.js"),
            Some(2048.),
            Some(100.),
            Some(120.),
            Some(120.),
            Some(170.),
            Some(171.),
            Some(230.),
            Some(300.),
        );
        let sample = TimingSample::from(timing);
        assert_eq!(sample.name, "https://example.com/a.js");
        assert_eq!(sample.transfer_size, Some(2048));
        assert_eq!(sample.domain_lookup_start, Some(100.));
        assert_eq!(sample.response_end, Some(300.));
    }

    #[test]
    fn test_resource_timing_invalid_size() {
        let sample = TimingSample::from(ResourceTiming::new(
            String::from("a"),
            Some(-1.),
            None,
            None,
            None,
            None,
            None,
            Some(10.),
            Some(20.),
        ));
        assert_eq!(sample.transfer_size, None);
        let sample = TimingSample::from(ResourceTiming::new(
            String::from("a"),
            Some(f64::NAN),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ));
        assert_eq!(sample.transfer_size, None);
    }
}
