use super::{percentile::percentile, sample::TimingSample};

/// Round trip estimate coming from a single accepted `TimingSample`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RttSample {
    /// `response_end` of the corresponding `TimingSample`, in milliseconds.
    timestamp: f64,
    /// Estimated round trip duration in milliseconds, `None` if the sample could not be
    /// attributed to any round trip.
    round_trip: Option<f64>,
}

/// Append-only log of the round trip estimates of every accepted sample.
#[derive(Clone, Debug, Default)]
pub(crate) struct RttSampleStore {
    samples: Vec<RttSample>,
}

impl RttSampleStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add the round trip estimate of an accepted `TimingSample` to the store.
    ///
    /// Samples without a known `response_end` cannot be placed in time and are ignored.
    pub(crate) fn record(&mut self, sample: &TimingSample, noise_floor: f64) {
        if let Some(timestamp) = sample.response_end.filter(|t| t.is_finite()) {
            self.samples.push(RttSample {
                timestamp,
                round_trip: sample.round_trip_estimate(noise_floor),
            });
        }
    }

    /// Estimate the RTT, in milliseconds, for samples received in the last `window` seconds
    /// before `now`.
    ///
    /// Returns `None` if less than `minimum_samples` samples could be attributed a round trip
    /// during that window.
    pub(crate) fn estimate_rtt(
        &self,
        now: f64,
        window: f64,
        minimum_samples: usize,
        rtt_percentile: f64,
    ) -> Option<f64> {
        let from = now - window * 1000.;
        let round_trips: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.timestamp >= from)
            .filter_map(|s| s.round_trip)
            .collect();
        if round_trips.len() < minimum_samples {
            return None;
        }
        percentile(round_trips, rtt_percentile)
    }

    /// Remove all samples received before `timestamp`.
    pub(crate) fn prune_before(&mut self, timestamp: f64) {
        self.samples.retain(|s| s.timestamp >= timestamp);
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }
}
