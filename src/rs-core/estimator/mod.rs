use crate::Logger;

use self::{
    combiner::{apply_downlink_cap, average_with_weight},
    persisted::EstimateSeed,
    rtt_store::RttSampleStore,
    sample::filter_sample,
    timeline::TransferTimeline,
};

mod combiner;
mod configuration;
mod content_lengths;
mod percentile;
mod persisted;
mod rtt_store;
mod sample;
mod timeline;


pub(crate) use combiner::megabits_to_kilobytes;
pub use configuration::{ConfigurationError, EstimatorConfiguration};
pub use content_lengths::{ContentLengthLookup, ContentLengthRegistry};
pub use persisted::{PersistedStats, PERSISTED_STATS_KEY};
pub use sample::{SampleRejection, TimingSample};

/// Values published after each refresh of the `NetworkEstimator`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Estimates {
    /// Estimated bandwidth, in kilobytes per second.
    pub bandwidth: Option<u32>,
    /// Estimated round trip time, in milliseconds.
    pub rtt: Option<u32>,
}

/// Produces bandwidth and RTT estimates from the timing information of resources loaded over
/// the network, without performing any dedicated request.
///
/// Accepted samples are spread into a timeline of transferred bytes and into a log of round trip
/// estimates. On each refresh, an estimate is computed for each configured window and all of
/// them are combined, giving much more weight to the most recent one.
///
/// No estimate is ever fabricated: when not enough data is available, `None` is returned.
pub struct NetworkEstimator {
    config: EstimatorConfiguration,

    /// Time, in milliseconds, from which the timeline's buckets are indexed.
    epoch: f64,

    timeline: TransferTimeline,

    rtt_store: RttSampleStore,

    /// Estimates computed at the last refresh.
    last_estimates: Estimates,

    /// Estimates persisted by a previous session, served until live ones are available.
    seed: EstimateSeed,
}

impl NetworkEstimator {
    /// Creates a new `NetworkEstimator` relying on the given configuration.
    ///
    /// `epoch` is the time, in milliseconds and on the same clock as the samples, at which this
    /// estimator is considered to have started.
    pub fn new(config: EstimatorConfiguration, epoch: f64) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self::new_unchecked(config, epoch))
    }

    /// Creates a new `NetworkEstimator` relying on the default configuration.
    pub fn with_default_configuration(epoch: f64) -> Self {
        Self::new_unchecked(EstimatorConfiguration::default(), epoch)
    }

    fn new_unchecked(config: EstimatorConfiguration, epoch: f64) -> Self {
        Self {
            timeline: TransferTimeline::new(epoch, config.bucket_width()),
            rtt_store: RttSampleStore::new(),
            last_estimates: Estimates::default(),
            seed: EstimateSeed::new(),
            config,
            epoch,
        }
    }

    pub fn configuration(&self) -> &EstimatorConfiguration {
        &self.config
    }

    /// Replace the current configuration by `config`.
    ///
    /// If `config` is invalid, the current configuration is kept and an error is returned.
    /// Changing the bucket width empties the transfer timeline, as already recorded buckets
    /// cannot be split again.
    pub fn update_configuration(
        &mut self,
        config: EstimatorConfiguration,
    ) -> Result<(), ConfigurationError> {
        config.validate()?;
        if config.bucket_width() != self.timeline.bucket_width() {
            Logger::warn("Estimator: bucket width updated, previous transfers are forgotten");
            self.timeline = TransferTimeline::new(self.epoch, config.bucket_width());
        }
        self.config = config;
        Ok(())
    }

    /// Add a new `TimingSample` to this `NetworkEstimator`.
    ///
    /// If the sample's transfer size is unknown, it is looked up through `content_lengths`.
    /// Samples which look unreliable (e.g. served from a cache) are ignored, in which case the
    /// reason is returned. A returned `SampleRejection` is informative, never an error to
    /// propagate.
    pub fn ingest(
        &mut self,
        sample: TimingSample,
        content_lengths: &dyn ContentLengthLookup,
    ) -> Result<(), SampleRejection> {
        let sample = filter_sample(sample, content_lengths, self.config.cache_throughput_limit)?;
        if let (Some(start), Some(end), Some(size)) =
            (sample.response_start, sample.response_end, sample.transfer_size)
        {
            self.timeline
                .record(start, end, size, self.config.longest_window());
        } else {
            Logger::lazy_debug(&|| {
                format!(
                    "Estimator: size of {} unknown, only considered for RTT",
                    sample.name
                )
            });
        }
        self.rtt_store
            .record(&sample, self.config.round_trip_noise_floor);
        Ok(())
    }

    /// Estimate the bandwidth, in kilobytes per second, for the last `window` seconds.
    pub fn estimate_bandwidth(&self, now: f64, window: f64) -> Option<f64> {
        self.timeline.estimate_bandwidth(
            now,
            window,
            self.config.minimum_window_bytes,
            self.config.bandwidth_percentile,
        )
    }

    /// Estimate the RTT, in milliseconds, for the last `window` seconds.
    pub fn estimate_rtt(&self, now: f64, window: f64) -> Option<f64> {
        self.rtt_store.estimate_rtt(
            now,
            window,
            self.config.minimum_rtt_samples,
            self.config.rtt_percentile,
        )
    }

    /// Bandwidth, in kilobytes per second, combined from all configured windows and bounded by
    /// `max_downlink` (also in kilobytes per second) if set.
    pub fn combined_bandwidth(&self, now: f64, max_downlink: Option<f64>) -> Option<f64> {
        let per_window: Vec<Option<f64>> = self
            .config
            .windows
            .iter()
            .map(|w| self.estimate_bandwidth(now, *w))
            .collect();
        average_with_weight(&per_window, self.config.weight_exponent)
            .map(|bw| apply_downlink_cap(bw, max_downlink))
    }

    /// RTT, in milliseconds, combined from all configured windows.
    pub fn combined_rtt(&self, now: f64) -> Option<f64> {
        let per_window: Vec<Option<f64>> = self
            .config
            .windows
            .iter()
            .map(|w| self.estimate_rtt(now, *w))
            .collect();
        average_with_weight(&per_window, self.config.weight_exponent)
    }

    /// Recompute both estimates at time `now`, forgetting data too old to be part of any window.
    ///
    /// `max_downlink` is the theoretical maximum throughput of the underlying network in
    /// kilobytes per second, if known.
    pub fn refresh(&mut self, now: f64, max_downlink: Option<f64>) -> Estimates {
        let oldest_needed = now - self.config.longest_window() * 1000.;
        self.timeline.prune_before(oldest_needed);
        self.rtt_store.prune_before(oldest_needed);

        let estimates = Estimates {
            bandwidth: self
                .combined_bandwidth(now, max_downlink)
                .map(|bw| bw.round() as u32),
            rtt: self.combined_rtt(now).map(|rtt| rtt.round() as u32),
        };
        if estimates.bandwidth.is_some() {
            self.seed.forget_bandwidth();
        }
        if estimates.rtt.is_some() {
            self.seed.forget_rtt();
        }
        Logger::lazy_debug(&|| {
            format!(
                "Estimator: refreshed from {} buckets and {} RTT samples, bandwidth: {:?}, rtt: {:?}",
                self.timeline.len(),
                self.rtt_store.len(),
                estimates.bandwidth,
                estimates.rtt
            )
        });
        self.last_estimates = estimates;
        estimates
    }

    /// Last bandwidth estimate, in kilobytes per second.
    ///
    /// Falls back to the persisted one if no live estimate was produced yet and the network type
    /// did not change since.
    pub fn bandwidth(&self, current_connection_type: Option<&str>) -> Option<u32> {
        self.last_estimates
            .bandwidth
            .or_else(|| self.seed.bandwidth(current_connection_type))
    }

    /// Last RTT estimate, in milliseconds.
    ///
    /// Falls back to the persisted one if no live estimate was produced yet and the network type
    /// did not change since.
    pub fn rtt(&self, current_connection_type: Option<&str>) -> Option<u32> {
        self.last_estimates
            .rtt
            .or_else(|| self.seed.rtt(current_connection_type))
    }

    /// Provide estimates persisted by a previous session.
    pub fn seed(&mut self, stats: PersistedStats) {
        Logger::lazy_debug(&|| {
            format!(
                "Estimator: seeding with bandwidth {:?}, rtt {:?}",
                stats.bandwidth, stats.rtt
            )
        });
        self.seed.set(stats);
    }

    /// Returns the stats the host should persist, or `None` if no live estimate exists.
    pub fn stats_to_persist(&self, current_connection_type: Option<&str>) -> Option<PersistedStats> {
        let Estimates { bandwidth, rtt } = self.last_estimates;
        if bandwidth.is_none() && rtt.is_none() {
            return None;
        }
        Some(PersistedStats {
            bandwidth,
            rtt,
            connection_type: current_connection_type.map(str::to_owned),
        })
    }

    /// Forget all samples and estimates, as if no sample was ever added.
    ///
    /// Seeded values are kept.
    pub fn reset(&mut self) {
        self.timeline.clear();
        self.rtt_store.clear();
        self.last_estimates = Estimates::default();
    }
}
