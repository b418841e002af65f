use thiserror::Error;

/// Default width, in milliseconds, of a single bucket of the transfer timeline.
pub(crate) const DEFAULT_BUCKET_WIDTH: f64 = 25.;

/// Default trailing windows, in seconds, over which estimates are computed: 20s, 1m, 5m and 1d.
pub(crate) const DEFAULT_WINDOWS: [f64; 4] = [20., 60., 300., 86400.];

/// Default exponent used to weight each window: the i-th window weights `1 / (i + 1)^3`.
pub(crate) const DEFAULT_WEIGHT_EXPONENT: f64 = 3.;

/// Default minimum amount of bytes a window should contain before a bandwidth estimate is
/// produced for it.
pub(crate) const DEFAULT_MINIMUM_WINDOW_BYTES: f64 = 51_200.;

/// Default throughput, in bytes per millisecond, at or above which a transfer is considered to
/// have been served from a local cache (roughly 200 Mbps).
pub(crate) const DEFAULT_CACHE_THROUGHPUT_LIMIT: f64 = 26_214.;

/// Default duration, in milliseconds, a request phase has to exceed to be counted as a round
/// trip.
pub(crate) const DEFAULT_ROUND_TRIP_NOISE_FLOOR: f64 = 10.;

/// Default minimum number of contributing samples in a window for a RTT estimate.
pub(crate) const DEFAULT_MINIMUM_RTT_SAMPLES: usize = 3;

pub(crate) const DEFAULT_BANDWIDTH_PERCENTILE: f64 = 0.9;
pub(crate) const DEFAULT_RTT_PERCENTILE: f64 = 0.2;

/// Default interval, in milliseconds, between two estimate refreshes.
pub(crate) const DEFAULT_TICK_INTERVAL: f64 = 1000.;

/// Configuration the `NetworkEstimator` relies on.
///
/// Can be updated at any time through the `NetworkEstimator`'s `update_configuration` method,
/// which validates it first.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfiguration {
    /// Width, in milliseconds, of a single bucket of the transfer timeline.
    ///
    /// Smaller buckets make bandwidth estimates more reactive to short bursts of parallel
    /// transfers, bigger ones smooth them out.
    pub(crate) bucket_width: f64,

    /// Trailing windows, in seconds, for which an estimate is computed on each tick.
    ///
    /// Must be ascending: the first window is the one with the most weight.
    pub(crate) windows: Vec<f64>,

    /// Exponent used when combining windows: the window at index `i` has a weight of
    /// `1 / (i + 1)^weight_exponent`.
    pub(crate) weight_exponent: f64,

    /// Minimum amount of bytes that should have been transferred in a window for a
    /// bandwidth estimate to be produced for it.
    pub(crate) minimum_window_bytes: f64,

    /// Throughput, in bytes per millisecond, at or above which a transfer is considered to come
    /// from a local cache and is thus ignored.
    pub(crate) cache_throughput_limit: f64,

    /// Duration, in milliseconds, the DNS, TCP or time-to-first-byte phase of a request has to
    /// exceed to be counted as one (two for TCP) round trip.
    pub(crate) round_trip_noise_floor: f64,

    /// Minimum number of contributing samples a window should contain for a RTT estimate to be
    /// produced for it.
    pub(crate) minimum_rtt_samples: usize,

    /// Percentile of the per-bucket transferred bytes used as the bandwidth of a window.
    pub(crate) bandwidth_percentile: f64,

    /// Percentile of the per-sample round trip durations used as the RTT of a window.
    pub(crate) rtt_percentile: f64,

    /// Interval, in milliseconds, between two estimate refreshes.
    pub(crate) tick_interval: f64,
}

impl Default for EstimatorConfiguration {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
            windows: DEFAULT_WINDOWS.to_vec(),
            weight_exponent: DEFAULT_WEIGHT_EXPONENT,
            minimum_window_bytes: DEFAULT_MINIMUM_WINDOW_BYTES,
            cache_throughput_limit: DEFAULT_CACHE_THROUGHPUT_LIMIT,
            round_trip_noise_floor: DEFAULT_ROUND_TRIP_NOISE_FLOOR,
            minimum_rtt_samples: DEFAULT_MINIMUM_RTT_SAMPLES,
            bandwidth_percentile: DEFAULT_BANDWIDTH_PERCENTILE,
            rtt_percentile: DEFAULT_RTT_PERCENTILE,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl EstimatorConfiguration {
    /// Checks that this configuration can be used by a `NetworkEstimator`.
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.bucket_width.is_finite() || self.bucket_width <= 0. {
            return Err(ConfigurationError::InvalidBucketWidth(self.bucket_width));
        }
        if self.windows.is_empty() {
            return Err(ConfigurationError::NoWindow);
        }
        let mut previous = 0.;
        for window in &self.windows {
            if !window.is_finite() || *window <= 0. {
                return Err(ConfigurationError::InvalidWindow(*window));
            }
            if *window <= previous {
                return Err(ConfigurationError::UnorderedWindows);
            }
            previous = *window;
        }
        if !self.weight_exponent.is_finite() {
            return Err(ConfigurationError::InvalidWeightExponent(self.weight_exponent));
        }
        if !self.minimum_window_bytes.is_finite() || self.minimum_window_bytes < 0. {
            return Err(ConfigurationError::InvalidMinimumWindowBytes(
                self.minimum_window_bytes,
            ));
        }
        if self.cache_throughput_limit.is_nan() || self.cache_throughput_limit <= 0. {
            return Err(ConfigurationError::InvalidCacheThroughputLimit(
                self.cache_throughput_limit,
            ));
        }
        if !self.round_trip_noise_floor.is_finite() || self.round_trip_noise_floor < 0. {
            return Err(ConfigurationError::InvalidNoiseFloor(
                self.round_trip_noise_floor,
            ));
        }
        if !(0. ..1.).contains(&self.bandwidth_percentile) {
            return Err(ConfigurationError::InvalidPercentile(self.bandwidth_percentile));
        }
        if !(0. ..1.).contains(&self.rtt_percentile) {
            return Err(ConfigurationError::InvalidPercentile(self.rtt_percentile));
        }
        if !self.tick_interval.is_finite() || self.tick_interval <= 0. {
            return Err(ConfigurationError::InvalidTickInterval(self.tick_interval));
        }
        Ok(())
    }

    /// Longest configured window, in seconds.
    pub(crate) fn longest_window(&self) -> f64 {
        self.windows.iter().copied().fold(0., f64::max)
    }

    pub(crate) fn bucket_width(&self) -> f64 {
        self.bucket_width
    }

    pub(crate) fn tick_interval(&self) -> f64 {
        self.tick_interval
    }
}

/// Error returned when an `EstimatorConfiguration` cannot be used.
///
/// This is the only fatal condition of the estimation logic: data-quality issues never
/// lead to an error.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("The bucket width should be a strictly positive number of milliseconds, got {0}")]
    InvalidBucketWidth(f64),
    #[error("At least one estimation window should be configured")]
    NoWindow,
    #[error("Estimation windows should be strictly positive numbers of seconds, got {0}")]
    InvalidWindow(f64),
    #[error("Estimation windows should be in a strictly ascending order")]
    UnorderedWindows,
    #[error("The window weight exponent should be a finite number, got {0}")]
    InvalidWeightExponent(f64),
    #[error("The minimum amount of bytes per window should be a positive number, got {0}")]
    InvalidMinimumWindowBytes(f64),
    #[error("The cache throughput limit should be a strictly positive number, got {0}")]
    InvalidCacheThroughputLimit(f64),
    #[error("The round trip noise floor should be a positive number of milliseconds, got {0}")]
    InvalidNoiseFloor(f64),
    #[error("Percentiles should be comprised between 0 (included) and 1 (excluded), got {0}")]
    InvalidPercentile(f64),
    #[error("The tick interval should be a strictly positive number of milliseconds, got {0}")]
    InvalidTickInterval(f64),
}
