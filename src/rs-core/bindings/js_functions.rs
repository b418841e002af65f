use crate::wasm_bindgen;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` of this
    // `Dispatcher` will be called with both the corresponding `TimerId` and `reason`,
    // which you can use on your side to better categorize timer categories.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Returns the current time, in milliseconds, on the same clock than the one used for the
    // timestamps of the `ResourceTiming` objects sent to the `Dispatcher`.
    pub fn jsNow() -> f64;

    // Returns the theoretical maximum downlink, in megabits per second, of the underlying
    // network if known (e.g. through the Network Information API's `downlinkMax` property).
    pub fn jsGetMaxDownlink() -> Option<f64>;

    // Returns the type of the current network connection (e.g. "wifi" or "cellular") if known.
    pub fn jsGetConnectionType() -> Option<String>;

    // Asks all execution contexts (pages, workers) which may have loaded resources to send
    // their resource timings, through the `on_resource_timing` method of this `Dispatcher`.
    pub fn jsRequestTimings();

    // Announces the last estimates, which may be `undefined` if not enough data is available
    // yet.
    //
    // `bandwidth` is in kilobytes per second and `rtt` in milliseconds.
    pub fn jsAnnounceEstimates(bandwidth: Option<u32>, rtt: Option<u32>);

    // Asks the JavaScript side to persist the given estimates under the given `key`, so they
    // can be given back through the `on_persisted_stats` method of a future `Dispatcher`.
    //
    // Persistence is best-effort: failing to persist should just be ignored.
    pub fn jsPersistStats(
        key: u32,
        bandwidth: Option<u32>,
        rtt: Option<u32>,
        connection_type: Option<&str>,
    );

    // Signals that a configuration update has been refused. The previous configuration is
    // still in use.
    pub fn jsSendConfigurationError(code: ConfigurationErrorCode, message: Option<&str>);
}

/// "Reason" associated to a timer started by the `Dispatcher`.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// The timer is linked to the periodic refresh of estimates.
    EstimateRefresh = 0,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Categorize the reason why a configuration update was refused.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigurationErrorCode {
    InvalidBucketWidth,
    InvalidWindows,
    InvalidWeightExponent,
    InvalidMinimumWindowBytes,
    InvalidCacheThroughputLimit,
    InvalidNoiseFloor,
    InvalidPercentile,
    InvalidTickInterval,
}

/// Identify a pending timer.
pub type TimerId = f64;
