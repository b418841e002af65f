/// Key under which the host is expected to persist the last `PersistedStats`.
pub const PERSISTED_STATS_KEY: u32 = 1;

/// Last known estimates, persisted by the host so they can be served right after a restart,
/// before enough live samples are available.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedStats {
    /// Bandwidth, in kilobytes per second.
    pub bandwidth: Option<u32>,
    /// Round trip time, in milliseconds.
    pub rtt: Option<u32>,
    /// Type of the network connection (e.g. `"wifi"`, `"cellular"`) when those were estimated.
    pub connection_type: Option<String>,
}

impl PersistedStats {
    /// Returns `true` if those stats may still describe a network whose current type is
    /// `current_connection_type`.
    ///
    /// Stats are only considered stale if both connection types are known and differ.
    pub(crate) fn applies_to(&self, current_connection_type: Option<&str>) -> bool {
        match (self.connection_type.as_deref(), current_connection_type) {
            (Some(persisted), Some(current)) => persisted == current,
            _ => true,
        }
    }
}

/// Seed values, read from `PersistedStats`, served until a live estimate replaces them.
#[derive(Clone, Debug, Default)]
pub(crate) struct EstimateSeed {
    stats: Option<PersistedStats>,

    /// Set once a live bandwidth estimate has been produced, after which no seeded bandwidth
    /// is served anymore, even one received later.
    has_live_bandwidth: bool,

    /// Same as `has_live_bandwidth`, for the RTT.
    has_live_rtt: bool,
}

impl EstimateSeed {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace the seed by `stats`. Zero values are considered as unknown, as are values for
    /// which a live estimate already exists.
    pub(crate) fn set(&mut self, stats: PersistedStats) {
        let stats = PersistedStats {
            bandwidth: stats
                .bandwidth
                .filter(|b| *b > 0 && !self.has_live_bandwidth),
            rtt: stats.rtt.filter(|r| *r > 0 && !self.has_live_rtt),
            connection_type: stats.connection_type,
        };
        self.stats = Some(stats);
    }

    pub(crate) fn bandwidth(&self, current_connection_type: Option<&str>) -> Option<u32> {
        self.stats
            .as_ref()
            .filter(|s| s.applies_to(current_connection_type))
            .and_then(|s| s.bandwidth)
    }

    pub(crate) fn rtt(&self, current_connection_type: Option<&str>) -> Option<u32> {
        self.stats
            .as_ref()
            .filter(|s| s.applies_to(current_connection_type))
            .and_then(|s| s.rtt)
    }

    /// Stop serving the seeded bandwidth, as a live estimate now exists.
    pub(crate) fn forget_bandwidth(&mut self) {
        self.has_live_bandwidth = true;
        if let Some(stats) = self.stats.as_mut() {
            stats.bandwidth = None;
        }
    }

    /// Stop serving the seeded RTT, as a live estimate now exists.
    pub(crate) fn forget_rtt(&mut self) {
        self.has_live_rtt = true;
        if let Some(stats) = self.stats.as_mut() {
            stats.rtt = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(connection_type: Option<&str>) -> PersistedStats {
        PersistedStats {
            bandwidth: Some(300),
            rtt: Some(80),
            connection_type: connection_type.map(str::to_owned),
        }
    }

    #[test]
    fn test_applies_to() {
        assert!(stats(None).applies_to(None));
        assert!(stats(None).applies_to(Some("wifi")));
        assert!(stats(Some("wifi")).applies_to(None));
        assert!(stats(Some("wifi")).applies_to(Some("wifi")));
        assert!(!stats(Some("wifi")).applies_to(Some("cellular")));
    }

    #[test]
    fn test_seed() {
        let mut seed = EstimateSeed::new();
        assert_eq!(seed.bandwidth(None), None);
        seed.set(stats(Some("wifi")));
        assert_eq!(seed.bandwidth(Some("wifi")), Some(300));
        assert_eq!(seed.rtt(Some("wifi")), Some(80));
        assert_eq!(seed.bandwidth(Some("cellular")), None);
        assert_eq!(seed.rtt(Some("cellular")), None);

        seed.forget_bandwidth();
        assert_eq!(seed.bandwidth(Some("wifi")), None);
        assert_eq!(seed.rtt(Some("wifi")), Some(80));
        seed.forget_rtt();
        assert_eq!(seed.rtt(Some("wifi")), None);
    }

    #[test]
    fn test_late_seed_after_live_estimate() {
        let mut seed = EstimateSeed::new();
        seed.forget_bandwidth();
        seed.set(stats(None));
        assert_eq!(seed.bandwidth(None), None);
        assert_eq!(seed.rtt(None), Some(80));
        seed.forget_rtt();
        seed.set(stats(None));
        assert_eq!(seed.rtt(None), None);
    }

    #[test]
    fn test_zero_seed_is_unknown() {
        let mut seed = EstimateSeed::new();
        seed.set(PersistedStats {
            bandwidth: Some(0),
            rtt: Some(0),
            connection_type: None,
        });
        assert_eq!(seed.bandwidth(None), None);
        assert_eq!(seed.rtt(None), None);
    }
}
