use std::collections::BTreeMap;

use super::percentile::percentile;

/// Sparse, time-indexed accumulator of the bytes transferred per fixed-width time bucket.
///
/// Bucket `i` covers the `[epoch + i * bucket_width, epoch + (i + 1) * bucket_width)` interval,
/// in milliseconds. Indexes are signed, as a transfer may have begun before the epoch.
/// Buckets in which nothing was observed are absent rather than set to `0`.
#[derive(Clone, Debug)]
pub(crate) struct TransferTimeline {
    epoch: f64,
    bucket_width: f64,
    buckets: BTreeMap<i64, f64>,
}

impl TransferTimeline {
    /// Creates a new empty `TransferTimeline`.
    ///
    /// `bucket_width` has to be a strictly positive number of milliseconds, which is checked
    /// when validating the `EstimatorConfiguration`.
    pub(crate) fn new(epoch: f64, bucket_width: f64) -> Self {
        Self {
            epoch,
            bucket_width,
            buckets: BTreeMap::new(),
        }
    }

    pub(crate) fn bucket_width(&self) -> f64 {
        self.bucket_width
    }

    /// Index of the bucket containing the `timestamp` given, in milliseconds.
    fn bucket_index(&self, timestamp: f64) -> i64 {
        ((timestamp - self.epoch) / self.bucket_width).floor() as i64
    }

    /// Index of the last bucket touched by a transfer ending at `timestamp`.
    ///
    /// A transfer ending exactly on a bucket boundary does not touch the bucket beginning there.
    fn last_bucket_index(&self, timestamp: f64) -> i64 {
        ((timestamp - self.epoch) / self.bucket_width).ceil() as i64 - 1
    }

    /// Spread `size` bytes, transferred from `start` to `end`, evenly through all buckets that
    /// interval touches.
    ///
    /// Only the buckets of the last `retained_window` seconds of the transfer are written, older
    /// ones could not be read by any window. A zero-length or reversed interval is attributed
    /// entirely to the bucket of `start`.
    pub(crate) fn record(&mut self, start: f64, end: f64, size: u64, retained_window: f64) {
        if !start.is_finite() || !end.is_finite() {
            return;
        }
        let start_idx = self.bucket_index(start);
        let end_idx = self.last_bucket_index(end).max(start_idx);
        let nb_buckets = (end_idx - start_idx + 1) as f64;
        let bytes_per_bucket = size as f64 / nb_buckets;
        let retained_buckets = (retained_window * 1000. / self.bucket_width).ceil() as i64;
        let first_written = start_idx.max(end_idx - retained_buckets);
        for idx in first_written..=end_idx {
            *self.buckets.entry(idx).or_insert(0.) += bytes_per_bucket;
        }
    }

    /// Estimate the bandwidth, in kilobytes per second, for the last `window` seconds before
    /// `now`.
    ///
    /// The `bandwidth_percentile` of the bytes transferred per bucket is taken, which reflects
    /// the near-peak sustained throughput without being diluted by idle periods.
    ///
    /// Returns `None` if less than `minimum_bytes` were transferred during that window.
    pub(crate) fn estimate_bandwidth(
        &self,
        now: f64,
        window: f64,
        minimum_bytes: f64,
        bandwidth_percentile: f64,
    ) -> Option<f64> {
        let from = self.bucket_index(now - window * 1000.);
        let slice: Vec<f64> = self.buckets.range(from..).map(|(_, bytes)| *bytes).collect();
        if slice.is_empty() {
            return None;
        }
        let transferred: f64 = slice.iter().sum();
        if transferred < minimum_bytes {
            return None;
        }
        let bytes_per_bucket = percentile(slice, bandwidth_percentile)?;
        Some(bytes_per_bucket * 1000. / self.bucket_width / 1024.)
    }

    /// Remove all buckets ending before `timestamp`.
    pub(crate) fn prune_before(&mut self, timestamp: f64) {
        let first_kept = self.bucket_index(timestamp);
        self.buckets = self.buckets.split_off(&first_kept);
    }

    /// Total amount of bytes currently attributed to the timeline.
    #[cfg(test)]
    pub(crate) fn total_bytes(&self) -> f64 {
        self.buckets.values().sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: f64 = 86_400.;

    #[test]
    fn test_record_spreads_bytes() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1000., 2000., 102_400, DAY);
        assert_eq!(timeline.len(), 100);
        assert_eq!(timeline.buckets.get(&100), Some(&1024.));
        assert_eq!(timeline.buckets.get(&199), Some(&1024.));
        assert_eq!(timeline.buckets.get(&200), None);
        assert_eq!(timeline.total_bytes(), 102_400.);
    }

    #[test]
    fn test_record_partial_buckets() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1005., 1025., 300, DAY);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.buckets.get(&100), Some(&100.));
        assert_eq!(timeline.buckets.get(&102), Some(&100.));
    }

    #[test]
    fn test_record_before_epoch() {
        let mut timeline = TransferTimeline::new(1000., 10.);
        timeline.record(980., 1020., 400, DAY);
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.buckets.get(&-2), Some(&100.));
        assert_eq!(timeline.buckets.get(&1), Some(&100.));
    }

    #[test]
    fn test_record_degenerate_interval() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1000., 1000., 500, DAY);
        timeline.record(1003., 1001., 500, DAY);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.buckets.get(&100), Some(&1000.));
        timeline.record(f64::NAN, 1001., 500, DAY);
        assert_eq!(timeline.total_bytes(), 1000.);
    }

    #[test]
    fn test_record_long_transfer() {
        let mut timeline = TransferTimeline::new(0., 10.);
        // 10 bytes per bucket over 100 000 000 buckets
        timeline.record(0., 1.0e9, 1_000_000_000, 20.);
        assert_eq!(timeline.len(), 2001);
        assert_eq!(timeline.buckets.get(&99_999_999), Some(&10.));
        assert_eq!(timeline.buckets.get(&99_997_999), Some(&10.));
        assert_eq!(timeline.buckets.get(&99_997_998), None);
        assert_eq!(
            timeline.estimate_bandwidth(1.0e9, 20., 0., 0.9),
            Some(10. * 1000. / 10. / 1024.)
        );
    }

    #[test]
    fn test_estimate_empty() {
        let timeline = TransferTimeline::new(0., 10.);
        assert_eq!(timeline.estimate_bandwidth(5000., 20., 0., 0.9), None);
    }

    #[test]
    fn test_estimate_not_enough_data() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(500., 800., 1000, DAY);
        assert_eq!(timeline.estimate_bandwidth(5000., 20., 51_200., 0.9), None);
        assert!(timeline.estimate_bandwidth(5000., 20., 0., 0.9).is_some());
    }

    #[test]
    fn test_estimate_one_transfer() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1000., 2000., 102_400, DAY);
        assert_eq!(
            timeline.estimate_bandwidth(5000., 20., 51_200., 0.9),
            Some(100.)
        );
    }

    #[test]
    fn test_estimate_within_single_bucket() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(7771., 7778., 200_000, DAY);
        let estimate = timeline.estimate_bandwidth(10_000., 20., 51_200., 0.9);
        assert_eq!(estimate.map(f64::round), Some(19531.));
    }

    #[test]
    fn test_estimate_window_excludes_older_buckets() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1000., 2000., 102_400, DAY);
        timeline.record(30_000., 31_000., 204_800, DAY);
        // Only the second transfer is in the last 20 seconds
        assert_eq!(
            timeline.estimate_bandwidth(40_000., 20., 51_200., 0.9),
            Some(200.)
        );
        assert_eq!(timeline.estimate_bandwidth(60_000., 20., 51_200., 0.9), None);
    }

    #[test]
    fn test_prune() {
        let mut timeline = TransferTimeline::new(0., 10.);
        timeline.record(1000., 2000., 102_400, DAY);
        timeline.record(30_000., 31_000., 204_800, DAY);
        timeline.prune_before(20_000.);
        assert_eq!(timeline.len(), 100);
        assert_eq!(timeline.total_bytes(), 204_800.);
        timeline.clear();
        assert_eq!(timeline.len(), 0);
    }
}
