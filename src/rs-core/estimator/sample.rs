use thiserror::Error;

use super::content_lengths::ContentLengthLookup;

/// One resource transfer observation, as reported by the host's resource timing facility.
///
/// All timestamps are in milliseconds, on the same clock as the one given to the
/// `NetworkEstimator`. Phases which did not occur (for example the DNS lookup of a reused
/// connection, or any phase of a cross-origin resource without timing authorization) are set to
/// `None` rather than to `0`, so they never produce a spurious zero-duration interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingSample {
    /// Identifier of the resource, generally its URL.
    pub name: String,
    /// Size in bytes of the resource on the wire, if known.
    pub transfer_size: Option<u64>,
    pub domain_lookup_start: Option<f64>,
    pub domain_lookup_end: Option<f64>,
    pub connect_start: Option<f64>,
    pub connect_end: Option<f64>,
    pub request_start: Option<f64>,
    pub response_start: Option<f64>,
    pub response_end: Option<f64>,
}

impl TimingSample {
    /// Duration of the DNS lookup, in milliseconds.
    pub(crate) fn dns_duration(&self) -> Option<f64> {
        phase_duration(self.domain_lookup_start, self.domain_lookup_end)
    }

    /// Duration of the connection establishment (TCP + TLS), in milliseconds.
    pub(crate) fn connect_duration(&self) -> Option<f64> {
        phase_duration(self.connect_start, self.connect_end)
    }

    /// Time between the request being sent and the first byte of the response, in milliseconds.
    pub(crate) fn time_to_first_byte(&self) -> Option<f64> {
        phase_duration(self.request_start, self.response_start)
    }

    /// Duration of the response's transfer, in milliseconds.
    pub(crate) fn response_duration(&self) -> Option<f64> {
        phase_duration(self.response_start, self.response_end)
    }

    /// Estimate a single round trip duration, in milliseconds, from this sample's phases.
    ///
    /// Each of the DNS, connection and time-to-first-byte phases longer than `noise_floor` is
    /// considered as a round trip. The connection phase counts as two, as we assume HTTPS
    /// everywhere (TCP handshake then TLS handshake).
    ///
    /// Returns `None` if no phase can be attributed to a round trip, e.g. when the connection was
    /// reused.
    pub(crate) fn round_trip_estimate(&self, noise_floor: f64) -> Option<f64> {
        let dns = self.dns_duration();
        let tcp = self.connect_duration();
        let ttfb = self.time_to_first_byte();
        let is_round_trip = |d: Option<f64>| d.map_or(false, |d| d > noise_floor);
        let round_trips_count = u32::from(is_round_trip(dns))
            + 2 * u32::from(is_round_trip(tcp))
            + u32::from(is_round_trip(ttfb));
        if round_trips_count == 0 {
            return None;
        }
        let total = dns.unwrap_or(0.) + tcp.unwrap_or(0.) + ttfb.unwrap_or(0.);
        Some((total / f64::from(round_trips_count)).round())
    }
}

fn phase_duration(start: Option<f64>, end: Option<f64>) -> Option<f64> {
    match (start, end) {
        (Some(start), Some(end)) if start.is_finite() && end.is_finite() => Some(end - start),
        _ => None,
    }
}

/// Reason why a `TimingSample` was not taken into account.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum SampleRejection {
    #[error("the response start or end time is unknown")]
    MissingResponseTiming,
    #[error("the response took {0}ms to be received")]
    NonPositiveDuration(f64),
    #[error("a zero transfer size was reported and no content length is known")]
    EmptyTransfer,
    #[error("its implied throughput of {0:.0} bytes/ms most probably means it came from a cache")]
    LikelyCached(f64),
}

/// Decides whether a `TimingSample` is trustworthy enough to be used for estimates.
///
/// If the sample's transfer size is not known, it is looked up through `content_lengths`. The
/// sample is refused if its transfer took no time or if it was transferred so fast that it most
/// probably came from a local cache.
///
/// A sample whose size stays unknown is still accepted, with a `None` transfer size: it cannot
/// be used for bandwidth estimates but its phases are still useful for RTT ones.
pub(crate) fn filter_sample(
    mut sample: TimingSample,
    content_lengths: &dyn ContentLengthLookup,
    cache_throughput_limit: f64,
) -> Result<TimingSample, SampleRejection> {
    let duration = sample
        .response_duration()
        .ok_or(SampleRejection::MissingResponseTiming)?;
    if duration.is_nan() || duration <= 0. {
        return Err(SampleRejection::NonPositiveDuration(duration));
    }

    let reported_size = sample.transfer_size;
    let size = reported_size
        .filter(|s| *s > 0)
        .or_else(|| content_lengths.content_length(&sample.name))
        .filter(|s| *s > 0);
    match size {
        Some(size) => {
            let throughput = size as f64 / duration;
            if throughput >= cache_throughput_limit {
                return Err(SampleRejection::LikelyCached(throughput));
            }
            sample.transfer_size = Some(size);
            Ok(sample)
        }
        None if reported_size.is_some() => Err(SampleRejection::EmptyTransfer),
        None => Ok(sample),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::content_lengths::ContentLengthRegistry;

    const LIMIT: f64 = 26_214.;

    fn transfer(start: f64, end: f64, size: Option<u64>) -> TimingSample {
        TimingSample {
            name: "https://example.com/a.js".to_owned(),
            transfer_size: size,
            response_start: Some(start),
            response_end: Some(end),
            ..TimingSample::default()
        }
    }

    #[test]
    fn test_accepts_regular_transfer() {
        let registry = ContentLengthRegistry::new();
        let sample = transfer(1000., 2000., Some(102_400));
        assert_eq!(
            filter_sample(sample.clone(), &registry, LIMIT),
            Ok(sample)
        );
    }

    #[test]
    fn test_rejects_missing_response_times() {
        let registry = ContentLengthRegistry::new();
        let mut sample = transfer(1000., 2000., Some(102_400));
        sample.response_start = None;
        assert_eq!(
            filter_sample(sample, &registry, LIMIT),
            Err(SampleRejection::MissingResponseTiming)
        );
    }

    #[test]
    fn test_rejects_zero_duration() {
        let registry = ContentLengthRegistry::new();
        assert_eq!(
            filter_sample(transfer(1000., 1000., Some(102_400)), &registry, LIMIT),
            Err(SampleRejection::NonPositiveDuration(0.))
        );
        assert_eq!(
            filter_sample(transfer(1000., 990., Some(102_400)), &registry, LIMIT),
            Err(SampleRejection::NonPositiveDuration(-10.))
        );
    }

    #[test]
    fn test_rejects_likely_cached() {
        let registry = ContentLengthRegistry::new();
        // 200 000 bytes in 7ms
        let res = filter_sample(transfer(7771., 7778., Some(200_000)), &registry, LIMIT);
        assert!(matches!(res, Err(SampleRejection::LikelyCached(_))));

        // Exactly on the limit
        let res = filter_sample(transfer(0., 1., Some(26_214)), &registry, LIMIT);
        assert!(matches!(res, Err(SampleRejection::LikelyCached(_))));
        let res = filter_sample(transfer(0., 1., Some(26_213)), &registry, LIMIT);
        assert!(res.is_ok());
    }

    #[test]
    fn test_backfills_size_from_content_length() {
        let mut registry = ContentLengthRegistry::new();
        registry.add("https://example.com/a.js", 5_000);
        registry.add("https://example.com/a.js", 10_000);
        let res = filter_sample(transfer(1000., 1100., None), &registry, LIMIT);
        assert_eq!(res.map(|s| s.transfer_size), Ok(Some(10_000)));

        let res = filter_sample(transfer(1000., 1100., Some(0)), &registry, LIMIT);
        assert_eq!(res.map(|s| s.transfer_size), Ok(Some(10_000)));
    }

    #[test]
    fn test_backfilled_size_is_checked_against_cache_limit() {
        let lookup = |_: &str| Some(1_000_000u64);
        let res = filter_sample(transfer(1000., 1001., None), &lookup, LIMIT);
        assert!(matches!(res, Err(SampleRejection::LikelyCached(_))));
    }

    #[test]
    fn test_unknown_size() {
        let registry = ContentLengthRegistry::new();
        let res = filter_sample(transfer(1000., 1100., None), &registry, LIMIT);
        assert_eq!(res.map(|s| s.transfer_size), Ok(None));

        assert_eq!(
            filter_sample(transfer(1000., 1100., Some(0)), &registry, LIMIT),
            Err(SampleRejection::EmptyTransfer)
        );
    }

    #[test]
    fn test_round_trip_estimate() {
        // HTTPS resource, new connection
        let sample = TimingSample {
            domain_lookup_start: Some(6166.7),
            domain_lookup_end: Some(6183.1),
            connect_start: Some(6183.1),
            connect_end: Some(6325.),
            request_start: Some(6325.6),
            response_start: Some(6424.1),
            response_end: Some(6431.6),
            ..TimingSample::default()
        };
        // (16.4 + 141.9 + 98.5) / 4
        assert_eq!(sample.round_trip_estimate(10.), Some(64.));

        // Reused connection, fast server
        let sample = TimingSample {
            domain_lookup_start: Some(649.8),
            domain_lookup_end: Some(649.8),
            connect_start: Some(649.8),
            connect_end: Some(649.8),
            request_start: Some(652.4),
            response_start: Some(655.3),
            response_end: Some(659.6),
            ..TimingSample::default()
        };
        assert_eq!(sample.round_trip_estimate(10.), None);

        // Only the time to first byte is known
        let sample = TimingSample {
            request_start: Some(100.),
            response_start: Some(180.),
            response_end: Some(200.),
            ..TimingSample::default()
        };
        assert_eq!(sample.round_trip_estimate(10.), Some(80.));
    }
}
