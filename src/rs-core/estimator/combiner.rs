/// Returns the weighted average of the known `values`, giving much more weight to the first ones.
///
/// The value at index `i` has a weight of `1 / (i + 1)^exponent`. With an exponent of `3`, the
/// first value weights `1`, the second `1/8`, the third `1/27`, the fourth `1/64` and so on.
///
/// Unknown values are skipped, they do not dilute the others. Returns `None` if no value is
/// known.
pub(crate) fn average_with_weight(values: &[Option<f64>], exponent: f64) -> Option<f64> {
    let mut total = 0.;
    let mut total_weights = 0.;
    for (i, value) in values.iter().enumerate() {
        if let Some(value) = value {
            let weight = 1. / ((i + 1) as f64).powf(exponent);
            total += value * weight;
            total_weights += weight;
        }
    }
    if total_weights == 0. {
        None
    } else {
        Some(total / total_weights)
    }
}

/// Bound a bandwidth estimate, in kilobytes per second, by the theoretical maximum throughput of
/// the underlying network, when it is known.
pub(crate) fn apply_downlink_cap(bandwidth: f64, max_downlink: Option<f64>) -> f64 {
    match max_downlink {
        Some(cap) if cap > 0. => bandwidth.min(cap),
        _ => bandwidth,
    }
}

/// Convert a downlink expressed in megabits per second, as reported by browsers, to kilobytes
/// per second.
pub(crate) fn megabits_to_kilobytes(mbps: f64) -> f64 {
    mbps * 1_000_000. / 8. / 1024.
}
