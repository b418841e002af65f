/// Returns the value at the given percentile `p` (between `0` and `1`) of `values`.
///
/// Entries that were not observed (`None`, or `NaN`) are ignored. This is a nearest-rank
/// percentile without interpolation: values are sorted in ascending order and the one at index
/// `floor(len * p)` is returned. Not very accurate, but accurate enough for our needs.
///
/// Returns `None` if there's no observed value at all.
pub(crate) fn percentile<I, T>(values: I, p: f64) -> Option<f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    let mut observed: Vec<f64> = values
        .into_iter()
        .filter_map(Into::<Option<f64>>::into)
        .filter(|v| !v.is_nan())
        .collect();
    if observed.is_empty() {
        return None;
    }
    observed.sort_by(f64::total_cmp);
    let rank = (observed.len() as f64 * p).floor();
    let idx = if rank <= 0. {
        0
    } else {
        (rank as usize).min(observed.len() - 1)
    };
    Some(observed[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(percentile(Vec::<f64>::new(), 0.8), None);
        assert_eq!(percentile(Vec::<f64>::new(), 0.), None);
        assert_eq!(percentile(vec![None::<f64>, None], 0.5), None);
    }

    #[test]
    fn test_nearest_rank() {
        let values: Vec<f64> = (0u8..10).map(f64::from).collect();
        assert_eq!(percentile(values, 0.8), Some(8.));
        let values: Vec<f64> = (0u8..11).map(f64::from).collect();
        assert_eq!(percentile(values, 0.8), Some(8.));
        let values: Vec<f64> = (0u8..12).map(f64::from).collect();
        assert_eq!(percentile(values, 0.8), Some(9.));
        assert_eq!(percentile([8., 6.], 0.4), Some(6.));
        assert_eq!(percentile([8., 6.], 0.6), Some(8.));
    }

    #[test]
    fn test_unsorted_input() {
        assert_eq!(
            percentile([9., 8., 7., 3., 4., 5., 6., 2., 0., 1.], 0.8),
            Some(8.)
        );
    }

    #[test]
    fn test_ignores_unobserved() {
        assert_eq!(
            percentile([Some(8f64), None, None, Some(6.), None, Some(4.)], 0.5),
            Some(6.)
        );
        assert_eq!(percentile([f64::NAN, 3., f64::NAN], 0.9), Some(3.));
    }

    #[test]
    fn test_ties() {
        assert_eq!(percentile([5., 5., 5., 1.], 0.5), Some(5.));
        assert_eq!(percentile([1., 1., 2.], 0.2), Some(1.));
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(percentile([1., 2., 3.], 1.), Some(3.));
    }
}
