use super::ConfigurationErrorCode;
use crate::estimator::ConfigurationError;

pub(crate) fn format_configuration_err_for_js(
    err: &ConfigurationError,
) -> (ConfigurationErrorCode, String) {
    let code = match err {
        ConfigurationError::InvalidBucketWidth(_) => ConfigurationErrorCode::InvalidBucketWidth,
        ConfigurationError::NoWindow
        | ConfigurationError::InvalidWindow(_)
        | ConfigurationError::UnorderedWindows => ConfigurationErrorCode::InvalidWindows,
        ConfigurationError::InvalidWeightExponent(_) => {
            ConfigurationErrorCode::InvalidWeightExponent
        }
        ConfigurationError::InvalidMinimumWindowBytes(_) => {
            ConfigurationErrorCode::InvalidMinimumWindowBytes
        }
        ConfigurationError::InvalidCacheThroughputLimit(_) => {
            ConfigurationErrorCode::InvalidCacheThroughputLimit
        }
        ConfigurationError::InvalidNoiseFloor(_) => ConfigurationErrorCode::InvalidNoiseFloor,
        ConfigurationError::InvalidPercentile(_) => ConfigurationErrorCode::InvalidPercentile,
        ConfigurationError::InvalidTickInterval(_) => ConfigurationErrorCode::InvalidTickInterval,
    };
    (code, err.to_string())
}
