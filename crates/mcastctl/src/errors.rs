//! Exit codes for mcastctl
//!
//! Failure codes are taken from sysexits.h.

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// EX_UNAVAILABLE: the device session could not be established
pub const EXIT_DEVICE_UNREACHABLE: i32 = 69;

/// EX_TEMPFAIL: the device was reached but no narrative could be produced
pub const EXIT_ANALYSIS_FAILED: i32 = 75;

/// EX_CONFIG: the configuration file is unreadable or invalid
pub const EXIT_CONFIG_INVALID: i32 = 78;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes_match_sysexits() {
        assert_eq!(EXIT_DEVICE_UNREACHABLE, 69);
        assert_eq!(EXIT_ANALYSIS_FAILED, 75);
        assert_eq!(EXIT_CONFIG_INVALID, 78);
    }
}
