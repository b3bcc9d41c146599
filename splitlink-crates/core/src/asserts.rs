#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const SPLITLINK_ASSERT_LEVEL_DEFINITION: u8 = SPLITLINK_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const SPLITLINK_ASSERT_LEVEL_DEFINITION: u8 = SPLITLINK_ASSERT_MODERATE;

/// Checks which are cheap enough to always run.
pub const SPLITLINK_ASSERT_SIMPLE: u8 = 1;
/// Checks which recompute cached aggregates; enabled in tests and with `debug-checks`.
pub const SPLITLINK_ASSERT_MODERATE: u8 = 2;

#[macro_export]
#[doc(hidden)]
macro_rules! splitlink_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::SPLITLINK_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SPLITLINK_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! splitlink_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::SPLITLINK_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SPLITLINK_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}
