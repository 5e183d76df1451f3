pub mod config;
pub mod generation;
pub mod map;
pub mod savegame;
pub mod track;
pub mod water_regions;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100th occurrence of a counter when perf_stats is enabled.
///
/// Used to keep an eye on how often water regions get recomputed without
/// flooding the log. When the perf_stats feature is disabled this expands to
/// an empty block and the arguments are never evaluated.
///
/// # Example
/// ```
/// let recomputes: u64 = 200;
/// waterway::profile_log!(recomputes, "{} region recomputes so far", recomputes);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {
        if $count % 100 == 0 {
            bevy::log::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {};
}
