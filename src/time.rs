use std::time::Instant;

/// Monotonic timestamp, immune to wall-clock adjustments (NTP steps,
/// `settimeofday`). Backed by [`std::time::Instant`], which the standard
/// library already guarantees is monotonic on every supported platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp(Instant);

/// Returns the current monotonic timestamp.
pub fn now() -> Timestamp {
    Timestamp(Instant::now())
}

/// Milliseconds elapsed between an earlier timestamp and `self`.
///
/// Saturates at zero rather than panicking if `earlier` is somehow later
/// (can't happen with monotonic timestamps from the same clock, but we don't
/// want a wraparound panic to be the failure mode if it ever does).
pub fn to_millis(later: Timestamp, earlier: Timestamp) -> u64 {
    later
        .0
        .checked_duration_since(earlier.0)
        .unwrap_or_default()
        .as_millis() as u64
}
