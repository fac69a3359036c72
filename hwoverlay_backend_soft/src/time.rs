// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock for the software backend.
//!
//! Ticks are nanoseconds since the first call to [`now`] in this process.

use std::sync::OnceLock;
use std::time::Instant;

use hwoverlay_core::time::{HostTime, Timebase};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Returns the software backend [`Timebase`]: host ticks are nanoseconds.
#[must_use]
pub const fn timebase() -> Timebase {
    Timebase::NANOS
}

/// Returns the current monotonic host time in nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    let epoch = *EPOCH.get_or_init(Instant::now);
    let nanos = Instant::now().saturating_duration_since(epoch).as_nanos();
    HostTime(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::{now, timebase};
    use hwoverlay_core::time::Timebase;

    #[test]
    fn timebase_is_nanos_identity() {
        assert_eq!(timebase(), Timebase::NANOS);
    }

    #[test]
    fn now_is_monotonic_non_decreasing() {
        let first = now();
        let second = now();
        assert!(second >= first, "monotonic clock should not go backwards");
    }
}
