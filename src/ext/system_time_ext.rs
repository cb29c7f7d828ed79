use std::time::{SystemTime, UNIX_EPOCH};

pub trait SystemTimeExt {
    /// Splits the time into whole seconds and nanoseconds relative to the unix epoch.
    ///
    /// Times before the epoch yield negative seconds with a non-negative
    /// nanosecond part, so `seconds + nanos / 1e9` is always the exact instant.
    fn to_unix_parts(&self) -> (i64, u32);
}

impl SystemTimeExt for SystemTime {
    fn to_unix_parts(&self) -> (i64, u32) {
        match self.duration_since(UNIX_EPOCH) {
            Ok(after) => (after.as_secs() as i64, after.subsec_nanos()),
            Err(err) => {
                let before = err.duration();
                let seconds = -(before.as_secs() as i64);
                match before.subsec_nanos() {
                    0 => (seconds, 0),
                    nanos => (seconds - 1, 1_000_000_000 - nanos),
                }
            }
        }
    }
}
