use std::fmt;

/// Cumulative flush and merge counters.
///
/// Time is wall-clock nanoseconds spent inside the respective pipeline;
/// bytes count key + value lengths moved (for merge: everything read from
/// the inputs plus everything written to the output).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub flush_time_ns: u64,
    pub merge_time_ns: u64,
    pub flush_bytes: u64,
    pub merge_bytes: u64,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flush: {} bytes in {:.3}s, merge: {} bytes in {:.3}s",
            self.flush_bytes,
            self.flush_time_ns as f64 / 1e9,
            self.merge_bytes,
            self.merge_time_ns as f64 / 1e9,
        )
    }
}
