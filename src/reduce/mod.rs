//! Salary reductions: a single-threaded pass, a naive one-thread-per-record
//! fan-out and a bounded rayon pool.
//!
//! Every reducer seeds its maximum with 0, which is only a valid identity
//! because salaries are unsigned.

pub mod concurrent;
pub mod pooled;
pub mod sequential;

pub use concurrent::{ConcurrentOpts, MaxStrategy};
pub use pooled::Pool;

use crate::error::{BenchError, Result};

// shared by every average: truncating division, empty input is an error
pub(crate) fn checked_average(sum: u64, len: usize) -> Result<u64> {
    if len == 0 {
        return Err(BenchError::EmptyInput);
    }
    Ok(sum / len as u64)
}
