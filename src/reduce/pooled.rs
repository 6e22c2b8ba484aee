use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{BenchError, Result};
use crate::vacancy::Salaried;

use super::checked_average;

/// Bounded worker pool counterpart of the fan-out reducer.
pub struct Pool {
    pool: ThreadPool,
}

impl Pool {
    /// `threads == 0` lets rayon pick.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("pool_worker{}", i))
            .build()?;
        Ok(Pool { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn sum<R: Salaried + Sync>(&self, records: &[R]) -> u64 {
        self.pool.install(|| records.par_iter().map(|r| u64::from(r.salary())).sum())
    }

    pub fn max<R: Salaried + Sync>(&self, records: &[R]) -> u32 {
        self.pool.install(|| records.par_iter().map(|r| r.salary()).reduce(|| 0, u32::max))
    }

    pub fn average<R: Salaried + Sync>(&self, records: &[R]) -> Result<u64> {
        if records.is_empty() {
            return Err(BenchError::EmptyInput);
        }
        checked_average(self.sum(records), records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_scenario() {
        let pool = Pool::new(2).unwrap();
        assert_eq!(pool.threads(), 2);
        let s = [100u32, 200, 300, 400];
        assert_eq!(pool.sum(&s), 1000);
        assert_eq!(pool.max(&s), 400);
        assert_eq!(pool.average(&s).unwrap(), 250);
    }

    #[test]
    fn empty_input() {
        let pool = Pool::new(1).unwrap();
        let s: [u32; 0] = [];
        assert_eq!(pool.max(&s), 0);
        assert!(matches!(pool.average(&s), Err(BenchError::EmptyInput)));
    }
}
