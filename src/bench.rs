use std::time::Instant;

use crate::error::{BenchError, Result};
use crate::reduce::{concurrent, sequential, ConcurrentOpts, MaxStrategy, Pool};
use crate::vacancy::Salaried;

pub const AVG_CONCURRENT: &str = "avg-concurrent";
pub const MAX_CONCURRENT: &str = "max-concurrent";
pub const AVG_SEQUENTIAL: &str = "avg-sequential";
pub const MAX_SEQUENTIAL: &str = "max-sequential";
pub const AVG_POOLED: &str = "avg-pooled";
pub const MAX_POOLED: &str = "max-pooled";

/// Wall time of one reducer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub name: &'static str,
    pub elapsed_ns: u128,
}

/// Result values of one operation under each strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub concurrent: u64,
    pub sequential: u64,
    pub pooled: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BenchReport {
    pub records: usize,
    pub max_strategy: MaxStrategy,
    /// in call order
    pub timings: Vec<Timing>,
    pub avg: Outcome,
    pub max: Outcome,
}

/// Runs `f` once and measures it on the monotonic clock.
pub fn timed<T>(name: &'static str, f: impl FnOnce() -> T) -> (T, Timing) {
    let start = Instant::now();
    let out = f();
    let elapsed_ns = start.elapsed().as_nanos();
    (out, Timing { name, elapsed_ns })
}

/// Calls every reducer exactly once, in the order avg-concurrent,
/// max-concurrent, avg-sequential, max-sequential (then avg-pooled,
/// max-pooled when a pool is given). The first failing call aborts the run.
pub fn run<R: Salaried + Sync>(records: &[R], opts: &ConcurrentOpts, pool: Option<&Pool>) -> Result<BenchReport> {
    let mut timings = Vec::with_capacity(6);

    let (avg_concurrent, t) = timed(AVG_CONCURRENT, || concurrent::average(records, opts));
    timings.push(t);
    let avg_concurrent = avg_concurrent?;

    let (max_concurrent, t) = timed(MAX_CONCURRENT, || concurrent::max(records, opts));
    timings.push(t);
    let max_concurrent = max_concurrent?;

    let (avg_sequential, t) = timed(AVG_SEQUENTIAL, || sequential::average(records));
    timings.push(t);
    let avg_sequential = avg_sequential?;

    let (max_sequential, t) = timed(MAX_SEQUENTIAL, || sequential::max(records));
    timings.push(t);

    let (avg_pooled, max_pooled) = match pool {
        Some(pool) => {
            let (avg, t) = timed(AVG_POOLED, || pool.average(records));
            timings.push(t);
            let avg = avg?;
            let (max, t) = timed(MAX_POOLED, || pool.max(records));
            timings.push(t);
            (Some(avg), Some(u64::from(max)))
        }
        None => (None, None),
    };

    if opts.verbose > 0 {
        eprintln!("avg: {} / {}  max: {} / {}  (concurrent / sequential)",
            avg_concurrent, avg_sequential, max_concurrent, max_sequential);
    }

    Ok(BenchReport {
        records: records.len(),
        max_strategy: opts.max_strategy,
        timings,
        avg: Outcome { concurrent: avg_concurrent, sequential: avg_sequential, pooled: avg_pooled },
        max: Outcome {
            concurrent: u64::from(max_concurrent),
            sequential: u64::from(max_sequential),
            pooled: max_pooled,
        },
    })
}

impl BenchReport {
    pub fn elapsed(&self, name: &str) -> Option<u128> {
        self.timings.iter().find(|t| t.name == name).map(|t| t.elapsed_ns)
    }

    pub fn has_pooled(&self) -> bool {
        self.avg.pooled.is_some()
    }

    /// Every concurrent or pooled result that disagrees with the sequential one.
    pub fn mismatches(&self) -> Vec<BenchError> {
        let mut found = vec![];
        let mut cmp = |op: &'static str, strategy: String, concurrent: u64, sequential: u64| {
            if concurrent != sequential {
                found.push(BenchError::Mismatch { op, strategy, concurrent, sequential });
            }
        };
        cmp("avg", "fan-out".to_string(), self.avg.concurrent, self.avg.sequential);
        cmp("max", format!("fan-out {}", self.max_strategy), self.max.concurrent, self.max.sequential);
        if let Some(p) = self.avg.pooled {
            cmp("avg", "pooled".to_string(), p, self.avg.sequential);
        }
        if let Some(p) = self.max.pooled {
            cmp("max", "pooled".to_string(), p, self.max.sequential);
        }
        found
    }

    /// One stderr line per mismatch. Max mismatches under the racy strategy
    /// are flagged as lost updates rather than defects.
    pub fn mismatch_warnings(&self) -> Vec<String> {
        self.mismatches()
            .iter()
            .map(|m| match m {
                BenchError::Mismatch { op: "max", strategy, .. }
                    if self.max_strategy.is_racy() && strategy.starts_with("fan-out") =>
                {
                    format!("warning: {} (lost update, expected with the racy strategy)", m)
                }
                _ => format!("warning: {}", m),
            })
            .collect()
    }

    pub fn verify(&self) -> Result<()> {
        match self.mismatches().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_values() {
        let s = [100u32, 200, 300, 400];
        let report = run(&s, &ConcurrentOpts::default(), None).unwrap();
        let names: Vec<_> = report.timings.iter().map(|t| t.name).collect();
        assert_eq!(names, vec![AVG_CONCURRENT, MAX_CONCURRENT, AVG_SEQUENTIAL, MAX_SEQUENTIAL]);
        assert_eq!(report.avg, Outcome { concurrent: 250, sequential: 250, pooled: None });
        assert_eq!(report.max, Outcome { concurrent: 400, sequential: 400, pooled: None });
        assert_eq!(report.records, 4);
        assert!(!report.has_pooled());
        assert!(report.mismatches().is_empty());
        assert!(report.verify().is_ok());
    }

    #[test]
    fn pooled_calls_come_last() {
        let pool = Pool::new(2).unwrap();
        let s = [1u32, 2, 3];
        let report = run(&s, &ConcurrentOpts::default(), Some(&pool)).unwrap();
        assert_eq!(report.timings.len(), 6);
        assert_eq!(report.timings[4].name, AVG_POOLED);
        assert_eq!(report.timings[5].name, MAX_POOLED);
        assert_eq!(report.avg.pooled, Some(2));
        assert_eq!(report.max.pooled, Some(3));
        assert!(report.elapsed(MAX_POOLED).is_some());
    }

    #[test]
    fn empty_input_aborts_the_run() {
        let s: [u32; 0] = [];
        assert!(matches!(run(&s, &ConcurrentOpts::default(), None), Err(BenchError::EmptyInput)));
    }

    #[test]
    fn mismatch_is_reported() {
        let mut report = run(&[5u32, 9], &ConcurrentOpts::default(), None).unwrap();
        report.max.concurrent = 5;
        let found = report.mismatches();
        assert_eq!(found.len(), 1);
        assert!(found[0].to_string().contains("fan-out locked"));
        assert!(matches!(report.verify(), Err(BenchError::Mismatch { op: "max", .. })));
    }

    #[test]
    fn racy_mismatch_is_labelled() {
        let opts = ConcurrentOpts { max_strategy: MaxStrategy::Racy, ..Default::default() };
        let mut report = run(&[5u32, 9], &opts, None).unwrap();
        assert!(report.mismatch_warnings().is_empty());
        report.max.concurrent = 5;
        let warnings = report.mismatch_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("expected with the racy strategy"), "{}", warnings[0]);

        report.max_strategy = MaxStrategy::Locked;
        let warnings = report.mismatch_warnings();
        assert!(warnings[0].starts_with("warning: max result mismatch"));
        assert!(!warnings[0].contains("racy"));
    }

    #[test]
    fn timed_returns_value() {
        let (v, t) = timed("answer", || 42);
        assert_eq!(v, 42);
        assert_eq!(t.name, "answer");
    }
}
