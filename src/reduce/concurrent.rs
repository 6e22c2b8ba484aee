use std::any::Any;
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ScopedJoinHandle};

use crate::error::{BenchError, Result};
use crate::report::paint_warning;
use crate::vacancy::Salaried;

use super::checked_average;

/// How fan-out units update the shared maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxStrategy {
    /// mutex held across the read and the conditional write
    Locked,
    /// one atomic read-modify-write per unit (`fetch_max`)
    Atomic,
    /// units send their salary over a channel, the caller folds after the join
    MapReduce,
    /// unguarded load, compare, store: updates can be lost
    Racy,
}

impl MaxStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MaxStrategy::Locked => "locked",
            MaxStrategy::Atomic => "atomic",
            MaxStrategy::MapReduce => "map-reduce",
            MaxStrategy::Racy => "racy",
        }
    }

    /// Whether this strategy can silently drop an update.
    pub fn is_racy(&self) -> bool {
        matches!(self, MaxStrategy::Racy)
    }
}

impl Display for MaxStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ConcurrentOpts {
    pub max_strategy: MaxStrategy,
    /// stack size of every fan-out thread, 0 keeps the platform default
    pub stack_size: usize,
    pub verbose: usize,
    /// colour warnings, only when stderr is a terminal
    pub color: bool,
}

impl Default for ConcurrentOpts {
    fn default() -> Self {
        ConcurrentOpts { max_strategy: MaxStrategy::Locked, stack_size: 64 * 1024, verbose: 0, color: false }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

fn failed_unit_message(name: &str, payload: &(dyn Any + Send), color: bool) -> String {
    paint_warning(&format!("unit {} failed: {}, waiting on the rest", name, panic_message(payload)), color)
}

// Waits for every handle. A failed unit is reported and skipped, never
// propagated; returns how many failed.
fn join_all(handles: Vec<ScopedJoinHandle<'_, ()>>, verbose: usize, color: bool) -> usize {
    let mut failed = 0usize;
    for h in handles {
        let name = h.thread().name().unwrap_or("unnamed").to_string();
        if let Err(payload) = h.join() {
            failed += 1;
            eprintln!("{}", failed_unit_message(&name, payload.as_ref(), color));
        } else if verbose > 3 {
            eprintln!("joined {}", name);
        }
    }
    failed
}

/// Spawns one named thread per record, each running `unit` on that record's
/// salary, then blocks until all of them are done. Everything written by the
/// units is visible to the caller once this returns.
pub(crate) fn fan_out<R, F>(records: &[R], label: &str, opts: &ConcurrentOpts, unit: F) -> Result<usize>
where
    R: Salaried + Sync,
    F: Fn(u32) + Sync,
{
    let unit = &unit;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(records.len());
        let mut spawn_err = None;
        for (index, record) in records.iter().enumerate() {
            let mut builder = thread::Builder::new().name(format!("{}{}", label, index));
            if opts.stack_size > 0 {
                builder = builder.stack_size(opts.stack_size);
            }
            match builder.spawn_scoped(s, move || unit(record.salary())) {
                Ok(h) => handles.push(h),
                Err(source) => {
                    spawn_err = Some(BenchError::Spawn { index, source });
                    break;
                }
            }
        }
        if opts.verbose > 2 {
            eprintln!("{}: dispatched {} units", label, handles.len());
        }
        let failed = join_all(handles, opts.verbose, opts.color);
        match spawn_err {
            Some(err) => Err(err),
            None => Ok(failed),
        }
    })
}

pub fn sum<R: Salaried + Sync>(records: &[R], opts: &ConcurrentOpts) -> Result<u64> {
    let total = AtomicU64::new(0);
    fan_out(records, "sum_unit", opts, |salary| {
        total.fetch_add(u64::from(salary), Ordering::Relaxed);
    })?;
    Ok(total.load(Ordering::Relaxed))
}

pub fn average<R: Salaried + Sync>(records: &[R], opts: &ConcurrentOpts) -> Result<u64> {
    if records.is_empty() {
        return Err(BenchError::EmptyInput);
    }
    checked_average(sum(records, opts)?, records.len())
}

pub fn max<R: Salaried + Sync>(records: &[R], opts: &ConcurrentOpts) -> Result<u32> {
    match opts.max_strategy {
        MaxStrategy::Locked => {
            let max_salary = Mutex::new(0u32);
            fan_out(records, "max_unit", opts, |salary| {
                let mut current = max_salary.lock().unwrap_or_else(PoisonError::into_inner);
                if salary > *current {
                    *current = salary;
                }
            })?;
            Ok(max_salary.into_inner().unwrap_or_else(PoisonError::into_inner))
        }
        MaxStrategy::Atomic => {
            let max_salary = AtomicU32::new(0);
            fan_out(records, "max_unit", opts, |salary| {
                max_salary.fetch_max(salary, Ordering::Relaxed);
            })?;
            Ok(max_salary.load(Ordering::Relaxed))
        }
        MaxStrategy::MapReduce => {
            let (send, recv) = crossbeam_channel::unbounded::<u32>();
            fan_out(records, "max_unit", opts, |salary| {
                send.send(salary)
                    .unwrap_or_else(|_| eprintln!("Unable to send salary {} to result queue", salary));
            })?;
            drop(send);
            Ok(recv.iter().fold(0u32, u32::max))
        }
        MaxStrategy::Racy => {
            let max_salary = AtomicU32::new(0);
            fan_out(records, "max_unit", opts, |salary| {
                if salary > max_salary.load(Ordering::Relaxed) {
                    max_salary.store(salary, Ordering::Relaxed);
                }
            })?;
            Ok(max_salary.load(Ordering::Relaxed))
        }
    }
}
