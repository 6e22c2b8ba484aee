use crate::error::Result;
use crate::vacancy::Salaried;

use super::checked_average;

pub fn sum<R: Salaried>(records: &[R]) -> u64 {
    let mut total = 0u64;
    for r in records {
        total += u64::from(r.salary());
    }
    total
}

pub fn max<R: Salaried>(records: &[R]) -> u32 {
    let mut max_salary = 0u32;
    for r in records {
        if r.salary() > max_salary {
            max_salary = r.salary();
        }
    }
    max_salary
}

pub fn average<R: Salaried>(records: &[R]) -> Result<u64> {
    checked_average(sum(records), records.len())
}
