use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::BenchError;
use crate::vacancy::{RawVacancy, Vacancy};

/// Shape of the synthetic record set.
#[derive(Debug, Clone)]
pub struct SourceCfg {
    pub count: usize,
    /// inclusive
    pub salary_min: u32,
    /// exclusive
    pub salary_max: u32,
    pub malformed_pct: u8,
    pub seed: Option<u64>,
}

impl SourceCfg {
    /// The salary range must be non-empty and `malformed_pct` at most 100.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.salary_min >= self.salary_max {
            return Err(BenchError::SalaryRange { min: self.salary_min, max: self.salary_max });
        }
        if self.malformed_pct > 100 {
            return Err(BenchError::MalformedPct(self.malformed_pct));
        }
        Ok(())
    }
}

impl Default for SourceCfg {
    fn default() -> Self {
        SourceCfg { count: 10, salary_min: 0, salary_max: 10_000, malformed_pct: 0, seed: None }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Builds one vacancy from synthetic text fields. A record that fails
/// validation comes back as `None`. `cfg` must have passed
/// [`SourceCfg::validate`].
pub fn generate_vacancy<R: Rng>(rng: &mut R, cfg: &SourceCfg, verbose: usize) -> Option<Vacancy> {
    let malformed = cfg.malformed_pct > 0 && rng.gen_range(0..100u8) < cfg.malformed_pct;
    let salary = if malformed {
        "n/a".to_string()
    } else {
        rng.gen_range(cfg.salary_min..cfg.salary_max).to_string()
    };
    let work_exp_years = rng.gen::<u16>().to_string();
    let raw = RawVacancy {
        company_name: "Company",
        specialization: "Specialization",
        conditions: "Conditions",
        salary: &salary,
        worker_specialization: "IT",
        work_exp_years: &work_exp_years,
        education: "",
        car: false,
    };
    match Vacancy::parse(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            if verbose > 1 {
                eprintln!("dropping synthetic record: {}", err);
            }
            None
        }
    }
}

/// Produces exactly `cfg.count` entries, absent ones included.
pub fn generate(cfg: &SourceCfg, verbose: usize) -> Result<Vec<Option<Vacancy>>, BenchError> {
    cfg.validate()?;
    let mut rng = make_rng(cfg.seed);
    Ok((0..cfg.count).map(|_| generate_vacancy(&mut rng, cfg, verbose)).collect())
}

/// Drops absent entries so no reducer ever sees one. Returns the survivors and
/// how many were dropped.
pub fn collect_present(generated: Vec<Option<Vacancy>>) -> (Vec<Vacancy>, usize) {
    let total = generated.len();
    let present: Vec<Vacancy> = generated.into_iter().flatten().collect();
    let dropped = total - present.len();
    (present, dropped)
}

/// Nanoseconds rendered with a metric unit for diagnostics, e.g. `12.34 us`.
pub fn nanos_metric_digit(v: u128, sig: usize) -> String {
    const METRIC: [&str; 4] = ["ns", "us", "ms", "s "];
    let mut base = 1u128;
    let mut unit = METRIC[METRIC.len() - 1];
    for (i, m) in METRIC.iter().enumerate() {
        if v < base * 1000 || i == METRIC.len() - 1 {
            unit = m;
            break;
        }
        base *= 1000;
    }
    let value = v as f64 / base as f64;
    let mut s = format!("{}", value);
    s.truncate(sig + 1);
    if s.ends_with('.') { s.pop(); }
    format!("{:>width$} {}", s, unit, width = sig + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacancy::Salaried;

    #[test]
    fn generates_requested_count_in_range() {
        let cfg = SourceCfg { count: 500, salary_min: 100, salary_max: 200, seed: Some(3), ..Default::default() };
        let generated = generate(&cfg, 0).unwrap();
        assert_eq!(generated.len(), 500);
        let (present, dropped) = collect_present(generated);
        assert_eq!(dropped, 0);
        assert!(present.iter().all(|v| (100..200).contains(&v.salary())));
    }

    #[test]
    fn seed_makes_generation_repeatable() {
        let cfg = SourceCfg { count: 50, seed: Some(42), ..Default::default() };
        let a: Vec<u32> = collect_present(generate(&cfg, 0).unwrap()).0.iter().map(Salaried::salary).collect();
        let b: Vec<u32> = collect_present(generate(&cfg, 0).unwrap()).0.iter().map(Salaried::salary).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_records_become_absent() {
        let cfg = SourceCfg { count: 20, malformed_pct: 100, seed: Some(1), ..Default::default() };
        let generated = generate(&cfg, 0).unwrap();
        assert_eq!(generated.len(), 20);
        assert!(generated.iter().all(Option::is_none));
        let (present, dropped) = collect_present(generated);
        assert!(present.is_empty());
        assert_eq!(dropped, 20);
    }

    #[test]
    fn empty_salary_range_is_rejected() {
        let cfg = SourceCfg { salary_min: 500, salary_max: 500, ..Default::default() };
        assert!(matches!(generate(&cfg, 0), Err(BenchError::SalaryRange { min: 500, max: 500 })));
        let cfg = SourceCfg { malformed_pct: 101, ..Default::default() };
        assert!(matches!(generate(&cfg, 0), Err(BenchError::MalformedPct(101))));
    }

    #[test]
    fn zero_count_is_empty() {
        let cfg = SourceCfg { count: 0, ..Default::default() };
        assert!(generate(&cfg, 0).unwrap().is_empty());
    }

    #[test]
    fn test_nanos_metric_digit() {
        assert_eq!(nanos_metric_digit(999, 4), "  999 ns");
        assert_eq!(nanos_metric_digit(1_500, 4), "  1.5 us");
        assert_eq!(nanos_metric_digit(12_345_678, 4), "12.34 ms");
        assert_eq!(nanos_metric_digit(3_000_000_000, 4), "    3 s ");
    }
}
