use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Anything the reducers can aggregate: exposes one non-negative salary.
pub trait Salaried {
    fn salary(&self) -> u32;
}

impl Salaried for u32 {
    fn salary(&self) -> u32 {
        *self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("salary \"{0}\" is not a non-negative integer")]
    InvalidSalary(String),
    #[error("unknown education \"{0}\"")]
    UnknownEducation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Education {
    None,
    School,
    University,
}

impl FromStr for Education {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Ok(Education::None),
            "school" => Ok(Education::School),
            "university" => Ok(Education::University),
            _ => Err(RecordError::UnknownEducation(s.to_string())),
        }
    }
}

impl Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Education::None => "NONE",
            Education::School => "SCHOOL",
            Education::University => "UNIVERSITY",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerSpecialization {
    pub name: String,
    pub work_exp_years: u32,
}

impl WorkerSpecialization {
    // A missing name or an unparsable experience leaves the requirement unset
    // rather than rejecting the vacancy.
    fn parse(name: &str, work_exp_years: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let work_exp_years = work_exp_years.trim().parse::<u32>().ok()?;
        Some(WorkerSpecialization { name: name.to_string(), work_exp_years })
    }
}

/// Two requirement sets are the same when specialization and education
/// match; `car` is informational and ignored by `Eq` and `Hash`.
#[derive(Debug, Clone)]
pub struct WorkerRequirements {
    pub specialization: Option<WorkerSpecialization>,
    pub education: Education,
    pub car: bool,
}

impl PartialEq for WorkerRequirements {
    fn eq(&self, other: &Self) -> bool {
        self.specialization == other.specialization && self.education == other.education
    }
}

impl Eq for WorkerRequirements {}

impl Hash for WorkerRequirements {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.specialization.hash(state);
        self.education.hash(state);
    }
}

/// Unvalidated vacancy fields, as they would arrive from a form or a feed.
#[derive(Debug, Clone, Default)]
pub struct RawVacancy<'a> {
    pub company_name: &'a str,
    pub specialization: &'a str,
    pub conditions: &'a str,
    pub salary: &'a str,
    pub worker_specialization: &'a str,
    pub work_exp_years: &'a str,
    pub education: &'a str,
    pub car: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vacancy {
    company_name: String,
    specialization: String,
    conditions: String,
    salary: u32,
    worker_requirements: WorkerRequirements,
}

impl Vacancy {
    pub fn parse(raw: &RawVacancy) -> Result<Self, RecordError> {
        let salary = raw
            .salary
            .trim()
            .parse::<u32>()
            .map_err(|_| RecordError::InvalidSalary(raw.salary.to_string()))?;
        let education = raw.education.parse::<Education>()?;
        Ok(Vacancy {
            company_name: raw.company_name.trim().to_string(),
            specialization: raw.specialization.trim().to_string(),
            conditions: raw.conditions.trim().to_string(),
            salary,
            worker_requirements: WorkerRequirements {
                specialization: WorkerSpecialization::parse(raw.worker_specialization, raw.work_exp_years),
                education,
                car: raw.car,
            },
        })
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn specialization(&self) -> &str {
        &self.specialization
    }

    pub fn conditions(&self) -> &str {
        &self.conditions
    }

    pub fn education(&self) -> Education {
        self.worker_requirements.education
    }

    pub fn worker_requirements(&self) -> &WorkerRequirements {
        &self.worker_requirements
    }
}

impl Salaried for Vacancy {
    fn salary(&self) -> u32 {
        self.salary
    }
}

// Vacancies sort by company; the remaining fields only break ties so the
// ordering agrees with Eq.
impl Ord for Vacancy {
    fn cmp(&self, other: &Self) -> Ordering {
        self.company_name
            .cmp(&other.company_name)
            .then_with(|| self.specialization.cmp(&other.specialization))
            .then_with(|| self.conditions.cmp(&other.conditions))
            .then_with(|| self.salary.cmp(&other.salary))
            .then_with(|| self.education().cmp(&other.education()))
            .then_with(|| {
                let l = self.worker_requirements.specialization.as_ref().map(|s| (&s.name, s.work_exp_years));
                let r = other.worker_requirements.specialization.as_ref().map(|s| (&s.name, s.work_exp_years));
                l.cmp(&r)
            })
    }
}

impl PartialOrd for Vacancy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}({}) - {}$ {} car: {}",
            self.company_name,
            self.specialization,
            self.conditions,
            self.salary,
            self.worker_requirements.education,
            self.worker_requirements.car
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw<'a>(salary: &'a str, education: &'a str) -> RawVacancy<'a> {
        RawVacancy {
            company_name: "  Acme ",
            specialization: "Backend",
            conditions: "remote",
            salary,
            worker_specialization: "IT",
            work_exp_years: "3",
            education,
            car: false,
        }
    }

    #[test]
    fn parse_trims_and_reads_salary() {
        let v = Vacancy::parse(&raw(" 4200 ", "")).unwrap();
        assert_eq!(v.company_name(), "Acme");
        assert_eq!(v.salary(), 4200);
        assert_eq!(v.education(), Education::None);
        assert_eq!(
            v.worker_requirements().specialization,
            Some(WorkerSpecialization { name: "IT".to_string(), work_exp_years: 3 })
        );
    }

    #[test]
    fn bad_salary_is_rejected() {
        assert_eq!(Vacancy::parse(&raw("-5", "")), Err(RecordError::InvalidSalary("-5".to_string())));
        assert!(Vacancy::parse(&raw("n/a", "")).is_err());
    }

    #[test]
    fn education_is_case_insensitive() {
        assert_eq!(Vacancy::parse(&raw("1", "University")).unwrap().education(), Education::University);
        assert_eq!("SCHOOL".parse::<Education>(), Ok(Education::School));
        assert!(matches!(Vacancy::parse(&raw("1", "college")), Err(RecordError::UnknownEducation(_))));
    }

    #[test]
    fn bad_experience_drops_specialization_only() {
        let mut r = raw("10", "");
        r.work_exp_years = "lots";
        let v = Vacancy::parse(&r).unwrap();
        assert!(v.worker_requirements().specialization.is_none());
    }

    #[test]
    fn car_does_not_affect_identity() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |v: &Vacancy| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let without = Vacancy::parse(&raw("10", "school")).unwrap();
        let mut r = raw("10", "school");
        r.car = true;
        let with = Vacancy::parse(&r).unwrap();
        assert!(with.worker_requirements().car);
        assert_eq!(with.worker_requirements(), without.worker_requirements());
        assert_eq!(with, without);
        assert_eq!(with.cmp(&without), Ordering::Equal);
        assert_eq!(hash(&with), hash(&without));

        r.education = "university";
        assert_ne!(Vacancy::parse(&r).unwrap(), without);
    }

    #[test]
    fn display_and_order() {
        let a = Vacancy::parse(&raw("10", "school")).unwrap();
        assert_eq!(a.to_string(), "Acme: Backend(remote) - 10$ SCHOOL car: false");
        let mut r = raw("10", "school");
        r.company_name = "Beta";
        let b = Vacancy::parse(&r).unwrap();
        assert!(a < b);
    }
}
