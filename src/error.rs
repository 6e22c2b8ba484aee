use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("empty input: cannot average zero records")]
    EmptyInput,

    #[error("unable to spawn worker thread {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid salary range: min {min} must be below max {max}")]
    SalaryRange { min: u32, max: u32 },

    #[error("malformed record percentage {0} is above 100")]
    MalformedPct(u8),

    #[error("{op} result mismatch ({strategy}): concurrent {concurrent} vs sequential {sequential}")]
    Mismatch {
        op: &'static str,
        strategy: String,
        concurrent: u64,
        sequential: u64,
    },
}
