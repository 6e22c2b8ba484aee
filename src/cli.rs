use std::ffi::OsString;

use atty::Stream;
use clap::{ArgAction, Parser, ValueEnum};
use lazy_static::lazy_static;

use crate::error::BenchError;
use crate::gen::SourceCfg;
use crate::reduce::{ConcurrentOpts, MaxStrategy};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn get_default_pool_thread_no() -> usize {
    if num_cpus::get() > 12 { 12 } else { num_cpus::get() }
}

lazy_static! {
    pub static ref BUILD_INFO: String = format!("  ver: {}  rev: {}",
        env!("CARGO_PKG_VERSION"), env!("BUILD_GIT_HASH"));
}

#[derive(Parser, Debug, Clone)]
#[command(name = "sb", version = BUILD_INFO.as_str(), rename_all = "kebab-case")]
/// Time concurrent (one thread per record) against sequential salary aggregation.
///
/// Generates synthetic vacancies, computes average and max salary with each
/// strategy and prints the elapsed nanoseconds of every call.
pub struct BenchCfg {
    #[arg(short='n', long="records", default_value_t = 10)] pub records: usize,
    #[arg(long="salary_min", default_value_t = 0)] pub salary_min: u32,
    #[arg(long="salary_max", default_value_t = 10_000)] pub salary_max: u32,
    #[arg(long="seed")] pub seed: Option<u64>,
    /// percentage of synthetic records generated with a malformed salary
    #[arg(long="malformed_pct", default_value_t = 0)] pub malformed_pct: u8,
    #[arg(short='m', long="max_strategy", value_enum, default_value_t = MaxStrategyArg::Locked)] pub max_strategy: MaxStrategyArg,
    #[arg(long="thread_stack_size", value_parser=parse_human_size, default_value="64K")] pub thread_stack_size: usize,
    /// add a column timed on a bounded rayon pool
    #[arg(long="pooled")] pub pooled: bool,
    #[arg(short='t', long="pool_threads", default_value_t = get_default_pool_thread_no())] pub pool_threads: usize,
    #[arg(short='c', long="csv_output")] pub csv_output: bool,
    #[arg(long="table")] pub table: bool,
    /// fail when concurrent and sequential results disagree
    #[arg(long="check")] pub check: bool,
    #[arg(long="stats")] pub stats: bool,
    #[arg(short='v', action=ArgAction::Count)] pub verbose: u8,
    #[arg(short='E', long="print_examples")] pub print_examples: bool,
}

/// Command line face of [`MaxStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MaxStrategyArg {
    Locked,
    Atomic,
    MapReduce,
    Racy,
}

impl From<MaxStrategyArg> for MaxStrategy {
    fn from(v: MaxStrategyArg) -> Self {
        match v {
            MaxStrategyArg::Locked => MaxStrategy::Locked,
            MaxStrategyArg::Atomic => MaxStrategy::Atomic,
            MaxStrategyArg::MapReduce => MaxStrategy::MapReduce,
            MaxStrategyArg::Racy => MaxStrategy::Racy,
        }
    }
}

fn print_examples() {
    println!(
"Here are a few examples for quick reference

sb                                # 10 records, the classic report
sb -n 10000 --seed 7 --check      # bigger fan-out, fail if results disagree
sb -n 5000 -m racy --check        # show lost max updates of the unguarded variant
sb -n 1000 --pooled --table       # add a rayon pool column and print result values
sb -c                             # csv: op,concurrent,sequential

ver: {}\n", env!("BUILD_GIT_HASH"));
}

fn from_human_size(s: &str) -> Result<usize> {
    let mut postfix = String::new();
    let mut number = String::new();
    for c in s.chars() {
        if !c.is_ascii_digit() {
            postfix.push(c.to_ascii_lowercase());
        } else {
            number.push(c);
        }
    }
    if number.is_empty() {
        Err(format!("Missing numeric portion in size, found only: \"{}\"", s))?
    }
    let num: usize = number.parse()?;
    let mult = match postfix.as_str() {
        "" => 1usize,
        "k" | "kb" => 1024usize,
        "m" | "mb" => 1024usize * 1024usize,
        "g" | "gb" => 1024usize * 1024usize * 1024usize,
        _ => Err(format!("human size postfix \"{}\" not understood", postfix.as_str()))?
    };
    match num.checked_mul(mult) {
        Some(size) => Ok(size),
        None => Err(format!("human size \"{}\" is too large", s))?
    }
}

fn parse_human_size(s: &str) -> std::result::Result<usize, String> {
    from_human_size(s).map_err(|e| e.to_string())
}

pub fn get_cli() -> Result<BenchCfg> {
    get_cli_from(std::env::args_os())
}

pub fn get_cli_from<I, T>(args: I) -> Result<BenchCfg>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // help, version and usage errors are printed and exit here, like `parse()`
    let cfg = BenchCfg::try_parse_from(args).unwrap_or_else(|e| e.exit());
    if cfg.print_examples {
        print_examples();
        std::process::exit(0);
    }
    cfg.validate()?;
    if cfg.verbose > 1 {
        eprintln!("{:#?}", cfg);
    }
    Ok(cfg)
}

impl BenchCfg {
    pub fn validate(&self) -> std::result::Result<(), BenchError> {
        self.source_cfg().validate()
    }

    pub fn source_cfg(&self) -> SourceCfg {
        SourceCfg {
            count: self.records,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            malformed_pct: self.malformed_pct,
            seed: self.seed,
        }
    }

    pub fn concurrent_opts(&self) -> ConcurrentOpts {
        ConcurrentOpts {
            max_strategy: self.max_strategy.into(),
            stack_size: self.thread_stack_size,
            verbose: self.verbose.into(),
            color: atty::is(Stream::Stderr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_sizes() {
        assert_eq!(from_human_size("512").unwrap(), 512);
        assert_eq!(from_human_size("64K").unwrap(), 64 * 1024);
        assert_eq!(from_human_size("2mb").unwrap(), 2 * 1024 * 1024);
        assert!(from_human_size("K").is_err());
        assert!(from_human_size("3q").is_err());
        assert!(from_human_size("99999999999G").is_err());
        assert!(from_human_size("99999999999999999999").is_err());
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        let err = BenchCfg::try_parse_from(["sb", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert_eq!(err.exit_code(), 0);
        assert!(!err.use_stderr());
        assert!(err.to_string().contains("rev:"));

        let err = BenchCfg::try_parse_from(["sb", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);

        let err = BenchCfg::try_parse_from(["sb", "--no_such_flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn defaults_match_classic_scenario() {
        let cfg = get_cli_from(["sb"]).unwrap();
        assert_eq!(cfg.records, 10);
        assert_eq!(cfg.salary_min, 0);
        assert_eq!(cfg.salary_max, 10_000);
        assert_eq!(cfg.max_strategy, MaxStrategyArg::Locked);
        assert_eq!(cfg.thread_stack_size, 64 * 1024);
        assert!(!cfg.pooled);
    }

    #[test]
    fn strategy_and_range_parse() {
        let cfg = get_cli_from(["sb", "-m", "map-reduce", "--salary_min", "5", "--salary_max", "6"]).unwrap();
        assert_eq!(MaxStrategy::from(cfg.max_strategy), MaxStrategy::MapReduce);
        assert!(get_cli_from(["sb", "--salary_min", "6", "--salary_max", "6"]).is_err());
        assert!(get_cli_from(["sb", "--malformed_pct", "101"]).is_err());
    }
}
