use std::io::Write;
use std::time::{Duration, Instant};

use atty::Stream;
use cpu_time::ProcessTime;

use salary_bench::bench;
use salary_bench::cli::get_cli;
use salary_bench::gen::{collect_present, generate, nanos_metric_digit};
use salary_bench::reduce::Pool;
use salary_bench::report::{paint_warning, write_csv, write_plain, write_table};

fn main() {
    if let Err(err) = sb() {
        eprintln!("error: {}", &err);
        std::process::exit(1);
    }
}

fn warn(color: bool, msg: &str) {
    eprintln!("{}", paint_warning(msg, color));
}

fn sb() -> Result<(), Box<dyn std::error::Error>> {
    let start_f = Instant::now();
    let startcpu = ProcessTime::now();

    let cfg = get_cli()?;
    let verbose: usize = cfg.verbose.into();
    let color = atty::is(Stream::Stderr);

    let generated = generate(&cfg.source_cfg(), verbose)?;
    let (records, dropped) = collect_present(generated);
    if dropped > 0 {
        warn(color, &format!("Note {} of {} synthetic records failed validation and were skipped", dropped, cfg.records));
    }
    if verbose > 2 {
        for v in &records {
            eprintln!("{}", v);
        }
    }

    let pool = if cfg.pooled { Some(Pool::new(cfg.pool_threads)?) } else { None };
    if verbose > 0 {
        eprintln!("records: {}  max strategy: {}  pool threads: {}",
            records.len(), cfg.concurrent_opts().max_strategy, pool.as_ref().map_or(0, Pool::threads));
    }

    let report = bench::run(&records, &cfg.concurrent_opts(), pool.as_ref())?;

    let mismatches = report.mismatches();
    if cfg.check {
        report.verify()?;
    } else {
        for line in report.mismatch_warnings() {
            warn(color, &line);
        }
    }

    if verbose > 0 {
        for t in &report.timings {
            eprintln!("{:>16}: {}", t.name, nanos_metric_digit(t.elapsed_ns, 4));
        }
    }

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    if cfg.csv_output {
        write_csv(&mut writer, &report)?;
    } else if cfg.table {
        write_table(&mut writer, &report)?;
    } else {
        write_plain(&mut writer, &report)?;
    }
    writer.flush()?;

    if verbose >= 1 || cfg.stats {
        let elapsed = start_f.elapsed();
        let sec = (elapsed.as_secs() as f64) + (elapsed.subsec_nanos() as f64 / 1_000_000_000.0);
        let elapsedcpu: Duration = startcpu.elapsed();
        let seccpu: f64 = (elapsedcpu.as_secs() as f64) + (elapsedcpu.subsec_nanos() as f64 / 1_000_000_000.0);
        eprintln!("records: {}  skipped: {}  mismatches: {}  time: {:.3}  cpu: {:.3}",
            report.records, dropped, mismatches.len(), sec, seccpu);
    }
    Ok(())
}
