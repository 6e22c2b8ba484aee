use std::io::Write;

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use prettytable::{format, Cell, Row, Table};

use crate::bench::{BenchReport, AVG_CONCURRENT, AVG_POOLED, AVG_SEQUENTIAL, MAX_CONCURRENT, MAX_POOLED, MAX_SEQUENTIAL};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Yellow when `color` is set, plain otherwise (stderr is not a terminal).
pub fn paint_warning(msg: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", SetForegroundColor(Color::Yellow), msg, ResetColor)
    } else {
        msg.to_string()
    }
}

struct Line {
    label: &'static str,
    op: &'static str,
    concurrent: u128,
    sequential: u128,
    pooled: Option<u128>,
    values: (u64, u64, Option<u64>),
}

// max first, then avg, whatever order the calls ran in
fn lines(report: &BenchReport) -> [Line; 2] {
    let ns = |name: &str| report.elapsed(name).unwrap_or(0);
    [
        Line {
            label: "Max salary (ns)",
            op: "max",
            concurrent: ns(MAX_CONCURRENT),
            sequential: ns(MAX_SEQUENTIAL),
            pooled: report.elapsed(MAX_POOLED),
            values: (report.max.concurrent, report.max.sequential, report.max.pooled),
        },
        Line {
            label: "Avg salary (ns)",
            op: "avg",
            concurrent: ns(AVG_CONCURRENT),
            sequential: ns(AVG_SEQUENTIAL),
            pooled: report.elapsed(AVG_POOLED),
            values: (report.avg.concurrent, report.avg.sequential, report.avg.pooled),
        },
    ]
}

/// The classic tab separated report.
pub fn write_plain<W: Write>(writer: &mut W, report: &BenchReport) -> Result<()> {
    let mut out = String::with_capacity(128);
    out.push_str("\n\n\n\t\t\t\t\tConcurrent\tSequential");
    if report.has_pooled() {
        out.push_str("\tPooled");
    }
    out.push('\n');
    for l in lines(report) {
        out.push_str(&format!("{}\t\t{}\t\t{}", l.label, l.concurrent, l.sequential));
        if let Some(p) = l.pooled {
            out.push_str(&format!("\t\t{}", p));
        }
        out.push('\n');
    }
    writer.write_all(out.as_bytes())?;
    Ok(())
}

pub fn write_csv<W: Write>(writer: &mut W, report: &BenchReport) -> Result<()> {
    let pooled = report.has_pooled();
    let mut out = String::from(if pooled { "op,concurrent,sequential,pooled\n" } else { "op,concurrent,sequential\n" });
    for l in lines(report) {
        out.push_str(&format!("{}_ns,{},{}", l.op, l.concurrent, l.sequential));
        if let Some(p) = l.pooled {
            out.push_str(&format!(",{}", p));
        }
        out.push('\n');
    }
    writer.write_all(out.as_bytes())?;
    Ok(())
}

/// Timings and result values side by side.
pub fn write_table<W: Write>(writer: &mut W, report: &BenchReport) -> Result<()> {
    let pooled = report.has_pooled();
    let mut celltable = Table::new();
    celltable.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    let mut titles = vec![Cell::new("op"), Cell::new("concurrent ns"), Cell::new("sequential ns")];
    if pooled {
        titles.push(Cell::new("pooled ns"));
    }
    titles.push(Cell::new("concurrent"));
    titles.push(Cell::new("sequential"));
    if pooled {
        titles.push(Cell::new("pooled"));
    }
    celltable.set_titles(Row::new(titles));

    for l in lines(report) {
        let mut vcell = vec![
            Cell::new(l.op),
            Cell::new(&l.concurrent.to_string()),
            Cell::new(&l.sequential.to_string()),
        ];
        if let Some(p) = l.pooled {
            vcell.push(Cell::new(&p.to_string()));
        }
        vcell.push(Cell::new(&l.values.0.to_string()));
        vcell.push(Cell::new(&l.values.1.to_string()));
        if let Some(p) = l.values.2 {
            vcell.push(Cell::new(&p.to_string()));
        }
        celltable.add_row(Row::new(vcell));
    }
    celltable.print(writer)?;
    Ok(())
}
