use latbench_core::{ScenarioKind, Summary};
use std::io::{self, Write};

pub const SEPARATOR: &str = "============================================";

/// Announce a scenario before it connects.
pub fn write_progress<W: Write>(
    out: &mut W,
    kind: ScenarioKind,
    iterations: usize,
) -> io::Result<()> {
    writeln!(out, "Benchmarking {} -- {}(iterations)", kind.title(), iterations)?;
    out.flush()
}

pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "Mean ----->  {:.6} nanos", summary.mean)?;
    writeln!(out, "(90 Percentile) ----->  {:.6} nanos", summary.p90)?;
    writeln!(out, "(99 Percentile) ----->  {:.6} nanos", summary.p99)?;
    out.flush()
}
