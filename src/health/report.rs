//! Cycle report output.

use std::io::{self, Write};

use crate::config::ReportOutput;
use crate::health::active::CycleReport;

/// Write one cycle's availability lines to the configured destination.
///
/// `Stdout` writes bare lines to `out`; `Log` emits one `info` event per line.
pub fn emit<W: Write>(report: &CycleReport, output: ReportOutput, out: &mut W) -> io::Result<()> {
    if report.availability.is_empty() {
        tracing::warn!(cycle = report.cycle, "No outcomes recorded yet");
        return Ok(());
    }

    match output {
        ReportOutput::Stdout => {
            for line in report.lines() {
                writeln!(out, "{}", line)?;
            }
            out.flush()
        }
        ReportOutput::Log => {
            for line in report.lines() {
                tracing::info!(cycle = report.cycle, "{}", line);
            }
            Ok(())
        }
    }
}
