//! Execution-order tracing: spec section 6's CSV format, plus the
//! optional reference-trace comparison described in section 4.4.

use std::path::Path;

use crate::error::SimResult;

/// One row of an execution-order trace: sequence number, timestamp,
/// and the name of the vertex that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub sequence_num: u64,
    pub timestamp: f64,
    pub event_type: String,
}

/// Accumulates executed-event rows and can either dump them as a plain
/// trace, or (when a reference trace was supplied) reduce them to the
/// match-count / displacement-stats summary spec 4.4 describes.
#[derive(Debug, Default)]
pub struct ExecutionTrace {
    rows: Vec<TraceRow>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn record(&mut self, sequence_num: u64, timestamp: f64, event_type: impl Into<String>) {
        self.rows.push(TraceRow {
            sequence_num,
            timestamp,
            event_type: event_type.into(),
        });
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    /// Writes the plain per-event trace: header
    /// `event_sequence_num, timestamp, event_type`, full double
    /// precision timestamps.
    pub fn write_plain(&self, path: &Path) -> SimResult<()> {
        let mut out = String::from("event_sequence_num, timestamp, event_type\n");
        for row in &self.rows {
            out.push_str(&format!("{},{},{}\n", row.sequence_num, row.timestamp, row.event_type));
        }
        std::fs::write(path, out)?;
        Ok(())
    }

    /// Compares against a reference in-order trace, loaded from the
    /// same CSV shape, and writes the two-row summary CSV (header +
    /// one data row: `num_event_matches,mean_diffs,std_diffs`) to
    /// `path`, overwriting whatever plain trace might have been there.
    ///
    /// Mirrors `original_source/OoO_EventSet.cpp`'s `ExecuteSerial_OoO`:
    /// an executed event matches the reference at the same sequence
    /// number if timestamp and vertex name agree; the displacement list
    /// accumulates `|event_index - record.sequence_num|` for *every*
    /// reference row with the same `(timestamp, vertex)`, not just the
    /// one at the same index.
    pub fn compare_and_write(&self, reference: &[TraceRow], path: &Path) -> SimResult<()> {
        let mut num_matches = 0usize;
        let mut diffs: Vec<f64> = Vec::new();

        for row in &self.rows {
            if let Some(at_index) = reference.iter().find(|r| r.sequence_num == row.sequence_num) {
                if at_index.timestamp == row.timestamp && at_index.event_type == row.event_type {
                    num_matches += 1;
                }
            }
            for record in reference {
                if record.timestamp == row.timestamp && record.event_type == row.event_type {
                    let diff = (row.sequence_num as i64 - record.sequence_num as i64).unsigned_abs();
                    diffs.push(diff as f64);
                }
            }
        }

        let (mean, std) = mean_std(&diffs);
        let out = format!(
            "num_event_matches,mean_diffs,std_diffs\n{num_matches},{mean},{std}\n"
        );
        std::fs::write(path, out)?;
        Ok(())
    }
}

/// Loads a reference execution-order trace CSV (same shape as
/// `write_plain` produces).
pub fn load_reference_trace(path: &Path) -> SimResult<Vec<TraceRow>> {
    let content = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, ',');
        let sequence_num: u64 = fields.next().unwrap_or_default().trim().parse().unwrap_or_default();
        let timestamp: f64 = fields.next().unwrap_or_default().trim().parse().unwrap_or_default();
        let event_type = fields.next().unwrap_or_default().trim().to_string();
        rows.push(TraceRow {
            sequence_num,
            timestamp,
            event_type,
        });
    }
    Ok(rows)
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}
