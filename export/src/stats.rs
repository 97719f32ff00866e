//! Run phase timing and throughput accounting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Running totals for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub batches: u64,
    pub records_read: u64,
    pub records_written: u64,
    pub records_dropped: u64,
}

/// Collects timestamped phase marks and per-batch totals for a run and logs
/// them as structured JSON reports.
///
/// Phase durations are computed between consecutive marks. Clock adjustments
/// can make a wall-clock delta negative; those are reported as zero rather
/// than propagated.
#[derive(Debug, Default)]
pub struct StatsManager {
    marks: Vec<(String, DateTime<Utc>)>,
    totals: RunTotals,
}

impl StatsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a named phase at the current time.
    pub fn mark(&mut self, phase: impl Into<String>) {
        self.marks.push((phase.into(), Utc::now()));
    }

    /// Records the completion of the current batch iteration at the current
    /// time.
    ///
    /// Iteration marks are numbered after the running batch count, so each
    /// processed batch contributes its own phase window to the final report.
    pub fn mark_iteration(&mut self) {
        self.mark(format!("iteration {}", self.totals.batches));
    }

    /// Records the outcome of one processed batch.
    pub fn record_batch(&mut self, read: u64, written: u64, dropped: u64) {
        self.totals.batches += 1;
        self.totals.records_read += read;
        self.totals.records_written += written;
        self.totals.records_dropped += dropped;
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Logs a JSON report of one batch iteration, including the elapsed time
    /// since the previous mark.
    pub fn log_iteration(&self, read: u64, written: u64, dropped: u64) {
        let report = json!({
            "iteration": self.totals.batches,
            "duration_ms": self.last_phase_duration_ms(),
            "records_read": read,
            "records_written": written,
            "records_dropped": dropped,
            "totals": self.totals,
        });

        info!(report = %report, "export iteration");
    }

    /// Duration, in milliseconds, of the most recent phase window.
    fn last_phase_duration_ms(&self) -> i64 {
        match self.marks.as_slice() {
            [.., (_, start), (_, end)] => {
                end.signed_duration_since(*start).num_milliseconds().max(0)
            }
            _ => 0,
        }
    }

    /// Durations, in milliseconds, between consecutive phase marks.
    pub fn phase_durations_ms(&self) -> Vec<(String, i64)> {
        self.marks
            .windows(2)
            .map(|pair| {
                let (_, start) = &pair[0];
                let (phase, end) = &pair[1];
                let delta = end.signed_duration_since(*start).num_milliseconds().max(0);
                (phase.clone(), delta)
            })
            .collect()
    }

    /// Logs the final JSON report for the run.
    pub fn log_report(&self, outcome: &str) {
        let phases: Vec<serde_json::Value> = self
            .phase_durations_ms()
            .into_iter()
            .map(|(phase, millis)| json!({ "phase": phase, "duration_ms": millis }))
            .collect();

        let total_ms = match (self.marks.first(), self.marks.last()) {
            (Some((_, start)), Some((_, end))) => {
                end.signed_duration_since(*start).num_milliseconds().max(0)
            }
            _ => 0,
        };

        let report = json!({
            "outcome": outcome,
            "duration_ms": total_ms,
            "phases": phases,
            "totals": self.totals,
        });

        info!(report = %report, "export run report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_across_batches() {
        let mut stats = StatsManager::new();
        stats.record_batch(3, 3, 0);
        stats.record_batch(2, 1, 1);

        let totals = stats.totals();
        assert_eq!(totals.batches, 2);
        assert_eq!(totals.records_read, 5);
        assert_eq!(totals.records_written, 4);
        assert_eq!(totals.records_dropped, 1);
    }

    #[test]
    fn phase_durations_pair_consecutive_marks() {
        let mut stats = StatsManager::new();
        stats.marks.push(("started".into(), Utc::now()));
        stats.marks.push((
            "reading".into(),
            stats.marks[0].1 + chrono::Duration::milliseconds(40),
        ));
        stats.marks.push((
            "finished".into(),
            stats.marks[1].1 + chrono::Duration::milliseconds(60),
        ));

        let durations = stats.phase_durations_ms();
        assert_eq!(
            durations,
            vec![("reading".into(), 40), ("finished".into(), 60)]
        );
    }

    #[test]
    fn iteration_marks_number_each_batch() {
        let mut stats = StatsManager::new();
        stats.mark("started");

        stats.record_batch(3, 3, 0);
        stats.mark_iteration();
        stats.record_batch(1, 1, 0);
        stats.mark_iteration();

        stats.mark("finished");

        let phases: Vec<String> = stats
            .phase_durations_ms()
            .into_iter()
            .map(|(phase, _)| phase)
            .collect();
        assert_eq!(phases, vec!["iteration 1", "iteration 2", "finished"]);
    }

    #[test]
    fn negative_clock_deltas_report_as_zero() {
        let mut stats = StatsManager::new();
        let now = Utc::now();
        stats.marks.push(("started".into(), now));
        stats
            .marks
            .push(("skewed".into(), now - chrono::Duration::milliseconds(500)));

        assert_eq!(stats.phase_durations_ms(), vec![("skewed".into(), 0)]);
    }
}
