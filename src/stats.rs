use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dump file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub lines: u64,
    pub statements: u64,
    pub rows_matched: u64,
    pub rows_written: u64,
    pub rows_dropped: u64,
    pub unmatched_spans: u64,
    pub batches: u64,
}

impl RunStats {
    /// Rows matched per second over `elapsed_secs`.
    pub fn match_rate(&self, elapsed_secs: f64) -> f64 {
        if elapsed_secs > 0.0 {
            self.rows_matched as f64 / elapsed_secs
        } else {
            0.0
        }
    }
}

/// Totals across every file of a run, shared between worker threads.
#[derive(Default)]
pub struct ExtractionStats {
    pub files_processed: AtomicU64,
    pub lines_read: AtomicU64,
    pub statements_parsed: AtomicU64,
    pub rows_matched: AtomicU64,
    pub rows_written: AtomicU64,
    pub rows_dropped: AtomicU64,
    pub unmatched_spans: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&self, run: &RunStats) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.lines_read.fetch_add(run.lines, Ordering::Relaxed);
        self.statements_parsed
            .fetch_add(run.statements, Ordering::Relaxed);
        self.rows_matched
            .fetch_add(run.rows_matched, Ordering::Relaxed);
        self.rows_written
            .fetch_add(run.rows_written, Ordering::Relaxed);
        self.rows_dropped
            .fetch_add(run.rows_dropped, Ordering::Relaxed);
        self.unmatched_spans
            .fetch_add(run.unmatched_spans, Ordering::Relaxed);
    }

    pub fn files(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn lines(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn statements(&self) -> u64 {
        self.statements_parsed.load(Ordering::Relaxed)
    }

    pub fn matched(&self) -> u64 {
        self.rows_matched.load(Ordering::Relaxed)
    }

    pub fn written(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.rows_dropped.load(Ordering::Relaxed)
    }

    pub fn unmatched(&self) -> u64 {
        self.unmatched_spans.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(matched: u64, written: u64) -> RunStats {
        RunStats {
            lines: 10,
            statements: 2,
            rows_matched: matched,
            rows_written: written,
            rows_dropped: matched - written,
            unmatched_spans: 1,
            batches: 1,
        }
    }

    #[test]
    fn default_values_are_zero() {
        let stats = ExtractionStats::new();
        assert_eq!(stats.files(), 0);
        assert_eq!(stats.lines(), 0);
        assert_eq!(stats.statements(), 0);
        assert_eq!(stats.matched(), 0);
        assert_eq!(stats.written(), 0);
        assert_eq!(stats.dropped(), 0);
        assert_eq!(stats.unmatched(), 0);
    }

    #[test]
    fn absorb_accumulates_runs() {
        let stats = ExtractionStats::new();
        stats.absorb(&run(100, 90));
        stats.absorb(&run(50, 50));

        assert_eq!(stats.files(), 2);
        assert_eq!(stats.lines(), 20);
        assert_eq!(stats.statements(), 4);
        assert_eq!(stats.matched(), 150);
        assert_eq!(stats.written(), 140);
        assert_eq!(stats.dropped(), 10);
        assert_eq!(stats.unmatched(), 2);
    }

    #[test]
    fn absorb_from_threads() {
        let stats = ExtractionStats::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| stats.absorb(&run(10, 5)));
            }
        });
        assert_eq!(stats.files(), 4);
        assert_eq!(stats.matched(), 40);
        assert_eq!(stats.dropped(), 20);
    }

    #[test]
    fn match_rate() {
        let stats = run(100, 100);
        assert_eq!(stats.match_rate(2.0), 50.0);
        assert_eq!(stats.match_rate(0.0), 0.0);
    }

    #[test]
    fn run_stats_serialize() {
        let json = serde_json::to_value(run(3, 2)).unwrap();
        assert_eq!(json["rows_matched"], 3);
        assert_eq!(json["rows_dropped"], 1);
    }
}
