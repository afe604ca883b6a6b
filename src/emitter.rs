use crate::config::PROGRESS_INTERVAL;
use crate::error::ConfigError;
use crate::row::{RawRowMatch, RowProjection};
use crate::scanner::DumpScanner;
use crate::sink::RowSink;
use crate::stats::RunStats;
use anyhow::Result;
use indicatif::ProgressBar;
use std::io;
use std::time::Instant;
use tracing::{debug, info};

/// Buffers raw matches and writes them to a sink one batch at a time.
///
/// Memory stays bounded by `batch_size` matches no matter how large the dump is.
pub struct BatchEmitter<'a, S: RowSink> {
    projection: &'a RowProjection,
    sink: S,
    batch_size: usize,
    batch: Vec<RawRowMatch>,
    stats: RunStats,
    started: Instant,
    progress: ProgressBar,
}

impl<'a, S: RowSink> BatchEmitter<'a, S> {
    pub fn new(
        projection: &'a RowProjection,
        sink: S,
        batch_size: usize,
    ) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self {
            projection,
            sink,
            batch_size,
            batch: Vec::new(),
            stats: RunStats::default(),
            started: Instant::now(),
            progress: ProgressBar::hidden(),
        })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Drains `scanner` into the sink. The header is always written, even when no
    /// statement is processed.
    pub fn run<I>(&mut self, mut scanner: DumpScanner<I>) -> Result<RunStats>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        self.started = Instant::now();
        self.sink.write_header(self.projection.header())?;

        for raw in scanner.by_ref() {
            self.push(raw?)?;
        }

        self.flush()?;
        self.sink.finish()?;

        self.stats.lines = scanner.line_number();
        self.stats.statements = scanner.statement_number();
        self.stats.unmatched_spans = scanner.unmatched_spans();
        self.progress.finish_and_clear();

        let elapsed = self.started.elapsed().as_secs_f64();
        info!(
            elapsed_secs = elapsed,
            lines = self.stats.lines,
            statements = self.stats.statements,
            matched = self.stats.rows_matched,
            written = self.stats.rows_written,
            dropped = self.stats.rows_dropped,
            unmatched_spans = self.stats.unmatched_spans,
            stopped_early = scanner.stopped_early(),
            "Dump scan complete"
        );
        Ok(self.stats)
    }

    pub fn push(&mut self, raw: RawRowMatch) -> Result<()> {
        self.stats.rows_matched += 1;
        self.batch.push(raw);
        if self.stats.rows_matched % PROGRESS_INTERVAL == 0 {
            self.progress
                .set_message(format!("{} rows matched", self.stats.rows_matched));
            self.progress.tick();
        }
        if self.batch.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Cleans, filters and writes whatever is buffered.
    pub fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let outcome = self.projection.process_batch(&self.batch);
        self.batch.clear();
        self.sink.write_batch(&outcome.records)?;

        self.stats.rows_written += outcome.kept;
        self.stats.rows_dropped += outcome.dropped;
        self.stats.batches += 1;

        let elapsed = self.started.elapsed().as_secs_f64();
        info!(
            elapsed_secs = elapsed,
            rows_per_sec = self.stats.match_rate(elapsed),
            matched = self.stats.rows_matched,
            written = self.stats.rows_written,
            dropped = self.stats.rows_dropped,
            "Batch written"
        );
        debug!(batch = self.stats.batches, rows = outcome.total, "Batch flushed");
        Ok(())
    }
}
