use crate::grammar::{CompiledRowMatcher, TupleSpan};
use crate::row::RawRowMatch;
use std::collections::VecDeque;
use std::io;
use tracing::{debug, trace};

const INSERT_PREFIX: &str = "INSERT INTO";
const VALUES_KEYWORD: &str = " VALUES ";

/// Pulls lines one at a time and yields every row-tuple of every INSERT statement.
///
/// Line and statement numbers are 1-based and only reset when a new scanner is
/// built. At most one line's worth of matches is held at a time.
pub struct DumpScanner<I> {
    lines: I,
    matcher: &'static CompiledRowMatcher,
    max_statements: Option<u64>,
    line_number: u64,
    statement_number: u64,
    unmatched_spans: u64,
    pending: VecDeque<RawRowMatch>,
    stopped: bool,
}

impl<I> DumpScanner<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, matcher: &'static CompiledRowMatcher) -> Self {
        Self {
            lines,
            matcher,
            max_statements: None,
            line_number: 0,
            statement_number: 0,
            unmatched_spans: 0,
            pending: VecDeque::new(),
            stopped: false,
        }
    }

    /// Stop before the INSERT statement that would exceed `max`.
    pub fn with_max_statements(mut self, max: Option<u64>) -> Self {
        self.max_statements = max;
        self
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn statement_number(&self) -> u64 {
        self.statement_number
    }

    /// Stretches of INSERT lines that no row-tuple covered.
    pub fn unmatched_spans(&self) -> u64 {
        self.unmatched_spans
    }

    /// True once the statement cap cut the scan short.
    pub fn stopped_early(&self) -> bool {
        self.stopped
    }

    fn scan_line(&mut self, line: &str) {
        let mut previous_end: Option<usize> = None;
        let mut skipped = 0u64;
        let matcher = self.matcher;
        // a --complete-insert column list sits before VALUES and holds no rows
        let values_start = line.find(VALUES_KEYWORD).unwrap_or(INSERT_PREFIX.len());

        for span in matcher.tuples(line) {
            let unmatched = match previous_end {
                Some(end) => &line[end..span.start] != ",",
                None => line[values_start.min(span.start)..span.start].contains('('),
            };
            if unmatched {
                skipped += 1;
            }
            previous_end = Some(span.end);
            let raw = self.to_raw(line, &span);
            self.pending.push_back(raw);
        }

        let tail_is_clean = match previous_end {
            // anything after the terminating semicolon is a comment
            Some(end) => line[end..]
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .is_empty(),
            None => !line[values_start.min(line.len())..].contains('('),
        };
        if !tail_is_clean {
            skipped += 1;
        }

        if skipped > 0 {
            debug!(
                line = self.line_number,
                statement = self.statement_number,
                spans = skipped,
                "Skipped text that did not match the row grammar"
            );
            self.unmatched_spans += skipped;
        }
    }

    fn to_raw(&self, line: &str, span: &TupleSpan) -> RawRowMatch {
        RawRowMatch {
            line_number: self.line_number,
            statement_number: self.statement_number,
            values: (0..span.columns.len())
                .map(|i| span.column(line, i).to_string())
                .collect(),
        }
    }
}

impl<I> Iterator for DumpScanner<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<RawRowMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.pending.pop_front() {
                return Some(Ok(raw));
            }
            if self.stopped {
                return None;
            }

            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            if !line.starts_with(INSERT_PREFIX) {
                trace!(line = self.line_number, "Skipping non INSERT line");
                continue;
            }
            if self
                .max_statements
                .is_some_and(|max| self.statement_number >= max)
            {
                debug!(
                    statements = self.statement_number,
                    "Statement limit reached, stopping scan"
                );
                self.stopped = true;
                return None;
            }
            self.statement_number += 1;
            self.scan_line(&line);
        }
    }
}
