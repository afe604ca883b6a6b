use crate::error::GrammarError;
use crate::schema::{Table, TableSchema};
use once_cell::sync::OnceCell;
use regex::{CaptureLocations, Regex};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Regex for a single `(v1,v2,...,vn)` row-tuple of one table.
///
/// Capture group `i + 1` holds column `i` of the schema, so callers address
/// values positionally and map them back to names through the schema.
#[derive(Debug)]
pub struct CompiledRowMatcher {
    schema: TableSchema,
    regex: Regex,
}

/// Byte span of one matched tuple and of each of its column captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleSpan {
    pub start: usize,
    pub end: usize,
    pub columns: Vec<(usize, usize)>,
}

impl TupleSpan {
    pub fn column<'h>(&self, haystack: &'h str, index: usize) -> &'h str {
        let (start, end) = self.columns[index];
        &haystack[start..end]
    }
}

pub fn build_pattern(schema: &TableSchema) -> String {
    let groups = schema
        .columns
        .iter()
        .map(|c| c.build_group_pattern())
        .collect::<Vec<_>>()
        .join(",");
    format!(r"\({}\)", groups)
}

pub fn compile(schema: TableSchema) -> Result<CompiledRowMatcher, GrammarError> {
    let mut seen = FxHashSet::default();
    for column in schema.columns {
        if !is_group_identifier(column.name) {
            return Err(GrammarError::InvalidColumnName(column.name.to_string()));
        }
        if !seen.insert(column.name) {
            return Err(GrammarError::DuplicateColumn(column.name.to_string()));
        }
    }

    let pattern = build_pattern(&schema);
    debug!(table = schema.table_name(), pattern = %pattern, "Compiling row grammar");
    let regex = Regex::new(&pattern)?;
    Ok(CompiledRowMatcher { schema, regex })
}

fn is_group_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

const NO_MATCHER: OnceCell<CompiledRowMatcher> = OnceCell::new();
static MATCHERS: [OnceCell<CompiledRowMatcher>; Table::ALL.len()] =
    [NO_MATCHER; Table::ALL.len()];

impl Table {
    /// Process-wide compiled matcher for this table, built on first use.
    pub fn matcher(self) -> Result<&'static CompiledRowMatcher, GrammarError> {
        MATCHERS[self.index()].get_or_try_init(|| compile(self.schema()))
    }
}

impl CompiledRowMatcher {
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All row-tuples in `line`, left to right and non-overlapping.
    pub fn tuples<'m, 'h>(&'m self, line: &'h str) -> Tuples<'m, 'h> {
        Tuples {
            matcher: self,
            line,
            pos: 0,
            locs: self.regex.capture_locations(),
        }
    }

    /// Raw column captures of the first tuple in `text`, in schema order.
    pub fn captures<'h>(&self, text: &'h str) -> Option<Vec<&'h str>> {
        let caps = self.regex.captures(text)?;
        Some(
            (1..=self.schema.len())
                .map(|i| caps.get(i).map_or("", |m| m.as_str()))
                .collect(),
        )
    }
}

/// Iterator returned by [`CompiledRowMatcher::tuples`].
pub struct Tuples<'m, 'h> {
    matcher: &'m CompiledRowMatcher,
    line: &'h str,
    pos: usize,
    locs: CaptureLocations,
}

impl Iterator for Tuples<'_, '_> {
    type Item = TupleSpan;

    fn next(&mut self) -> Option<TupleSpan> {
        if self.pos > self.line.len() {
            return None;
        }
        let m = self
            .matcher
            .regex
            .captures_read_at(&mut self.locs, self.line, self.pos)?;
        let (start, end) = (m.start(), m.end());
        // a tuple always spans at least "()", so there is no empty-match case
        self.pos = end;
        let columns = (1..=self.matcher.schema.len())
            .map(|i| self.locs.get(i).unwrap_or((start, start)))
            .collect();
        Some(TupleSpan {
            start,
            end,
            columns,
        })
    }
}
