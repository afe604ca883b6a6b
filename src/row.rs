//! Cleaning, allow/block filtering and projection of matched rows.

use crate::error::ConfigError;
use crate::schema::TableSchema;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// One output row, in `keep_column_names` order.
pub type OutputRecord = Vec<String>;

/// Column name -> values, as supplied by the user for allow/block lists.
pub type ColumnValues = BTreeMap<String, Vec<String>>;

/// Raw captures of one matched row-tuple, in schema column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRowMatch {
    pub line_number: u64,
    pub statement_number: u64,
    pub values: Vec<String>,
}

impl RawRowMatch {
    pub fn get<'a>(&'a self, schema: &TableSchema, column_name: &str) -> Option<&'a str> {
        schema
            .position(column_name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }
}

/// Cleaned values for every schema column, positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRow(pub Vec<String>);

/// Result of post-processing one batch of matches.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<OutputRecord>,
    pub total: u64,
    pub kept: u64,
    pub dropped: u64,
}

/// Which columns to write and which rows to keep, resolved against one schema.
#[derive(Debug, Clone)]
pub struct RowProjection {
    schema: TableSchema,
    keep_column_names: Vec<&'static str>,
    keep_indices: Vec<usize>,
    allowlists: Vec<(usize, FxHashSet<String>)>,
    blocklists: Vec<(usize, FxHashSet<String>)>,
}

impl RowProjection {
    /// Validates user configuration against `schema`.
    ///
    /// `keep_column_names = None` keeps every column in schema order; otherwise
    /// the output follows the order given here.
    pub fn new(
        schema: TableSchema,
        keep_column_names: Option<&[String]>,
        allowlists: &ColumnValues,
        blocklists: &ColumnValues,
    ) -> Result<Self, ConfigError> {
        let keep_indices = match keep_column_names {
            None => (0..schema.len()).collect::<Vec<_>>(),
            Some([]) => return Err(ConfigError::EmptyKeepColumns),
            Some(names) => {
                let mut seen = FxHashSet::default();
                let mut indices = Vec::with_capacity(names.len());
                for name in names {
                    if !seen.insert(name.as_str()) {
                        return Err(ConfigError::DuplicateKeepColumn {
                            column: name.clone(),
                        });
                    }
                    indices.push(resolve(&schema, "keep column names", name)?);
                }
                indices
            }
        };
        let keep_column_names = keep_indices
            .iter()
            .map(|&i| schema.columns[i].name)
            .collect();

        Ok(Self {
            schema,
            keep_column_names,
            keep_indices,
            allowlists: resolve_sets(&schema, "allowlists", allowlists)?,
            blocklists: resolve_sets(&schema, "blocklists", blocklists)?,
        })
    }

    /// Keeps all columns with no filters.
    pub fn all(schema: TableSchema) -> Self {
        let keep_indices: Vec<usize> = (0..schema.len()).collect();
        Self {
            schema,
            keep_column_names: schema.column_names(),
            keep_indices,
            allowlists: Vec::new(),
            blocklists: Vec::new(),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// CSV header: the kept column names in output order.
    pub fn header(&self) -> &[&'static str] {
        &self.keep_column_names
    }

    pub fn clean(&self, raw: &RawRowMatch) -> CleanRow {
        CleanRow(
            self.schema
                .columns
                .iter()
                .zip(&raw.values)
                .map(|(column, value)| column.clean(value))
                .collect(),
        )
    }

    pub fn passes_allowlists(&self, row: &CleanRow) -> bool {
        self.allowlists
            .iter()
            .all(|(i, allowed)| allowed.contains(&row.0[*i]))
    }

    pub fn passes_blocklists(&self, row: &CleanRow) -> bool {
        self.blocklists
            .iter()
            .all(|(i, blocked)| !blocked.contains(&row.0[*i]))
    }

    /// Filters run on the full clean row, so a filter column need not be kept.
    pub fn project(&self, row: CleanRow) -> Option<OutputRecord> {
        if !(self.passes_allowlists(&row) && self.passes_blocklists(&row)) {
            return None;
        }
        let mut values = row.0;
        Some(
            self.keep_indices
                .iter()
                .map(|&i| std::mem::take(&mut values[i]))
                .collect(),
        )
    }

    pub fn process_batch(&self, matches: &[RawRowMatch]) -> BatchOutcome {
        let records: Vec<OutputRecord> = matches
            .iter()
            .filter_map(|m| self.project(self.clean(m)))
            .collect();
        let total = matches.len() as u64;
        let kept = records.len() as u64;
        BatchOutcome {
            records,
            total,
            kept,
            dropped: total - kept,
        }
    }
}

fn resolve(schema: &TableSchema, list: &'static str, name: &str) -> Result<usize, ConfigError> {
    schema
        .position(name)
        .ok_or_else(|| ConfigError::UnknownColumn {
            list,
            column: name.to_string(),
            table: schema.table_name(),
            valid: schema.column_names().join(", "),
        })
}

fn resolve_sets(
    schema: &TableSchema,
    list: &'static str,
    values: &ColumnValues,
) -> Result<Vec<(usize, FxHashSet<String>)>, ConfigError> {
    values
        .iter()
        .map(|(name, accepted)| {
            let index = resolve(schema, list, name)?;
            Ok((index, accepted.iter().cloned().collect()))
        })
        .collect()
}
