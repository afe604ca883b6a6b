use crate::error::ConfigError;
use crate::row::ColumnValues;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Rows buffered before a batch is cleaned, filtered and written
pub const DEFAULT_BATCH_SIZE: usize = 500_000;

/// Buffer size for reading (possibly compressed) dump files
pub const READ_BUFFER_CAPACITY: usize = 256 * 1024;

/// Buffer size for CSV writers
pub const WRITE_BUFFER_CAPACITY: usize = 128 * 1024;

/// Progress spinner update interval (tick every N matched rows)
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// User-facing knobs for one extraction run.
///
/// Loaded from a JSON file and/or filled in from command line flags:
///
/// ```json
/// {
///   "keep_columns": ["cl_from", "cl_to"],
///   "allowlists": { "cl_type": ["page"] },
///   "blocklists": { "cl_to": ["Hidden_categories"] },
///   "batch_size": 100000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractOptions {
    pub keep_columns: Option<Vec<String>>,
    pub allowlists: ColumnValues,
    pub blocklists: ColumnValues,
    pub batch_size: usize,
    pub max_statements: Option<u64>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keep_columns: None,
            allowlists: ColumnValues::new(),
            blocklists: ColumnValues::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_statements: None,
        }
    }
}

impl ExtractOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file: {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid filter file: {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Appends `column=value` pairs to the allowlists.
    pub fn allow(&mut self, pairs: &[(String, String)]) {
        extend_lists(&mut self.allowlists, pairs);
    }

    /// Appends `column=value` pairs to the blocklists.
    pub fn block(&mut self, pairs: &[(String, String)]) {
        extend_lists(&mut self.blocklists, pairs);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

fn extend_lists(lists: &mut ColumnValues, pairs: &[(String, String)]) {
    for (column, value) in pairs {
        lists.entry(column.clone()).or_default().push(value.clone());
    }
}

/// Parses a `column=value` command line argument. Only the first `=` splits, so
/// values may themselves contain `=`.
pub fn parse_column_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((column, value)) if !column.is_empty() => {
            Ok((column.to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got {:?}", arg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.batch_size, DEFAULT_BATCH_SIZE);
        assert!(opts.keep_columns.is_none());
        assert!(opts.allowlists.is_empty());
        assert!(opts.max_statements.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let opts = ExtractOptions::from_json_str(r#"{"allowlists": {"cl_type": ["page"]}}"#).unwrap();
        assert_eq!(opts.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(opts.allowlists["cl_type"], vec!["page"]);
    }

    #[test]
    fn full_json() {
        let opts = ExtractOptions::from_json_str(
            r#"{
                "keep_columns": ["cl_from", "cl_to"],
                "allowlists": {},
                "blocklists": {"cl_to": ["A", "B"]},
                "batch_size": 10,
                "max_statements": 3
            }"#,
        )
        .unwrap();
        assert_eq!(
            opts.keep_columns,
            Some(vec!["cl_from".to_string(), "cl_to".to_string()])
        );
        assert_eq!(opts.blocklists["cl_to"].len(), 2);
        assert_eq!(opts.batch_size, 10);
        assert_eq!(opts.max_statements, Some(3));
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(ExtractOptions::from_json_str(r#"{"keep": ["a"]}"#).is_err());
    }

    #[test]
    fn zero_batch_size_invalid() {
        let opts = ExtractOptions {
            batch_size: 0,
            ..Default::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::ZeroBatchSize));
    }

    #[test]
    fn allow_and_block_merge_with_file_values() {
        let mut opts = ExtractOptions::from_json_str(r#"{"allowlists": {"cl_type": ["page"]}}"#).unwrap();
        opts.allow(&[("cl_type".to_string(), "subcat".to_string())]);
        opts.block(&[("cl_to".to_string(), "X".to_string())]);
        assert_eq!(opts.allowlists["cl_type"], vec!["page", "subcat"]);
        assert_eq!(opts.blocklists["cl_to"], vec!["X"]);
    }

    #[test]
    fn from_json_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ExtractOptions::from_json_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid filter file"));
    }

    #[test]
    fn parse_column_value_splits_once() {
        assert_eq!(
            parse_column_value("pp_propname=a=b").unwrap(),
            ("pp_propname".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_column_value("cl_to=").unwrap(),
            ("cl_to".to_string(), String::new())
        );
        assert!(parse_column_value("novalue").is_err());
        assert!(parse_column_value("=x").is_err());
    }
}
