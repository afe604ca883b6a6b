use thiserror::Error;

/// Fatal configuration problems, raised before any dump line is parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("table name {0:?} is not supported (known tables: {known})", known = crate::schema::known_table_names().join(", "))]
    UnknownTable(String),

    #[error(
        "basename of {0:?} does not match the required pattern \"WIKI-YYYYMMDD-TABLE_NAME.sql{{.gz,.bz2}}\""
    )]
    BadFileName(String),

    #[error("keep column names must name at least one column")]
    EmptyKeepColumns,

    #[error("keep column names include duplicate {column:?}")]
    DuplicateKeepColumn { column: String },

    #[error("column name {column:?} in {list} is not a valid column of table {table} ({valid})")]
    UnknownColumn {
        list: &'static str,
        column: String,
        table: &'static str,
        valid: String,
    },

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("{first:?} and {second:?} would both be written to {output:?}")]
    DuplicateOutput {
        first: String,
        second: String,
        output: String,
    },
}

/// Problems turning a column list into a row matcher.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("column name {0:?} is not a valid capture group identifier")]
    InvalidColumnName(String),

    #[error("column name {0:?} appears more than once")]
    DuplicateColumn(String),

    #[error("row grammar failed to compile: {0}")]
    Regex(#[from] regex::Error),
}
