//! wpsql: Wikipedia SQL dump row extraction
//!
//! Wikimedia publishes many MediaWiki tables as MySQL dumps: a handful of DDL
//! lines followed by very long `INSERT INTO ... VALUES (...),(...),...;` lines.
//! This crate turns such a dump into a filtered CSV file without ever holding
//! more than one line and one batch of rows in memory.
//!
//! # Pipeline
//!
//! 1. **Grammar** -- each known table has a static column list built from
//!    primitive value patterns; it is compiled once into a single row-tuple regex
//! 2. **Scan** -- lines are streamed from the (optionally gzip/bzip2 compressed)
//!    dump; every `INSERT INTO` line is searched left to right for row-tuples
//! 3. **Clean** -- captures are unquoted, unescaped and NULL-normalised per column
//! 4. **Filter & project** -- allowlists/blocklists are applied to the full clean
//!    row, then the kept columns are written in the requested order
//! 5. **Emit** -- rows are flushed to the sink in fixed-size batches
//!
//! Row-tuples that do not fit the grammar are skipped silently (and counted).
//!
//! # Key Modules
//!
//! - [`patterns`] -- Primitive SQL literal grammars
//! - [`column`] -- Column descriptors and value cleaning
//! - [`schema`] -- Closed catalog of supported tables
//! - [`grammar`] -- Row grammar compilation and tuple iteration
//! - [`row`] -- Cleaning, filtering and projection of matched rows
//! - [`scanner`] -- Line-oriented INSERT statement scanner
//! - [`emitter`] -- Batched output with progress reporting
//! - [`sink`] -- Output sink trait and CSV implementation
//! - [`dumpfile`] -- File name convention and decompressing line reader
//! - [`extract`] -- One-file extraction driver
//! - [`stats`] -- Per-run and aggregate counters
//! - [`config`] -- Constants and extraction options
//! - [`error`] -- Configuration and grammar errors
//!
//! # Example Usage
//!
//! ```bash
//! # All columns of the category table
//! wpsql extract enwiki-20240101-category.sql.gz -o output/
//!
//! # Only article membership in categorylinks, two columns
//! wpsql extract enwiki-20240101-categorylinks.sql.gz -o output/ \
//!     --keep cl_from,cl_to --allow cl_type=page
//! ```

pub mod column;
pub mod config;
pub mod dumpfile;
pub mod emitter;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod patterns;
pub mod row;
pub mod scanner;
pub mod schema;
pub mod sink;
pub mod stats;
