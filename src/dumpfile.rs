//! Dump file naming convention and decoded line reading.
//!
//! Wikimedia publishes one file per table, named `WIKI-YYYYMMDD-TABLE.sql.gz`
//! (e.g. `enwiki-20240101-categorylinks.sql.gz`). Lines can be hundreds of
//! megabytes long since each INSERT statement sits on a single line.

use crate::config::READ_BUFFER_CAPACITY;
use crate::error::ConfigError;
use crate::schema::Table;
use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<basename>(?P<wiki>[a-z]+)-(?P<yyyymmdd>[0-9]{8})-(?P<table_name>\w+))(?P<extension>\.sql(?:\.gz|\.bz2)?)$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    fn from_extension(extension: &str) -> Self {
        match extension {
            ".sql.gz" => Compression::Gzip,
            ".sql.bz2" => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

/// Parts of a dump file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpFileName {
    pub basename: String,
    pub wiki: String,
    pub yyyymmdd: String,
    pub table_name: String,
    pub compression: Compression,
}

impl DumpFileName {
    pub fn parse(path: &Path) -> Result<Self, ConfigError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ConfigError::BadFileName(path.display().to_string()))?;
        let caps = FILE_NAME_REGEX
            .captures(file_name)
            .ok_or_else(|| ConfigError::BadFileName(file_name.to_string()))?;
        Ok(Self {
            basename: caps["basename"].to_string(),
            wiki: caps["wiki"].to_string(),
            yyyymmdd: caps["yyyymmdd"].to_string(),
            table_name: caps["table_name"].to_string(),
            compression: Compression::from_extension(&caps["extension"]),
        })
    }

    pub fn table(&self) -> Result<Table, ConfigError> {
        self.table_name.parse()
    }
}

/// A dump file on disk whose name follows the convention and names a known table.
#[derive(Debug, Clone)]
pub struct DumpFile {
    pub path: PathBuf,
    pub name: DumpFileName,
    pub table: Table,
}

impl DumpFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let name = DumpFileName::parse(&path)?;
        let table = name.table()?;
        Ok(Self { path, name, table })
    }

    pub fn open(&self) -> Result<DumpLines<Box<dyn BufRead + Send>>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open dump file: {:?}", self.path))?;
        let reader: Box<dyn Read + Send> = match self.name.compression {
            Compression::Gzip => Box::new(MultiGzDecoder::new(file)),
            Compression::Bzip2 => Box::new(BzDecoder::new(file)),
            Compression::None => Box::new(file),
        };
        let reader: Box<dyn BufRead + Send> =
            Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, reader));
        Ok(DumpLines::new(reader))
    }
}

/// Lines of a byte stream, decoded as UTF-8 with invalid sequences dropped.
pub struct DumpLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> DumpLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for DumpLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                Some(Ok(decode_lossy(&self.buf)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.utf8_chunks().map(|chunk| chunk.valid()).collect(),
    }
}
