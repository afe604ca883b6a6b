use crate::config::WRITE_BUFFER_CAPACITY;
use crate::row::OutputRecord;
use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for extracted rows: one header, then rows of the same arity.
pub trait RowSink {
    fn write_header(&mut self, header: &[&str]) -> Result<()>;
    fn write_batch(&mut self, rows: &[OutputRecord]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

/// Comma separated output with minimal quoting and CRLF line endings.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(inner);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
    }
}

impl CsvSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {:?}", path))?;
        Ok(Self::new(BufWriter::with_capacity(
            WRITE_BUFFER_CAPACITY,
            file,
        )))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, header: &[&str]) -> Result<()> {
        self.writer.write_record(header)?;
        Ok(())
    }

    fn write_batch(&mut self, rows: &[OutputRecord]) -> Result<()> {
        for row in rows {
            self.writer.write_record(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV output")
    }
}

/// `<output_dir>/<basename>.csv`
pub fn csv_output_path(output_dir: &Path, basename: &str) -> PathBuf {
    output_dir.join(format!("{}.csv", basename))
}
