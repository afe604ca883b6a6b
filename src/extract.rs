use crate::config::ExtractOptions;
use crate::dumpfile::DumpFile;
use crate::emitter::BatchEmitter;
use crate::error::ConfigError;
use crate::row::RowProjection;
use crate::scanner::DumpScanner;
use crate::sink::{csv_output_path, CsvSink, RowSink};
use crate::stats::RunStats;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything needed to scan one dump, validated before any input is read.
pub struct Extraction {
    pub dump: DumpFile,
    pub projection: RowProjection,
    pub options: ExtractOptions,
}

impl Extraction {
    /// Resolves the table and checks the column configuration against it.
    pub fn prepare(dump: DumpFile, options: &ExtractOptions) -> Result<Self> {
        options.validate()?;
        let projection = RowProjection::new(
            dump.table.schema(),
            options.keep_columns.as_deref(),
            &options.allowlists,
            &options.blocklists,
        )
        .with_context(|| format!("Invalid column configuration for {:?}", dump.path))?;
        // compile up front so grammar problems surface before the file is opened
        dump.table.matcher()?;
        Ok(Self {
            dump,
            projection,
            options: options.clone(),
        })
    }

    pub fn header(&self) -> &[&'static str] {
        self.projection.header()
    }

    /// Streams the dump into `sink`.
    pub fn run<S: RowSink>(&self, sink: S, progress: ProgressBar) -> Result<RunStats> {
        let matcher = self.dump.table.matcher()?;
        let lines = self.dump.open()?;
        let scanner =
            DumpScanner::new(lines, matcher).with_max_statements(self.options.max_statements);

        info!(
            path = %self.dump.path.display(),
            table = self.dump.table.name(),
            wiki = %self.dump.name.wiki,
            date = %self.dump.name.yyyymmdd,
            columns = ?self.projection.header(),
            "Extracting rows"
        );

        let mut emitter = BatchEmitter::new(&self.projection, sink, self.options.batch_size)?
            .with_progress(progress);
        emitter
            .run(scanner)
            .with_context(|| format!("Failed to extract rows from {:?}", self.dump.path))
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        csv_output_path(output_dir, &self.dump.name.basename)
    }

    /// Writes `<output_dir>/<basename>.csv` and returns the output path with the
    /// run's counters.
    pub fn to_csv(&self, output_dir: &Path, progress: ProgressBar) -> Result<(PathBuf, RunStats)> {
        let output_path = self.output_path(output_dir);
        info!(path = %output_path.display(), "Writing CSV");
        let sink = CsvSink::create(&output_path)?;
        let stats = self.run(sink, progress)?;
        Ok((output_path, stats))
    }
}

/// Fails when two inputs share a basename, since both would write the same CSV.
pub fn check_distinct_outputs(
    extractions: &[Extraction],
    output_dir: &Path,
) -> Result<(), ConfigError> {
    let mut claimed: FxHashMap<PathBuf, &Path> = FxHashMap::default();
    for extraction in extractions {
        let output = extraction.output_path(output_dir);
        if let Some(first) = claimed.get(&output) {
            return Err(ConfigError::DuplicateOutput {
                first: first.display().to_string(),
                second: extraction.dump.path.display().to_string(),
                output: output.display().to_string(),
            });
        }
        claimed.insert(output, &extraction.dump.path);
    }
    Ok(())
}

/// Convenience wrapper: validate, then extract `input` into a CSV under `output_dir`.
pub fn run_extraction(
    input: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<RunStats> {
    let dump = DumpFile::new(input)?;
    let extraction = Extraction::prepare(dump, options)?;
    let (_, stats) = extraction.to_csv(output_dir, ProgressBar::hidden())?;
    Ok(stats)
}
