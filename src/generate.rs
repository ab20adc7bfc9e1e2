use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::client::OpenAIClient;
use crate::countries::{self, CountryRow};
use crate::parser;
use crate::pdf;
use crate::record::{self, CountryRecord};
use crate::render;
use crate::settings::Settings;

pub struct GenerateOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub limit: Option<usize>,
    /// Abort on the first failing row instead of skipping it
    pub strict: bool,
}

/// Counts returned after a generation run.
#[derive(Debug, Default, PartialEq)]
pub struct GenerateStats {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl GenerateStats {
    pub fn print(&self) {
        println!(
            "Generated {} documents ({} skipped, {} failed).",
            self.generated, self.skipped, self.failed
        );
    }
}

/// Where a record comes from. The HTTP client is the real one; tests swap in canned replies.
pub trait RecordSource {
    fn fetch(&self, country: &str) -> crate::error::Result<CountryRecord>;
}

pub struct ChatSource<'a> {
    pub client: &'a OpenAIClient,
    pub settings: &'a Settings,
}

impl RecordSource for ChatSource<'_> {
    fn fetch(&self, country: &str) -> crate::error::Result<CountryRecord> {
        let request = record::country_request(self.settings, country);
        let reply = self.client.chat_completion(&request)?;
        parser::parse_country_reply(&reply)
    }
}

/// Read the row table and render one PDF per included row, sequentially.
pub fn run(source: &dyn RecordSource, opts: &GenerateOptions) -> Result<GenerateStats> {
    let rows = countries::read_rows(&opts.input)
        .with_context(|| format!("Failed to read {}", opts.input.display()))?;
    info!(rows = rows.len(), input = %opts.input.display(), "Loaded input table");

    std::fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("Failed to create {}", opts.output_dir.display()))?;

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut stats = GenerateStats::default();

    for row in &rows {
        pb.inc(1);

        if !row.is_included() {
            info!("Skipping {} (flag={})", row.name(), row.flag_value());
            stats.skipped += 1;
            continue;
        }
        if opts.limit.is_some_and(|n| stats.generated + stats.failed >= n) {
            break;
        }

        pb.set_message(row.name().to_string());
        info!("Processing {} ({})...", row.name(), row.continent());

        match generate_one(source, row, &opts.output_dir) {
            Ok(path) => {
                info!("Created PDF: {}", path.display());
                stats.generated += 1;
            }
            Err(e) if !opts.strict => {
                warn!("Failed {}: {:#}", row.name(), e);
                stats.failed += 1;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.context(format!("Generation stopped at {}", row.name())));
            }
        }
    }

    pb.finish_and_clear();
    info!(
        generated = stats.generated,
        skipped = stats.skipped,
        failed = stats.failed,
        "Generation finished"
    );
    Ok(stats)
}

fn generate_one(source: &dyn RecordSource, row: &CountryRow, output_dir: &Path) -> Result<PathBuf> {
    let continent = row.continent();

    let mut record = source
        .fetch(row.name())
        .with_context(|| format!("Fetching facts for {}", row.name()))?;
    record.continent = continent.to_string();

    let path = render::document_path(output_dir, continent, &record);
    pdf::write_pdf(&render::layout(&record), &path)
        .with_context(|| format!("Writing {}", path.display()))?;
    Ok(path)
}
