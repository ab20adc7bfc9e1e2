use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::parser::SectionList;
use crate::pdf;

/// One output row: the document a line came from and the line itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkRow {
    pub source: String,
    pub link: String,
}

/// Scan stats returned after completion.
#[derive(Debug, Default, PartialEq)]
pub struct ScanStats {
    pub documents: usize,
    pub unreadable: usize,
    pub rows: usize,
}

/// Every `*.pdf` under `root`, recursively, in file-name order.
pub fn find_documents(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pdf"))
        .map(|e| e.into_path())
        .collect()
}

/// Pull `header` items out of every document under `root`, deduplicated on
/// (source, link) in first-seen order.
pub fn collect_links(root: &Path, header: &str) -> Result<(Vec<LinkRow>, ScanStats)> {
    let documents = find_documents(root);
    info!(documents = documents.len(), root = %root.display(), "Scanning documents");

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut stats = ScanStats {
        documents: documents.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();

    for path in &documents {
        pb.inc(1);
        let text = match pdf::extract_text(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping {} (error reading): {}", path.display(), e);
                stats.unreadable += 1;
                continue;
            }
        };

        let source = path.display().to_string();
        rows.extend(SectionList::new(&text, header).items().map(|link| LinkRow {
            source: source.clone(),
            link: link.to_string(),
        }));
    }

    pb.finish_and_clear();

    let rows = dedupe(rows);
    stats.rows = rows.len();
    Ok((rows, stats))
}

/// Drop repeated (source, link) pairs, keeping the first occurrence.
pub fn dedupe(rows: Vec<LinkRow>) -> Vec<LinkRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert((r.source.clone(), r.link.clone())))
        .collect()
}

/// Write `source,link` rows with a header line.
pub fn write_csv(path: &Path, rows: &[LinkRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(["source", "link"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
