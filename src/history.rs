use anyhow::{Context, Result};
use chrono::Utc;
use mediacull::AutoSelectionResult;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const HISTORY_FILE_NAME: &str = ".history.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullAction {
    Moved,
    Deleted,
}

/// One applied auto-selection, one JSON object per line in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CullHistoryRecord {
    pub timestamp: String,
    pub retained: Vec<String>,
    pub culled: Vec<String>,
    pub action: CullAction,
    /// Where moved files went; absent for deletions.
    #[serde(default)]
    pub target_dir: Option<String>,
    pub confidence: f64,
    pub reasoning: String,
}

impl CullHistoryRecord {
    /// Record for `result` where `culled` are the files the action actually touched.
    pub fn from_result(
        result: &AutoSelectionResult,
        culled: &[PathBuf],
        action: CullAction,
        target_dir: Option<&Path>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            retained: paths_to_strings(&result.files_to_keep),
            culled: paths_to_strings(culled),
            action,
            target_dir: target_dir.map(|d| d.to_string_lossy().into_owned()),
            confidence: result.confidence,
            reasoning: result.reasoning.clone(),
        }
    }
}

fn paths_to_strings<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

pub fn history_path(dir: &Path) -> PathBuf {
    dir.join(HISTORY_FILE_NAME)
}

/// Append-only writer for the history file of one scanned directory.
pub struct HistoryLog {
    path: PathBuf,
    out: File,
}

impl HistoryLog {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = history_path(dir);
        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open history file {:?}", path))?;
        Ok(Self { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &CullHistoryRecord) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(record)?)
            .with_context(|| format!("Failed to write history file {:?}", self.path))?;
        Ok(())
    }
}

/// Every line of the history file, parsed or not, in file order.
pub fn read_history(dir: &Path) -> Result<Vec<(String, serde_json::Result<CullHistoryRecord>)>> {
    let path = history_path(dir);
    let f = File::open(&path).with_context(|| format!("Could not open history file {:?}", path))?;

    let mut lines = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<CullHistoryRecord>(&line);
        lines.push((line, parsed));
    }
    Ok(lines)
}

/// Which moved records to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSelection {
    /// The record at this position in the history file, as numbered by
    /// `read_history`; the latest moved record when `None`.
    Record(Option<usize>),
    All,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub records_restored: usize,
    pub files_restored: usize,
    pub files_skipped: usize,
}

/// Move culled files of the selected records back to their original paths.
///
/// A record is dropped from the history file once all of its files are back.
/// Files that could not be restored stay listed in their record.
pub fn restore(dir: &Path, selection: RestoreSelection) -> Result<RestoreReport> {
    let entries = read_history(dir)?;
    let moved: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, (_, parsed))| matches!(parsed, Ok(rec) if rec.action == CullAction::Moved))
        .map(|(i, _)| i)
        .collect();

    let Some(&latest) = moved.last() else {
        anyhow::bail!("No valid 'moved' history records to restore");
    };

    let targets: Vec<usize> = match selection {
        RestoreSelection::All => moved,
        RestoreSelection::Record(None) => vec![latest],
        RestoreSelection::Record(Some(idx)) => {
            if idx >= entries.len() {
                anyhow::bail!(
                    "Invalid history index {}; valid range is 0..{}",
                    idx,
                    entries.len() - 1
                );
            }
            if !moved.contains(&idx) {
                anyhow::bail!("History record {} is not a 'moved' record", idx);
            }
            vec![idx]
        }
    };

    let mut lines: Vec<Option<String>> = entries.iter().map(|(line, _)| Some(line.clone())).collect();
    let mut report = RestoreReport::default();
    for &i in &targets {
        let Ok(rec) = &entries[i].1 else {
            continue;
        };
        println!(
            "🔄 Restoring {} files from record {}...",
            rec.culled.len(),
            rec.timestamp
        );

        let remaining = restore_record(dir, rec, &mut report)?;
        if remaining.len() < rec.culled.len() {
            report.records_restored += 1;
        }
        if remaining.is_empty() {
            lines[i] = None;
        } else if remaining.len() < rec.culled.len() {
            let mut rest = rec.clone();
            rest.culled = remaining;
            lines[i] = Some(serde_json::to_string(&rest)?);
        }
    }

    let kept_lines: Vec<String> = lines.into_iter().flatten().collect();
    let path = history_path(dir);
    let new_content = if kept_lines.is_empty() {
        String::new()
    } else {
        kept_lines.join("\n") + "\n"
    };
    fs::write(&path, new_content)
        .with_context(|| format!("Failed to update history file {:?}", path))?;

    Ok(report)
}

/// Restore the files of one moved record, returning the ones left behind.
fn restore_record(
    dir: &Path,
    rec: &CullHistoryRecord,
    report: &mut RestoreReport,
) -> Result<Vec<String>> {
    let source_dir = rec
        .target_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join("duplicates"));

    let mut remaining = Vec::new();
    for orig in &rec.culled {
        let dest = Path::new(orig);
        let Some(fname) = dest.file_name() else {
            report.files_skipped += 1;
            remaining.push(orig.clone());
            continue;
        };
        let src = source_dir.join(fname);

        if !src.exists() {
            eprintln!("⚠️ Source file {:?} does not exist; skipping", src);
        } else if src == dest {
            eprintln!("⚠️ Source and destination are the same; skipping {:?}", src);
        } else if dest.exists() {
            eprintln!("⚠️ Destination {:?} already exists; skipping", dest);
        } else {
            fs::rename(&src, dest)
                .with_context(|| format!("Failed to restore {:?} → {:?}", src, dest))?;
            println!("🔄 Restored {:?} → {:?}", src, dest);
            report.files_restored += 1;
            continue;
        }
        report.files_skipped += 1;
        remaining.push(orig.clone());
    }
    Ok(remaining)
}
