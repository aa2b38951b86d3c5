use crate::history::{CullAction, CullHistoryRecord, HistoryLog};
use anyhow::{Context, Result};
use mediacull::AutoSelectionResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Move every path of `files` into `dup_dir`, returning the ones that moved.
///
/// Files without a name or whose destination already exists stay in place.
pub fn move_files<'a>(
    files: impl IntoIterator<Item = &'a PathBuf>,
    dup_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut moved = Vec::new();
    for dup in files {
        let Some(file_name) = dup.file_name() else {
            eprintln!("⚠️  {} has no file name; skipping", dup.display());
            continue;
        };
        let dest = dup_dir.join(file_name);
        if dest.exists() {
            eprintln!("⚠️  {} already exists; skipping", dest.display());
            continue;
        }
        fs::rename(dup, &dest).with_context(|| format!("Failed to move {:?} → {:?}", dup, dest))?;
        println!("   📦 Moved {} → {}", dup.display(), dest.display());
        moved.push(dup.clone());
    }
    Ok(moved)
}

/// Move the files a proposal marks for deletion and record what moved.
///
/// The result is marked applied, and a history record written, only when at
/// least one file actually moved. Returns whether that happened.
pub fn apply_move(
    result: &mut AutoSelectionResult,
    dup_dir: &Path,
    history: &mut HistoryLog,
) -> Result<bool> {
    let moved = move_files(&result.files_to_delete, dup_dir)?;
    if moved.is_empty() {
        println!("   ⏭  Nothing moved for '{}'", result.group.base_name);
        return Ok(false);
    }

    result.applied = true;
    history.append(&CullHistoryRecord::from_result(
        result,
        &moved,
        CullAction::Moved,
        Some(dup_dir),
    ))?;
    Ok(true)
}
