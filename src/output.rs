use anyhow::Result;
use mediacull::{AutoSelectionResult, DuplicateGroup, ScanSummary, SelectionBatch};
use std::path::Path;

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_scan_summary(summary: &ScanSummary, detailed: bool) {
    println!(
        "▶ Scanned {} files ({} media) in {:.2?}",
        summary.total_files_found, summary.media_files_found, summary.scan_duration
    );
    if summary.duplicate_groups.is_empty() {
        println!("No duplicates found.");
        return;
    }

    println!(
        "Found {} duplicate group(s), {} files, {:.1} MB reclaimable:",
        summary.duplicate_groups.len(),
        summary.potential_duplicates_count(),
        summary.potential_space_savings_mb()
    );
    for (i, group) in summary.duplicate_groups.iter().enumerate() {
        print_group(i, group, detailed);
    }
}

fn print_group(index: usize, group: &DuplicateGroup, detailed: bool) {
    println!(
        "\n✨ Group {}: {} [{}] confidence {:.2}",
        index + 1,
        group.base_name,
        group.pattern_type,
        group.confidence_score
    );
    for file in &group.files {
        if detailed {
            println!(
                "   ▶ {} ({:.1} MB, created {})",
                file.file_path().display(),
                file.size_mb(),
                file.created_at().format("%Y-%m-%d %H:%M:%S")
            );
        } else {
            println!("   ▶ {}", file.file_path().display());
        }
    }
    if detailed {
        if let Some(largest) = group.largest_file() {
            println!("   📏 Largest: {}", largest);
        }
        if let Some(newest) = group.newest_file() {
            println!("   🕒 Newest: {}", newest);
        }
    }
}

pub fn print_result(result: &AutoSelectionResult) {
    println!(
        "\n✨ {} [{}] confidence {:.2}",
        result.group.base_name, result.group.pattern_type, result.confidence
    );
    for keep in &result.files_to_keep {
        println!("   🏆 Keeping → {}", display_name(keep));
    }
    for delete in &result.files_to_delete {
        println!("   🗑️  Remove → {}", display_name(delete));
    }
    println!("   {}", result.reasoning);
}

pub fn print_batch(batch: &SelectionBatch) {
    if !batch.auto_selected.is_empty() {
        println!("\n✅ Auto-selected:");
        batch.auto_selected.iter().for_each(print_result);
    }
    if !batch.low_confidence.is_empty() {
        println!("\n⚠️  Low confidence (review manually):");
        batch.low_confidence.iter().for_each(print_result);
    }
    if !batch.skipped.is_empty() {
        println!("\n⏭  Skipped:");
        for group in &batch.skipped {
            println!("   ▶ {}", group);
        }
    }
    println!("\n{}", batch.summary());
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
