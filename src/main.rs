mod cli;
mod cull;
mod history;
mod output;
mod terminal;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, Dups, HistoryCmd, ScanArgs};
use dialoguer::Confirm;
use history::{CullAction, CullHistoryRecord, HistoryLog, RestoreSelection};
use mediacull::{
    AppConfig, AutoSelectionResult, AutoSelector, DuplicateGroup, DuplicateGrouper, GroupFilter,
    MediaScanner, ScanSummary, SelectionBatch,
};
use std::fs;
use std::path::Path;
use std::time::Instant;
use terminal::TerminalProgress;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Duplicates { command } => match command {
            Dups::Scan {
                scan,
                detailed,
                exact,
                json,
            } => {
                let summary = scan_and_group(&config, &scan, exact)?;
                if json {
                    output::print_json(&summary)?;
                } else {
                    output::print_scan_summary(&summary, detailed);
                }
            }

            Dups::Auto {
                scan,
                min_confidence,
                json,
            } => {
                let mut config = config;
                if let Some(min_confidence) = min_confidence {
                    config.auto_selection_confidence_threshold = min_confidence;
                    config = config.validate()?;
                }
                let (_, batch) = auto_select(&config, &scan)?;
                if json {
                    output::print_json(&batch)?;
                } else {
                    output::print_batch(&batch);
                }
            }

            Dups::Cull {
                scan,
                dry_run,
                target_dir,
                interactive,
            } => {
                println!("▶ Culling duplicates in: {}", scan.path.display());
                let (groups, batch) = auto_select(&config, &scan)?;
                let dup_dir = target_dir.unwrap_or_else(|| scan.path.join("duplicates"));
                cull(&scan.path, &dup_dir, groups, batch, dry_run, interactive)?;
            }

            Dups::Delete { scan, yes } => {
                println!("▶ Deleting duplicates in: {}", scan.path.display());
                let (_, batch) = auto_select(&config, &scan)?;
                delete(&scan.path, batch, yes)?;
            }
        },

        Commands::History { command } => match command {
            HistoryCmd::List { path } => list_history(&path)?,

            HistoryCmd::Restore { path, record, all } => {
                let selection = if all {
                    RestoreSelection::All
                } else {
                    RestoreSelection::Record(record)
                };
                let report = history::restore(&path, selection)?;
                println!(
                    "🧹 Updated history, removed {} record(s); {} file(s) restored, {} skipped",
                    report.records_restored, report.files_restored, report.files_skipped
                );
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Scan `args.path`, then group what was found.
fn scan_and_group(config: &AppConfig, args: &ScanArgs, exact: bool) -> Result<ScanSummary> {
    let started = Instant::now();
    let mut config = config.clone();
    if args.no_visual {
        config.enable_visual_filtering = false;
    }

    let progress = TerminalProgress::new("Scanning for media…")?;
    let scanner = MediaScanner::new(config.clone());
    let scanned = scanner
        .scan_directory(&args.path, !args.no_recursive, &progress)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;
    progress.finish("Scan complete");

    let progress = TerminalProgress::new("Grouping duplicates…")?;
    let mut grouper = DuplicateGrouper::from_config(&config);
    let groups = if exact {
        grouper.find_exact_duplicates(&scanned.media_files, &progress)
    } else {
        grouper.group_with_progress(&scanned.media_files, &progress)
    };
    progress.finish("Grouping complete");

    let (hits, misses) = grouper.cache().stats();
    log::debug!("Similarity cache: {} hits, {} misses", hits, misses);

    Ok(ScanSummary {
        scan_path: args.path.clone(),
        total_files_found: scanned.total_files,
        media_files_found: scanned.media_files.len(),
        duplicate_groups: groups,
        scan_duration: started.elapsed(),
        scan_timestamp: Utc::now(),
    })
}

fn auto_select(config: &AppConfig, args: &ScanArgs) -> Result<(Vec<DuplicateGroup>, SelectionBatch)> {
    if !config.enable_auto_selection {
        anyhow::bail!("Auto-selection is disabled in the configuration");
    }

    let summary = scan_and_group(config, args, false)?;
    let selector = AutoSelector::from_config(config);
    let progress = TerminalProgress::new("Selecting duplicates…")?;
    let batch = selector.process_groups_with_progress(&summary.duplicate_groups, false, &progress);
    progress.finish("Selection complete");
    Ok((summary.duplicate_groups, batch))
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

fn cull(
    root: &Path,
    dup_dir: &Path,
    groups: Vec<DuplicateGroup>,
    batch: SelectionBatch,
    dry_run: bool,
    interactive: bool,
) -> Result<()> {
    let mut proposals: Vec<AutoSelectionResult> = batch.auto_selected;
    if interactive {
        proposals.extend(batch.low_confidence);
    } else if !batch.low_confidence.is_empty() {
        println!(
            "⚠️  {} low-confidence group(s) left alone; use --interactive to review them",
            batch.low_confidence.len()
        );
    }

    if proposals.is_empty() {
        println!("No duplicates to cull.");
        return Ok(());
    }

    if !dry_run {
        fs::create_dir_all(dup_dir)
            .with_context(|| format!("Failed to create directory {:?}", dup_dir))?;
    }
    let mut history_out = if dry_run {
        None
    } else {
        Some(HistoryLog::open(root)?)
    };

    let mut applied = Vec::new();
    for mut result in proposals {
        output::print_result(&result);
        if interactive && !confirm("Move the proposed file(s)?", false)? {
            println!("   ⏭  Skipped");
            continue;
        }

        let Some(out) = history_out.as_mut() else {
            for dup in &result.files_to_delete {
                println!("   📦 [dry-run] MOVE {} → {}", dup.display(), dup_dir.display());
            }
            continue;
        };
        if cull::apply_move(&mut result, dup_dir, out)? {
            applied.push(result);
        }
    }

    match history_out {
        Some(out) => println!("\n✅ Recorded cull history in {}", out.path().display()),
        None => println!("\n⚠️  Dry-run only; no files were changed."),
    }
    println!(
        "{} group(s) still unresolved",
        GroupFilter::unresolved_count(&groups, &applied)
    );
    Ok(())
}

fn delete(root: &Path, batch: SelectionBatch, yes: bool) -> Result<()> {
    if batch.auto_selected.is_empty() {
        println!("No duplicates to delete.");
        return Ok(());
    }

    batch.auto_selected.iter().for_each(output::print_result);
    let prompt = format!(
        "Permanently delete {} file(s)?",
        batch.files_marked_for_deletion()
    );
    if !yes && !confirm(&prompt, false)? {
        println!("Aborted; no files were changed.");
        return Ok(());
    }

    let mut history_out = HistoryLog::open(root)?;
    for mut result in batch.auto_selected {
        let mut deleted = Vec::new();
        for dup in &result.files_to_delete {
            fs::remove_file(dup).with_context(|| format!("Failed to delete {}", dup.display()))?;
            println!("   🗑️  Deleted {}", dup.display());
            deleted.push(dup.clone());
        }
        result.applied = true;
        history_out.append(&CullHistoryRecord::from_result(
            &result,
            &deleted,
            CullAction::Deleted,
            None,
        ))?;
    }

    println!("\n✅ Recorded cull history in {}", history_out.path().display());
    Ok(())
}

fn list_history(root: &Path) -> Result<()> {
    println!("🗂️  Cull History:");
    for (i, (_, parsed)) in history::read_history(root)?.into_iter().enumerate() {
        match parsed {
            Ok(rec) => println!(
                "[{}] {}\n     kept: {:?}\n     culled: {:?}\n     action: {:?}\n     confidence: {:.2}\n     {}\n",
                i, rec.timestamp, rec.retained, rec.culled, rec.action, rec.confidence, rec.reasoning
            ),
            Err(err) => eprintln!("⚠️  Skipping malformed entry {}: {}", i, err),
        }
    }
    Ok(())
}
