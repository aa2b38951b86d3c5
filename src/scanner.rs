use crate::config::AppConfig;
use crate::error::ScanError;
use crate::models::FileMetadata;
use crate::parser::FilenameParser;
use crate::progress::ProgressReporter;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

/// Discovers media files and builds their metadata records.
///
/// This is the filesystem-facing collaborator of the grouping engine: it only
/// reads, and every record it returns already carries its parse result.
pub struct MediaScanner {
    config: AppConfig,
    parser: FilenameParser,
}

impl MediaScanner {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            parser: FilenameParser::new(),
        }
    }

    pub fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.config.is_supported_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    /// All regular files under `dir`, reporting `(count, None, ..)` as they are found.
    pub fn discover_files(
        &self,
        dir: &Path,
        recursive: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::MissingDirectory {
                path: dir.to_string_lossy().into_owned(),
            });
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory {
                path: dir.to_string_lossy().into_owned(),
            });
        }

        log::info!("Starting file discovery in: {}", dir.display());
        let mut walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut found = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            found.push(entry.into_path());
            reporter.report(
                found.len(),
                None,
                &format!("Discovered {} files...", found.len()),
            );
        }

        log::info!("File discovery complete. Found {} total files.", found.len());
        Ok(found)
    }

    /// Metadata for every supported file under `dir`, in discovery order.
    pub fn scan_directory(
        &self,
        dir: &Path,
        recursive: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanOutput, ScanError> {
        let all_files = self.discover_files(dir, recursive, reporter)?;
        let total_files = all_files.len();
        log::info!("Found {} total files, filtering for media files...", total_files);

        let media_files = self.scan_files(&all_files, reporter);
        log::info!(
            "Scan complete: {} media files found out of {} total files",
            media_files.len(),
            total_files
        );

        Ok(ScanOutput {
            total_files,
            media_files,
        })
    }

    /// Metadata for the supported files among `paths`.
    ///
    /// Files are processed in parallel; output order follows `paths`. Entries
    /// that cannot be read are logged and left out.
    pub fn scan_files(&self, paths: &[PathBuf], reporter: &dyn ProgressReporter) -> Vec<FileMetadata> {
        let total = paths.len();
        let processed = AtomicUsize::new(0);

        paths
            .par_iter()
            .filter_map(|path| {
                let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                reporter.report(current, Some(total), &format!("Processing {}...", name));

                if !self.is_media_file(path) {
                    return None;
                }
                match self.file_metadata(path) {
                    Ok(metadata) => Some(metadata),
                    Err(e) => {
                        log::error!("Error accessing file {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect()
    }

    fn file_metadata(&self, path: &Path) -> Result<FileMetadata, ScanError> {
        let metadata = fs::metadata(path)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        let created: DateTime<Utc> = metadata.created().map(Into::into).unwrap_or(modified);

        let file = FileMetadata::new(path, metadata.len(), created, modified)?;
        let parsed = self.parser.parse(file.filename());
        Ok(file.with_parsed_filename(parsed))
    }
}

/// Files produced by one directory scan.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Every regular file seen, media or not.
    pub total_files: usize,
    pub media_files: Vec<FileMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternType;
    use crate::progress::SilentReporter;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[test]
    fn test_scan_filters_and_parses() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("IMG_0001.JPG"), b"one").unwrap();
        fs::write(temp_dir.path().join("IMG_0001-1.jpg"), b"two!").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"text").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("clip.mov"), b"mov").unwrap();

        let scanner = MediaScanner::new(AppConfig::default());
        let output = scanner
            .scan_directory(temp_dir.path(), true, &SilentReporter)
            .unwrap();

        assert_eq!(output.total_files, 4);
        assert_eq!(output.media_files.len(), 3);

        let img = output
            .media_files
            .iter()
            .find(|f| f.filename() == "IMG_0001-1.jpg")
            .unwrap();
        assert_eq!(img.size_bytes(), 4);
        let parsed = img.parsed_filename().unwrap();
        assert_eq!(parsed.pattern_type(), PatternType::Img);
        assert_eq!(parsed.base_name(), "img_0001");
    }

    #[test]
    fn test_non_recursive_scan() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("top.jpg"), b"x").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("deep.jpg"), b"x").unwrap();

        let scanner = MediaScanner::new(AppConfig::default());
        let output = scanner
            .scan_directory(temp_dir.path(), false, &SilentReporter)
            .unwrap();
        assert_eq!(output.media_files.len(), 1);
        assert_eq!(output.media_files[0].filename(), "top.jpg");
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = MediaScanner::new(AppConfig::default());
        let err = scanner
            .scan_directory(&temp_dir.path().join("nope"), true, &SilentReporter)
            .unwrap_err();
        assert!(matches!(err, ScanError::MissingDirectory { .. }));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();
        let scanner = MediaScanner::new(AppConfig::default());
        assert!(matches!(
            scanner.scan_directory(&file, true, &SilentReporter),
            Err(ScanError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_discovery_progress_has_unknown_total() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..3 {
            fs::write(temp_dir.path().join(format!("f{}.jpg", i)), b"x").unwrap();
        }

        let events = Mutex::new(Vec::new());
        let reporter = |current: usize, total: Option<usize>, _msg: &str| {
            events.lock().unwrap().push((current, total));
        };
        let scanner = MediaScanner::new(AppConfig::default());
        scanner.scan_directory(temp_dir.path(), true, &reporter).unwrap();

        let events = events.into_inner().unwrap();
        assert_eq!(&events[..3], &[(1, None), (2, None), (3, None)]);
        assert_eq!(events.len(), 6);
        assert!(events[3..].iter().all(|(_, total)| *total == Some(3)));
    }
}
