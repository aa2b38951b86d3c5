use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Naming convention a filename was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternType {
    Guid,
    Img,
    Generic,
}

impl PatternType {
    /// Prior confidence that two files sharing this pattern and base name are duplicates.
    pub fn confidence(self) -> f64 {
        match self {
            PatternType::Guid => 0.95,
            PatternType::Img => 0.90,
            PatternType::Generic => 0.70,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::Guid => "GUID",
            PatternType::Img => "IMG",
            PatternType::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components extracted from a filename by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFilename {
    original_name: String,
    base_name: String,
    suffix: Option<String>,
    extension: String,
    pattern_type: PatternType,
}

impl ParsedFilename {
    pub fn new(
        original_name: impl Into<String>,
        base_name: &str,
        suffix: Option<String>,
        extension: &str,
        pattern_type: PatternType,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            base_name: base_name.to_lowercase(),
            suffix,
            extension: normalize_extension(extension),
            pattern_type,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Bucket key used by the grouper: `"{pattern_type}:{base_name}"`.
    pub fn group_key(&self) -> String {
        format!("{}:{}", self.pattern_type, self.base_name)
    }
}

/// Lowercase an extension and make sure it carries a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// A discovered media file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    file_path: PathBuf,
    filename: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    parsed_filename: Option<ParsedFilename>,
}

impl FileMetadata {
    /// Build a record for `path`. Relative paths are made absolute against the
    /// current directory; the filesystem is not touched.
    pub fn new(
        path: impl AsRef<Path>,
        size_bytes: u64,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ModelError::InvalidPath {
                path: String::new(),
            });
        }

        let file_path = std::path::absolute(path).map_err(|_| ModelError::InvalidPath {
            path: path.to_string_lossy().into_owned(),
        })?;

        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ModelError::MissingFileName {
                path: file_path.to_string_lossy().into_owned(),
            })?;

        Ok(Self {
            file_path,
            filename,
            size_bytes,
            created_at,
            modified_at,
            parsed_filename: None,
        })
    }

    pub fn with_parsed_filename(mut self, parsed: Option<ParsedFilename>) -> Self {
        self.parsed_filename = parsed;
        self
    }

    pub(crate) fn set_parsed_filename(&mut self, parsed: Option<ParsedFilename>) {
        self.parsed_filename = parsed;
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn parsed_filename(&self) -> Option<&ParsedFilename> {
        self.parsed_filename.as_ref()
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }

    /// Lowercase, dot-prefixed extension of the path, or an empty string.
    pub fn extension(&self) -> String {
        self.file_path
            .extension()
            .map(|ext| normalize_extension(&ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} MB)", self.filename, self.size_mb())
    }
}

/// A set of files believed to be copies of one another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub base_name: String,
    pub pattern_type: PatternType,
    pub files: Vec<FileMetadata>,
    pub confidence_score: f64,
}

impl DuplicateGroup {
    /// Build a group of at least two files; the confidence is clamped to [0, 1].
    pub fn new(
        base_name: impl Into<String>,
        pattern_type: PatternType,
        files: Vec<FileMetadata>,
        confidence_score: f64,
    ) -> Result<Self, ModelError> {
        let base_name = base_name.into();
        if files.len() < 2 {
            return Err(ModelError::TooFewFiles {
                base_name,
                count: files.len(),
            });
        }

        Ok(Self {
            base_name,
            pattern_type,
            files,
            confidence_score: confidence_score.clamp(0.0, 1.0),
        })
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// `(pattern_type, base_name)`, the naming key the group was bucketed on.
    pub fn key(&self) -> (PatternType, &str) {
        (self.pattern_type, self.base_name.as_str())
    }

    /// Naming key plus member paths. Exact mode can emit several groups with
    /// one naming key, so the members are needed to tell them apart.
    pub fn identity(&self) -> (PatternType, &str, BTreeSet<&Path>) {
        (
            self.pattern_type,
            self.base_name.as_str(),
            self.files.iter().map(FileMetadata::file_path).collect(),
        )
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(FileMetadata::size_bytes).sum()
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes() as f64 / BYTES_PER_MB
    }

    pub fn largest_file(&self) -> Option<&FileMetadata> {
        self.files.iter().max_by_key(|f| f.size_bytes())
    }

    pub fn newest_file(&self) -> Option<&FileMetadata> {
        self.files.iter().max_by_key(|f| f.created_at())
    }
}

impl fmt::Display for DuplicateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate group '{}' ({} files, {:.1} MB)",
            self.base_name,
            self.file_count(),
            self.total_size_mb()
        )
    }
}

/// Outcome of scanning one directory and grouping what was found.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub scan_path: PathBuf,
    pub total_files_found: usize,
    pub media_files_found: usize,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub scan_duration: Duration,
    pub scan_timestamp: DateTime<Utc>,
}

impl ScanSummary {
    pub fn potential_duplicates_count(&self) -> usize {
        self.duplicate_groups
            .iter()
            .filter(|g| g.file_count() > 1)
            .map(DuplicateGroup::file_count)
            .sum()
    }

    /// Bytes freed if every group were reduced to its largest file.
    pub fn potential_space_savings_bytes(&self) -> u64 {
        self.duplicate_groups
            .iter()
            .filter(|g| g.file_count() > 1)
            .map(|g| {
                let largest = g.largest_file().map(FileMetadata::size_bytes).unwrap_or(0);
                g.total_size_bytes() - largest
            })
            .sum()
    }

    pub fn potential_space_savings_mb(&self) -> f64 {
        self.potential_space_savings_bytes() as f64 / BYTES_PER_MB
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan of {}: {} media files, {} duplicate groups, {} potential duplicates",
            self.scan_path.display(),
            self.media_files_found,
            self.duplicate_groups.len(),
            self.potential_duplicates_count()
        )
    }
}
