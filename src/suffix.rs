use crate::models::FileMetadata;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Trailing copy markers, checked in order against the lowercased stem.
static SUFFIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"_([0-9]+)$",       // name_1
        r"\s*\(([0-9]+)\)$", // name (1)
        r"\s*-\s*([0-9]+)$", // name - 1, name-1
        r"\s+([0-9]+)$",     // name 1
        r"_copy([0-9]*)$",   // name_copy, name_copy2
        r"\s+copy([0-9]*)$", // name copy, name copy2
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid suffix regex"))
    .collect()
});

/// Ranks filenames by how likely they are to be the original of a set of copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixDetector;

impl SuffixDetector {
    pub fn new() -> Self {
        Self
    }

    fn stem(filename: &str) -> String {
        Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn has_numeric_suffix(&self, filename: &str) -> bool {
        let stem = Self::stem(filename);
        SUFFIX_PATTERNS.iter().any(|re| re.is_match(&stem))
    }

    /// 0 for a name with no copy marker, otherwise the marker's number.
    ///
    /// A bare `copy` marker counts as 1. Numbers too large to represent also
    /// count as 1.
    pub fn priority(&self, filename: &str) -> u64 {
        let stem = Self::stem(filename);

        for re in SUFFIX_PATTERNS.iter() {
            if let Some(caps) = re.captures(&stem) {
                let digits = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if digits.is_empty() {
                    return 1;
                }
                return digits.parse().unwrap_or(1);
            }
        }

        0
    }

    /// The file most likely to be the original: lowest priority wins, and among
    /// equal priorities the one that comes first in `files`.
    pub fn identify_original<'a>(&self, files: &'a [FileMetadata]) -> Option<&'a FileMetadata> {
        files
            .iter()
            .enumerate()
            .map(|(index, file)| (self.priority(file.filename()), index, file))
            .min_by_key(|(priority, index, _)| (*priority, *index))
            .map(|(_, _, file)| file)
    }
}
