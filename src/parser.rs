use crate::models::{FileMetadata, ParsedFilename, PatternType};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 8-4-4-4-12 hex identifier, optional `-digits` suffix, extension.
static RE_GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})(?:-([0-9]+))?(\.[^.]+)$",
    )
    .expect("Invalid GUID regex")
});

/// Camera-style `IMG_1234` names, optional `-digits` suffix.
static RE_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(IMG_[0-9]+)(?:-([0-9]+))?(\.[^.]+)$").expect("Invalid IMG regex")
});

/// Anything with an extension; a trailing ` (N)`, `-N` or `_N` is split off.
static RE_NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:\s*\(([0-9]+)\)|\s*-([0-9]+)|\s*_([0-9]+))?(\.[^.]+)$")
        .expect("Invalid numbered regex")
});

/// Generic base names shorter than this are too weak a signal to group on.
const MIN_GENERIC_BASE_LEN: usize = 3;

/// Classifies filenames into naming patterns and extracts their grouping key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameParser;

impl FilenameParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `filename`, trying GUID, then IMG, then the generic pattern.
    ///
    /// Returns `None` when nothing matches; such files take no part in grouping.
    pub fn parse(&self, filename: &str) -> Option<ParsedFilename> {
        if filename.is_empty() {
            return None;
        }

        if let Some(caps) = RE_GUID.captures(filename) {
            return Some(ParsedFilename::new(
                filename,
                &caps[1],
                caps.get(2).map(|m| m.as_str().to_string()),
                &caps[3],
                PatternType::Guid,
            ));
        }

        if let Some(caps) = RE_IMG.captures(filename) {
            return Some(ParsedFilename::new(
                filename,
                &caps[1],
                caps.get(2).map(|m| m.as_str().to_string()),
                &caps[3],
                PatternType::Img,
            ));
        }

        let caps = RE_NUMBERED.captures(filename)?;
        let base_name = caps[1].trim();
        if base_name.chars().count() < MIN_GENERIC_BASE_LEN {
            return None;
        }

        Some(ParsedFilename::new(
            filename,
            base_name,
            numbered_suffix(&caps),
            &caps[5],
            PatternType::Generic,
        ))
    }

    /// Base name used for grouping, if the filename is recognised.
    pub fn extract_base_name(&self, filename: &str) -> Option<String> {
        self.parse(filename).map(|p| p.base_name().to_string())
    }

    /// Pattern prior for `filename`; 0.0 when it cannot be parsed.
    pub fn confidence_for(&self, filename: &str) -> f64 {
        self.parse(filename)
            .map(|p| p.pattern_type().confidence())
            .unwrap_or(0.0)
    }

    /// Two names are candidates when both parse to the same pattern and base
    /// name. Extensions play no part.
    pub fn are_potential_duplicates(&self, filename1: &str, filename2: &str) -> bool {
        match (self.parse(filename1), self.parse(filename2)) {
            (Some(a), Some(b)) => {
                a.pattern_type() == b.pattern_type() && a.base_name() == b.base_name()
            }
            _ => false,
        }
    }

    /// Attach a parse result to every record, replacing any previous one.
    pub fn annotate(&self, files: &mut [FileMetadata]) {
        for file in files.iter_mut() {
            let parsed = self.parse(file.filename());
            if parsed.is_none() {
                log::debug!("Unrecognised filename pattern: {}", file.filename());
            }
            file.set_parsed_filename(parsed);
        }
    }
}

fn numbered_suffix(caps: &Captures<'_>) -> Option<String> {
    caps.get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map(|m| m.as_str().to_string())
}
