use crate::config::AppConfig;
use crate::error::IncomparableError;
use crate::models::FileMetadata;
use image::{ColorType, DynamicImage, ImageReader};
use image_hasher::{HashAlg, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp", ".ico", ".heic", ".heif",
];

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv", ".webm"];

/// dHash grid; 8x8 gives a 64-bit fingerprint.
const DHASH_SIZE: u32 = 8;

/// Size ratio above which two videos are treated as near-identical encodes.
const VIDEO_CLOSE_RATIO: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Classify a dot-prefixed extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityThresholds {
    pub image: f64,
    pub video: f64,
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            image: 0.90,
            video: 0.85,
        }
    }
}

/// Scores how alike two media files of the same category are.
#[derive(Debug, Clone, Default)]
pub struct SimilarityAnalyzer {
    thresholds: SimilarityThresholds,
}

impl SimilarityAnalyzer {
    pub fn new(thresholds: SimilarityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(SimilarityThresholds {
            image: config.image_similarity_threshold,
            video: config.video_similarity_threshold,
        })
    }

    pub fn thresholds(&self) -> SimilarityThresholds {
        self.thresholds
    }

    pub fn threshold_for(&self, kind: MediaKind) -> Option<f64> {
        match kind {
            MediaKind::Image => Some(self.thresholds.image),
            MediaKind::Video => Some(self.thresholds.video),
            MediaKind::Unknown => None,
        }
    }

    /// Similarity in [0, 1] between two files of the same media category.
    ///
    /// Fails when either file is missing or the pair cannot be compared. Decode
    /// and hashing failures are not errors: they score 0.
    pub fn similarity(
        &self,
        file1: &FileMetadata,
        file2: &FileMetadata,
    ) -> Result<f64, IncomparableError> {
        for file in [file1, file2] {
            if !file.file_path().exists() {
                return Err(IncomparableError::MissingFile(file.file_path().to_path_buf()));
            }
        }

        let (ext1, ext2) = (file1.extension(), file2.extension());
        let kind = MediaKind::from_extension(&ext1);
        if kind != MediaKind::from_extension(&ext2) {
            return Err(IncomparableError::MixedMedia {
                left: ext1,
                right: ext2,
            });
        }

        match kind {
            MediaKind::Image => Ok(self.image_similarity(file1, file2)),
            MediaKind::Video => Ok(video_similarity(file1, file2)),
            MediaKind::Unknown => Err(IncomparableError::UnsupportedMedia { extension: ext1 }),
        }
    }

    /// The similarity score when it clears the category threshold.
    ///
    /// Anything that prevents a comparison yields `None`, so callers fall back
    /// to keeping both files.
    pub fn confirmed_similarity(&self, file1: &FileMetadata, file2: &FileMetadata) -> Option<f64> {
        let score = match self.similarity(file1, file2) {
            Ok(score) => score,
            Err(e) => {
                log::warn!(
                    "Could not compare {} and {}: {}",
                    file1.filename(),
                    file2.filename(),
                    e
                );
                return None;
            }
        };

        let threshold = self.threshold_for(MediaKind::from_extension(&file1.extension()))?;
        (score >= threshold).then_some(score)
    }

    pub fn are_visually_similar(&self, file1: &FileMetadata, file2: &FileMetadata) -> bool {
        self.confirmed_similarity(file1, file2).is_some()
    }

    fn image_similarity(&self, file1: &FileMetadata, file2: &FileMetadata) -> f64 {
        let (Some(hash1), Some(hash2)) = (dhash(file1.file_path()), dhash(file2.file_path())) else {
            return 0.0;
        };

        let max_distance = (hash1.as_bytes().len() * 8) as f64;
        if max_distance == 0.0 {
            return 0.0;
        }

        let distance = hash1.dist(&hash2);
        let similarity = (1.0 - distance as f64 / max_distance).max(0.0);

        log::debug!(
            "Image similarity between {} and {}: {:.3} (distance: {})",
            file1.filename(),
            file2.filename(),
            similarity,
            distance
        );

        similarity
    }
}

/// Difference hash of the image at `path`, or `None` if it cannot be decoded.
pub fn dhash(path: &Path) -> Option<ImageHash> {
    let img = match ImageReader::open(path).and_then(|reader| reader.with_guessed_format()) {
        Ok(reader) => match reader.decode() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Failed to decode {}: {}", path.display(), e);
                return None;
            }
        },
        Err(e) => {
            log::warn!("Failed to open {}: {}", path.display(), e);
            return None;
        }
    };

    let img = match img.color() {
        ColorType::Rgb8 | ColorType::L8 => img,
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    };

    let hasher = HasherConfig::new()
        .hash_size(DHASH_SIZE, DHASH_SIZE)
        .hash_alg(HashAlg::Gradient)
        .to_hasher();

    Some(hasher.hash_image(&img))
}

/// Size-ratio heuristic for videos; no frames are decoded.
///
/// Ratios at or above 0.95 map linearly onto [0.9, 1.0]; lower ratios are
/// scaled by 0.9.
fn video_similarity(file1: &FileMetadata, file2: &FileMetadata) -> f64 {
    let (size1, size2) = (file1.size_bytes(), file2.size_bytes());
    if size1 == 0 || size2 == 0 {
        return 0.0;
    }

    let ratio = size1.min(size2) as f64 / size1.max(size2) as f64;
    let similarity = if ratio >= VIDEO_CLOSE_RATIO {
        0.9 + (ratio - VIDEO_CLOSE_RATIO) * 2.0
    } else {
        ratio * 0.9
    };

    log::debug!(
        "Video similarity between {} and {}: {:.3} (size ratio: {:.3})",
        file1.filename(),
        file2.filename(),
        similarity,
        ratio
    );

    similarity.min(1.0)
}
