use crate::cache::SimilarityCache;
use crate::config::AppConfig;
use crate::disjoint_set::DisjointSet;
use crate::models::{DuplicateGroup, FileMetadata, PatternType};
use crate::progress::{ProgressReporter, SilentReporter};
use crate::similarity::SimilarityAnalyzer;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const HOUR_SECS: f64 = 3_600.0;
const DAY_SECS: f64 = 86_400.0;
const WEEK_SECS: f64 = 604_800.0;

/// Extensions of a live-photo pair: a still and its motion clip are not copies.
const LIVE_PHOTO_EXTENSIONS: [&str; 2] = [".heic", ".mov"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingSettings {
    pub enable_visual_filtering: bool,
    pub max_visual_group_size: usize,
    pub similarity_cache_capacity: usize,
    pub exact_confidence_threshold: f64,
    pub exact_confidence_boost: f64,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for GroupingSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            enable_visual_filtering: config.enable_visual_filtering,
            max_visual_group_size: config.max_visual_group_size,
            similarity_cache_capacity: config.similarity_cache_capacity,
            exact_confidence_threshold: config.exact_confidence_threshold,
            exact_confidence_boost: config.exact_confidence_boost,
        }
    }
}

/// A bucket of files sharing `(pattern_type, base_name)`, before scoring.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub pattern_type: PatternType,
    pub base_name: String,
    pub files: Vec<FileMetadata>,
}

/// Partitions files into duplicate candidate groups.
///
/// Visual filtering runs only when it is enabled in the settings and an
/// analyzer was supplied. Pairwise verdicts are memoised in the grouper's
/// cache for the lifetime of the instance.
pub struct DuplicateGrouper {
    settings: GroupingSettings,
    analyzer: Option<SimilarityAnalyzer>,
    cache: SimilarityCache,
}

impl DuplicateGrouper {
    /// Name-based grouping only.
    pub fn new(settings: GroupingSettings) -> Self {
        Self {
            settings,
            analyzer: None,
            cache: SimilarityCache::with_capacity(settings.similarity_cache_capacity),
        }
    }

    pub fn with_visual_filter(
        settings: GroupingSettings,
        analyzer: SimilarityAnalyzer,
        cache: SimilarityCache,
    ) -> Self {
        Self {
            settings,
            analyzer: Some(analyzer),
            cache,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let settings = GroupingSettings::from(config);
        Self::with_visual_filter(
            settings,
            SimilarityAnalyzer::from_config(config),
            SimilarityCache::with_capacity(settings.similarity_cache_capacity),
        )
    }

    pub fn settings(&self) -> &GroupingSettings {
        &self.settings
    }

    pub fn cache(&self) -> &SimilarityCache {
        &self.cache
    }

    fn visual_analyzer(&self) -> Option<&SimilarityAnalyzer> {
        if self.settings.enable_visual_filtering {
            self.analyzer.as_ref()
        } else {
            None
        }
    }

    /// Bucket files by `(pattern_type, base_name)` in first-seen order.
    /// Files without a parsed filename are skipped.
    pub fn group_by_base_name(&self, files: &[FileMetadata]) -> Vec<Bucket> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<Bucket> = Vec::new();

        for file in files {
            let Some(parsed) = file.parsed_filename() else {
                log::debug!("Skipping unparsed file: {}", file.filename());
                continue;
            };

            let slot = *index.entry(parsed.group_key()).or_insert_with(|| {
                buckets.push(Bucket {
                    pattern_type: parsed.pattern_type(),
                    base_name: parsed.base_name().to_string(),
                    files: Vec::new(),
                });
                buckets.len() - 1
            });
            buckets[slot].files.push(file.clone());
        }

        log::info!(
            "Grouped {} files into {} base name groups",
            files.len(),
            buckets.len()
        );
        buckets
    }

    pub fn group(&mut self, files: &[FileMetadata]) -> Vec<DuplicateGroup> {
        self.group_with_progress(files, &SilentReporter)
    }

    /// Full pipeline: bucket, drop live-photo pairs, score, optionally filter
    /// visually, then sort by confidence and size.
    pub fn group_with_progress(
        &mut self,
        files: &[FileMetadata],
        reporter: &dyn ProgressReporter,
    ) -> Vec<DuplicateGroup> {
        let candidates: Vec<DuplicateGroup> = self
            .group_by_base_name(files)
            .into_iter()
            .filter(|bucket| bucket.files.len() >= 2)
            .filter(|bucket| {
                let live = is_live_photo_pair(&bucket.files);
                if live {
                    log::debug!("Skipping live photo pair: {}", bucket.base_name);
                }
                !live
            })
            .filter_map(|bucket| {
                let confidence = calculate_group_confidence(&bucket.files);
                DuplicateGroup::new(bucket.base_name, bucket.pattern_type, bucket.files, confidence)
                    .ok()
            })
            .collect();

        let total = candidates.len();
        let mut groups = Vec::with_capacity(total);
        for (i, group) in candidates.into_iter().enumerate() {
            reporter.report(
                i + 1,
                Some(total),
                &format!("Analyzing group '{}'", group.base_name),
            );
            if let Some(group) = self.refine_visually(group) {
                log::debug!(
                    "Created duplicate group: {} ({} files, confidence: {:.2})",
                    group.base_name,
                    group.file_count(),
                    group.confidence_score
                );
                groups.push(group);
            }
        }

        sort_groups(&mut groups);
        log::info!("Created {} duplicate groups", groups.len());
        groups
    }

    /// Keep only the largest visually-connected subset of a group.
    fn refine_visually(&mut self, group: DuplicateGroup) -> Option<DuplicateGroup> {
        let Some(analyzer) = self.visual_analyzer().cloned() else {
            return Some(group);
        };

        if group.file_count() > self.settings.max_visual_group_size {
            log::debug!(
                "Group '{}' has {} files, skipping visual filtering",
                group.base_name,
                group.file_count()
            );
            return Some(group);
        }

        let files = &group.files;
        if files.len() == 2 {
            return if self.pair_similar(&analyzer, &files[0], &files[1]) {
                Some(group)
            } else {
                log::debug!("Dropping group '{}': pair not visually similar", group.base_name);
                None
            };
        }

        let mut components = DisjointSet::new(files.len());
        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                if self.pair_similar(&analyzer, &files[i], &files[j]) {
                    components.union(i, j);
                }
            }
        }

        let keep = components.largest_component();
        if keep.len() < 2 {
            log::debug!("Dropping group '{}': no visually similar pair", group.base_name);
            return None;
        }
        if keep.len() == files.len() {
            return Some(group);
        }

        log::debug!(
            "Group '{}' reduced from {} to {} visually similar files",
            group.base_name,
            files.len(),
            keep.len()
        );
        let kept: Vec<FileMetadata> = keep.into_iter().map(|i| files[i].clone()).collect();
        let confidence = calculate_group_confidence(&kept);
        DuplicateGroup::new(group.base_name, group.pattern_type, kept, confidence).ok()
    }

    fn pair_similar(
        &mut self,
        analyzer: &SimilarityAnalyzer,
        a: &FileMetadata,
        b: &FileMetadata,
    ) -> bool {
        self.cache
            .get_or_insert_with(a.file_path(), b.file_path(), || {
                analyzer.are_visually_similar(a, b)
            })
    }

    /// Same-size files only, re-grouped by name; groups clearing the exact
    /// threshold get a confidence boost.
    pub fn find_exact_duplicates(
        &mut self,
        files: &[FileMetadata],
        reporter: &dyn ProgressReporter,
    ) -> Vec<DuplicateGroup> {
        let mut by_size: BTreeMap<u64, Vec<FileMetadata>> = BTreeMap::new();
        for file in files {
            by_size.entry(file.size_bytes()).or_default().push(file.clone());
        }

        let mut exact = Vec::new();
        for same_size in by_size.into_values().filter(|v| v.len() >= 2) {
            for mut group in self.group_with_progress(&same_size, reporter) {
                if group.confidence_score >= self.settings.exact_confidence_threshold {
                    group.confidence_score =
                        (group.confidence_score + self.settings.exact_confidence_boost).min(1.0);
                    exact.push(group);
                }
            }
        }

        sort_groups(&mut exact);
        log::info!("Found {} exact duplicate groups", exact.len());
        exact
    }
}

/// `0.7 * pattern + 0.2 * size bonus + 0.1 * time bonus`, capped at 1.0.
///
/// Returns 0.0 for an empty list or when no file carries a parse result.
pub fn calculate_group_confidence(files: &[FileMetadata]) -> f64 {
    let base_confidence = files
        .iter()
        .filter_map(|f| f.parsed_filename())
        .map(|p| p.pattern_type().confidence())
        .reduce(f64::max);

    let Some(base_confidence) = base_confidence else {
        return 0.0;
    };

    let confidence = base_confidence * 0.7
        + size_similarity_bonus(files) * 0.2
        + time_proximity_bonus(files) * 0.1;

    confidence.clamp(0.0, 1.0)
}

/// `(min / max) * 0.3`; 0 when any file is empty or there is only one file.
pub fn size_similarity_bonus(files: &[FileMetadata]) -> f64 {
    if files.len() < 2 {
        return 0.0;
    }

    let sizes = files.iter().map(FileMetadata::size_bytes);
    let min_size = sizes.clone().min().unwrap_or(0);
    let max_size = sizes.max().unwrap_or(0);
    if min_size == 0 {
        return 0.0;
    }

    (min_size as f64 / max_size as f64) * 0.3
}

/// 0.2 within an hour, 0.1 within a day, 0.05 within a week, else 0.
pub fn time_proximity_bonus(files: &[FileMetadata]) -> f64 {
    if files.len() < 2 {
        return 0.0;
    }

    let (Some(earliest), Some(latest)) = (
        files.iter().map(FileMetadata::created_at).min(),
        files.iter().map(FileMetadata::created_at).max(),
    ) else {
        return 0.0;
    };
    let span = (latest - earliest).num_milliseconds() as f64 / 1000.0;

    if span <= HOUR_SECS {
        0.2
    } else if span <= DAY_SECS {
        0.1
    } else if span <= WEEK_SECS {
        0.05
    } else {
        0.0
    }
}

fn is_live_photo_pair(files: &[FileMetadata]) -> bool {
    if files.len() != 2 {
        return false;
    }
    let extensions: BTreeSet<String> = files.iter().map(FileMetadata::extension).collect();
    let live: BTreeSet<String> = LIVE_PHOTO_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    extensions == live
}

/// Highest confidence first, larger groups breaking ties; stable otherwise.
fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.file_count().cmp(&a.file_count()))
    });
}
