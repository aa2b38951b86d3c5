use crate::config::AppConfig;
use crate::models::DuplicateGroup;
use crate::progress::{ProgressReporter, SilentReporter};
use crate::similarity::SimilarityAnalyzer;
use crate::suffix::SuffixDetector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// Weights of the auto-selection confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionWeights {
    /// Multiplied by the visual similarity score.
    pub similarity: f64,
    /// Added when the two names have different copy-suffix priorities.
    pub suffix_difference: f64,
    /// Added when they do not.
    pub no_suffix_difference: f64,
    pub identical_size: f64,
    /// Added when sizes differ but their ratio is at least `near_size_ratio`.
    pub near_size: f64,
    pub near_size_ratio: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            suffix_difference: 0.3,
            no_suffix_difference: 0.1,
            identical_size: 0.1,
            near_size: 0.05,
            near_size_ratio: 0.95,
        }
    }
}

/// A keep/delete proposal for one two-file group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoSelectionResult {
    pub group: DuplicateGroup,
    pub files_to_delete: BTreeSet<PathBuf>,
    pub files_to_keep: BTreeSet<PathBuf>,
    pub confidence: f64,
    pub reasoning: String,
    /// Set by whoever accepts the proposal; never by `analyze`.
    pub applied: bool,
}

/// Every group passed to `process_groups`, partitioned by outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionBatch {
    pub auto_selected: Vec<AutoSelectionResult>,
    pub low_confidence: Vec<AutoSelectionResult>,
    pub skipped: Vec<DuplicateGroup>,
}

impl SelectionBatch {
    pub fn files_marked_for_deletion(&self) -> usize {
        self.auto_selected
            .iter()
            .map(|r| r.files_to_delete.len())
            .sum()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.auto_selected.is_empty() {
            parts.push(format!(
                "{} groups auto-selected ({} files marked for deletion)",
                self.auto_selected.len(),
                self.files_marked_for_deletion()
            ));
        }
        if !self.low_confidence.is_empty() {
            parts.push(format!("{} groups with low confidence", self.low_confidence.len()));
        }
        if !self.skipped.is_empty() {
            parts.push(format!(
                "{} groups skipped (not 2 files or not similar)",
                self.skipped.len()
            ));
        }

        if parts.is_empty() {
            return "No groups processed".to_string();
        }
        parts.join(". ") + "."
    }
}

/// Proposes which file of a two-file group to delete.
#[derive(Debug, Clone)]
pub struct AutoSelector {
    analyzer: SimilarityAnalyzer,
    suffix_detector: SuffixDetector,
    weights: SelectionWeights,
    min_confidence: f64,
}

impl AutoSelector {
    pub fn new(analyzer: SimilarityAnalyzer, weights: SelectionWeights, min_confidence: f64) -> Self {
        Self {
            analyzer,
            suffix_detector: SuffixDetector::new(),
            weights,
            min_confidence,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SimilarityAnalyzer::from_config(config),
            config.selection_weights,
            config.auto_selection_confidence_threshold,
        )
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Analyze a group of exactly two files.
    ///
    /// Returns `None` for any other size, when the pair is not visually
    /// similar, or when no original can be picked.
    pub fn analyze(&self, group: &DuplicateGroup) -> Option<AutoSelectionResult> {
        let [file1, file2] = group.files.as_slice() else {
            log::debug!(
                "Skipping group {}: not exactly 2 files ({})",
                group.base_name,
                group.file_count()
            );
            return None;
        };

        if file1.file_path() == file2.file_path() {
            log::warn!("Group {} lists the same file twice", group.base_name);
            return None;
        }

        let Some(similarity) = self.analyzer.confirmed_similarity(file1, file2) else {
            log::debug!("Files not visually similar in group {}", group.base_name);
            return None;
        };

        let Some(original) = self.suffix_detector.identify_original(&group.files) else {
            log::debug!("Could not identify original file in group {}", group.base_name);
            return None;
        };
        let copy = if original.file_path() == file1.file_path() {
            file2
        } else {
            file1
        };

        let mut reasons = vec![format!("Visual similarity: {:.1}%", similarity * 100.0)];
        let mut confidence = similarity * self.weights.similarity;

        let priority1 = self.suffix_detector.priority(file1.filename());
        let priority2 = self.suffix_detector.priority(file2.filename());
        if priority1 != priority2 {
            reasons.push("Numeric suffix detected".to_string());
            confidence += self.weights.suffix_difference;
        } else {
            reasons.push("No clear suffix pattern".to_string());
            confidence += self.weights.no_suffix_difference;
        }

        let (size1, size2) = (file1.size_bytes(), file2.size_bytes());
        if size1 == size2 {
            reasons.push("Identical file sizes".to_string());
            confidence += self.weights.identical_size;
        } else {
            let ratio = size1.min(size2) as f64 / size1.max(size2) as f64;
            if ratio >= self.weights.near_size_ratio {
                reasons.push("Very similar file sizes".to_string());
                confidence += self.weights.near_size;
            }
        }

        let confidence = confidence.clamp(0.0, 1.0);
        let reasoning = format!(
            "Keep '{}', delete '{}'. Reasons: {}",
            original.filename(),
            copy.filename(),
            reasons.join(", ")
        );

        log::debug!(
            "Auto-selection for group {}: confidence={:.2}, reason='{}'",
            group.base_name,
            confidence,
            reasoning
        );

        Some(AutoSelectionResult {
            group: group.clone(),
            files_to_delete: BTreeSet::from([copy.file_path().to_path_buf()]),
            files_to_keep: BTreeSet::from([original.file_path().to_path_buf()]),
            confidence,
            reasoning,
            applied: false,
        })
    }

    /// Whether a proposal is confident enough to act on without review.
    pub fn can_auto_select(&self, result: &AutoSelectionResult) -> bool {
        result.confidence >= self.min_confidence
    }

    pub fn process_groups(&self, groups: &[DuplicateGroup], apply: bool) -> SelectionBatch {
        self.process_groups_with_progress(groups, apply, &SilentReporter)
    }

    /// Partition `groups` into auto-selected, low-confidence and skipped.
    ///
    /// With `apply`, auto-selected results come back with `applied` set.
    pub fn process_groups_with_progress(
        &self,
        groups: &[DuplicateGroup],
        apply: bool,
        reporter: &dyn ProgressReporter,
    ) -> SelectionBatch {
        let mut batch = SelectionBatch::default();
        let total = groups.len();

        for (i, group) in groups.iter().enumerate() {
            reporter.report(
                i + 1,
                Some(total),
                &format!("Auto-selecting in '{}'", group.base_name),
            );

            match self.analyze(group) {
                None => batch.skipped.push(group.clone()),
                Some(mut result) if self.can_auto_select(&result) => {
                    result.applied = apply;
                    batch.auto_selected.push(result);
                }
                Some(result) => batch.low_confidence.push(result),
            }
        }

        log::info!(
            "Auto-selection results: {} auto-selected, {} low confidence, {} skipped",
            batch.auto_selected.len(),
            batch.low_confidence.len(),
            batch.skipped.len()
        );
        batch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    Resolved,
    Unresolved,
    All,
}

/// Read-side queries over groups and the proposals applied to them.
pub struct GroupFilter;

impl GroupFilter {
    /// Groups matching `status`. A group is resolved when some applied result
    /// refers to the same naming key and the same member files.
    pub fn filter_by_status<'a>(
        groups: &'a [DuplicateGroup],
        results: &[AutoSelectionResult],
        status: ResolutionStatus,
    ) -> Vec<&'a DuplicateGroup> {
        let resolved: HashSet<_> = results
            .iter()
            .filter(|r| r.applied)
            .map(|r| r.group.identity())
            .collect();

        groups
            .iter()
            .filter(|g| match status {
                ResolutionStatus::All => true,
                ResolutionStatus::Resolved => resolved.contains(&g.identity()),
                ResolutionStatus::Unresolved => !resolved.contains(&g.identity()),
            })
            .collect()
    }

    pub fn unresolved_count(groups: &[DuplicateGroup], results: &[AutoSelectionResult]) -> usize {
        Self::filter_by_status(groups, results, ResolutionStatus::Unresolved).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileMetadata, PatternType};
    use crate::similarity::tests::{meta, write_gradient};
    use std::path::Path;
    use tempfile::TempDir;

    fn pair_group(dir: &Path, names: [&str; 2], mirrored: bool, sizes: [u64; 2]) -> DuplicateGroup {
        let a = dir.join(names[0]);
        let b = dir.join(names[1]);
        write_gradient(&a, false);
        write_gradient(&b, mirrored);
        DuplicateGroup::new(
            "pair",
            PatternType::Generic,
            vec![meta(&a, sizes[0]), meta(&b, sizes[1])],
            0.7,
        )
        .unwrap()
    }

    #[test]
    fn test_copy_suffix_pair_selected() {
        let temp_dir = TempDir::new().unwrap();
        let group = pair_group(
            temp_dir.path(),
            ["vacation_photo.png", "vacation_photo_copy.png"],
            false,
            [2048, 2048],
        );

        let selector = AutoSelector::from_config(&AppConfig::default());
        let result = selector.analyze(&group).unwrap();

        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert_eq!(
            result.files_to_delete,
            BTreeSet::from([temp_dir.path().join("vacation_photo_copy.png")])
        );
        assert_eq!(
            result.files_to_keep,
            BTreeSet::from([temp_dir.path().join("vacation_photo.png")])
        );
        assert!(result.reasoning.starts_with("Keep 'vacation_photo.png', delete 'vacation_photo_copy.png'"));
        assert!(result.reasoning.contains("Visual similarity: 100.0%"));
        assert!(result.reasoning.contains("Numeric suffix detected"));
        assert!(result.reasoning.contains("Identical file sizes"));
        assert!(!result.applied);
        assert!(selector.can_auto_select(&result));
    }

    #[test]
    fn test_original_may_come_second() {
        let temp_dir = TempDir::new().unwrap();
        let group = pair_group(temp_dir.path(), ["pic (2).png", "pic.png"], false, [10, 10]);
        let result = AutoSelector::from_config(&AppConfig::default())
            .analyze(&group)
            .unwrap();
        assert!(result.files_to_keep.contains(&temp_dir.path().join("pic.png")));
        assert!(result.files_to_delete.contains(&temp_dir.path().join("pic (2).png")));
    }

    #[test]
    fn test_no_suffix_difference_lowers_confidence() {
        let temp_dir = TempDir::new().unwrap();
        let group = pair_group(temp_dir.path(), ["left.png", "right.png"], false, [1000, 960]);
        let selector = AutoSelector::from_config(&AppConfig::default());
        let result = selector.analyze(&group).unwrap();

        // 1.0 * 0.6 + 0.1 + 0.05
        assert!((result.confidence - 0.75).abs() < 1e-9);
        assert!(result.reasoning.contains("No clear suffix pattern"));
        assert!(result.reasoning.contains("Very similar file sizes"));
        assert!(!selector.can_auto_select(&result));
        // tie goes to the first listed file
        assert!(result.files_to_keep.contains(&temp_dir.path().join("left.png")));
    }

    #[test]
    fn test_dissimilar_pair_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let group = pair_group(temp_dir.path(), ["a.png", "a_1.png"], true, [10, 10]);
        assert!(AutoSelector::from_config(&AppConfig::default()).analyze(&group).is_none());
    }

    #[test]
    fn test_only_pairs_are_eligible() {
        let temp_dir = TempDir::new().unwrap();
        let paths: Vec<_> = ["x.png", "x_1.png", "x_2.png"]
            .iter()
            .map(|n| temp_dir.path().join(n))
            .collect();
        for p in &paths {
            write_gradient(p, false);
        }
        let files: Vec<FileMetadata> = paths.iter().map(|p| meta(p, 10)).collect();
        let selector = AutoSelector::from_config(&AppConfig::default());

        let three = DuplicateGroup::new("x", PatternType::Generic, files.clone(), 0.7).unwrap();
        assert!(selector.analyze(&three).is_none());

        let one = DuplicateGroup {
            base_name: "x".to_string(),
            pattern_type: PatternType::Generic,
            files: files[..1].to_vec(),
            confidence_score: 0.7,
        };
        assert!(selector.analyze(&one).is_none());
    }

    #[test]
    fn test_custom_weights() {
        let temp_dir = TempDir::new().unwrap();
        let group = pair_group(temp_dir.path(), ["w.png", "w_1.png"], false, [10, 10]);
        let weights = SelectionWeights {
            similarity: 0.5,
            suffix_difference: 0.2,
            identical_size: 0.0,
            ..SelectionWeights::default()
        };
        let selector = AutoSelector::new(SimilarityAnalyzer::default(), weights, 0.8);
        let result = selector.analyze(&group).unwrap();
        assert!((result.confidence - 0.7).abs() < 1e-9);
        assert!(!selector.can_auto_select(&result));
    }

    #[test]
    fn test_process_groups_partitions() {
        let temp_dir = TempDir::new().unwrap();
        let good = pair_group(temp_dir.path(), ["g.png", "g_1.png"], false, [10, 10]);
        let weak = pair_group(temp_dir.path(), ["h.png", "k.png"], false, [10, 5]);
        let bad = pair_group(temp_dir.path(), ["m.png", "m_1.png"], true, [10, 10]);

        let selector = AutoSelector::from_config(&AppConfig::default());
        let batch = selector.process_groups(&[good, weak, bad], true);

        assert_eq!(batch.auto_selected.len(), 1);
        assert!(batch.auto_selected[0].applied);
        assert_eq!(batch.low_confidence.len(), 1);
        assert!(!batch.low_confidence[0].applied);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(
            batch.summary(),
            "1 groups auto-selected (1 files marked for deletion). \
             1 groups with low confidence. \
             1 groups skipped (not 2 files or not similar)."
        );
    }

    #[test]
    fn test_process_without_apply() {
        let temp_dir = TempDir::new().unwrap();
        let good = pair_group(temp_dir.path(), ["g.png", "g_1.png"], false, [10, 10]);
        let batch = AutoSelector::from_config(&AppConfig::default()).process_groups(&[good], false);
        assert_eq!(batch.auto_selected.len(), 1);
        assert!(!batch.auto_selected[0].applied);
    }

    #[test]
    fn test_empty_batch_summary() {
        assert_eq!(SelectionBatch::default().summary(), "No groups processed");
    }

    #[test]
    fn test_group_filter() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = pair_group(temp_dir.path(), ["g.png", "g_1.png"], false, [10, 10]);
        first.base_name = "g".to_string();
        let mut second = pair_group(temp_dir.path(), ["n.png", "n_1.png"], false, [10, 10]);
        second.base_name = "n".to_string();
        let groups = vec![first, second];

        let selector = AutoSelector::from_config(&AppConfig::default());
        let mut results: Vec<AutoSelectionResult> =
            groups.iter().filter_map(|g| selector.analyze(g)).collect();
        assert_eq!(results.len(), 2);
        results[0].applied = true;

        let resolved = GroupFilter::filter_by_status(&groups, &results, ResolutionStatus::Resolved);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].base_name, "g");

        let unresolved =
            GroupFilter::filter_by_status(&groups, &results, ResolutionStatus::Unresolved);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].base_name, "n");

        assert_eq!(
            GroupFilter::filter_by_status(&groups, &results, ResolutionStatus::All).len(),
            2
        );
        assert_eq!(GroupFilter::unresolved_count(&groups, &results), 1);
    }

    #[test]
    fn test_group_filter_tells_apart_groups_sharing_a_name() {
        let temp_dir = TempDir::new().unwrap();
        let small = pair_group(temp_dir.path(), ["s.png", "s_1.png"], false, [10, 10]);
        let large = pair_group(temp_dir.path(), ["t.png", "t_1.png"], false, [20, 20]);
        assert_eq!(small.key(), large.key());
        let groups = vec![small, large];

        let selector = AutoSelector::from_config(&AppConfig::default());
        let mut applied = selector.analyze(&groups[1]).unwrap();
        applied.applied = true;

        let resolved =
            GroupFilter::filter_by_status(&groups, &[applied.clone()], ResolutionStatus::Resolved);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].files[0].filename(), "t.png");
        assert_eq!(GroupFilter::unresolved_count(&groups, &[applied]), 1);
    }
}
