pub mod cache;
pub mod config;
pub mod disjoint_set;
pub mod error;
pub mod grouper;
pub mod models;
pub mod parser;
pub mod progress;
pub mod scanner;
pub mod selector;
pub mod similarity;
pub mod suffix;

pub use cache::SimilarityCache;
pub use config::AppConfig;
pub use error::{ConfigError, Error, IncomparableError, ModelError, ScanError};
pub use grouper::{DuplicateGrouper, GroupingSettings};
pub use models::{DuplicateGroup, FileMetadata, ParsedFilename, PatternType, ScanSummary};
pub use parser::FilenameParser;
pub use progress::{ProgressReporter, SilentReporter};
pub use scanner::{MediaScanner, ScanOutput};
pub use selector::{
    AutoSelectionResult, AutoSelector, GroupFilter, ResolutionStatus, SelectionBatch,
    SelectionWeights,
};
pub use similarity::{MediaKind, SimilarityAnalyzer, SimilarityThresholds};
pub use suffix::SuffixDetector;

pub type Result<T> = std::result::Result<T, Error>;
