//! Comparison parameters and their validation.
//!
//! Defaults mirror long-standing benchmarking practice: a live-path ceiling of
//! 150,000 per region, 10 million search steps per unresolved region, and variants up to
//! 1,000 bp.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::MatchMode;
use crate::utils::validation::ValidationError;

/// Live paths allowed before a region is skipped as too complex
pub const DEFAULT_MAX_PATH_SIZE: usize = 150_000;

/// Search steps allowed within one unresolved region before the chromosome is abandoned
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000_000;

/// Largest allele (bases spanned or inserted) still assessed
pub const DEFAULT_MAX_VARIANT_SIZE: usize = 1000;

/// Included variants one side may accumulate between sync points
pub const DEFAULT_MAX_SINCE_SYNC: usize = 1000;

pub const DEFAULT_THREAD_COUNT: usize = 2;

pub const MAX_THREAD_COUNT: usize = 25;

pub const DEFAULT_FILTER_NAME: &str = "PASS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--snp-only and --indel-only cannot be used together")]
    ConflictingVariantFilters,

    #[error("{name} must be at least 1 (got {value})")]
    InvalidLimit { name: &'static str, value: usize },

    #[error("thread count must be between 1 and 25 (got {0})")]
    InvalidThreadCount(usize),

    #[error("quality threshold must be a finite number (got {0})")]
    InvalidQuality(f32),

    #[error("input file not readable: {path}: {reason}")]
    UnreadableInput { path: PathBuf, reason: String },

    #[error("invalid pedigree: {0}")]
    InvalidPedigree(String),

    #[error("invalid output prefix: {0}")]
    InvalidOutputPrefix(#[from] ValidationError),
}

/// All knobs of a comparison run that affect decisions
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    pub max_path_size: usize,
    pub max_iterations: usize,
    pub max_variant_size: usize,
    pub max_since_sync: usize,
    pub threads: usize,
    pub autosome_only: bool,
    pub snp_only: bool,
    pub indel_only: bool,
    /// Drop records whose FILTER column is not `filter_name`
    pub filter_enabled: bool,
    pub filter_name: String,
    pub min_quality: Option<f32>,
    /// Trim each ALT allele against REF instead of only dropping a shared padding base
    pub ref_overlap: bool,
    /// Mode used by single-pass comparisons
    pub match_mode: MatchMode,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_path_size: DEFAULT_MAX_PATH_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_variant_size: DEFAULT_MAX_VARIANT_SIZE,
            max_since_sync: DEFAULT_MAX_SINCE_SYNC,
            threads: DEFAULT_THREAD_COUNT,
            autosome_only: false,
            snp_only: false,
            indel_only: false,
            filter_enabled: true,
            filter_name: DEFAULT_FILTER_NAME.to_string(),
            min_quality: None,
            ref_overlap: true,
            match_mode: MatchMode::Genotype,
        }
    }
}

impl ComparisonConfig {
    /// Reject option combinations that cannot produce a meaningful run
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snp_only && self.indel_only {
            return Err(ConfigError::ConflictingVariantFilters);
        }
        for (name, value) in [
            ("max path size", self.max_path_size),
            ("max iterations", self.max_iterations),
            ("max variant size", self.max_variant_size),
            ("max since sync", self.max_since_sync),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidLimit { name, value });
            }
        }
        if self.threads == 0 || self.threads > MAX_THREAD_COUNT {
            return Err(ConfigError::InvalidThreadCount(self.threads));
        }
        if let Some(q) = self.min_quality {
            if !q.is_finite() {
                return Err(ConfigError::InvalidQuality(q));
            }
        }
        Ok(())
    }
}

/// Fail early on inputs that cannot be opened
///
/// # Errors
///
/// Returns [`ConfigError::UnreadableInput`] if the path is missing or not a file.
pub fn check_readable(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ConfigError::UnreadableInput {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        }),
        Err(e) => Err(ConfigError::UnreadableInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ComparisonConfig::default().validate().is_ok());
    }

    #[test]
    fn test_conflicting_filters() {
        let config = ComparisonConfig {
            snp_only: true,
            indel_only: true,
            ..ComparisonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingVariantFilters)
        ));
    }

    #[test]
    fn test_limits() {
        let config = ComparisonConfig {
            max_iterations: 0,
            ..ComparisonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit { value: 0, .. })
        ));

        let config = ComparisonConfig {
            threads: MAX_THREAD_COUNT + 1,
            ..ComparisonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreadCount(26))
        ));
    }

    #[test]
    fn test_check_readable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(check_readable(file.path()).is_ok());
        assert!(check_readable(Path::new("/definitely/not/here.vcf")).is_err());
        assert!(check_readable(std::env::temp_dir().as_path()).is_err());
    }
}
