//! Centralized validation and helper functions.

use std::path::{Path, PathBuf};

/// Maximum number of contigs allowed in a single file (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Check that a REF allele only holds nucleotide or IUPAC ambiguity letters.
///
/// # Examples
///
/// ```
/// use varsync::utils::validation::is_valid_bases;
///
/// assert!(is_valid_bases("ACGTN"));
/// assert!(is_valid_bases("acgtr"));
/// assert!(!is_valid_bases(""));
/// assert!(!is_valid_bases("<DEL>"));
/// ```
#[must_use]
pub fn is_valid_bases(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            matches!(
                b.to_ascii_uppercase(),
                b'A' | b'C' | b'G' | b'T' | b'N' | b'R' | b'Y' | b'S' | b'W' | b'K' | b'M'
                    | b'B' | b'D' | b'H' | b'V'
            )
        })
}

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Output prefix validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty output prefix provided")]
    EmptyPrefix,
    #[error("Output directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("Output prefix names a directory: {0}")]
    PrefixIsDirectory(PathBuf),
}

/// Check that files named `<prefix>...` can be created.
///
/// The prefix itself may not be an existing directory and its parent must exist.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first problem found.
pub fn validate_output_prefix(prefix: &Path) -> Result<(), ValidationError> {
    if prefix.as_os_str().is_empty() {
        return Err(ValidationError::EmptyPrefix);
    }
    if prefix.is_dir() {
        return Err(ValidationError::PrefixIsDirectory(prefix.to_path_buf()));
    }
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ValidationError::MissingDirectory(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}

/// Path of an output file derived from the prefix, e.g. `out` + `_FN.vcf`
#[must_use]
pub fn output_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contig_limit() {
        assert!(check_contig_limit(0).is_none());
        assert!(check_contig_limit(MAX_CONTIGS - 1).is_none());
        assert!(check_contig_limit(MAX_CONTIGS).is_some());
    }

    #[test]
    fn test_validate_output_prefix() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_output_prefix(&dir.path().join("run1")).is_ok());
        assert_eq!(
            validate_output_prefix(dir.path()),
            Err(ValidationError::PrefixIsDirectory(dir.path().to_path_buf()))
        );
        assert!(matches!(
            validate_output_prefix(&dir.path().join("missing/run1")),
            Err(ValidationError::MissingDirectory(_))
        ));
        assert_eq!(
            validate_output_prefix(Path::new("")),
            Err(ValidationError::EmptyPrefix)
        );
        assert!(validate_output_prefix(Path::new("run1")).is_ok());
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out/run"), "_FN.vcf"),
            PathBuf::from("out/run_FN.vcf")
        );
    }
}
