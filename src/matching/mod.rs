//! Path-based reconciliation of two variant call sets.
//!
//! Base and called variants of a chromosome are replayed against the reference
//! as two diploid sequences each. A [`Path`] pairs one base and one called
//! [`SemiPath`]; every variant either joins its side's haplotypes (in one of
//! its orientations) or is left out. Paths whose emitted bases disagree are
//! dropped, so the surviving path describes which variants on each side yield
//! the same sequence.
//!
//! ## Search
//!
//! 1. Pop the least advanced live path
//! 2. If the next called (then base) variant has been reached, branch on it
//! 3. Otherwise step one base, jump ahead when both sides are level, and keep
//!    the path if its next bases agree
//! 4. When a single path remains, commit its decisions
//!
//! Positions where both sides are level and no variant is open become
//! [`SyncPoint`] boundaries. Each variant is attributed to exactly one sync point.
//!
//! ## Example
//!
//! ```rust
//! use varsync::core::contig::Contig;
//! use varsync::core::types::MatchMode;
//! use varsync::core::variant::{Genotype, Variant};
//! use varsync::matching::engine::{ComparisonEngine, SearchLimits};
//!
//! let contig = Contig::new("chr1", 0, b"ACGT".repeat(50));
//! let snp = Variant::new(0, "chr1", 100, "A", vec!["G".into()], Genotype::parse("0/1").unwrap(), true).unwrap();
//!
//! let engine = ComparisonEngine::new(SearchLimits::default());
//! let result = engine.compare(&contig, &[&snp], &[&snp], MatchMode::Genotype).unwrap();
//! assert_eq!(result.called.included, vec![0]);
//! ```
//!
//! [`Path`]: path::Path
//! [`SemiPath`]: semipath::SemiPath
//! [`SyncPoint`]: sync_point::SyncPoint

pub mod engine;
pub mod haplotype;
pub mod oriented;
pub mod path;
pub mod semipath;
pub mod sync_point;

pub use engine::{ChromosomeComparison, ComparisonEngine, EngineError, SearchLimits};
pub use sync_point::SyncPoint;
