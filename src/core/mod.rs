//! Core data types for variant comparison.
//!
//! - [`Variant`]: a single-sample VCF call with trimmed per-haplotype alleles
//! - [`Contig`] and [`Reference`]: the reference sequences variants are replayed against
//! - [`ComparisonConfig`]: limits and admission filters of a run
//! - [`LabelledVariant`], [`RecordShape`]: per-variant outcomes and output lines
//! - [`Side`], [`MatchMode`], [`MatchStatus`], [`MendelianDecision`]: classification enums
//!
//! ## Coordinates
//!
//! All positions are 0-based. Allele spans are half-open, so a pure insertion
//! has `start == end` and sits between `start - 1` and `start`.
//!
//! [`Variant`]: variant::Variant
//! [`Contig`]: contig::Contig
//! [`Reference`]: reference::Reference
//! [`ComparisonConfig`]: config::ComparisonConfig
//! [`LabelledVariant`]: record::LabelledVariant
//! [`RecordShape`]: record::RecordShape
//! [`Side`]: types::Side
//! [`MatchMode`]: types::MatchMode
//! [`MatchStatus`]: types::MatchStatus
//! [`MendelianDecision`]: types::MendelianDecision

pub mod config;
pub mod contig;
pub mod record;
pub mod reference;
pub mod types;
pub mod variant;
