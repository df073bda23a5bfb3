//! # varsync
//!
//! A library for comparing two sets of variant calls made against the same
//! reference genome.
//!
//! The same haplotype can be written in many ways in a VCF: a multi-nucleotide
//! change may be one record or several adjacent SNPs, an insertion in a
//! homopolymer may be placed at any position of the run. Comparing records by
//! position and allele misses these. `varsync` instead replays both call sets
//! onto the reference and searches for the subsets of calls on each side that
//! produce identical haplotype sequences.
//!
//! ## Features
//!
//! - **Path replay**: Reconciles calls by the sequence they produce, not by their text
//! - **Sync points**: Splits each chromosome into independently decided intervals
//! - **Genotype and allele matching**: Separates zygosity errors from allele errors
//! - **Complex region handling**: Skips regions whose search explodes instead of failing
//! - **Trio analysis**: Classifies child calls for Mendelian consistency
//! - **Annotated output**: GA4GH-style `BD`/`BK` VCF annotations and statistics
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use varsync::analysis::duo::compare_duo;
//! use varsync::analysis::provider::admit;
//! use varsync::analysis::reconcile::PassStrategy;
//! use varsync::core::config::ComparisonConfig;
//! use varsync::parsing::fasta::load_reference;
//! use varsync::parsing::vcf::{read_vcf, ReadOptions};
//!
//! let config = ComparisonConfig::default();
//! let reference = load_reference(Path::new("ref.fa")).unwrap();
//! let base = read_vcf(Path::new("truth.vcf.gz"), &ReadOptions::default()).unwrap();
//! let called = read_vcf(Path::new("calls.vcf.gz"), &ReadOptions::default()).unwrap();
//!
//! let report = compare_duo(
//!     &reference,
//!     admit(base.variants, &reference, &config, None),
//!     admit(called.variants, &reference, &config, None),
//!     &config,
//!     PassStrategy::GenotypeThenAllele,
//! );
//! println!("precision: {:?}, recall: {:?}", report.stats.precision, report.stats.recall);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Variants, genotypes, contigs and the comparison configuration
//! - [`matching`]: The path replay engine and sync points
//! - [`analysis`]: Per-chromosome orchestration, duo and trio comparisons, statistics
//! - [`parsing`]: Parsers for VCF, FASTA, BED and PED files
//! - [`output`]: Annotated VCF, sync point and statistics writers
//! - [`cli`]: Command-line interface implementation

pub mod analysis;
pub mod cli;
pub mod core;
pub mod matching;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::config::ComparisonConfig;
pub use core::contig::Contig;
pub use core::reference::Reference;
pub use core::types::*;
pub use core::variant::{Genotype, Variant};
pub use matching::engine::{ChromosomeComparison, ComparisonEngine};
