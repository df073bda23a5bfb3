//! Command-line interface for varsync.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **compare**: Compare a call set against a truth set (duo)
//! - **trio**: Check a child's calls for Mendelian consistency with both parents
//!
//! ## Usage
//!
//! ```text
//! # Benchmark calls against a truth set, merged TRUTH/QUERY VCF
//! varsync compare truth.vcf.gz calls.vcf.gz -r ref.fa -o out/run
//!
//! # One VCF per decision class, allele matching only
//! varsync compare truth.vcf calls.vcf -r ref.fa -o out/run --mode split --match-mode allele
//!
//! # Statistics as JSON for scripting
//! varsync compare truth.vcf calls.vcf -r ref.fa -o out/run --format json
//!
//! # Trio with a pedigree check
//! varsync trio mother.vcf father.vcf child.vcf -r ref.fa -o out/trio --ped family.ped
//! ```
//!
//! Exit status is 0 on success, 2 when the options are rejected, and 3 when
//! the run finished but at least one chromosome could not be compared.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::{
    ComparisonConfig, DEFAULT_FILTER_NAME, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_PATH_SIZE,
    DEFAULT_MAX_SINCE_SYNC, DEFAULT_MAX_VARIANT_SIZE, DEFAULT_THREAD_COUNT,
};
use crate::core::types::MatchMode;

pub mod compare;
pub mod trio;

#[derive(Parser)]
#[command(name = "varsync")]
#[command(version)]
#[command(about = "Compare variant call sets by replaying them against the reference")]
#[command(
    long_about = "varsync decides which variants of two call sets describe the same haplotype sequences.\n\nVariants are replayed onto the reference and reconciled between sync points, so calls written differently (split MNPs, shifted indels) still match. It provides:\n- Annotated VCF output with GA4GH-style decisions\n- Precision, recall and per-chromosome statistics\n- Mendelian consistency checks for trios"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for statistics
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a called VCF against a base (truth) VCF
    Compare(compare::CompareArgs),

    /// Compare mother, father and child VCFs
    Trio(trio::TrioArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    /// At least one chromosome was abandoned
    Incomplete,
}

impl RunStatus {
    #[must_use]
    pub fn from_complete(complete: bool) -> Self {
        if complete {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }
}

/// Options shared by every comparison command
#[derive(clap::Args, Debug, Clone)]
pub struct EngineArgs {
    /// Worker threads (one chromosome per job)
    #[arg(short, long, default_value_t = DEFAULT_THREAD_COUNT)]
    pub threads: usize,

    /// Live paths allowed before a region is skipped as too complex
    #[arg(long, default_value_t = DEFAULT_MAX_PATH_SIZE)]
    pub max_path_size: usize,

    /// Search steps allowed in one unresolved region before the chromosome is abandoned
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Largest variant (bp) still assessed
    #[arg(long, default_value_t = DEFAULT_MAX_VARIANT_SIZE)]
    pub max_variant_size: usize,

    /// Included variants one side may accumulate without a sync point
    #[arg(long, default_value_t = DEFAULT_MAX_SINCE_SYNC)]
    pub max_since_sync: usize,

    /// Only compare chromosomes 1-22
    #[arg(long)]
    pub autosome_only: bool,

    /// Only assess SNPs
    #[arg(long)]
    pub snp_only: bool,

    /// Only assess indels
    #[arg(long)]
    pub indel_only: bool,

    /// Assess records regardless of their FILTER column
    #[arg(long)]
    pub no_filter: bool,

    /// FILTER value treated as passing
    #[arg(long, default_value = DEFAULT_FILTER_NAME)]
    pub filter_name: String,

    /// Skip records with a lower (or missing) QUAL
    #[arg(long)]
    pub min_quality: Option<f32>,

    /// Only strip a shared padding base instead of trimming ALT alleles against REF
    #[arg(long)]
    pub no_ref_overlap: bool,

    /// Restrict the comparison to regions of a BED file
    #[arg(long)]
    pub bed: Option<PathBuf>,
}

impl EngineArgs {
    #[must_use]
    pub fn config(&self, match_mode: MatchMode) -> ComparisonConfig {
        ComparisonConfig {
            max_path_size: self.max_path_size,
            max_iterations: self.max_iterations,
            max_variant_size: self.max_variant_size,
            max_since_sync: self.max_since_sync,
            threads: self.threads,
            autosome_only: self.autosome_only,
            snp_only: self.snp_only,
            indel_only: self.indel_only,
            filter_enabled: !self.no_filter,
            filter_name: self.filter_name.clone(),
            min_quality: self.min_quality,
            ref_overlap: !self.no_ref_overlap,
            match_mode,
        }
    }
}
