//! Writers for comparison results.
//!
//! Every file lands next to a user-chosen prefix:
//!
//! | File | Written by |
//! |------|------------|
//! | `<prefix>.vcf` | duo comparison, `ga4gh` mode |
//! | `<prefix>_TP_base.vcf`, `_TP_called.vcf`, `_FN.vcf`, `_FP.vcf` | duo comparison, `split` mode |
//! | `<prefix>_trio.vcf` | trio comparison |
//! | `<prefix>_syncpoints.json` | duo comparison with `--sync-points` |
//! | `<prefix>_stats.json` | both comparisons |

use thiserror::Error;

pub mod stats;
pub mod sync_dump;
pub mod vcf_writer;

/// Layout of the annotated VCF output of a duo comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// One merged VCF with TRUTH and QUERY samples, genotype pass then allele pass
    #[default]
    Ga4gh,
    /// One VCF per decision class, single pass in the configured match mode
    Split,
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
