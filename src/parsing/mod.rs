//! Readers for the input files of a comparison run.
//!
//! This module provides parsers for:
//!
//! - **VCF files**: Header metadata and per-sample variant records (`.vcf`, `.vcf.gz`)
//! - **FASTA files**: Reference contigs loaded through noodles (`.fa`, `.fa.gz`)
//! - **BED files**: Regions restricting which variants are assessed
//! - **PED files**: Pedigrees declaring mother, father and child samples
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use varsync::parsing::fasta::load_reference;
//! use varsync::parsing::vcf::{read_vcf, ReadOptions};
//!
//! let reference = load_reference(Path::new("ref.fa")).unwrap();
//! let input = read_vcf(Path::new("calls.vcf.gz"), &ReadOptions::default()).unwrap();
//! println!("{} contigs, {} variants", reference.len(), input.variants.len());
//! ```
//!
//! Compressed inputs are detected by extension (`.gz` or `.bgz`) and read with
//! a multi-member gzip decoder so that bgzip blocks are handled.

pub mod bed;
pub mod fasta;
pub mod ped;
pub mod vcf;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Sample '{0}' not found in VCF header")]
    UnknownSample(String),

    #[error("Too many contigs: {0} exceeds maximum allowed (100000)")]
    TooManyContigs(usize),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a text input, transparently decompressing gzip/bgzip files
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
