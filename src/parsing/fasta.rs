//! Reference loader for FASTA files using noodles.
//!
//! Reads every sequence into memory, upper-cased, in file order. Contig names
//! are the first word of the definition line.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::BufRead;
use std::path::Path;

use noodles::fasta;
use tracing::debug;

use crate::core::contig::Contig;
use crate::core::reference::Reference;
use crate::parsing::{open_text, ParseError};
use crate::utils::validation::check_contig_limit;

/// Check if the path has a FASTA extension
#[must_use]
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Load all sequences of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no sequences are found, or
/// `ParseError::TooManyContigs` if the limit is exceeded.
pub fn load_reference(path: &Path) -> Result<Reference, ParseError> {
    let mut reader = fasta::io::Reader::new(open_text(path)?);
    let reference = read_reference(&mut reader)?;
    debug!(path = %path.display(), contigs = reference.len(), "Loaded reference");
    Ok(reference)
}

/// Read all sequences from a noodles FASTA reader
///
/// # Errors
///
/// See [`load_reference`].
pub fn read_reference<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Reference, ParseError> {
    let mut contigs = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_contig_limit(contigs.len()).is_some() {
            return Err(ParseError::TooManyContigs(contigs.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence: Vec<u8> = record.sequence().as_ref().to_vec();
        contigs.push(Contig::new(name, contigs.len(), sequence));
    }

    if contigs.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(Reference::new(contigs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("ref.fa")));
        assert!(is_fasta_file(Path::new("ref.FASTA")));
        assert!(is_fasta_file(Path::new("ref.fna.bgz")));
        assert!(!is_fasta_file(Path::new("ref.vcf")));
    }

    #[test]
    fn test_read_reference() {
        let data = b">chr1 first contig\nacgtACGT\nNNAA\n>chr2\nGGCC\n";
        let mut reader = fasta::io::Reader::new(&data[..]);
        let reference = read_reference(&mut reader).unwrap();

        assert_eq!(reference.len(), 2);
        let chr1 = reference.get("chr1").unwrap();
        assert_eq!(chr1.sequence, b"ACGTACGTNNAA".to_vec());
        assert_eq!(chr1.index, 0);
        assert_eq!(reference.get("chr2").unwrap().length(), 4);
    }

    #[test]
    fn test_load_reference_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".fa").unwrap();
        writeln!(file, ">chrM\nGATC").unwrap();
        file.flush().unwrap();

        let reference = load_reference(file.path()).unwrap();
        assert_eq!(reference.contigs()[0].name, "chrM");
    }

    #[test]
    fn test_empty_fasta_is_error() {
        let mut reader = fasta::io::Reader::new(&b""[..]);
        assert!(matches!(
            read_reference(&mut reader),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
