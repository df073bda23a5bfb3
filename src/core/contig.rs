/// A single reference sequence, uppercased on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    /// Sequence name as it appears in the FASTA header and VCF `CHROM` column
    pub name: String,

    /// Position of this contig in the reference file, used to order output
    pub index: usize,

    /// Uppercase bases
    pub sequence: Vec<u8>,
}

impl Contig {
    pub fn new(name: impl Into<String>, index: usize, sequence: impl Into<Vec<u8>>) -> Self {
        let mut sequence = sequence.into();
        sequence.make_ascii_uppercase();
        Self {
            name: name.into(),
            index,
            sequence,
        }
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.sequence.len() as u64
    }

    /// Check if this contig is an autosome (1-22)
    /// Matches both UCSC (chr1) and NCBI (1) naming conventions exactly
    #[must_use]
    pub fn is_autosome(&self) -> bool {
        is_autosome_name(&self.name)
    }

    /// Check if this is a mitochondrial contig
    #[must_use]
    pub fn is_mitochondrial(&self) -> bool {
        let name_lower = self.name.to_lowercase();
        matches!(name_lower.as_str(), "mt" | "m" | "chrm" | "chrmt")
    }
}

/// Autosome check on a bare chromosome name
#[must_use]
pub fn is_autosome_name(name: &str) -> bool {
    let number = name.strip_prefix("chr").unwrap_or(name);
    matches!(number.parse::<u8>(), Ok(1..=22)) && !number.starts_with('0')
}
