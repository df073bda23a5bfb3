//! Variant records as seen by the comparison engine.
//!
//! A [`Variant`] keeps the original VCF representation (position, REF, ALT list,
//! genotype) for output, and one trimmed [`Allele`] per genotype entry for replay.
//! Trimming removes bases an ALT allele shares with REF, first from the left and
//! then from the right, so `A -> ATT` at position 99 becomes an insertion of `TT`
//! with `start == end == 100`.

use thiserror::Error;

use crate::core::types::{VariantCategory, VariantType};

/// Upper bound (exclusive) on the length of a "small" indel
pub const SMALL_VARIANT_SIZE: usize = 5;

/// Upper bound (exclusive) on the length of a "medium" indel
pub const MEDIUM_VARIANT_SIZE: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantError {
    #[error("reference allele is empty")]
    EmptyReference,

    #[error("genotype has no alleles")]
    EmptyGenotype,

    #[error("invalid genotype: {0}")]
    InvalidGenotype(String),

    #[error("genotype allele index {index} out of range for {count} alleles")]
    AlleleIndexOutOfRange { index: usize, count: usize },
}

/// Called genotype: one optional allele index per haplotype (`None` is a no-call)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Genotype {
    pub alleles: Vec<Option<usize>>,
    pub phased: bool,
}

impl Genotype {
    /// Parse a VCF `GT` value such as `0/1`, `1|0`, `./.` or `1`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty or an allele is not an integer or `.`.
    pub fn parse(text: &str) -> Result<Self, VariantError> {
        if text.is_empty() {
            return Err(VariantError::EmptyGenotype);
        }
        let alleles = text
            .split(['/', '|'])
            .map(|token| match token {
                "." => Ok(None),
                _ => token
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|_| VariantError::InvalidGenotype(text.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            alleles,
            phased: text.contains('|'),
        })
    }

    #[must_use]
    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    #[must_use]
    pub fn is_no_call(&self) -> bool {
        self.alleles.iter().any(Option::is_none)
    }

    #[must_use]
    pub fn is_hom_ref(&self) -> bool {
        self.alleles.iter().all(|a| *a == Some(0))
    }

    /// Allele indices with no-calls read as reference
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.alleles.iter().map(|a| a.unwrap_or(0))
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let separator = if self.phased { "|" } else { "/" };
        let text = self
            .alleles
            .iter()
            .map(|a| a.map_or_else(|| ".".to_string(), |i| i.to_string()))
            .collect::<Vec<_>>()
            .join(separator);
        write!(f, "{text}")
    }
}

/// One haplotype's allele after trimming, in 0-based half-open reference coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allele {
    pub start: u64,
    pub end: u64,
    pub sequence: Vec<u8>,
    /// Reference or no-call allele; contributes nothing to a haplotype
    pub ignored: bool,
}

impl Allele {
    fn reference(position: u64, ref_seq: &[u8]) -> Self {
        Self {
            start: position,
            end: position + ref_seq.len() as u64,
            sequence: ref_seq.to_vec(),
            ignored: true,
        }
    }

    /// Insertion-free allele that changes nothing (REF == ALT after trimming)
    #[must_use]
    pub fn is_empty_edit(&self) -> bool {
        self.start == self.end && self.sequence.is_empty()
    }
}

/// A single-sample variant call
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Ordinal of the record in its input file
    pub id: usize,
    pub chrom: String,
    /// 0-based position of the VCF `POS` column
    pub position: u64,
    /// VCF `ID` column
    pub record_id: String,
    /// REF followed by the ALT alleles, uppercased
    pub alleles: Vec<String>,
    pub genotype: Genotype,
    /// Trimmed allele for each genotype entry, in genotype order
    pub haplotypes: Vec<Allele>,
    /// Leftmost start of any non-reference allele
    pub start: u64,
    /// Rightmost end of any non-reference allele
    pub end: u64,
    pub quality: Option<f32>,
    pub filters: Vec<String>,
}

impl Variant {
    /// Build a variant from its VCF columns.
    ///
    /// With `trim_ref_overlap` each ALT allele is trimmed against REF independently;
    /// otherwise only a leading base shared by every called allele is removed.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty REF or genotype, or a genotype index with no allele.
    pub fn new(
        id: usize,
        chrom: impl Into<String>,
        position: u64,
        ref_seq: &str,
        alts: Vec<String>,
        genotype: Genotype,
        trim_ref_overlap: bool,
    ) -> Result<Self, VariantError> {
        if ref_seq.is_empty() {
            return Err(VariantError::EmptyReference);
        }
        if genotype.alleles.is_empty() {
            return Err(VariantError::EmptyGenotype);
        }

        let mut alleles = Vec::with_capacity(alts.len() + 1);
        alleles.push(ref_seq.to_ascii_uppercase());
        alleles.extend(alts.iter().map(|a| a.to_ascii_uppercase()));

        for index in genotype.alleles.iter().flatten() {
            if *index >= alleles.len() {
                return Err(VariantError::AlleleIndexOutOfRange {
                    index: *index,
                    count: alleles.len(),
                });
            }
        }

        let haplotypes = build_haplotypes(position, &alleles, &genotype, trim_ref_overlap);
        let ref_len = alleles[0].len() as u64;
        let called = haplotypes.iter().filter(|a| !a.ignored);
        let start = called.clone().map(|a| a.start).min().unwrap_or(position);
        let end = called.map(|a| a.end).max().unwrap_or(position + ref_len);

        Ok(Self {
            id,
            chrom: chrom.into(),
            position,
            record_id: ".".to_string(),
            alleles,
            genotype,
            haplotypes,
            start,
            end: end.max(start),
            quality: None,
            filters: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = record_id.into();
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: Option<f32>) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn ref_seq(&self) -> &str {
        &self.alleles[0]
    }

    /// Allele string for each genotype entry, no-calls read as REF
    pub fn genotype_alleles(&self) -> impl Iterator<Item = &str> + '_ {
        self.genotype.indices().map(|i| self.alleles[i].as_str())
    }

    #[must_use]
    pub fn is_heterozygous(&self) -> bool {
        let mut alleles = self.genotype_alleles();
        match (alleles.next(), alleles.next()) {
            (Some(first), Some(second)) => first != second,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_hom_ref(&self) -> bool {
        self.genotype.is_hom_ref()
    }

    #[must_use]
    pub fn is_no_call(&self) -> bool {
        self.genotype.is_no_call()
    }

    /// Passes when no filter is set or the filter column holds `name` (normally `PASS`)
    #[must_use]
    pub fn passes_filter(&self, name: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().all(|f| f == name || f == ".")
    }

    /// Any called allele is symbolic, a breakend, a spanning deletion or missing
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        self.genotype_alleles()
            .any(|a| a == "." || a.contains(['<', '>', '[', ']', '*']))
    }

    #[must_use]
    pub fn variant_type(&self) -> VariantType {
        if self.is_symbolic() {
            VariantType::Sv
        } else if self.ref_seq().len() == 1 && self.genotype_alleles().all(|a| a.len() == 1) {
            VariantType::Snp
        } else {
            VariantType::Indel
        }
    }

    /// True when any called allele spans or inserts more than `max_size` bases
    #[must_use]
    pub fn exceeds_size(&self, max_size: usize) -> bool {
        self.haplotypes.iter().filter(|a| !a.ignored).any(|a| {
            a.sequence.len() > max_size || (a.end - a.start) as usize > max_size
        })
    }

    /// Size class over the original (untrimmed) REF and genotype alleles
    #[must_use]
    pub fn category(&self) -> VariantCategory {
        let ref_len = self.ref_seq().len();
        let lengths: Vec<usize> = self.genotype_alleles().map(str::len).collect();
        let longest = lengths.iter().copied().max().unwrap_or(ref_len);

        let sized = |small, medium, large, length: usize| {
            if length < SMALL_VARIANT_SIZE {
                small
            } else if length < MEDIUM_VARIANT_SIZE {
                medium
            } else {
                large
            }
        };

        if ref_len == 1 && lengths.iter().all(|&l| l == 1) {
            VariantCategory::Snp
        } else if ref_len == 1 && longest > 1 {
            sized(
                VariantCategory::InsertSmall,
                VariantCategory::InsertMedium,
                VariantCategory::InsertLarge,
                longest,
            )
        } else if ref_len > 1 && lengths.iter().any(|&l| l == 1) {
            sized(
                VariantCategory::DeleteSmall,
                VariantCategory::DeleteMedium,
                VariantCategory::DeleteLarge,
                ref_len,
            )
        } else {
            sized(
                VariantCategory::ComplexSmall,
                VariantCategory::ComplexMedium,
                VariantCategory::ComplexLarge,
                longest.max(ref_len),
            )
        }
    }

    /// ALT column text
    #[must_use]
    pub fn alt_text(&self) -> String {
        if self.alleles.len() > 1 {
            self.alleles[1..].join(",")
        } else {
            ".".to_string()
        }
    }

    /// FILTER column text
    #[must_use]
    pub fn filter_text(&self) -> String {
        if self.filters.is_empty() {
            ".".to_string()
        } else {
            self.filters.join(";")
        }
    }

    /// Two records describe the same VCF line content
    #[must_use]
    pub fn same_site(&self, other: &Variant) -> bool {
        self.chrom == other.chrom && self.position == other.position && self.alleles == other.alleles
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{} ({}>{} {})",
            self.chrom,
            self.start + 1,
            self.end,
            self.ref_seq(),
            self.alt_text(),
            self.genotype
        )
    }
}

fn build_haplotypes(
    position: u64,
    alleles: &[String],
    genotype: &Genotype,
    trim_ref_overlap: bool,
) -> Vec<Allele> {
    let ref_seq = alleles[0].as_bytes();
    let is_called = |index: &Option<usize>| matches!(index, Some(i) if *i > 0);

    // Without full trimming, drop the padding base only when every called allele has it
    let shared_padding = !trim_ref_overlap
        && genotype.alleles.iter().filter(|&i| is_called(i)).all(|i| {
            let alt = alleles[i.unwrap_or(0)].as_bytes();
            !alt.is_empty() && alt[0] == ref_seq[0]
        });

    genotype
        .alleles
        .iter()
        .map(|index| match index {
            Some(i) if *i > 0 => {
                let alt = alleles[*i].as_bytes();
                if is_symbolic_allele(alt) {
                    Allele {
                        start: position,
                        end: position + ref_seq.len() as u64,
                        sequence: alt.to_vec(),
                        ignored: false,
                    }
                } else if trim_ref_overlap {
                    trim_allele(position, ref_seq, alt)
                } else if shared_padding {
                    Allele {
                        start: position + 1,
                        end: position + ref_seq.len() as u64,
                        sequence: alt[1..].to_vec(),
                        ignored: false,
                    }
                } else {
                    Allele {
                        start: position,
                        end: position + ref_seq.len() as u64,
                        sequence: alt.to_vec(),
                        ignored: false,
                    }
                }
            }
            _ => Allele::reference(position, ref_seq),
        })
        .collect()
}

fn is_symbolic_allele(allele: &[u8]) -> bool {
    allele == b"." || allele.iter().any(|b| matches!(b, b'<' | b'>' | b'[' | b']' | b'*'))
}

/// Strip the longest common prefix, then the longest common suffix of what remains
fn trim_allele(position: u64, ref_seq: &[u8], alt: &[u8]) -> Allele {
    let prefix = ref_seq.iter().zip(alt).take_while(|(r, a)| r == a).count();
    let suffix = ref_seq[prefix..]
        .iter()
        .rev()
        .zip(alt[prefix..].iter().rev())
        .take_while(|(r, a)| r == a)
        .count();

    Allele {
        start: position + prefix as u64,
        end: position + (ref_seq.len() - suffix) as u64,
        sequence: alt[prefix..alt.len() - suffix].to_vec(),
        ignored: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(ref_seq: &str, alts: &[&str], gt: &str) -> Variant {
        Variant::new(
            0,
            "chr1",
            99,
            ref_seq,
            alts.iter().map(|a| (*a).to_string()).collect(),
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_genotype() {
        let gt = Genotype::parse("0|1").unwrap();
        assert!(gt.phased);
        assert_eq!(gt.alleles, vec![Some(0), Some(1)]);
        assert_eq!(gt.to_string(), "0|1");

        let gt = Genotype::parse("./1").unwrap();
        assert!(gt.is_no_call());
        assert_eq!(gt.to_string(), "./1");

        assert_eq!(Genotype::parse("1").unwrap().ploidy(), 1);
        assert!(Genotype::parse("0/0").unwrap().is_hom_ref());
        assert!(Genotype::parse("a/1").is_err());
        assert_eq!(Genotype::parse(""), Err(VariantError::EmptyGenotype));
    }

    #[test]
    fn test_trim_snp() {
        let v = variant("A", &["G"], "1/1");
        assert_eq!((v.start, v.end), (99, 100));
        assert_eq!(v.haplotypes[0].sequence, b"G");
        assert_eq!(v.variant_type(), VariantType::Snp);
        assert!(!v.is_heterozygous());
    }

    #[test]
    fn test_trim_insertion() {
        let v = variant("A", &["ATT"], "0/1");
        assert!(v.haplotypes[0].ignored);
        let alt = &v.haplotypes[1];
        assert_eq!((alt.start, alt.end), (100, 100));
        assert_eq!(alt.sequence, b"TT");
        assert_eq!((v.start, v.end), (100, 100));
        assert!(v.is_heterozygous());
        assert_eq!(v.variant_type(), VariantType::Indel);
        assert_eq!(v.category(), VariantCategory::InsertSmall);
    }

    #[test]
    fn test_trim_deletion_and_suffix() {
        let v = variant("ATT", &["A"], "1/1");
        assert_eq!((v.start, v.end), (100, 102));
        assert!(v.haplotypes[0].sequence.is_empty());
        assert_eq!(v.category(), VariantCategory::DeleteSmall);

        let v = variant("CAG", &["CTG"], "1/1");
        assert_eq!((v.start, v.end), (100, 101));
        assert_eq!(v.haplotypes[0].sequence, b"T");
    }

    #[test]
    fn test_multiallelic_span() {
        let v = variant("ACG", &["A", "TCG"], "1/2");
        assert_eq!(v.start, 99);
        assert_eq!(v.end, 102);
        assert!(v.is_heterozygous());
    }

    #[test]
    fn test_padding_only_trim() {
        let v = Variant::new(
            0,
            "chr1",
            99,
            "A",
            vec!["ATT".to_string()],
            Genotype::parse("1/1").unwrap(),
            false,
        )
        .unwrap();
        assert_eq!((v.start, v.end), (100, 100));
        assert_eq!(v.haplotypes[0].sequence, b"TT");

        let v = Variant::new(
            0,
            "chr1",
            99,
            "CAG",
            vec!["CTG".to_string()],
            Genotype::parse("1/1").unwrap(),
            false,
        )
        .unwrap();
        assert_eq!((v.start, v.end), (100, 102));
        assert_eq!(v.haplotypes[0].sequence, b"TG");
    }

    #[test]
    fn test_symbolic_and_size() {
        let v = variant("A", &["<DEL>"], "0/1");
        assert!(v.is_symbolic());
        assert_eq!(v.variant_type(), VariantType::Sv);

        let long = "A".repeat(30);
        let v = variant("C", &[&format!("C{long}")], "0/1");
        assert!(v.exceeds_size(20));
        assert!(!v.exceeds_size(30));
        assert_eq!(v.category(), VariantCategory::InsertLarge);
    }

    #[test]
    fn test_genotype_index_out_of_range() {
        let result = Variant::new(
            0,
            "chr1",
            0,
            "A",
            vec!["G".to_string()],
            Genotype::parse("0/2").unwrap(),
            true,
        );
        assert_eq!(
            result,
            Err(VariantError::AlleleIndexOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn test_filters() {
        let v = variant("A", &["G"], "0/1");
        assert!(v.passes_filter("PASS"));
        let v = v.with_filters(vec!["LowQual".to_string()]);
        assert!(!v.passes_filter("PASS"));
        assert_eq!(v.filter_text(), "LowQual");
    }
}
