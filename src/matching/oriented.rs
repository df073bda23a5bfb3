use std::cmp::Ordering;

use crate::core::types::MatchMode;
use crate::core::variant::{Allele, Variant};

/// A variant with one of its alleles assigned to each haplotype.
///
/// Genotype matching offers both phasings of a heterozygous call; allele
/// matching offers each distinct called allele as a homozygous candidate.
#[derive(Debug, Clone, Copy)]
pub struct OrientedVariant<'a> {
    /// Position of the variant in its side's list
    pub index: usize,
    variant: &'a Variant,
    first: usize,
    second: usize,
    ordered: bool,
}

impl<'a> OrientedVariant<'a> {
    /// Candidate orientations of `variant` under the given mode
    #[must_use]
    pub fn candidates(index: usize, variant: &'a Variant, mode: MatchMode) -> Vec<Self> {
        match mode {
            MatchMode::Genotype => Self::genotype_orientations(index, variant),
            MatchMode::Allele => Self::allele_orientations(index, variant),
        }
    }

    fn new(index: usize, variant: &'a Variant, first: usize, second: usize, ordered: bool) -> Self {
        Self {
            index,
            variant,
            first,
            second,
            ordered,
        }
    }

    fn genotype_orientations(index: usize, variant: &'a Variant) -> Vec<Self> {
        let last = variant.haplotypes.len().saturating_sub(1);
        if variant.is_heterozygous() {
            vec![
                Self::new(index, variant, 0, last, true),
                Self::new(index, variant, last, 0, false),
            ]
        } else {
            vec![Self::new(index, variant, 0, last, true)]
        }
    }

    fn allele_orientations(index: usize, variant: &'a Variant) -> Vec<Self> {
        let mut seen: Vec<&[u8]> = Vec::new();
        let mut out = Vec::new();
        for (i, allele) in variant.haplotypes.iter().enumerate() {
            if allele.ignored || seen.contains(&allele.sequence.as_slice()) {
                continue;
            }
            seen.push(&allele.sequence);
            out.push(Self::new(index, variant, i, i, true));
        }
        out
    }

    #[must_use]
    pub fn variant(&self) -> &'a Variant {
        self.variant
    }

    /// Allele replayed on the first haplotype
    #[must_use]
    pub fn allele(&self) -> &'a Allele {
        &self.variant.haplotypes[self.first]
    }

    /// Genotype slot of the first haplotype's allele
    #[must_use]
    pub fn allele_index(&self) -> usize {
        self.first
    }

    /// Same variant with the haplotypes swapped
    #[must_use]
    pub fn other(&self) -> Self {
        Self::new(self.index, self.variant, self.second, self.first, !self.ordered)
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.variant.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.variant.end
    }
}

impl PartialEq for OrientedVariant<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrientedVariant<'_> {}

impl PartialOrd for OrientedVariant<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrientedVariant<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then(self.ordered.cmp(&other.ordered))
            .then(self.first.cmp(&other.first))
            .then(self.second.cmp(&other.second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::Genotype;

    fn variant(alts: &[&str], gt: &str) -> Variant {
        Variant::new(
            0,
            "chr1",
            10,
            "A",
            alts.iter().map(|a| (*a).to_string()).collect(),
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_heterozygous_has_two_phasings() {
        let v = variant(&["G"], "0/1");
        let orientations = OrientedVariant::candidates(3, &v, MatchMode::Genotype);
        assert_eq!(orientations.len(), 2);
        assert!(orientations[0].allele().ignored);
        assert!(!orientations[1].allele().ignored);
        assert_eq!(orientations[0].other(), orientations[1]);
    }

    #[test]
    fn test_homozygous_has_one_orientation() {
        let v = variant(&["G"], "1/1");
        assert_eq!(OrientedVariant::candidates(0, &v, MatchMode::Genotype).len(), 1);

        let haploid = variant(&["G"], "1");
        let only = OrientedVariant::candidates(0, &haploid, MatchMode::Genotype);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].allele().sequence, b"G");
        assert_eq!(only[0].other().allele().sequence, b"G");
    }

    #[test]
    fn test_allele_mode_skips_reference() {
        let v = variant(&["G", "T"], "1/2");
        let orientations = OrientedVariant::candidates(0, &v, MatchMode::Allele);
        assert_eq!(orientations.len(), 2);
        assert!(orientations.iter().all(|o| o.allele() == o.other().allele()));

        let het = variant(&["G"], "0/1");
        assert_eq!(OrientedVariant::candidates(0, &het, MatchMode::Allele).len(), 1);
    }
}
