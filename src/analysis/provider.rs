//! Admission of parsed variants into a comparison.
//!
//! Each call set is split per reference contig into variants the engine will
//! reconcile and variants reported as not assessed. Hom-ref calls, calls on
//! contigs outside the run (unknown to the reference, non-autosomal under
//! `autosome_only`, or outside the BED regions) are dropped entirely.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::ComparisonConfig;
use crate::core::contig::is_autosome_name;
use crate::core::reference::Reference;
use crate::core::types::VariantType;
use crate::core::variant::Variant;
use crate::parsing::bed::RegionSet;

/// Why a variant is reported without being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    FailedFilter,
    LowQuality,
    NoCall,
    NotSnp,
    NotIndel,
    StructuralOrOversized,
    BeyondContig,
}

/// Admitted variants of one contig
#[derive(Debug, Clone, Default)]
pub struct ChromosomeCalls {
    /// Sorted by start, end, then input order
    pub assessed: Vec<Variant>,
    /// Sorted like `assessed`
    pub not_assessed: Vec<(Variant, ExclusionReason)>,
}

impl ChromosomeCalls {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assessed.is_empty() && self.not_assessed.is_empty()
    }
}

/// Counts of variants that never reach the output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionCounts {
    pub hom_ref: usize,
    pub unknown_contig: usize,
    pub out_of_scope: usize,
}

/// One call set split per reference contig, indexed like the reference
#[derive(Debug, Clone, Default)]
pub struct AdmittedCalls {
    pub chromosomes: Vec<ChromosomeCalls>,
    pub counts: AdmissionCounts,
}

impl AdmittedCalls {
    #[must_use]
    pub fn assessed_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.assessed.len()).sum()
    }

    #[must_use]
    pub fn not_assessed_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.not_assessed.len()).sum()
    }
}

/// Decide for one variant whether it can be reconciled
#[must_use]
pub fn exclusion_reason(
    variant: &Variant,
    contig_length: u64,
    config: &ComparisonConfig,
) -> Option<ExclusionReason> {
    if config.filter_enabled && !variant.passes_filter(&config.filter_name) {
        return Some(ExclusionReason::FailedFilter);
    }
    if let Some(threshold) = config.min_quality {
        if variant.quality.map_or(true, |q| q < threshold) {
            return Some(ExclusionReason::LowQuality);
        }
    }
    if variant.is_no_call() {
        return Some(ExclusionReason::NoCall);
    }

    let variant_type = variant.variant_type();
    if config.snp_only && variant_type != VariantType::Snp {
        return Some(ExclusionReason::NotSnp);
    }
    if config.indel_only && variant_type != VariantType::Indel {
        return Some(ExclusionReason::NotIndel);
    }
    if variant_type == VariantType::Sv || variant.exceeds_size(config.max_variant_size) {
        return Some(ExclusionReason::StructuralOrOversized);
    }
    if variant.end > contig_length || variant.position >= contig_length {
        return Some(ExclusionReason::BeyondContig);
    }
    None
}

fn replay_order(a: &Variant, b: &Variant) -> std::cmp::Ordering {
    (a.start, a.end, a.id).cmp(&(b.start, b.end, b.id))
}

/// Split `variants` per contig of `reference` and sort the assessed ones
#[must_use]
pub fn admit(
    variants: Vec<Variant>,
    reference: &Reference,
    config: &ComparisonConfig,
    regions: Option<&RegionSet>,
) -> AdmittedCalls {
    let mut admitted = AdmittedCalls {
        chromosomes: vec![ChromosomeCalls::default(); reference.len()],
        counts: AdmissionCounts::default(),
    };
    let mut missing: BTreeSet<String> = BTreeSet::new();

    for variant in variants {
        if variant.is_hom_ref() {
            admitted.counts.hom_ref += 1;
            continue;
        }

        let Some(contig) = reference.get(&variant.chrom) else {
            if missing.insert(variant.chrom.clone()) {
                warn!(chromosome = %variant.chrom, "Chromosome not found in reference, skipping its variants");
            }
            admitted.counts.unknown_contig += 1;
            continue;
        };

        let in_scope = (!config.autosome_only || is_autosome_name(&contig.name))
            && regions.map_or(true, |r| r.contains(&contig.name, variant.position));
        if !in_scope {
            admitted.counts.out_of_scope += 1;
            continue;
        }

        let calls = &mut admitted.chromosomes[contig.index];
        match exclusion_reason(&variant, contig.length(), config) {
            Some(reason) => calls.not_assessed.push((variant, reason)),
            None => calls.assessed.push(variant),
        }
    }

    for calls in &mut admitted.chromosomes {
        calls.assessed.sort_by(|a, b| replay_order(a, b));
        calls.not_assessed.sort_by(|(a, _), (b, _)| replay_order(a, b));
    }

    debug!(
        assessed = admitted.assessed_count(),
        not_assessed = admitted.not_assessed_count(),
        hom_ref = admitted.counts.hom_ref,
        unknown_contig = admitted.counts.unknown_contig,
        out_of_scope = admitted.counts.out_of_scope,
        "Admitted variants"
    );
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::Contig;
    use crate::core::variant::Genotype;

    fn reference() -> Reference {
        Reference::new(vec![
            Contig::new("chr1", 0, b"ACGT".repeat(25)),
            Contig::new("chrX", 1, b"ACGT".repeat(25)),
        ])
    }

    fn variant(id: usize, chrom: &str, position: u64, ref_seq: &str, alt: &str, gt: &str) -> Variant {
        Variant::new(
            id,
            chrom,
            position,
            ref_seq,
            vec![alt.to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_admission_rules() {
        let variants = vec![
            variant(0, "chr1", 40, "A", "G", "0/1"),
            variant(1, "chr1", 10, "C", "T", "0/0"),
            variant(2, "chr1", 20, "A", "G", "./."),
            variant(3, "chr1", 30, "A", "G", "1/1").with_filters(vec!["LowQual".to_string()]),
            variant(4, "chr2", 30, "A", "G", "1/1"),
            variant(5, "chr1", 8, "A", "G", "0/1"),
            variant(6, "chr1", 99, "TAC", "T", "0/1"),
        ];
        let admitted = admit(variants, &reference(), &ComparisonConfig::default(), None);

        assert_eq!(admitted.counts.hom_ref, 1);
        assert_eq!(admitted.counts.unknown_contig, 1);

        let chr1 = &admitted.chromosomes[0];
        let ids: Vec<usize> = chr1.assessed.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![5, 0]);

        let reasons: Vec<(usize, ExclusionReason)> =
            chr1.not_assessed.iter().map(|(v, r)| (v.id, *r)).collect();
        assert_eq!(
            reasons,
            vec![
                (2, ExclusionReason::NoCall),
                (3, ExclusionReason::FailedFilter),
                (6, ExclusionReason::BeyondContig),
            ]
        );
        assert!(admitted.chromosomes[1].is_empty());
    }

    #[test]
    fn test_type_and_quality_filters() {
        let config = ComparisonConfig {
            snp_only: true,
            min_quality: Some(20.0),
            ..ComparisonConfig::default()
        };
        let snp = variant(0, "chr1", 40, "A", "G", "0/1").with_quality(Some(30.0));
        let low = variant(1, "chr1", 44, "A", "G", "0/1").with_quality(Some(10.0));
        let indel = variant(2, "chr1", 48, "A", "AT", "0/1").with_quality(Some(30.0));

        assert_eq!(exclusion_reason(&snp, 100, &config), None);
        assert_eq!(
            exclusion_reason(&low, 100, &config),
            Some(ExclusionReason::LowQuality)
        );
        assert_eq!(
            exclusion_reason(&indel, 100, &config),
            Some(ExclusionReason::NotSnp)
        );

        let oversized = ComparisonConfig {
            max_variant_size: 1,
            ..ComparisonConfig::default()
        };
        assert_eq!(
            exclusion_reason(&indel, 100, &oversized),
            None,
            "one inserted base is within the size limit"
        );
        let long = variant(3, "chr1", 48, "A", "ATTT", "0/1");
        assert_eq!(
            exclusion_reason(&long, 100, &oversized),
            Some(ExclusionReason::StructuralOrOversized)
        );
    }

    #[test]
    fn test_scope_filters() {
        let config = ComparisonConfig {
            autosome_only: true,
            ..ComparisonConfig::default()
        };
        let regions = RegionSet::from_reader("chr1\t0\t50\n".as_bytes()).unwrap();
        let variants = vec![
            variant(0, "chr1", 40, "A", "G", "0/1"),
            variant(1, "chr1", 60, "A", "G", "0/1"),
            variant(2, "chrX", 40, "A", "G", "0/1"),
        ];
        let admitted = admit(variants, &reference(), &config, Some(&regions));

        assert_eq!(admitted.assessed_count(), 1);
        assert_eq!(admitted.counts.out_of_scope, 2);
    }
}
