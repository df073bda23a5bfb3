//! Base-versus-called comparison over a whole reference.

use tracing::info;

use crate::analysis::pool::map_ordered;
use crate::analysis::provider::{AdmittedCalls, ChromosomeCalls};
use crate::analysis::reconcile::{reconcile, PassStrategy, SyncInterval};
use crate::analysis::stats::{ChromosomeStats, DecisionCounts, RunStats};
use crate::analysis::ChromosomeStatus;
use crate::core::config::ComparisonConfig;
use crate::core::record::LabelledVariant;
use crate::core::reference::Reference;
use crate::core::types::{MatchStatus, Side};
use crate::core::variant::Variant;
use crate::matching::engine::{ComparisonEngine, SearchLimits, SearchStats};

/// Labelled calls of one chromosome, sorted by position
#[derive(Debug, Clone)]
pub struct DuoChromosome {
    pub index: usize,
    pub name: String,
    pub status: ChromosomeStatus,
    pub base: Vec<LabelledVariant>,
    pub called: Vec<LabelledVariant>,
    pub sync_points: Vec<SyncInterval>,
    pub search: SearchStats,
}

impl DuoChromosome {
    fn stats(&self) -> ChromosomeStats {
        let mut counts = DecisionCounts::default();
        for call in &self.base {
            counts.add(Side::Base, call.status);
        }
        for call in &self.called {
            counts.add(Side::Called, call.status);
        }
        ChromosomeStats {
            chromosome: self.name.clone(),
            status: self.status.clone(),
            counts,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DuoReport {
    /// Chromosomes with at least one call, in reference order
    pub chromosomes: Vec<DuoChromosome>,
    pub stats: RunStats,
}

impl DuoReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.chromosomes.iter().all(|c| c.status.is_complete())
    }
}

/// Compare two admitted call sets chromosome by chromosome on the worker pool.
///
/// `base` and `called` must have been admitted against `reference`.
#[must_use]
pub fn compare_duo(
    reference: &Reference,
    base: AdmittedCalls,
    called: AdmittedCalls,
    config: &ComparisonConfig,
    strategy: PassStrategy,
) -> DuoReport {
    let engine = ComparisonEngine::new(SearchLimits::from(config));

    let jobs: Vec<(usize, ChromosomeCalls, ChromosomeCalls)> = base
        .chromosomes
        .into_iter()
        .zip(called.chromosomes)
        .enumerate()
        .filter(|(_, (b, c))| !(b.is_empty() && c.is_empty()))
        .map(|(index, (b, c))| (index, b, c))
        .collect();

    let mut chromosomes = map_ordered(config.threads, jobs, |(index, base, called)| {
        compare_chromosome(&engine, reference, index, base, called, strategy)
    });
    chromosomes.sort_by_key(|c| c.index);

    let stats = RunStats::from_chromosomes(chromosomes.iter().map(DuoChromosome::stats).collect());
    info!(
        chromosomes = chromosomes.len(),
        tp_base = stats.total.tp_base,
        tp_called = stats.total.tp_called,
        false_negative = stats.total.false_negative,
        false_positive = stats.total.false_positive,
        incomplete = stats.incomplete().len(),
        "Comparison finished"
    );

    DuoReport { chromosomes, stats }
}

fn compare_chromosome(
    engine: &ComparisonEngine,
    reference: &Reference,
    index: usize,
    base: ChromosomeCalls,
    called: ChromosomeCalls,
    strategy: PassStrategy,
) -> DuoChromosome {
    let contig = &reference.contigs()[index];
    let outcome = reconcile(engine, contig, &base.assessed, &called.assessed, strategy);

    DuoChromosome {
        index,
        name: contig.name.clone(),
        base: label(base, &outcome.base),
        called: label(called, &outcome.called),
        status: outcome.status,
        sync_points: outcome.sync_points,
        search: outcome.search,
    }
}

/// Attach statuses to assessed calls, add not-assessed ones and sort by position
pub(crate) fn label(calls: ChromosomeCalls, statuses: &[MatchStatus]) -> Vec<LabelledVariant> {
    let mut labelled: Vec<LabelledVariant> = calls
        .assessed
        .into_iter()
        .zip(statuses.iter().copied())
        .map(|(variant, status)| LabelledVariant::new(variant, status))
        .chain(
            calls
                .not_assessed
                .into_iter()
                .map(|(variant, _)| LabelledVariant::new(variant, MatchStatus::NotAssessed)),
        )
        .collect();
    labelled.sort_by(|a, b| by_position(&a.variant, &b.variant));
    labelled
}

fn by_position(a: &Variant, b: &Variant) -> std::cmp::Ordering {
    (a.position, a.id).cmp(&(b.position, b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::provider::admit;
    use crate::core::contig::Contig;
    use crate::core::types::MatchMode;
    use crate::core::variant::Genotype;

    fn reference() -> Reference {
        Reference::new(vec![
            Contig::new("chr1", 0, b"ACGT".repeat(50)),
            Contig::new("chr2", 1, b"ACGT".repeat(50)),
            Contig::new("chr3", 2, b"ACGT".repeat(50)),
        ])
    }

    fn variant(id: usize, chrom: &str, position: u64, alt: &str, gt: &str) -> Variant {
        Variant::new(
            id,
            chrom,
            position,
            "A",
            vec![alt.to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_compare_duo() {
        let reference = reference();
        let config = ComparisonConfig::default();
        let base = vec![
            variant(0, "chr1", 100, "G", "0/1"),
            variant(1, "chr1", 140, "T", "1/1"),
            variant(2, "chr2", 20, "C", "0/1"),
        ];
        let called = vec![
            variant(0, "chr1", 100, "G", "0/1"),
            variant(1, "chr1", 140, "T", "0/1"),
            variant(2, "chr1", 160, "C", "./1"),
        ];

        let report = compare_duo(
            &reference,
            admit(base, &reference, &config, None),
            admit(called, &reference, &config, None),
            &config,
            PassStrategy::GenotypeThenAllele,
        );

        assert!(report.is_complete());
        assert_eq!(report.chromosomes.len(), 2);
        let chr1 = &report.chromosomes[0];
        assert_eq!(chr1.name, "chr1");

        let base_status: Vec<MatchStatus> = chr1.base.iter().map(|c| c.status).collect();
        assert_eq!(
            base_status,
            vec![MatchStatus::GenotypeMatch, MatchStatus::AlleleMatch]
        );
        let called_status: Vec<MatchStatus> = chr1.called.iter().map(|c| c.status).collect();
        assert_eq!(
            called_status,
            vec![
                MatchStatus::GenotypeMatch,
                MatchStatus::AlleleMatch,
                MatchStatus::NotAssessed
            ]
        );

        let chr2 = &report.chromosomes[1];
        assert_eq!(chr2.base[0].status, MatchStatus::NoMatch);

        assert_eq!(report.stats.total.tp_base, 2);
        assert_eq!(report.stats.total.false_negative, 1);
        assert_eq!(report.stats.total.not_assessed_called, 1);
    }

    #[test]
    fn test_single_pass_strategy() {
        let reference = reference();
        let config = ComparisonConfig::default();
        let base = vec![variant(0, "chr3", 100, "G", "1/1")];
        let called = vec![variant(0, "chr3", 100, "G", "0/1")];

        let report = compare_duo(
            &reference,
            admit(base, &reference, &config, None),
            admit(called, &reference, &config, None),
            &config,
            PassStrategy::Single(MatchMode::Allele),
        );
        assert_eq!(report.chromosomes[0].base[0].status, MatchStatus::AlleleMatch);
    }
}
