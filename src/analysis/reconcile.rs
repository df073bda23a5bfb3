//! One chromosome, one pair of call sets.
//!
//! Runs the engine once or twice over the same chromosome and turns its
//! decisions into a [`MatchStatus`] per variant:
//!
//! | Pass | Included | Excluded | Skipped |
//! |------|----------|----------|---------|
//! | genotype | `GenotypeMatch` | offered to the allele pass | `NotAssessed` |
//! | allele | `AlleleMatch` | `NoMatch` | `NotAssessed` |
//!
//! A single-pass comparison maps excluded variants straight to `NoMatch`.

use serde::Serialize;
use tracing::warn;

use crate::analysis::ChromosomeStatus;
use crate::core::contig::Contig;
use crate::core::types::{MatchMode, MatchStatus};
use crate::core::variant::Variant;
use crate::matching::engine::{ComparisonEngine, EngineError, SearchStats};
use crate::matching::sync_point::{SideDecisions, SyncPoint};

/// Which engine passes make up a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStrategy {
    /// Genotype pass, then an allele pass over what it left unmatched
    GenotypeThenAllele,
    Single(MatchMode),
}

/// A sync point expressed with 1-based VCF positions instead of list indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncInterval {
    pub start: u64,
    pub end: u64,
    pub base_included: Vec<u64>,
    pub base_excluded: Vec<u64>,
    pub called_included: Vec<u64>,
    pub called_excluded: Vec<u64>,
    pub unresolved: bool,
}

impl SyncInterval {
    fn from_point(point: &SyncPoint, base: &[Variant], called: &[Variant]) -> Self {
        let positions = |ids: &[usize], variants: &[Variant]| -> Vec<u64> {
            ids.iter().map(|&i| variants[i].position + 1).collect()
        };
        Self {
            start: point.start,
            end: point.end,
            base_included: positions(&point.base_included, base),
            base_excluded: positions(&point.base_excluded, base),
            called_included: positions(&point.called_included, called),
            called_excluded: positions(&point.called_excluded, called),
            unresolved: point.unresolved,
        }
    }
}

/// Per-variant outcome of reconciling one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    /// Parallel to the base variants passed in
    pub base: Vec<MatchStatus>,
    /// Parallel to the called variants passed in
    pub called: Vec<MatchStatus>,
    /// Allele numbers of each called variant that the base side reproduced
    pub called_alleles: Vec<Vec<usize>>,
    /// Sync points of the first pass
    pub sync_points: Vec<SyncInterval>,
    pub search: SearchStats,
    pub status: ChromosomeStatus,
}

impl PairOutcome {
    fn incomplete(base: usize, called: usize, reason: String) -> Self {
        Self {
            base: vec![MatchStatus::NotAssessed; base],
            called: vec![MatchStatus::NotAssessed; called],
            called_alleles: vec![Vec::new(); called],
            sync_points: Vec::new(),
            search: SearchStats::default(),
            status: ChromosomeStatus::Incomplete(reason),
        }
    }
}

/// Reconcile `base` against `called` on `contig`.
///
/// Both lists must be sorted by start. Engine failures are contained: the
/// outcome is marked incomplete and every variant is left not assessed.
#[must_use]
pub fn reconcile(
    engine: &ComparisonEngine,
    contig: &Contig,
    base: &[Variant],
    called: &[Variant],
    strategy: PassStrategy,
) -> PairOutcome {
    match run_passes(engine, contig, base, called, strategy) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(chromosome = %contig.name, error = %e, "Chromosome marked incomplete");
            PairOutcome::incomplete(base.len(), called.len(), e.to_string())
        }
    }
}

fn run_passes(
    engine: &ComparisonEngine,
    contig: &Contig,
    base: &[Variant],
    called: &[Variant],
    strategy: PassStrategy,
) -> Result<PairOutcome, EngineError> {
    let base_refs: Vec<&Variant> = base.iter().collect();
    let called_refs: Vec<&Variant> = called.iter().collect();

    let mode = match strategy {
        PassStrategy::GenotypeThenAllele => MatchMode::Genotype,
        PassStrategy::Single(mode) => mode,
    };
    let first = engine.compare(contig, &base_refs, &called_refs, mode)?;
    let matched = match mode {
        MatchMode::Genotype => MatchStatus::GenotypeMatch,
        MatchMode::Allele => MatchStatus::AlleleMatch,
    };

    let mut base_status = statuses(&first.base, base.len(), matched);
    let mut called_status = statuses(&first.called, called.len(), matched);
    let mut called_alleles: Vec<Vec<usize>> = called
        .iter()
        .enumerate()
        .map(|(i, variant)| match called_status[i] {
            MatchStatus::GenotypeMatch => variant.genotype.indices().filter(|&a| a != 0).collect(),
            MatchStatus::AlleleMatch => slot_allele(variant, first.called.slot(i)),
            MatchStatus::NoMatch | MatchStatus::NotAssessed => Vec::new(),
        })
        .collect();
    let mut search = first.stats.clone();

    let retry_base = &first.base.excluded;
    let retry_called = &first.called.excluded;
    if strategy == PassStrategy::GenotypeThenAllele
        && !(retry_base.is_empty() && retry_called.is_empty())
    {
        let subset_base: Vec<&Variant> = retry_base.iter().map(|&i| base_refs[i]).collect();
        let subset_called: Vec<&Variant> = retry_called.iter().map(|&i| called_refs[i]).collect();
        let second = engine.compare(contig, &subset_base, &subset_called, MatchMode::Allele)?;

        apply_second_pass(&mut base_status, retry_base, &second.base);
        apply_second_pass(&mut called_status, retry_called, &second.called);
        for &k in &second.called.included {
            let i = retry_called[k];
            called_alleles[i] = slot_allele(&called[i], second.called.slot(k));
        }
        search.merge(&second.stats);
    }

    let sync_points = first
        .sync_points
        .iter()
        .map(|p| SyncInterval::from_point(p, base, called))
        .collect();

    Ok(PairOutcome {
        base: base_status,
        called: called_status,
        called_alleles,
        sync_points,
        search,
        status: ChromosomeStatus::Complete,
    })
}

fn statuses(decisions: &SideDecisions, len: usize, matched: MatchStatus) -> Vec<MatchStatus> {
    let mut statuses = vec![MatchStatus::NotAssessed; len];
    for &i in &decisions.included {
        statuses[i] = matched;
    }
    for &i in &decisions.excluded {
        statuses[i] = MatchStatus::NoMatch;
    }
    statuses
}

/// Allele number carried in genotype `slot` of `variant`, if any
fn slot_allele(variant: &Variant, slot: Option<usize>) -> Vec<usize> {
    slot.and_then(|s| variant.genotype.alleles.get(s).copied().flatten())
        .into_iter()
        .collect()
}

/// Map allele-pass decisions on a subset back onto the full list
fn apply_second_pass(statuses: &mut [MatchStatus], subset: &[usize], decisions: &SideDecisions) {
    for &k in &decisions.included {
        statuses[subset[k]] = MatchStatus::AlleleMatch;
    }
    for &k in &decisions.skipped {
        statuses[subset[k]] = MatchStatus::NotAssessed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::Genotype;
    use crate::matching::engine::SearchLimits;

    fn contig() -> Contig {
        Contig::new("chr1", 0, b"ACGT".repeat(50))
    }

    fn variant(id: usize, position: u64, alt: &str, gt: &str) -> Variant {
        Variant::new(
            id,
            "chr1",
            position,
            "A",
            vec![alt.to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    fn engine() -> ComparisonEngine {
        ComparisonEngine::new(SearchLimits::default())
    }

    #[test]
    fn test_zygosity_mismatch_is_allele_match() {
        let base = vec![variant(0, 100, "G", "1/1"), variant(1, 120, "T", "0/1")];
        let called = vec![variant(0, 100, "G", "0/1")];
        let outcome = reconcile(
            &engine(),
            &contig(),
            &base,
            &called,
            PassStrategy::GenotypeThenAllele,
        );

        assert!(outcome.status.is_complete());
        assert_eq!(
            outcome.base,
            vec![MatchStatus::AlleleMatch, MatchStatus::NoMatch]
        );
        assert_eq!(outcome.called, vec![MatchStatus::AlleleMatch]);
        assert_eq!(outcome.called_alleles, vec![vec![1]]);

        // Sync points describe the genotype pass
        let excluded: Vec<u64> = outcome
            .sync_points
            .iter()
            .flat_map(|p| p.base_excluded.iter().copied())
            .collect();
        assert_eq!(excluded, vec![101, 121]);
    }

    #[test]
    fn test_allele_match_records_matched_allele() {
        let base = vec![variant(0, 100, "T", "0/1")];
        let called = vec![Variant::new(
            0,
            "chr1",
            100,
            "A",
            vec!["G".to_string(), "T".to_string()],
            Genotype::parse("1/2").unwrap(),
            true,
        )
        .unwrap()];
        let outcome = reconcile(
            &engine(),
            &contig(),
            &base,
            &called,
            PassStrategy::GenotypeThenAllele,
        );

        assert_eq!(outcome.called, vec![MatchStatus::AlleleMatch]);
        assert_eq!(outcome.called_alleles, vec![vec![2]]);
    }

    #[test]
    fn test_single_genotype_pass() {
        let base = vec![variant(0, 100, "G", "1/1")];
        let called = vec![variant(0, 100, "G", "0/1")];
        let outcome = reconcile(
            &engine(),
            &contig(),
            &base,
            &called,
            PassStrategy::Single(MatchMode::Genotype),
        );
        assert_eq!(outcome.base, vec![MatchStatus::NoMatch]);
        assert_eq!(outcome.called, vec![MatchStatus::NoMatch]);
    }

    #[test]
    fn test_engine_failure_marks_incomplete() {
        let base = vec![variant(0, 100, "G", "0/1"), variant(1, 60, "G", "0/1")];
        let outcome = reconcile(
            &engine(),
            &contig(),
            &base,
            &[],
            PassStrategy::GenotypeThenAllele,
        );
        assert!(!outcome.status.is_complete());
        assert_eq!(outcome.base, vec![MatchStatus::NotAssessed; 2]);
        assert!(outcome.sync_points.is_empty());
    }
}
