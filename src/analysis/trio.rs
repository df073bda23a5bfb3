//! Mother, father and child comparison with Mendelian classification.
//!
//! The child is reconciled against each parent separately (genotype pass, then
//! allele pass). A child call is then classified from what each parent can pass
//! on at its site:
//!
//! - an ALT allele, when that parent's comparison matched the child call
//! - a REF allele, when every overlapping parent call carries a reference allele
//! - nothing known, when the parent has a no-call there
//!
//! Parent calls matched in the child are compliant; unmatched ones are judged
//! by whether the parent could have withheld them.

use tracing::info;

use crate::analysis::duo::label;
use crate::analysis::mendelian::{mendelian_decision, untransmitted_parent_decision, Transmissible};
use crate::analysis::pool::map_ordered;
use crate::analysis::provider::{AdmittedCalls, ChromosomeCalls, ExclusionReason};
use crate::analysis::reconcile::{reconcile, PairOutcome, PassStrategy};
use crate::analysis::stats::{MendelianCounts, TrioChromosomeStats, TrioStats};
use crate::analysis::ChromosomeStatus;
use crate::core::config::ComparisonConfig;
use crate::core::record::LabelledVariant;
use crate::core::reference::Reference;
use crate::core::types::{MatchStatus, MendelianDecision};
use crate::core::variant::Variant;
use crate::matching::engine::{ComparisonEngine, SearchLimits, SearchStats};

/// Admitted calls of the three trio members
#[derive(Debug, Clone)]
pub struct TrioCalls {
    pub mother: AdmittedCalls,
    pub father: AdmittedCalls,
    pub child: AdmittedCalls,
}

#[derive(Debug, Clone)]
pub struct TrioChromosome {
    pub index: usize,
    pub name: String,
    pub status: ChromosomeStatus,
    pub mother: Vec<LabelledVariant>,
    pub father: Vec<LabelledVariant>,
    pub child: Vec<LabelledVariant>,
    pub search: SearchStats,
}

impl TrioChromosome {
    fn stats(&self) -> TrioChromosomeStats {
        let count = |calls: &[LabelledVariant]| {
            let mut counts = MendelianCounts::default();
            for call in calls {
                counts.add(call.mendelian.unwrap_or_default());
            }
            counts
        };
        TrioChromosomeStats {
            chromosome: self.name.clone(),
            status: self.status.clone(),
            mother: count(&self.mother),
            father: count(&self.father),
            child: count(&self.child),
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrioReport {
    pub chromosomes: Vec<TrioChromosome>,
    pub stats: TrioStats,
}

impl TrioReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.chromosomes.iter().all(|c| c.status.is_complete())
    }
}

/// Run the trio comparison on the worker pool
#[must_use]
pub fn compare_trio(reference: &Reference, calls: TrioCalls, config: &ComparisonConfig) -> TrioReport {
    let engine = ComparisonEngine::new(SearchLimits::from(config));
    let window = config.max_variant_size as u64 + 1;

    let jobs: Vec<TrioJob> = calls
        .mother
        .chromosomes
        .into_iter()
        .zip(calls.father.chromosomes)
        .zip(calls.child.chromosomes)
        .enumerate()
        .filter(|(_, ((m, f), c))| !(m.is_empty() && f.is_empty() && c.is_empty()))
        .map(|(index, ((mother, father), child))| TrioJob {
            index,
            mother,
            father,
            child,
        })
        .collect();

    let mut chromosomes = map_ordered(config.threads, jobs, |job| {
        compare_chromosome(&engine, reference, job, window)
    });
    chromosomes.sort_by_key(|c| c.index);

    let stats = TrioStats::from_chromosomes(chromosomes.iter().map(TrioChromosome::stats).collect());
    info!(
        chromosomes = chromosomes.len(),
        compliant = stats.child.compliant,
        violation = stats.child.violation,
        incomplete = stats.incomplete().len(),
        "Trio comparison finished"
    );

    TrioReport { chromosomes, stats }
}

struct TrioJob {
    index: usize,
    mother: ChromosomeCalls,
    father: ChromosomeCalls,
    child: ChromosomeCalls,
}

fn compare_chromosome(
    engine: &ComparisonEngine,
    reference: &Reference,
    job: TrioJob,
    window: u64,
) -> TrioChromosome {
    let contig = &reference.contigs()[job.index];
    let strategy = PassStrategy::GenotypeThenAllele;
    let father_pair = reconcile(engine, contig, &job.father.assessed, &job.child.assessed, strategy);
    let mother_pair = reconcile(engine, contig, &job.mother.assessed, &job.child.assessed, strategy);

    let status = match (&father_pair.status, &mother_pair.status) {
        (ChromosomeStatus::Incomplete(reason), _) | (_, ChromosomeStatus::Incomplete(reason)) => {
            ChromosomeStatus::Incomplete(reason.clone())
        }
        _ => ChromosomeStatus::Complete,
    };
    let complete = status.is_complete();

    let mut search = father_pair.search.clone();
    search.merge(&mother_pair.search);

    let child_decisions: Vec<MendelianDecision> = job
        .child
        .assessed
        .iter()
        .enumerate()
        .map(|(j, variant)| {
            if !complete {
                return MendelianDecision::Skipped;
            }
            let father = transmissible(&job.father, &father_pair, j, variant, window);
            let mother = transmissible(&job.mother, &mother_pair, j, variant, window);
            mendelian_decision(&variant.genotype, father, mother)
        })
        .collect();
    let child_status: Vec<MatchStatus> = father_pair
        .called
        .iter()
        .zip(&mother_pair.called)
        .map(|(&f, &m)| best_status(f, m))
        .collect();

    let father_decisions = parent_decisions(&job.father, &father_pair.base, complete);
    let mother_decisions = parent_decisions(&job.mother, &mother_pair.base, complete);

    TrioChromosome {
        index: job.index,
        name: contig.name.clone(),
        mother: annotate(job.mother, &mother_pair.base, &mother_decisions, not_assessed_parent),
        father: annotate(job.father, &father_pair.base, &father_decisions, not_assessed_parent),
        child: annotate(job.child, &child_status, &child_decisions, not_assessed_child),
        status,
        search,
    }
}

/// What `parent` can pass on at the site of child call `j`
fn transmissible(
    parent: &ChromosomeCalls,
    pair: &PairOutcome,
    j: usize,
    child: &Variant,
    window: u64,
) -> Transmissible {
    let no_call = overlapping(&parent.not_assessed, child, window, |(v, _)| v)
        .any(|(v, reason)| *reason == ExclusionReason::NoCall && v.is_no_call());
    let reference = overlapping(&parent.assessed, child, window, |v| v)
        .all(|v| v.genotype.alleles.contains(&Some(0)));

    Transmissible {
        reference,
        alternates: pair.called_alleles[j].clone(),
        no_call,
    }
}

/// Items whose variant span overlaps `target`.
///
/// `items` must be sorted by variant start; `window` bounds how far a span
/// can reach back.
fn overlapping<'v, T>(
    items: &'v [T],
    target: &Variant,
    window: u64,
    variant: impl Fn(&T) -> &Variant + Copy + 'v,
) -> impl Iterator<Item = &'v T> + 'v {
    let (start, end) = span(target);
    let first = items.partition_point(|item| variant(item).start + window < start);
    items[first..]
        .iter()
        .take_while(move |item| variant(*item).start < end)
        .filter(move |item| {
            let (s, e) = span(variant(*item));
            s < end && start < e
        })
}

/// Half-open reference span, one base wide for insertions
fn span(variant: &Variant) -> (u64, u64) {
    (variant.start, variant.end.max(variant.start + 1))
}

fn parent_decisions(
    parent: &ChromosomeCalls,
    statuses: &[MatchStatus],
    complete: bool,
) -> Vec<MendelianDecision> {
    parent
        .assessed
        .iter()
        .zip(statuses)
        .map(|(variant, status)| match status {
            _ if !complete => MendelianDecision::Skipped,
            MatchStatus::GenotypeMatch | MatchStatus::AlleleMatch => MendelianDecision::Compliant,
            MatchStatus::NoMatch => untransmitted_parent_decision(&variant.genotype),
            MatchStatus::NotAssessed => MendelianDecision::Skipped,
        })
        .collect()
}

fn not_assessed_parent(reason: ExclusionReason) -> MendelianDecision {
    match reason {
        ExclusionReason::NoCall => MendelianDecision::NoCallParent,
        _ => MendelianDecision::Skipped,
    }
}

fn not_assessed_child(reason: ExclusionReason) -> MendelianDecision {
    match reason {
        ExclusionReason::NoCall => MendelianDecision::NoCallChild,
        _ => MendelianDecision::Skipped,
    }
}

/// The stronger of the child's two parent comparisons
fn best_status(a: MatchStatus, b: MatchStatus) -> MatchStatus {
    let rank = |status: MatchStatus| match status {
        MatchStatus::NotAssessed => 0,
        MatchStatus::NoMatch => 1,
        MatchStatus::AlleleMatch => 2,
        MatchStatus::GenotypeMatch => 3,
    };
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}

/// Label calls and attach Mendelian decisions, matched by variant id
fn annotate(
    calls: ChromosomeCalls,
    statuses: &[MatchStatus],
    decisions: &[MendelianDecision],
    not_assessed: fn(ExclusionReason) -> MendelianDecision,
) -> Vec<LabelledVariant> {
    let mut by_id: Vec<(usize, MendelianDecision)> = calls
        .assessed
        .iter()
        .map(|v| v.id)
        .zip(decisions.iter().copied())
        .chain(
            calls
                .not_assessed
                .iter()
                .map(|(v, reason)| (v.id, not_assessed(*reason))),
        )
        .collect();
    by_id.sort_unstable_by_key(|(id, _)| *id);

    let mut labelled = label(calls, statuses);
    for call in &mut labelled {
        if let Ok(k) = by_id.binary_search_by_key(&call.variant.id, |(id, _)| *id) {
            call.mendelian = Some(by_id[k].1);
        }
    }
    labelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::provider::admit;
    use crate::core::contig::Contig;
    use crate::core::variant::Genotype;

    fn reference() -> Reference {
        Reference::new(vec![Contig::new("chr1", 0, b"ACGT".repeat(50))])
    }

    fn variant(id: usize, position: u64, gt: &str) -> Variant {
        Variant::new(
            id,
            "chr1",
            position,
            "A",
            vec!["G".to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    fn run(mother: Vec<Variant>, father: Vec<Variant>, child: Vec<Variant>) -> TrioReport {
        let reference = reference();
        let config = ComparisonConfig::default();
        let calls = TrioCalls {
            mother: admit(mother, &reference, &config, None),
            father: admit(father, &reference, &config, None),
            child: admit(child, &reference, &config, None),
        };
        compare_trio(&reference, calls, &config)
    }

    fn child_decisions(report: &TrioReport) -> Vec<Option<MendelianDecision>> {
        report.chromosomes[0]
            .child
            .iter()
            .map(|c| c.mendelian)
            .collect()
    }

    #[test]
    fn test_inherited_het() {
        let report = run(vec![], vec![variant(0, 100, "0/1")], vec![variant(0, 100, "0/1")]);
        assert!(report.is_complete());
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::Compliant)]
        );
        let father = &report.chromosomes[0].father[0];
        assert_eq!(father.mendelian, Some(MendelianDecision::Compliant));
        assert_eq!(father.status, MatchStatus::GenotypeMatch);
    }

    #[test]
    fn test_de_novo_is_violation() {
        let report = run(vec![], vec![], vec![variant(0, 100, "0/1")]);
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::Violation)]
        );
        assert_eq!(report.stats.child.violation, 1);
    }

    #[test]
    fn test_hom_alt_child_needs_both_parents() {
        let report = run(
            vec![variant(0, 100, "0/1")],
            vec![variant(0, 100, "0/1")],
            vec![variant(0, 100, "1/1")],
        );
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::Compliant)]
        );
        assert_eq!(report.chromosomes[0].child[0].status, MatchStatus::AlleleMatch);
    }

    fn multiallelic(alts: &[&str], gt: &str) -> Variant {
        Variant::new(
            0,
            "chr1",
            100,
            "A",
            alts.iter().map(|a| (*a).to_string()).collect(),
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_child_alleles_must_come_from_different_parents() {
        let report = run(
            vec![variant(0, 100, "0/1")],
            vec![variant(0, 100, "0/1")],
            vec![multiallelic(&["G", "T"], "1/2")],
        );
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::Violation)]
        );

        let report = run(
            vec![variant(0, 100, "0/1")],
            vec![multiallelic(&["T"], "0/1")],
            vec![multiallelic(&["G", "T"], "1/2")],
        );
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::Compliant)]
        );
    }

    #[test]
    fn test_parent_only_calls() {
        let report = run(
            vec![variant(0, 100, "1/1")],
            vec![variant(0, 120, "0/1")],
            vec![variant(0, 140, "0/1"), variant(1, 160, "./.")],
        );
        let chromosome = &report.chromosomes[0];
        assert_eq!(chromosome.mother[0].mendelian, Some(MendelianDecision::Violation));
        assert_eq!(chromosome.father[0].mendelian, Some(MendelianDecision::Compliant));
        assert_eq!(
            child_decisions(&report),
            vec![
                Some(MendelianDecision::Violation),
                Some(MendelianDecision::NoCallChild)
            ]
        );
    }

    #[test]
    fn test_parent_no_call() {
        let report = run(
            vec![variant(0, 100, "./.")],
            vec![variant(0, 100, "0/1")],
            vec![variant(0, 100, "0/1")],
        );
        assert_eq!(
            child_decisions(&report),
            vec![Some(MendelianDecision::NoCallParent)]
        );
    }
}
