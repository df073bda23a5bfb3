use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::{
    ComparisonConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_PATH_SIZE, DEFAULT_MAX_SINCE_SYNC,
};
use crate::core::contig::Contig;
use crate::core::types::{DecisionLabel, MatchMode, Side};
use crate::core::variant::Variant;
use crate::matching::path::Path;
use crate::matching::sync_point::{build_sync_points, is_partition, SideDecisions, SyncPoint};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{side} variant {index} at {position} decided out of order (frontier at {frontier})")]
    InvalidDecision {
        side: Side,
        index: usize,
        position: u64,
        frontier: u64,
    },

    #[error("search on {chromosome} exceeded {limit} iterations in one region ({iterations} run)")]
    SearchBoundExceeded {
        chromosome: String,
        iterations: usize,
        limit: usize,
    },
}

/// Bounds on the path search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Live paths allowed before the current region is skipped
    pub max_path_size: usize,
    /// Search steps allowed between two commits before the chromosome is abandoned
    pub max_iterations: usize,
    /// Inclusions one side may make between sync points before a branch is pruned
    pub max_since_sync: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_path_size: DEFAULT_MAX_PATH_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_since_sync: DEFAULT_MAX_SINCE_SYNC,
        }
    }
}

impl From<&ComparisonConfig> for SearchLimits {
    fn from(config: &ComparisonConfig) -> Self {
        Self {
            max_path_size: config.max_path_size,
            max_iterations: config.max_iterations,
            max_since_sync: config.max_since_sync,
        }
    }
}

/// Counters describing how hard a chromosome was to reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub max_paths: usize,
    pub complex_regions: usize,
    pub skipped_variants: usize,
    pub pruned_branches: usize,
}

impl SearchStats {
    pub fn merge(&mut self, other: &Self) {
        self.iterations += other.iterations;
        self.max_paths = self.max_paths.max(other.max_paths);
        self.complex_regions += other.complex_regions;
        self.skipped_variants += other.skipped_variants;
        self.pruned_branches += other.pruned_branches;
    }
}

/// Outcome of reconciling one chromosome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromosomeComparison {
    pub chromosome: String,
    pub length: u64,
    pub sync_points: Vec<SyncPoint>,
    pub base: SideDecisions,
    pub called: SideDecisions,
    pub stats: SearchStats,
}

impl ChromosomeComparison {
    /// Decision label of the variant at `index` on `side`
    #[must_use]
    pub fn label(&self, side: Side, index: usize) -> DecisionLabel {
        let decisions = match side {
            Side::Base => &self.base,
            Side::Called => &self.called,
        };
        if decisions.included.binary_search(&index).is_ok() {
            DecisionLabel::Matched
        } else if decisions.excluded.binary_search(&index).is_ok() {
            DecisionLabel::Unmatched
        } else {
            DecisionLabel::Unresolved
        }
    }
}

/// Reconciles base and called variants of one chromosome by replaying them
/// against the reference.
///
/// The search keeps an ordered set of live [`Path`]s and always advances the
/// least advanced one. Whenever a single path survives, its decisions are
/// committed; regions where the set grows past `max_path_size` are skipped and
/// their variants reported as unresolved.
pub struct ComparisonEngine {
    limits: SearchLimits,
}

impl ComparisonEngine {
    #[must_use]
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Reconcile `base` against `called` on `contig`.
    ///
    /// Both lists must be sorted by start and lie within the contig.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SearchBoundExceeded`] when a region needs more than
    /// `max_iterations` steps, and [`EngineError::InvalidDecision`] if the input
    /// order is violated.
    pub fn compare<'a>(
        &self,
        contig: &'a Contig,
        base: &[&'a Variant],
        called: &[&'a Variant],
        mode: MatchMode,
    ) -> Result<ChromosomeComparison, EngineError> {
        let search = Search {
            chromosome: &contig.name,
            reference: &contig.sequence,
            base,
            called,
            mode,
            limits: self.limits,
            frontier: BTreeSet::new(),
            current_position: -1,
            committed_positions: Vec::new(),
            committed_base: SideDecisions::default(),
            committed_called: SideDecisions::default(),
            stats: SearchStats::default(),
        };
        search.run()
    }
}

struct Search<'s, 'a> {
    chromosome: &'s str,
    reference: &'a [u8],
    base: &'s [&'a Variant],
    called: &'s [&'a Variant],
    mode: MatchMode,
    limits: SearchLimits,
    frontier: BTreeSet<Path<'a>>,
    /// Furthest variant start handed to the search
    current_position: i64,
    committed_positions: Vec<i64>,
    committed_base: SideDecisions,
    committed_called: SideDecisions,
    stats: SearchStats,
}

impl<'s, 'a> Search<'s, 'a> {
    fn run(mut self) -> Result<ChromosomeComparison, EngineError> {
        let mut last_committed = Path::new(self.reference);
        self.frontier.insert(last_committed.clone());

        let mut finished: Option<Path<'a>> = None;
        let mut region_iterations = 0usize;
        let mut region_paths = 0usize;
        let mut dead_end_at: Option<i64> = None;

        let mut best = loop {
            while let Some(mut path) = self.frontier.pop_first() {
                self.stats.iterations += 1;
                region_iterations += 1;
                if region_iterations > self.limits.max_iterations {
                    return Err(self.bound_exceeded());
                }
                region_paths = region_paths.max(self.frontier.len() + 1);

                if self.frontier.is_empty() && finished.is_none() {
                    self.commit(&mut path);
                    last_committed = path.clone();
                    self.stats.max_paths = self.stats.max_paths.max(region_paths);
                    region_iterations = 0;
                    region_paths = 0;
                } else if self.frontier.len() > self.limits.max_path_size {
                    path = self.skip_complex_region(&last_committed);
                    region_iterations = 0;
                }

                if path.has_finished() {
                    let position = path.called.position();
                    path.record_sync(position);
                    finished = match finished {
                        Some(current) if !path.is_better_than(&current) => Some(current),
                        _ => Some(path),
                    };
                    continue;
                }

                if self.enqueue(&path, Side::Called)? || self.enqueue(&path, Side::Base)? {
                    continue;
                }

                path.step();
                if path.in_sync() {
                    self.skip_to_next_variant(&mut path);
                }
                if path.matches() {
                    self.add_if_better(path);
                }
            }

            if let Some(found) = finished.take() {
                break found;
            }

            // Every live path was pruned: give up on the open region
            if dead_end_at == Some(self.current_position) {
                return Err(self.bound_exceeded());
            }
            dead_end_at = Some(self.current_position);
            let restored = self.skip_complex_region(&last_committed);
            self.frontier.insert(restored);
        };

        self.commit(&mut best);
        self.stats.max_paths = self.stats.max_paths.max(region_paths);
        self.skip_unvisited(&best, Side::Base);
        self.skip_unvisited(&best, Side::Called);
        Ok(self.finish())
    }

    fn variants(&self, side: Side) -> &'s [&'a Variant] {
        match side {
            Side::Base => self.base,
            Side::Called => self.called,
        }
    }

    fn committed(&mut self, side: Side) -> &mut SideDecisions {
        match side {
            Side::Base => &mut self.committed_base,
            Side::Called => &mut self.committed_called,
        }
    }

    fn bound_exceeded(&self) -> EngineError {
        EngineError::SearchBoundExceeded {
            chromosome: self.chromosome.to_string(),
            iterations: self.stats.iterations,
            limit: self.limits.max_iterations,
        }
    }

    /// Offer the next variant of `side` to `path` if the replay has reached it
    fn enqueue(&mut self, path: &Path<'a>, side: Side) -> Result<bool, EngineError> {
        let semipath = path.semipath(side);
        let index = semipath.next_index();
        let Some(&variant) = self.variants(side).get(index) else {
            return Ok(false);
        };

        let start = variant.start as i64;
        let reached = start <= semipath.position() + 1
            || (semipath.wants_future_variant_bases() && start <= semipath.variant_end());
        if !reached {
            return Ok(false);
        }

        self.current_position = self.current_position.max(start);
        for child in path.branch(side, index, variant, self.mode)? {
            if child.since_sync(side) > self.limits.max_since_sync {
                self.stats.pruned_branches += 1;
                continue;
            }
            self.add_if_better(child);
        }
        Ok(true)
    }

    /// Keep one path per replay state, preferring the better of two equals
    fn add_if_better(&mut self, path: Path<'a>) {
        let keep = match self.frontier.take(&path) {
            Some(existing) if !path.is_better_than(&existing) => existing,
            _ => path,
        };
        self.frontier.insert(keep);
    }

    /// Jump over reference stretches with no pending variant on either side
    fn skip_to_next_variant(&self, path: &mut Path<'a>) {
        let last = self.reference.len() as i64 - 1;
        let upcoming = |variants: &[&Variant], next: usize| {
            variants.get(next).map_or(last, |v| v.start as i64)
        };
        let next = upcoming(self.called, path.called.next_index())
            .min(upcoming(self.base, path.base.next_index()))
            .min(last)
            - 1;
        if next > path.called.position() {
            path.move_forward(next);
        }
    }

    /// Move decisions of the sole surviving path into the committed lists
    fn commit(&mut self, path: &mut Path<'a>) {
        for side in [Side::Base, Side::Called] {
            let (included, excluded) = path.semipath_mut(side).take_decisions();
            let committed = self.committed(side);
            committed.included.extend(included.iter().map(|v| v.index));
            committed
                .slots
                .extend(included.iter().map(|v| (v.index, v.allele_index())));
            committed.excluded.extend(excluded);
        }
        self.committed_positions.extend(path.take_sync_points());
    }

    /// Drop the live set, restart from the last committed path and skip every
    /// variant handed out so far
    fn skip_complex_region(&mut self, last_committed: &Path<'a>) -> Path<'a> {
        self.stats.complex_regions += 1;
        warn!(
            chromosome = %self.chromosome,
            position = self.current_position + 1,
            live_paths = self.frontier.len(),
            "Skipping complex region"
        );
        self.frontier.clear();

        let mut path = last_committed.clone();
        let max_position = self.current_position + 1;
        self.skip_variants(&mut path, Side::Called, max_position);
        self.skip_variants(&mut path, Side::Base, max_position);

        let last = self.reference.len() as i64 - 1;
        let position = (max_position - 1).max(path.called.position()).min(last);
        path.base.reset_to(position);
        path.called.reset_to(position);
        path.record_sync(position);
        path
    }

    fn skip_variants(&mut self, path: &mut Path<'a>, side: Side, max_position: i64) {
        let variants = self.variants(side);
        let semipath = path.semipath_mut(side);
        let first = semipath.next_index();
        let count = variants[first.min(variants.len())..]
            .iter()
            .take_while(|v| (v.start as i64) < max_position)
            .count();
        if count == 0 {
            return;
        }

        let last = first + count - 1;
        semipath.skip_past(last, variants[last].start);
        self.stats.skipped_variants += count;
        self.committed(side).skipped.extend(first..=last);
        debug!(chromosome = %self.chromosome, %side, count, "Skipped variants");
    }

    /// Variants the finished replay never reached
    fn skip_unvisited(&mut self, best: &Path<'a>, side: Side) {
        let total = self.variants(side).len();
        let first = best.semipath(side).next_index();
        if first < total {
            self.stats.skipped_variants += total - first;
            self.committed(side).skipped.extend(first..total);
        }
    }

    fn finish(mut self) -> ChromosomeComparison {
        self.committed_base.sort();
        self.committed_called.sort();
        let length = self.reference.len() as u64;
        let sync_points = build_sync_points(
            &self.committed_positions,
            length,
            &self.committed_base,
            self.base,
            &self.committed_called,
            self.called,
        );
        debug_assert!(is_partition(&sync_points, length));

        info!(
            chromosome = %self.chromosome,
            sync_points = sync_points.len(),
            complex_regions = self.stats.complex_regions,
            skipped = self.stats.skipped_variants,
            max_paths = self.stats.max_paths,
            "Finished chromosome"
        );

        ChromosomeComparison {
            chromosome: self.chromosome.to_string(),
            length,
            sync_points,
            base: self.committed_base,
            called: self.committed_called,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::Genotype;

    fn reference() -> Contig {
        Contig::new("chr1", 0, b"ACGT".repeat(50))
    }

    fn variant(id: usize, position: u64, ref_seq: &str, alt: &str, gt: &str) -> Variant {
        Variant::new(
            id,
            "chr1",
            position,
            ref_seq,
            vec![alt.to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    fn run(contig: &Contig, base: &[Variant], called: &[Variant]) -> ChromosomeComparison {
        let base: Vec<&Variant> = base.iter().collect();
        let called: Vec<&Variant> = called.iter().collect();
        ComparisonEngine::new(SearchLimits::default())
            .compare(contig, &base, &called, MatchMode::Genotype)
            .unwrap()
    }

    #[test]
    fn test_identical_snp() {
        let contig = reference();
        // position 100 holds 'A'
        let snp = variant(0, 100, "A", "G", "0/1");
        let result = run(&contig, &[snp.clone()], &[snp]);

        assert_eq!(result.base.included, vec![0]);
        assert_eq!(result.called.included, vec![0]);
        assert_eq!(result.sync_points.len(), 1);
        assert_eq!(result.label(Side::Base, 0), DecisionLabel::Matched);
    }

    #[test]
    fn test_genotype_mismatch_is_unmatched() {
        let contig = reference();
        let base = variant(0, 100, "A", "G", "1/1");
        let called = variant(0, 100, "A", "G", "0/1");
        let result = run(&contig, &[base], &[called]);

        assert_eq!(result.base.excluded, vec![0]);
        assert_eq!(result.called.excluded, vec![0]);
        assert_eq!(result.label(Side::Called, 0), DecisionLabel::Unmatched);
    }

    #[test]
    fn test_insertions_after_last_base_are_compared() {
        let contig = Contig::new("chr1", 0, b"ACGTACGTAC".to_vec());
        let base = variant(0, 9, "C", "CTT", "1/1");
        let result = run(&contig, &[base.clone()], &[variant(0, 9, "C", "CGG", "1/1")]);
        assert_eq!(result.base.excluded, vec![0]);
        assert_eq!(result.called.excluded, vec![0]);

        let result = run(&contig, &[base.clone()], &[base.clone()]);
        assert_eq!(result.base.included, vec![0]);
        assert_eq!(result.called.included, vec![0]);

        let result = run(&contig, &[base], &[]);
        assert_eq!(result.base.excluded, vec![0]);
        assert!(is_partition(&result.sync_points, 10));
    }

    #[test]
    fn test_no_variants() {
        let contig = reference();
        let result = run(&contig, &[], &[]);
        assert_eq!(result.sync_points.len(), 1);
        assert_eq!(result.sync_points[0].end, 200);
        assert!(result.base.is_empty());
    }

    #[test]
    fn test_complex_region_is_skipped() {
        let contig = reference();
        let base: Vec<Variant> = (0..6)
            .map(|i| variant(i, 80 + 4 * i as u64, "A", "T", "0/1"))
            .collect();
        let called: Vec<Variant> = (0..6)
            .map(|i| variant(i, 80 + 4 * i as u64, "A", "T", "0/1"))
            .collect();
        let base_refs: Vec<&Variant> = base.iter().collect();
        let called_refs: Vec<&Variant> = called.iter().collect();

        let limits = SearchLimits {
            max_path_size: 1,
            ..SearchLimits::default()
        };
        let result = ComparisonEngine::new(limits)
            .compare(&contig, &base_refs, &called_refs, MatchMode::Genotype)
            .unwrap();

        assert!(result.stats.complex_regions > 0);
        assert!(result.sync_points.iter().any(|p| p.unresolved));
        assert_eq!(result.base.len(), 6);
        assert_eq!(result.called.len(), 6);
        assert!(is_partition(&result.sync_points, 200));
    }
}
