use std::cmp::Ordering;

use crate::core::types::{MatchMode, Side};
use crate::core::variant::Variant;
use crate::matching::engine::EngineError;
use crate::matching::oriented::OrientedVariant;
use crate::matching::semipath::{step_pair, Extension, SemiPath};

/// A joint replay of base and called decisions.
///
/// Paths compare equal when their replay states are interchangeable, regardless
/// of which decisions led there; the search keeps only the better of two equal paths.
#[derive(Debug, Clone)]
pub struct Path<'a> {
    pub base: SemiPath<'a>,
    pub called: SemiPath<'a>,
    /// Template positions where both sides were level since the last commit
    sync_points: Vec<i64>,
    base_since_sync: usize,
    called_since_sync: usize,
}

impl<'a> Path<'a> {
    pub fn new(reference: &'a [u8]) -> Self {
        Self {
            base: SemiPath::new(Side::Base, reference),
            called: SemiPath::new(Side::Called, reference),
            sync_points: Vec::new(),
            base_since_sync: 0,
            called_since_sync: 0,
        }
    }

    #[must_use]
    pub fn semipath(&self, side: Side) -> &SemiPath<'a> {
        match side {
            Side::Base => &self.base,
            Side::Called => &self.called,
        }
    }

    pub fn semipath_mut(&mut self, side: Side) -> &mut SemiPath<'a> {
        match side {
            Side::Base => &mut self.base,
            Side::Called => &mut self.called,
        }
    }

    /// Both sides sit on the same reference base with no variant still open
    #[must_use]
    pub fn in_sync(&self) -> bool {
        self.called.compare_haplotype_positions() == Ordering::Equal
            && self.base.compare_haplotype_positions() == Ordering::Equal
            && self.called.position() == self.base.position()
            && self.called.position() >= self.called.variant_end()
            && self.base.position() >= self.base.variant_end()
            && self.called.is_on_template()
            && self.base.is_on_template()
    }

    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.base.has_finished() && self.called.has_finished()
    }

    /// Only one side has included anything since the last sync point
    #[must_use]
    pub fn has_no_operation(&self) -> bool {
        (self.base_since_sync == 0 && self.called_since_sync > 0)
            || (self.called_since_sync == 0 && self.base_since_sync > 0)
    }

    #[must_use]
    pub fn since_sync(&self, side: Side) -> usize {
        match side {
            Side::Base => self.base_since_sync,
            Side::Called => self.called_since_sync,
        }
    }

    #[must_use]
    pub fn sync_points(&self) -> &[i64] {
        &self.sync_points
    }

    pub fn record_sync(&mut self, position: i64) {
        self.sync_points.push(position);
        self.base_since_sync = 0;
        self.called_since_sync = 0;
    }

    pub fn take_sync_points(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.sync_points)
    }

    #[must_use]
    pub fn total_included(&self) -> usize {
        self.base.included().len() + self.called.included().len()
    }

    pub fn step(&mut self) {
        step_pair(&mut self.called, &mut self.base);
    }

    #[must_use]
    pub fn matches(&self) -> bool {
        self.called.matches(&self.base)
    }

    pub fn move_forward(&mut self, position: i64) {
        self.base.move_forward(position);
        self.called.move_forward(position);
    }

    /// Children of this path for the next decision on `side`: exclusion
    /// first, then each orientation that fits after the included alleles
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDecision`] when `index` is out of replay order.
    pub fn branch(
        &self,
        side: Side,
        index: usize,
        variant: &'a Variant,
        mode: MatchMode,
    ) -> Result<Vec<Self>, EngineError> {
        let mut parent = self.clone();
        if parent.in_sync() {
            let position = parent.called.position();
            parent.record_sync(position);
        }

        let candidates = OrientedVariant::candidates(index, variant, mode);
        let mut children = Vec::with_capacity(candidates.len() + 1);

        let mut excluded = parent.clone();
        *excluded.semipath_mut(side) =
            parent.semipath(side).extend(index, variant, Extension::Exclude)?;
        children.push(excluded);

        for oriented in candidates {
            if !parent.semipath(side).is_new(&oriented) {
                continue;
            }
            let mut included = parent.clone();
            *included.semipath_mut(side) =
                parent.semipath(side).extend(index, variant, Extension::Include(oriented))?;
            match side {
                Side::Base => included.base_since_sync += 1,
                Side::Called => included.called_since_sync += 1,
            }
            children.push(included);
        }

        Ok(children)
    }

    /// Tie-break between two paths reaching the same replay state.
    ///
    /// Order of preference: at a sync point, a path where only one side did
    /// anything loses; then more included variants; then the smaller base/called
    /// imbalance since the last sync; then the later last sync point; then the
    /// lower allele slot of the last included variant. Otherwise the incumbent stays.
    #[must_use]
    pub fn is_better_than(&self, other: &Self) -> bool {
        let self_settled = self.in_sync() || self.has_finished();
        let other_settled = other.in_sync() || other.has_finished();
        if self_settled && other_settled {
            if self.has_no_operation() {
                return false;
            }
            if other.has_no_operation() {
                return true;
            }
        }

        let (ours, theirs) = (self.total_included(), other.total_included());
        if ours != theirs {
            return ours > theirs;
        }

        let (Some(our_last), Some(their_last)) = (self.last_included(), other.last_included())
        else {
            return false;
        };

        let our_delta = self.base_since_sync.abs_diff(self.called_since_sync);
        let their_delta = other.base_since_sync.abs_diff(other.called_since_sync);
        if our_delta != their_delta {
            return our_delta < their_delta;
        }

        let our_sync = self.sync_points.last().copied().unwrap_or(0);
        let their_sync = other.sync_points.last().copied().unwrap_or(0);
        if our_sync != their_sync {
            return our_sync > their_sync;
        }

        our_last.allele_index() < their_last.allele_index()
    }

    fn last_included(&self) -> Option<&OrientedVariant<'a>> {
        self.called
            .last_included()
            .or_else(|| self.base.last_included())
    }
}

impl PartialEq for Path<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Path<'_> {}

impl PartialOrd for Path<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.called
            .compare(&other.called)
            .then_with(|| self.base.compare(&other.base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::Genotype;

    fn variant(position: u64, alt: &str, gt: &str) -> Variant {
        Variant::new(
            0,
            "chr1",
            position,
            "A",
            vec![alt.to_string()],
            Genotype::parse(gt).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_branch_counts() {
        let reference = b"CCCCCACCCC";
        let het = variant(5, "G", "0/1");
        let hom = variant(5, "G", "1/1");
        let path = Path::new(reference);

        let children = path.branch(Side::Called, 0, &het, MatchMode::Genotype).unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].called.excluded(), &[0]);
        assert_eq!(children[1].since_sync(Side::Called), 1);

        let children = path.branch(Side::Base, 0, &hom, MatchMode::Genotype).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[1].has_no_operation());
    }

    #[test]
    fn test_prefers_more_inclusions() {
        let reference = b"CCCCCACCCC";
        let hom = variant(5, "G", "1/1");
        let path = Path::new(reference);

        let called = path.branch(Side::Called, 0, &hom, MatchMode::Genotype).unwrap();
        let both = called[1]
            .branch(Side::Base, 0, &hom, MatchMode::Genotype)
            .unwrap();
        let excluded_both = called[0]
            .branch(Side::Base, 0, &hom, MatchMode::Genotype)
            .unwrap();

        assert!(both[1].is_better_than(&excluded_both[0]));
        assert!(!excluded_both[0].is_better_than(&both[1]));
    }

    #[test]
    fn test_ordering_is_replay_state() {
        let reference = b"CCCCCACCCC";
        let mut a = Path::new(reference);
        let mut b = Path::new(reference);
        assert_eq!(a, b);
        a.step();
        assert!(b < a);
        b.step();
        assert_eq!(a, b);
        assert!(a.in_sync());
    }
}
