//! One side's replay: include/exclude decisions over its variant stream and
//! the two haplotypes they imply.
//!
//! [`SemiPath::extend`] is how a path branches. The search compares sides one
//! base at a time with [`SemiPath::matches`]; [`SemiPath::sequence_matches`]
//! runs the same comparison to a target position in one call.

use std::cmp::Ordering;

use crate::core::types::Side;
use crate::core::variant::Variant;
use crate::matching::engine::EngineError;
use crate::matching::haplotype::HaplotypeCursor;
use crate::matching::oriented::OrientedVariant;

/// Include or exclude choice for one variant
#[derive(Debug, Clone, Copy)]
pub enum Extension<'a> {
    Include(OrientedVariant<'a>),
    Exclude,
}

/// One side's decisions so far, replayed as two haplotypes over the reference
#[derive(Debug, Clone)]
pub struct SemiPath<'a> {
    side: Side,
    last_index: Option<usize>,
    last_start: Option<u64>,
    /// Furthest end of any decided variant
    variant_end: i64,
    /// Furthest end of any included variant
    included_end: i64,
    included: Vec<OrientedVariant<'a>>,
    excluded: Vec<usize>,
    haplotype_a: HaplotypeCursor<'a>,
    haplotype_b: HaplotypeCursor<'a>,
    finished_a: bool,
    finished_b: bool,
}

impl<'a> SemiPath<'a> {
    pub fn new(side: Side, reference: &'a [u8]) -> Self {
        Self {
            side,
            last_index: None,
            last_start: None,
            variant_end: 0,
            included_end: 0,
            included: Vec::new(),
            excluded: Vec::new(),
            haplotype_a: HaplotypeCursor::new(reference),
            haplotype_b: HaplotypeCursor::new(reference),
            finished_a: false,
            finished_b: false,
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Index of the first variant not yet decided
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.last_index.map_or(0, |i| i + 1)
    }

    /// Furthest template position reached by either haplotype
    #[must_use]
    pub fn position(&self) -> i64 {
        self.haplotype_a
            .template_position()
            .max(self.haplotype_b.template_position())
    }

    #[must_use]
    pub fn variant_end(&self) -> i64 {
        self.variant_end
    }

    #[must_use]
    pub fn included(&self) -> &[OrientedVariant<'a>] {
        &self.included
    }

    #[must_use]
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    #[must_use]
    pub fn last_included(&self) -> Option<&OrientedVariant<'a>> {
        self.included.last()
    }

    /// Move decided variants out, leaving the replay state untouched
    pub fn take_decisions(&mut self) -> (Vec<OrientedVariant<'a>>, Vec<usize>) {
        (
            std::mem::take(&mut self.included),
            std::mem::take(&mut self.excluded),
        )
    }

    /// Whether `variant` can be included without overlapping an included allele
    #[must_use]
    pub fn is_new(&self, variant: &OrientedVariant<'a>) -> bool {
        if variant.start() as i64 >= self.included_end
            && self.haplotype_a.is_on_template()
            && self.haplotype_b.is_on_template()
            && variant.start() as i64 > self.position()
        {
            return true;
        }
        self.haplotype_a.accepts(variant) && self.haplotype_b.accepts(&variant.other())
    }

    fn check_order(&self, index: usize, variant: &Variant) -> Result<(), EngineError> {
        let behind_index = self.last_index.is_some_and(|last| index <= last);
        let behind_start = self.last_start.is_some_and(|start| variant.start < start);
        if behind_index || behind_start {
            return Err(EngineError::InvalidDecision {
                side: self.side,
                index,
                position: variant.start,
                frontier: self.last_start.unwrap_or(0),
            });
        }
        Ok(())
    }

    fn record_decision(&mut self, index: usize, variant: &Variant) {
        self.last_index = Some(index);
        self.last_start = Some(variant.start);
        self.variant_end = self.variant_end.max(variant.end as i64);
    }

    /// Add `variant` to both haplotypes in its orientation
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDecision`] if the variant precedes the last
    /// decision or overlaps an allele already included.
    pub fn include(&mut self, variant: OrientedVariant<'a>) -> Result<(), EngineError> {
        self.check_order(variant.index, variant.variant())?;
        if !self.is_new(&variant) {
            return Err(EngineError::InvalidDecision {
                side: self.side,
                index: variant.index,
                position: variant.start(),
                frontier: u64::try_from(self.included_end).unwrap_or(0),
            });
        }
        self.haplotype_a.add_allele(variant);
        self.haplotype_b.add_allele(variant.other());
        self.included.push(variant);
        self.included_end = self.included_end.max(variant.end() as i64);
        self.record_decision(variant.index, variant.variant());
        Ok(())
    }

    /// Leave `variant` out of the replayed sequence
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDecision`] if the variant precedes the last decision.
    pub fn exclude(&mut self, index: usize, variant: &Variant) -> Result<(), EngineError> {
        self.check_order(index, variant)?;
        self.excluded.push(index);
        self.record_decision(index, variant);
        Ok(())
    }

    /// Copy of this semi-path with one more decision applied
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDecision`] for a decision out of replay order.
    pub fn extend(
        &self,
        index: usize,
        variant: &Variant,
        extension: Extension<'a>,
    ) -> Result<Self, EngineError> {
        let mut next = self.clone();
        match extension {
            Extension::Include(oriented) => next.include(oriented)?,
            Extension::Exclude => next.exclude(index, variant)?,
        }
        Ok(next)
    }

    /// Mark variants up to `index` as skipped without deciding them
    pub fn skip_past(&mut self, index: usize, start: u64) {
        if index + 1 > self.next_index() {
            self.last_index = Some(index);
            self.last_start = Some(start);
        }
    }

    #[must_use]
    pub fn is_on_template(&self) -> bool {
        self.haplotype_a.is_on_template() && self.haplotype_b.is_on_template()
    }

    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.finished_a && self.finished_b
    }

    #[must_use]
    pub fn compare_haplotype_positions(&self) -> Ordering {
        self.haplotype_a
            .template_position()
            .cmp(&self.haplotype_b.template_position())
    }

    pub fn step_a(&mut self) {
        if self.haplotype_a.has_next() {
            self.haplotype_a.next();
        } else {
            self.finished_a = true;
        }
    }

    pub fn step_b(&mut self) {
        if self.haplotype_b.has_next() {
            self.haplotype_b.next();
        } else {
            self.finished_b = true;
        }
    }

    #[must_use]
    pub fn wants_future_variant_bases(&self) -> bool {
        self.haplotype_a.wants_future_variant_bases() && self.haplotype_b.wants_future_variant_bases()
    }

    pub fn move_forward(&mut self, position: i64) {
        self.haplotype_a.move_forward(position);
        self.haplotype_b.move_forward(position);
    }

    /// Abandon pending alleles and restart both haplotypes at `position`
    pub fn reset_to(&mut self, position: i64) {
        self.haplotype_a.reset_to(position);
        self.haplotype_b.reset_to(position);
        self.finished_a = false;
        self.finished_b = false;
    }

    /// Next bases agree on both haplotype pairs; a finished haplotype only
    /// agrees with one that emits nothing
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.base_a() == other.base_a() && self.base_b() == other.base_b()
    }

    fn base_a(&self) -> Option<u8> {
        if self.finished_a {
            None
        } else {
            self.haplotype_a.next_base()
        }
    }

    fn base_b(&self) -> Option<u8> {
        if self.finished_b {
            None
        } else {
            self.haplotype_b.next_base()
        }
    }

    /// Replay both semi-paths in lock-step and check that their sequences agree
    /// until both reach `upto` on the reference
    #[must_use]
    pub fn sequence_matches(&self, other: &Self, upto: i64) -> bool {
        let mut lead = self.clone();
        let mut follower = other.clone();
        loop {
            if !lead.matches(&follower) {
                return false;
            }
            let reached = lead.position() >= upto
                && follower.position() >= upto
                && lead.is_on_template()
                && follower.is_on_template();
            if reached || (lead.has_finished() && follower.has_finished()) {
                return true;
            }
            step_pair(&mut lead, &mut follower);
        }
    }

    /// Replay-state ordering used to merge equivalent paths
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.haplotype_a
            .compare(&other.haplotype_a)
            .then_with(|| self.haplotype_b.compare(&other.haplotype_b))
    }
}

/// Advance the lagging haplotype of `lead` (both when level) and the same
/// haplotype of `follower`, keeping their emitted sequences aligned
pub fn step_pair(lead: &mut SemiPath<'_>, follower: &mut SemiPath<'_>) {
    match lead.compare_haplotype_positions() {
        Ordering::Greater => {
            lead.step_b();
            follower.step_b();
        }
        Ordering::Less => {
            lead.step_a();
            follower.step_a();
        }
        Ordering::Equal => {
            lead.step_a();
            lead.step_b();
            follower.step_a();
            follower.step_b();
        }
    }
}
