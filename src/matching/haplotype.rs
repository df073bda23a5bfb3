use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::matching::oriented::OrientedVariant;

/// Cursor over one haplotype: the reference with a queue of alleles applied.
///
/// The cursor starts one base before the reference. Each [`next`](Self::next)
/// moves to the following base of the edited sequence, entering an allele when
/// the template reaches its start and resuming the template at its end.
#[derive(Debug, Clone)]
pub struct HaplotypeCursor<'a> {
    reference: &'a [u8],
    template_position: i64,
    /// Offset inside the current allele, `None` while on the reference
    position_in_allele: Option<usize>,
    current: Option<OrientedVariant<'a>>,
    queue: VecDeque<OrientedVariant<'a>>,
    last_allele_end: i64,
}

impl<'a> HaplotypeCursor<'a> {
    pub fn new(reference: &'a [u8]) -> Self {
        Self {
            reference,
            template_position: -1,
            position_in_allele: None,
            current: None,
            queue: VecDeque::new(),
            last_allele_end: -1,
        }
    }

    /// Queue the first-haplotype allele of `variant`. Reference alleles and
    /// edits that change nothing are dropped.
    pub fn add_allele(&mut self, variant: OrientedVariant<'a>) {
        let allele = variant.allele();
        if allele.ignored || allele.is_empty_edit() {
            return;
        }
        self.last_allele_end = allele.end as i64;
        if self.current.is_none() {
            self.current = Some(variant);
        } else {
            self.queue.push_back(variant);
        }
    }

    /// Whether the allele this orientation puts on this haplotype can follow
    /// the ones already queued
    #[must_use]
    pub fn accepts(&self, variant: &OrientedVariant<'a>) -> bool {
        let allele = variant.allele();
        let start = allele.start as i64;
        allele.ignored
            || (start >= self.last_allele_end
                && (!self.is_on_template() || start > self.template_position))
    }

    /// More bases remain: reference, the current allele, or an allele queued
    /// after the last reference base
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.template_position < self.reference.len() as i64 - 1
            || !self.is_on_template()
            || self.current.is_some()
    }

    #[must_use]
    pub fn is_on_template(&self) -> bool {
        self.position_in_allele.is_none()
    }

    #[must_use]
    pub fn template_position(&self) -> i64 {
        self.template_position
    }

    /// Advance one base along the edited sequence
    pub fn next(&mut self) {
        match self.position_in_allele {
            None => {
                self.template_position += 1;
                if let Some(current) = self.current {
                    if current.allele().start as i64 == self.template_position {
                        self.position_in_allele = Some(0);
                    }
                }
            }
            Some(offset) => self.position_in_allele = Some(offset + 1),
        }

        while let (Some(offset), Some(current)) = (self.position_in_allele, self.current) {
            let allele = current.allele();
            if offset < allele.sequence.len() {
                break;
            }
            // Allele exhausted: resume the template at its end
            self.template_position = allele.end as i64;
            self.position_in_allele = None;
            self.current = self.queue.pop_front();
            match self.current {
                Some(next) if next.allele().start as i64 <= self.template_position => {
                    self.position_in_allele = Some(0);
                }
                _ => break,
            }
        }
    }

    /// Base at the cursor, `None` before the start or past the end of the reference
    #[must_use]
    pub fn next_base(&self) -> Option<u8> {
        let base = match (self.position_in_allele, self.current) {
            (Some(offset), Some(current)) => current.allele().sequence.get(offset).copied(),
            _ => usize::try_from(self.template_position)
                .ok()
                .and_then(|p| self.reference.get(p).copied()),
        };
        base.map(|b| b.to_ascii_uppercase())
    }

    /// Jump along the reference so the cursor sits on `position`.
    /// Only meaningful while on the template.
    pub fn move_forward(&mut self, position: i64) {
        debug_assert!(self.is_on_template());
        self.template_position = position - 1;
        self.next();
    }

    /// Drop all pending alleles and place the cursor on `position`
    pub fn reset_to(&mut self, position: i64) {
        self.current = None;
        self.queue.clear();
        self.position_in_allele = None;
        self.template_position = position - 1;
        self.next();
    }

    /// False while bases of queued alleles are still to be emitted
    #[must_use]
    pub fn wants_future_variant_bases(&self) -> bool {
        let Some(current) = self.current else {
            return true;
        };
        if let Some(offset) = self.position_in_allele {
            if offset + 1 < current.allele().sequence.len() {
                return false;
            }
        }
        !self.queue.iter().any(|v| !v.allele().sequence.is_empty())
    }

    /// Replay-state ordering: less advanced cursors sort first
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.template_position
            .cmp(&other.template_position)
            .then_with(|| self.current.is_some().cmp(&other.current.is_some()))
            .then_with(|| self.current.cmp(&other.current))
            .then_with(|| self.position_in_allele.cmp(&other.position_in_allele))
            .then_with(|| self.queue.iter().cmp(other.queue.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MatchMode;
    use crate::core::variant::{Genotype, Variant};

    fn hom(position: u64, ref_seq: &str, alt: &str) -> Variant {
        Variant::new(
            0,
            "chr1",
            position,
            ref_seq,
            vec![alt.to_string()],
            Genotype::parse("1/1").unwrap(),
            true,
        )
        .unwrap()
    }

    fn replay(cursor: &mut HaplotypeCursor<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        while cursor.has_next() || !cursor.is_on_template() {
            cursor.next();
            if let Some(b) = cursor.next_base() {
                out.push(b);
            }
        }
        out
    }

    #[test]
    fn test_reference_only() {
        let mut cursor = HaplotypeCursor::new(b"ACGT");
        assert_eq!(cursor.next_base(), None);
        assert_eq!(replay(&mut cursor), b"ACGT");
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_snp_and_insertion() {
        let snp = hom(1, "C", "T");
        let ins = hom(2, "G", "GAA");
        let mut cursor = HaplotypeCursor::new(b"ACGT");
        cursor.add_allele(OrientedVariant::candidates(0, &snp, MatchMode::Genotype)[0]);
        cursor.add_allele(OrientedVariant::candidates(1, &ins, MatchMode::Genotype)[0]);
        assert_eq!(replay(&mut cursor), b"ATGAAT");
    }

    #[test]
    fn test_insertion_after_last_base() {
        let ins = hom(3, "T", "TAA");
        let mut cursor = HaplotypeCursor::new(b"ACGT");
        cursor.add_allele(OrientedVariant::candidates(0, &ins, MatchMode::Genotype)[0]);
        assert_eq!(replay(&mut cursor), b"ACGTAA");
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_deletion() {
        let del = hom(0, "ACG", "A");
        let mut cursor = HaplotypeCursor::new(b"ACGT");
        let oriented = OrientedVariant::candidates(0, &del, MatchMode::Genotype)[0];
        assert!(cursor.accepts(&oriented));
        cursor.add_allele(oriented);
        assert_eq!(replay(&mut cursor), b"AT");
    }

    #[test]
    fn test_overlapping_allele_rejected() {
        let del = hom(0, "ACG", "A");
        let snp = hom(1, "C", "T");
        let mut cursor = HaplotypeCursor::new(b"ACGT");
        cursor.add_allele(OrientedVariant::candidates(0, &del, MatchMode::Genotype)[0]);
        assert!(!cursor.accepts(&OrientedVariant::candidates(1, &snp, MatchMode::Genotype)[0]));
    }

    #[test]
    fn test_move_forward_and_compare() {
        let mut a = HaplotypeCursor::new(b"ACGTACGT");
        let mut b = a.clone();
        a.move_forward(4);
        assert_eq!(a.template_position(), 4);
        assert_eq!(a.next_base(), Some(b'A'));
        assert_eq!(b.compare(&a), Ordering::Less);
        b.reset_to(4);
        assert_eq!(b.compare(&a), Ordering::Equal);
    }
}
