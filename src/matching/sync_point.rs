use serde::Serialize;

use crate::core::variant::Variant;

/// A reference interval at whose boundaries base and called replays agree.
///
/// Intervals are half-open and tile the chromosome. Variant identifiers are
/// indices into the per-chromosome variant lists handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPoint {
    pub index: usize,
    pub start: u64,
    pub end: u64,
    pub base_included: Vec<usize>,
    pub base_excluded: Vec<usize>,
    pub called_included: Vec<usize>,
    pub called_excluded: Vec<usize>,
    /// Some variants here were skipped rather than decided
    pub unresolved: bool,
}

impl SyncPoint {
    fn new(start: u64, end: u64) -> Self {
        Self {
            index: 0,
            start,
            end,
            base_included: Vec::new(),
            base_excluded: Vec::new(),
            called_included: Vec::new(),
            called_excluded: Vec::new(),
            unresolved: false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base_included.is_empty()
            && self.base_excluded.is_empty()
            && self.called_included.is_empty()
            && self.called_excluded.is_empty()
    }

    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.base_included.len()
            + self.base_excluded.len()
            + self.called_included.len()
            + self.called_excluded.len()
    }
}

/// Final decisions of one side for one chromosome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideDecisions {
    pub included: Vec<usize>,
    pub excluded: Vec<usize>,
    /// Variants dropped in complex regions
    pub skipped: Vec<usize>,
    /// Genotype slot replayed on the first haplotype of each included variant
    pub slots: Vec<(usize, usize)>,
}

impl SideDecisions {
    pub fn sort(&mut self) {
        self.included.sort_unstable();
        self.excluded.sort_unstable();
        self.skipped.sort_unstable();
        self.slots.sort_unstable();
    }

    /// Genotype slot through which included variant `index` was matched
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<usize> {
        self.slots
            .binary_search_by_key(&index, |&(i, _)| i)
            .ok()
            .map(|k| self.slots[k].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.included.len() + self.excluded.len() + self.skipped.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cut `[0, length)` after each sync position and attribute every variant to
/// the interval containing its start. Intervals holding no variant are folded
/// into their successor, or into their predecessor at the end of the chromosome.
#[must_use]
pub fn build_sync_points(
    positions: &[i64],
    length: u64,
    base: &SideDecisions,
    base_variants: &[&Variant],
    called: &SideDecisions,
    called_variants: &[&Variant],
) -> Vec<SyncPoint> {
    let mut ends: Vec<u64> = positions
        .iter()
        .filter_map(|&p| u64::try_from(p + 1).ok())
        .filter(|&end| end > 0 && end < length)
        .collect();
    ends.sort_unstable();
    ends.dedup();
    ends.push(length);

    let mut start = 0;
    let mut points: Vec<SyncPoint> = ends
        .iter()
        .map(|&end| {
            let point = SyncPoint::new(start, end);
            start = end;
            point
        })
        .collect();

    let locate = |position: u64| ends.partition_point(|&e| e <= position).min(ends.len() - 1);

    for &i in &base.included {
        points[locate(base_variants[i].start)].base_included.push(i);
    }
    for &i in &base.excluded {
        points[locate(base_variants[i].start)].base_excluded.push(i);
    }
    for &i in &base.skipped {
        let point = &mut points[locate(base_variants[i].start)];
        point.base_excluded.push(i);
        point.unresolved = true;
    }
    for &i in &called.included {
        points[locate(called_variants[i].start)].called_included.push(i);
    }
    for &i in &called.excluded {
        points[locate(called_variants[i].start)].called_excluded.push(i);
    }
    for &i in &called.skipped {
        let point = &mut points[locate(called_variants[i].start)];
        point.called_excluded.push(i);
        point.unresolved = true;
    }

    coalesce(points)
}

fn coalesce(points: Vec<SyncPoint>) -> Vec<SyncPoint> {
    let total = points.len();
    let mut merged: Vec<SyncPoint> = Vec::with_capacity(total);
    let mut carried_start: Option<u64> = None;

    for (i, mut point) in points.into_iter().enumerate() {
        let is_last = i + 1 == total;
        if point.is_empty() && !is_last {
            carried_start.get_or_insert(point.start);
            continue;
        }
        if let Some(start) = carried_start.take() {
            point.start = start;
        }
        match merged.last_mut() {
            Some(previous) if point.is_empty() => previous.end = point.end,
            _ => merged.push(point),
        }
    }

    for (index, point) in merged.iter_mut().enumerate() {
        point.index = index;
        point.base_excluded.sort_unstable();
        point.called_excluded.sort_unstable();
    }
    merged
}

/// Check that `points` tile `[0, length)` and attribute each variant at most once
#[must_use]
pub fn is_partition(points: &[SyncPoint], length: u64) -> bool {
    let Some(first) = points.first() else {
        return false;
    };
    if first.start != 0 || points.last().map(|p| p.end) != Some(length) {
        return false;
    }
    if points.windows(2).any(|w| w[0].end != w[1].start || w[0].start > w[0].end) {
        return false;
    }

    let mut base: Vec<usize> = Vec::new();
    let mut called: Vec<usize> = Vec::new();
    for point in points {
        base.extend(&point.base_included);
        base.extend(&point.base_excluded);
        called.extend(&point.called_included);
        called.extend(&point.called_excluded);
    }
    let unique = |ids: &mut Vec<usize>| {
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        ids.len() == before
    };
    unique(&mut base) && unique(&mut called)
}
