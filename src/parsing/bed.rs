//! BED region lists restricting which variants are assessed.
//!
//! Only the first three columns are read. Intervals are 0-based half-open, and
//! overlapping or touching intervals of a chromosome are merged on load.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::parsing::{open_text, ParseError};

/// Merged, sorted intervals per chromosome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    regions: HashMap<String, Vec<(u64, u64)>>,
}

impl RegionSet {
    /// Parse BED text, skipping `#`, `track` and `browser` lines
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedRecord` for lines with fewer than three
    /// columns, non-numeric coordinates, or an end before the start.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut regions: HashMap<String, Vec<(u64, u64)>> = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            let malformed = |reason: &str| ParseError::MalformedRecord {
                line: index + 1,
                reason: reason.to_string(),
            };

            let mut fields = line.split('\t');
            let (Some(chrom), Some(start), Some(end)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed("expected at least 3 columns"));
            };
            let start: u64 = start.parse().map_err(|_| malformed("invalid start"))?;
            let end: u64 = end.parse().map_err(|_| malformed("invalid end"))?;
            if end < start {
                return Err(malformed("end before start"));
            }

            regions.entry(chrom.to_string()).or_default().push((start, end));
        }

        for intervals in regions.values_mut() {
            merge(intervals);
        }
        Ok(Self { regions })
    }

    /// Load a BED file (plain or gzip)
    ///
    /// # Errors
    ///
    /// See [`RegionSet::from_reader`].
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let set = Self::from_reader(open_text(path)?)?;
        debug!(path = %path.display(), regions = set.len(), "Loaded regions");
        Ok(set)
    }

    /// `position` (0-based) lies inside a region of `chrom`
    #[must_use]
    pub fn contains(&self, chrom: &str, position: u64) -> bool {
        let Some(intervals) = self.regions.get(chrom) else {
            return false;
        };
        let i = intervals.partition_point(|&(_, end)| end <= position);
        intervals.get(i).is_some_and(|&(start, _)| start <= position)
    }

    #[must_use]
    pub fn has_chromosome(&self, chrom: &str) -> bool {
        self.regions.contains_key(chrom)
    }

    /// Number of merged intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn merge(intervals: &mut Vec<(u64, u64)>) {
    intervals.sort_unstable();
    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(intervals.len());
    for &(start, end) in intervals.iter() {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    *intervals = merged;
}
