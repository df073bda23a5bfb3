//! Run-level statistics.

use serde::Serialize;

use crate::analysis::ChromosomeStatus;
use crate::core::types::{MatchStatus, MendelianDecision, Side};
use crate::matching::engine::SearchStats;

/// Decision counts over base and called calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub tp_base: usize,
    pub tp_called: usize,
    /// Subset of the true positives matched on alleles only
    pub allele_match_base: usize,
    pub allele_match_called: usize,
    pub false_negative: usize,
    pub false_positive: usize,
    pub not_assessed_base: usize,
    pub not_assessed_called: usize,
}

impl DecisionCounts {
    pub fn add(&mut self, side: Side, status: MatchStatus) {
        match (side, status) {
            (Side::Base, MatchStatus::GenotypeMatch) => self.tp_base += 1,
            (Side::Base, MatchStatus::AlleleMatch) => {
                self.tp_base += 1;
                self.allele_match_base += 1;
            }
            (Side::Base, MatchStatus::NoMatch) => self.false_negative += 1,
            (Side::Base, MatchStatus::NotAssessed) => self.not_assessed_base += 1,
            (Side::Called, MatchStatus::GenotypeMatch) => self.tp_called += 1,
            (Side::Called, MatchStatus::AlleleMatch) => {
                self.tp_called += 1;
                self.allele_match_called += 1;
            }
            (Side::Called, MatchStatus::NoMatch) => self.false_positive += 1,
            (Side::Called, MatchStatus::NotAssessed) => self.not_assessed_called += 1,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.tp_base += other.tp_base;
        self.tp_called += other.tp_called;
        self.allele_match_base += other.allele_match_base;
        self.allele_match_called += other.allele_match_called;
        self.false_negative += other.false_negative;
        self.false_positive += other.false_positive;
        self.not_assessed_base += other.not_assessed_base;
        self.not_assessed_called += other.not_assessed_called;
    }

    /// TP(called) / (TP(called) + FP)
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counts are far below 2^52
    pub fn precision(&self) -> Option<f64> {
        let total = self.tp_called + self.false_positive;
        (total > 0).then(|| self.tp_called as f64 / total as f64)
    }

    /// TP(base) / (TP(base) + FN)
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counts are far below 2^52
    pub fn recall(&self) -> Option<f64> {
        let total = self.tp_base + self.false_negative;
        (total > 0).then(|| self.tp_base as f64 / total as f64)
    }

    #[must_use]
    pub fn f1(&self) -> Option<f64> {
        let (p, r) = (self.precision()?, self.recall()?);
        (p + r > 0.0).then(|| 2.0 * p * r / (p + r))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromosomeStats {
    pub chromosome: String,
    #[serde(flatten)]
    pub status: ChromosomeStatus,
    pub counts: DecisionCounts,
    pub search: SearchStats,
}

/// Statistics of a duo comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub chromosomes: Vec<ChromosomeStats>,
    pub total: DecisionCounts,
    pub search: SearchStats,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    /// Malformed records skipped while reading (base, called)
    pub malformed_base: usize,
    pub malformed_called: usize,
}

impl RunStats {
    #[must_use]
    pub fn from_chromosomes(chromosomes: Vec<ChromosomeStats>) -> Self {
        let mut total = DecisionCounts::default();
        let mut search = SearchStats::default();
        for chromosome in &chromosomes {
            total.merge(&chromosome.counts);
            search.merge(&chromosome.search);
        }
        Self {
            precision: total.precision(),
            recall: total.recall(),
            f1: total.f1(),
            chromosomes,
            total,
            search,
            malformed_base: 0,
            malformed_called: 0,
        }
    }

    /// Names of chromosomes whose search did not complete
    #[must_use]
    pub fn incomplete(&self) -> Vec<&str> {
        self.chromosomes
            .iter()
            .filter(|c| !c.status.is_complete())
            .map(|c| c.chromosome.as_str())
            .collect()
    }
}

/// Counts of Mendelian decisions for one trio member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MendelianCounts {
    pub compliant: usize,
    pub violation: usize,
    pub nocall_parent: usize,
    pub nocall_child: usize,
    pub skipped: usize,
}

impl MendelianCounts {
    pub fn add(&mut self, decision: MendelianDecision) {
        match decision {
            MendelianDecision::Compliant => self.compliant += 1,
            MendelianDecision::Violation => self.violation += 1,
            MendelianDecision::NoCallParent => self.nocall_parent += 1,
            MendelianDecision::NoCallChild => self.nocall_child += 1,
            MendelianDecision::Skipped | MendelianDecision::Unknown => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.compliant += other.compliant;
        self.violation += other.violation;
        self.nocall_parent += other.nocall_parent;
        self.nocall_child += other.nocall_child;
        self.skipped += other.skipped;
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.compliant + self.violation + self.nocall_parent + self.nocall_child + self.skipped
    }

    /// Share of assessed calls that are compliant
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counts are far below 2^52
    pub fn compliance(&self) -> Option<f64> {
        let assessed = self.compliant + self.violation;
        (assessed > 0).then(|| self.compliant as f64 / assessed as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrioChromosomeStats {
    pub chromosome: String,
    #[serde(flatten)]
    pub status: ChromosomeStatus,
    pub mother: MendelianCounts,
    pub father: MendelianCounts,
    pub child: MendelianCounts,
    pub search: SearchStats,
}

/// Statistics of a trio comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrioStats {
    pub chromosomes: Vec<TrioChromosomeStats>,
    pub mother: MendelianCounts,
    pub father: MendelianCounts,
    pub child: MendelianCounts,
    pub search: SearchStats,
    pub child_compliance: Option<f64>,
}

impl TrioStats {
    #[must_use]
    pub fn from_chromosomes(chromosomes: Vec<TrioChromosomeStats>) -> Self {
        let mut stats = Self::default();
        for chromosome in &chromosomes {
            stats.mother.merge(&chromosome.mother);
            stats.father.merge(&chromosome.father);
            stats.child.merge(&chromosome.child);
            stats.search.merge(&chromosome.search);
        }
        stats.child_compliance = stats.child.compliance();
        stats.chromosomes = chromosomes;
        stats
    }

    #[must_use]
    pub fn incomplete(&self) -> Vec<&str> {
        self.chromosomes
            .iter()
            .filter(|c| !c.status.is_complete())
            .map(|c| c.chromosome.as_str())
            .collect()
    }
}
