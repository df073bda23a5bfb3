use serde::{Deserialize, Serialize};

/// Which of the two compared call sets a variant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The truth set
    Base,
    /// The call set under test
    Called,
}

impl Side {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Base => Self::Called,
            Self::Called => Self::Base,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Called => write!(f, "called"),
        }
    }
}

/// How alleles of a variant are offered to the replay engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Both haplotypes must agree (phasing is free for heterozygous calls)
    #[default]
    Genotype,
    /// Any shared non-reference allele is enough, zygosity is ignored
    Allele,
}

/// Broad variant classification used by the admission filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Snp,
    Indel,
    /// Symbolic, breakend or spanning-deletion alleles
    Sv,
}

/// Size class of a variant, reported in trio statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCategory {
    Snp,
    InsertSmall,
    InsertMedium,
    InsertLarge,
    DeleteSmall,
    DeleteMedium,
    DeleteLarge,
    ComplexSmall,
    ComplexMedium,
    ComplexLarge,
}

impl std::fmt::Display for VariantCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Snp => "snp",
            Self::InsertSmall => "insert_small",
            Self::InsertMedium => "insert_medium",
            Self::InsertLarge => "insert_large",
            Self::DeleteSmall => "delete_small",
            Self::DeleteMedium => "delete_medium",
            Self::DeleteLarge => "delete_large",
            Self::ComplexSmall => "complex_small",
            Self::ComplexMedium => "complex_medium",
            Self::ComplexLarge => "complex_large",
        };
        write!(f, "{name}")
    }
}

/// Comparison outcome for a single variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Filtered out, skipped in a complex region, or on an incomplete chromosome
    #[default]
    NotAssessed,
    /// Reconciled with both haplotypes agreeing
    GenotypeMatch,
    /// Reconciled only when zygosity is ignored
    AlleleMatch,
    /// Assessed but not part of any reconciled sequence
    NoMatch,
}

impl MatchStatus {
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Self::GenotypeMatch | Self::AlleleMatch)
    }

    #[must_use]
    pub fn label(self) -> DecisionLabel {
        match self {
            Self::GenotypeMatch | Self::AlleleMatch => DecisionLabel::Matched,
            Self::NoMatch => DecisionLabel::Unmatched,
            Self::NotAssessed => DecisionLabel::Unresolved,
        }
    }

    /// GA4GH benchmarking decision (`BD`) for a call on the given side
    #[must_use]
    pub fn decision_code(self, side: Side) -> &'static str {
        match (self, side) {
            (Self::GenotypeMatch | Self::AlleleMatch, _) => "TP",
            (Self::NoMatch, Side::Base) => "FN",
            (Self::NoMatch, Side::Called) => "FP",
            (Self::NotAssessed, _) => "N",
        }
    }

    /// GA4GH match sub-type (`BK`)
    #[must_use]
    pub fn match_code(self) -> &'static str {
        match self {
            Self::GenotypeMatch => "gm",
            Self::AlleleMatch => "am",
            Self::NoMatch => "nm",
            Self::NotAssessed => ".",
        }
    }
}

/// Coarse decision label attached to every input record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLabel {
    Matched,
    Unmatched,
    Unresolved,
}

/// Mendelian consistency class of a trio call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MendelianDecision {
    #[default]
    Unknown,
    Compliant,
    Violation,
    NoCallParent,
    NoCallChild,
    Skipped,
}

impl MendelianDecision {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Compliant => "compliant",
            Self::Violation => "violation",
            Self::NoCallParent => "nocall_parent",
            Self::NoCallChild => "nocall_child",
            Self::Skipped => "skipped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_codes() {
        assert_eq!(MatchStatus::GenotypeMatch.decision_code(Side::Base), "TP");
        assert_eq!(MatchStatus::AlleleMatch.decision_code(Side::Called), "TP");
        assert_eq!(MatchStatus::NoMatch.decision_code(Side::Base), "FN");
        assert_eq!(MatchStatus::NoMatch.decision_code(Side::Called), "FP");
        assert_eq!(MatchStatus::NotAssessed.decision_code(Side::Called), "N");
    }

    #[test]
    fn test_labels() {
        assert_eq!(MatchStatus::AlleleMatch.label(), DecisionLabel::Matched);
        assert_eq!(MatchStatus::NoMatch.label(), DecisionLabel::Unmatched);
        assert_eq!(MatchStatus::NotAssessed.label(), DecisionLabel::Unresolved);
        assert_eq!(Side::Base.other(), Side::Called);
    }
}
