//! Mendelian consistency lookup.
//!
//! A child call is compliant when one of its alleles can come from the father
//! and the other from the mother. What each parent can pass on at the child's
//! site is summarised as a [`Transmissible`] value by the trio driver: the
//! reference, and the child's own allele numbers that the parent comparison
//! reproduced. This module only applies the inheritance table:
//!
//! | Child | Father | Mother | Decision |
//! |-------|--------|--------|----------|
//! | any no-call | - | - | `NoCallChild` |
//! | called | no-call | - | `NoCallParent` |
//! | called | - | no-call | `NoCallParent` |
//! | `a/b` | can pass `a` | can pass `b` | `Compliant` |
//! | `a/b` | can pass `b` | can pass `a` | `Compliant` |
//! | `a` (haploid) | can pass `a` | - | `Compliant` |
//! | `a` (haploid) | - | can pass `a` | `Compliant` |
//! | otherwise | | | `Violation` |

use crate::core::types::MendelianDecision;
use crate::core::variant::Genotype;

/// Alleles one parent can pass on at a site
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transmissible {
    pub reference: bool,
    /// Child allele numbers matched by this parent's calls
    pub alternates: Vec<usize>,
    pub no_call: bool,
}

impl Transmissible {
    fn can_pass(&self, allele: usize) -> bool {
        if allele == 0 {
            self.reference
        } else {
            self.alternates.contains(&allele)
        }
    }
}

/// Classify a child genotype against what each parent can pass on
#[must_use]
pub fn mendelian_decision(
    child: &Genotype,
    father: Transmissible,
    mother: Transmissible,
) -> MendelianDecision {
    if child.is_no_call() || child.alleles.is_empty() {
        return MendelianDecision::NoCallChild;
    }
    if father.no_call || mother.no_call {
        return MendelianDecision::NoCallParent;
    }

    let alleles: Vec<usize> = child.indices().collect();
    let compliant = match alleles.as_slice() {
        [a] => father.can_pass(*a) || mother.can_pass(*a),
        [a, b, ..] => {
            (father.can_pass(*a) && mother.can_pass(*b))
                || (father.can_pass(*b) && mother.can_pass(*a))
        }
        [] => false,
    };

    if compliant {
        MendelianDecision::Compliant
    } else {
        MendelianDecision::Violation
    }
}

/// Classify a parent call the child comparison did not match.
///
/// A parent carrying a reference allele may simply not have passed the
/// variant on; a parent without one must have.
#[must_use]
pub fn untransmitted_parent_decision(genotype: &Genotype) -> MendelianDecision {
    if genotype.is_no_call() {
        MendelianDecision::NoCallParent
    } else if genotype.alleles.contains(&Some(0)) {
        MendelianDecision::Compliant
    } else {
        MendelianDecision::Violation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF_ONLY: Transmissible = Transmissible {
        reference: true,
        alternates: Vec::new(),
        no_call: false,
    };
    const NO_CALL: Transmissible = Transmissible {
        reference: false,
        alternates: Vec::new(),
        no_call: true,
    };

    fn het(alleles: &[usize]) -> Transmissible {
        Transmissible {
            reference: true,
            alternates: alleles.to_vec(),
            no_call: false,
        }
    }

    fn hom_alt(alleles: &[usize]) -> Transmissible {
        Transmissible {
            reference: false,
            alternates: alleles.to_vec(),
            no_call: false,
        }
    }

    fn gt(text: &str) -> Genotype {
        Genotype::parse(text).unwrap()
    }

    #[test]
    fn test_het_child() {
        assert_eq!(
            mendelian_decision(&gt("0/1"), het(&[1]), REF_ONLY),
            MendelianDecision::Compliant
        );
        assert_eq!(
            mendelian_decision(&gt("0/1"), REF_ONLY, hom_alt(&[1])),
            MendelianDecision::Compliant
        );
        assert_eq!(
            mendelian_decision(&gt("0/1"), REF_ONLY, REF_ONLY),
            MendelianDecision::Violation
        );
        assert_eq!(
            mendelian_decision(&gt("0/1"), hom_alt(&[1]), hom_alt(&[1])),
            MendelianDecision::Violation
        );
    }

    #[test]
    fn test_hom_alt_child() {
        assert_eq!(
            mendelian_decision(&gt("1/1"), het(&[1]), het(&[1])),
            MendelianDecision::Compliant
        );
        assert_eq!(
            mendelian_decision(&gt("1/1"), het(&[1]), REF_ONLY),
            MendelianDecision::Violation
        );
    }

    #[test]
    fn test_multiallelic_child_needs_each_allele() {
        assert_eq!(
            mendelian_decision(&gt("1/2"), het(&[1]), het(&[2])),
            MendelianDecision::Compliant
        );
        assert_eq!(
            mendelian_decision(&gt("1/2"), het(&[1]), het(&[1])),
            MendelianDecision::Violation
        );
    }

    #[test]
    fn test_haploid_and_no_calls() {
        assert_eq!(
            mendelian_decision(&gt("1"), REF_ONLY, het(&[1])),
            MendelianDecision::Compliant
        );
        assert_eq!(
            mendelian_decision(&gt("./1"), het(&[1]), het(&[1])),
            MendelianDecision::NoCallChild
        );
        assert_eq!(
            mendelian_decision(&gt("0/1"), NO_CALL, het(&[1])),
            MendelianDecision::NoCallParent
        );
    }

    #[test]
    fn test_untransmitted_parent() {
        assert_eq!(
            untransmitted_parent_decision(&gt("0/1")),
            MendelianDecision::Compliant
        );
        assert_eq!(
            untransmitted_parent_decision(&gt("1/1")),
            MendelianDecision::Violation
        );
        assert_eq!(
            untransmitted_parent_decision(&gt("./.")),
            MendelianDecision::NoCallParent
        );
    }
}
