use crate::core::types::{MatchStatus, MendelianDecision};
use crate::core::variant::Variant;

/// A variant together with the outcome assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledVariant {
    pub variant: Variant,
    pub status: MatchStatus,
    /// Set only by trio analysis
    pub mendelian: Option<MendelianDecision>,
}

impl LabelledVariant {
    #[must_use]
    pub fn new(variant: Variant, status: MatchStatus) -> Self {
        Self {
            variant,
            status,
            mendelian: None,
        }
    }
}

/// One output line: the calls of one, two or three samples at the same VCF site
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordShape<'a> {
    Single(&'a LabelledVariant),
    Duo {
        base: Option<&'a LabelledVariant>,
        called: Option<&'a LabelledVariant>,
    },
    Trio {
        mother: Option<&'a LabelledVariant>,
        father: Option<&'a LabelledVariant>,
        child: Option<&'a LabelledVariant>,
    },
}

impl<'a> RecordShape<'a> {
    /// Per-sample calls in output column order
    #[must_use]
    pub fn samples(&self) -> Vec<Option<&'a LabelledVariant>> {
        match *self {
            Self::Single(call) => vec![Some(call)],
            Self::Duo { base, called } => vec![base, called],
            Self::Trio {
                mother,
                father,
                child,
            } => vec![mother, father, child],
        }
    }

    /// Call whose site columns (ID, QUAL, FILTER) are written
    #[must_use]
    pub fn representative(&self) -> Option<&'a LabelledVariant> {
        match *self {
            Self::Single(call) => Some(call),
            Self::Duo { base, called } => called.or(base),
            Self::Trio {
                mother,
                father,
                child,
            } => child.or(mother).or(father),
        }
    }

    /// Pair base and called calls that share position, REF and ALT.
    ///
    /// Both slices must come from one chromosome and be sorted by position.
    #[must_use]
    pub fn pair_duo(base: &'a [LabelledVariant], called: &'a [LabelledVariant]) -> Vec<Self> {
        let mut records = Vec::with_capacity(base.len().max(called.len()));
        let (mut i, mut j) = (0, 0);

        loop {
            let base_pos = base.get(i).map(|b| b.variant.position);
            let called_pos = called.get(j).map(|c| c.variant.position);
            match (base_pos, called_pos) {
                (Some(b), Some(c)) if b == c => {
                    let base_end = i + base[i..]
                        .iter()
                        .take_while(|v| v.variant.position == b)
                        .count();
                    let called_end = j + called[j..]
                        .iter()
                        .take_while(|v| v.variant.position == c)
                        .count();
                    let mut used = vec![false; called_end - j];

                    for item in &base[i..base_end] {
                        let partner = (j..called_end)
                            .find(|&k| !used[k - j] && called[k].variant.same_site(&item.variant));
                        match partner {
                            Some(k) => {
                                used[k - j] = true;
                                records.push(Self::Duo {
                                    base: Some(item),
                                    called: Some(&called[k]),
                                });
                            }
                            None => records.push(Self::Duo {
                                base: Some(item),
                                called: None,
                            }),
                        }
                    }
                    for k in j..called_end {
                        if !used[k - j] {
                            records.push(Self::Duo {
                                base: None,
                                called: Some(&called[k]),
                            });
                        }
                    }
                    i = base_end;
                    j = called_end;
                }
                (Some(b), Some(c)) if b < c => {
                    records.push(Self::Duo {
                        base: Some(&base[i]),
                        called: None,
                    });
                    i += 1;
                }
                (Some(_), None) => {
                    records.push(Self::Duo {
                        base: Some(&base[i]),
                        called: None,
                    });
                    i += 1;
                }
                (_, Some(_)) => {
                    records.push(Self::Duo {
                        base: None,
                        called: Some(&called[j]),
                    });
                    j += 1;
                }
                (None, None) => break,
            }
        }

        records
    }

    /// Group mother, father and child calls that share position, REF and ALT
    #[must_use]
    pub fn group_trio(
        mother: &'a [LabelledVariant],
        father: &'a [LabelledVariant],
        child: &'a [LabelledVariant],
    ) -> Vec<Self> {
        let mut entries: Vec<(&'a LabelledVariant, usize)> = mother
            .iter()
            .map(|v| (v, 0))
            .chain(father.iter().map(|v| (v, 1)))
            .chain(child.iter().map(|v| (v, 2)))
            .collect();
        entries.sort_by(|(a, ma), (b, mb)| {
            (a.variant.position, &a.variant.alleles, ma).cmp(&(
                b.variant.position,
                &b.variant.alleles,
                mb,
            ))
        });

        let mut records = Vec::new();
        let mut slots: [Option<&'a LabelledVariant>; 3] = [None; 3];
        let mut current: Option<&'a LabelledVariant> = None;

        for (call, member) in entries {
            let same_site = current.is_some_and(|c| c.variant.same_site(&call.variant));
            if !same_site || slots[member].is_some() {
                if current.is_some() {
                    records.push(Self::trio_from(slots));
                }
                slots = [None; 3];
                current = Some(call);
            }
            slots[member] = Some(call);
        }
        if current.is_some() {
            records.push(Self::trio_from(slots));
        }

        records
    }

    fn trio_from(slots: [Option<&'a LabelledVariant>; 3]) -> Self {
        let [mother, father, child] = slots;
        Self::Trio {
            mother,
            father,
            child,
        }
    }
}
