//! Property tests for the structure of engine results on random SNP sets.

use proptest::prelude::*;

use varsync::core::contig::Contig;
use varsync::core::types::MatchMode;
use varsync::core::variant::{Genotype, Variant};
use varsync::matching::engine::{ChromosomeComparison, ComparisonEngine, SearchLimits};
use varsync::matching::sync_point::is_partition;

const BASES: &[u8; 4] = b"ACGT";
const LENGTH: u64 = 200;

fn contig() -> Contig {
    Contig::new("chr1", 0, BASES.repeat(50))
}

/// SNPs at distinct positions, each with a non-reference ALT and a het or hom genotype
fn snps() -> impl Strategy<Value = Vec<Variant>> {
    prop::collection::btree_map(5u64..LENGTH - 5, (1usize..4, any::<bool>()), 0..12).prop_map(
        |sites| {
            sites
                .into_iter()
                .enumerate()
                .map(|(id, (position, (shift, het)))| {
                    let reference = BASES[(position % 4) as usize] as char;
                    let alt = BASES[((position as usize) + shift) % 4] as char;
                    let gt = if het { "0/1" } else { "1/1" };
                    Variant::new(
                        id,
                        "chr1",
                        position,
                        &reference.to_string(),
                        vec![alt.to_string()],
                        Genotype::parse(gt).unwrap(),
                        true,
                    )
                    .unwrap()
                })
                .collect()
        },
    )
}

/// Edit applied at one site; spans stay shorter than the site spacing
#[derive(Debug, Clone, Copy)]
enum Edit {
    Snp(usize),
    Deletion(usize),
    Insertion(usize),
    Mnp,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (1usize..4).prop_map(Edit::Snp),
        (1usize..4).prop_map(Edit::Deletion),
        (1usize..4).prop_map(Edit::Insertion),
        Just(Edit::Mnp),
    ]
}

fn shifted(base: u8, shift: usize) -> char {
    let index = BASES.iter().position(|&b| b == base).unwrap_or(0);
    BASES[(index + shift) % 4] as char
}

/// SNPs, MNPs, insertions and deletions at sites eight bases apart
fn edits() -> impl Strategy<Value = Vec<Variant>> {
    let sequence = BASES.repeat(50);
    prop::collection::btree_map(1u64..24, (edit(), any::<bool>()), 0..10).prop_map(move |sites| {
        sites
            .into_iter()
            .enumerate()
            .map(|(id, (slot, (edit, het)))| {
                let position = slot * 8;
                let at = position as usize;
                let text = |len: usize| String::from_utf8(sequence[at..at + len].to_vec()).unwrap();
                let (reference, alt) = match edit {
                    Edit::Snp(shift) => (text(1), shifted(sequence[at], shift).to_string()),
                    Edit::Deletion(len) => (text(len + 1), text(1)),
                    Edit::Insertion(len) => (text(1), format!("{}{}", text(1), "T".repeat(len))),
                    Edit::Mnp => (
                        text(2),
                        format!("{}{}", shifted(sequence[at], 1), shifted(sequence[at + 1], 2)),
                    ),
                };
                let gt = if het { "0/1" } else { "1/1" };
                Variant::new(
                    id,
                    "chr1",
                    position,
                    &reference,
                    vec![alt],
                    Genotype::parse(gt).unwrap(),
                    true,
                )
                .unwrap()
            })
            .collect()
    })
}

fn compare(contig: &Contig, base: &[Variant], called: &[Variant]) -> ChromosomeComparison {
    let base: Vec<&Variant> = base.iter().collect();
    let called: Vec<&Variant> = called.iter().collect();
    ComparisonEngine::new(SearchLimits::default())
        .compare(contig, &base, &called, MatchMode::Genotype)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sync_points_tile_the_chromosome(base in snps(), called in snps()) {
        let contig = contig();
        let result = compare(&contig, &base, &called);

        prop_assert!(is_partition(&result.sync_points, LENGTH));
        for pair in result.sync_points.windows(2) {
            prop_assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn every_variant_belongs_to_one_sync_point(base in snps(), called in snps()) {
        let contig = contig();
        let result = compare(&contig, &base, &called);

        let mut base_ids: Vec<usize> = result
            .sync_points
            .iter()
            .flat_map(|p| p.base_included.iter().chain(&p.base_excluded).copied())
            .collect();
        let mut called_ids: Vec<usize> = result
            .sync_points
            .iter()
            .flat_map(|p| p.called_included.iter().chain(&p.called_excluded).copied())
            .collect();
        base_ids.sort_unstable();
        called_ids.sort_unstable();

        prop_assert_eq!(base_ids, (0..base.len()).collect::<Vec<_>>());
        prop_assert_eq!(called_ids, (0..called.len()).collect::<Vec<_>>());

        for point in &result.sync_points {
            for &i in point.base_included.iter().chain(&point.base_excluded) {
                prop_assert!(base[i].start >= point.start && base[i].start < point.end);
            }
        }
    }

    #[test]
    fn reruns_are_identical(base in snps(), called in snps()) {
        let contig = contig();
        prop_assert_eq!(compare(&contig, &base, &called), compare(&contig, &base, &called));
    }

    #[test]
    fn indel_sync_points_tile_and_attribute(base in edits(), called in edits()) {
        let contig = contig();
        let result = compare(&contig, &base, &called);

        prop_assert!(is_partition(&result.sync_points, LENGTH));
        let attributed: usize = result.sync_points.iter().map(|p| p.variant_count()).sum();
        prop_assert_eq!(attributed, base.len() + called.len());
    }

    #[test]
    fn indel_swap_mirrors_decisions(base in edits(), called in edits()) {
        let contig = contig();
        let forward = compare(&contig, &base, &called);
        let backward = compare(&contig, &called, &base);

        prop_assert_eq!(&forward.base.included, &backward.called.included);
        prop_assert_eq!(&forward.called.included, &backward.base.included);
    }

    #[test]
    fn indel_set_matches_itself(calls in edits()) {
        let contig = contig();
        let result = compare(&contig, &calls, &calls);

        prop_assert_eq!(&result.base.included, &(0..calls.len()).collect::<Vec<_>>());
        prop_assert_eq!(&result.called.included, &(0..calls.len()).collect::<Vec<_>>());
    }

    #[test]
    fn swapping_sides_mirrors_decisions(base in snps(), called in snps()) {
        let contig = contig();
        let forward = compare(&contig, &base, &called);
        let backward = compare(&contig, &called, &base);

        prop_assert_eq!(&forward.base.included, &backward.called.included);
        prop_assert_eq!(&forward.called.included, &backward.base.included);
        prop_assert_eq!(&forward.base.excluded, &backward.called.excluded);
        prop_assert_eq!(&forward.called.excluded, &backward.base.excluded);
    }
}
