use num_bigint::BigUint;
use proptest::prelude::*;
use region_bench::splitter::{
    compute_boundaries, is_strictly_increasing, regions_from_boundaries, BoundaryEncoding,
    KeyInterval, RangeSplitter, SplitAlgorithm,
};

fn numeric(boundaries: &[region_bench::BoundaryKey]) -> Vec<BigUint> {
    boundaries
        .iter()
        .map(|key| key.as_str().parse::<BigUint>().unwrap())
        .collect()
}

/// Intervals of at least `min_len` keys, anchored anywhere in u64.
fn interval_strategy(min_len: u64) -> impl Strategy<Value = (u64, u64)> {
    (0u64..u64::MAX / 2, min_len..1_000_000u64).prop_map(|(start, len)| (start, start + len - 1))
}

// Property: N regions produce N - 1 boundaries
proptest! {
    #[test]
    fn prop_boundary_count((start, end) in interval_strategy(1), n in 1i64..500) {
        let boundaries = compute_boundaries(&BigUint::from(start), &BigUint::from(end), n).unwrap();
        prop_assert_eq!(boundaries.len() as i64, n - 1);
        prop_assert_eq!(regions_from_boundaries(&boundaries).len() as i64, n);
    }
}

// Property: with enough keys, boundaries lie inside the interval and increase
proptest! {
    #[test]
    fn prop_increasing_within_interval(
        (start, end) in interval_strategy(500),
        n in 1i64..500,
    ) {
        let boundaries = compute_boundaries(&BigUint::from(start), &BigUint::from(end), n).unwrap();
        let values = numeric(&boundaries);
        for pair in values.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for value in &values {
            prop_assert!(*value > BigUint::from(start));
            prop_assert!(*value <= BigUint::from(end));
        }
    }
}

// Property: fixed-width keys sort like the numbers they encode
proptest! {
    #[test]
    fn prop_fixed_width_sorts_numerically(
        (start, end) in interval_strategy(500),
        n in 1i64..500,
    ) {
        let width = end.to_string().len();
        let interval = KeyInterval::new(BigUint::from(start), BigUint::from(end)).unwrap();
        let boundaries = interval.boundaries(n, BoundaryEncoding::FixedWidth(width)).unwrap();
        prop_assert!(is_strictly_increasing(&boundaries));
        prop_assert!(boundaries.iter().all(|key| key.as_str().len() == width));
    }
}

// Property: splitting is a pure function of its inputs
proptest! {
    #[test]
    fn prop_split_is_idempotent((start, end) in interval_strategy(1), n in 1i64..200) {
        let splitter = RangeSplitter::new(
            KeyInterval::new(BigUint::from(start), BigUint::from(end)).unwrap(),
        );
        prop_assert_eq!(splitter.split(n).unwrap(), splitter.split(n).unwrap());
    }
}

// Property: the remainder of an uneven division lands in the last region
proptest! {
    #[test]
    fn prop_first_regions_are_equal_width((start, end) in interval_strategy(2), n in 2i64..100) {
        let boundaries = compute_boundaries(&BigUint::from(start), &BigUint::from(end), n).unwrap();
        let values = numeric(&boundaries);
        let len = end - start + 1;
        let width = BigUint::from(len / n as u64);
        prop_assert_eq!(&values[0] - BigUint::from(start), width.clone());
        for pair in values.windows(2) {
            prop_assert_eq!(&pair[1] - &pair[0], width.clone());
        }
    }
}

#[test]
fn single_region_needs_no_boundaries() {
    let boundaries = RangeSplitter::default().split(1).unwrap();
    assert!(boundaries.is_empty());
}

#[test]
fn default_splitter_quarters() {
    let boundaries: Vec<String> = RangeSplitter::default()
        .split(4)
        .unwrap()
        .into_iter()
        .map(|key| key.into_string())
        .collect();
    assert_eq!(boundaries, vec!["2500", "5000", "7500"]);
}

#[test]
fn zero_and_negative_counts_rejected() {
    assert!(RangeSplitter::default().split(0).is_err());
    assert!(RangeSplitter::default().split(-4).is_err());
}

#[test]
fn too_many_regions_yield_duplicates() {
    let boundaries = compute_boundaries(&BigUint::from(0u32), &BigUint::from(2u32), 5).unwrap();
    assert_eq!(boundaries.len(), 4);
    assert!(!is_strictly_increasing(&boundaries));
}
