use cohortstat::stats::MomentAccumulator;
use cohortstat::utils::error::StatsError;

const SAMPLE: [f64; 12] = [
    98.0, 121.0, 87.0, 140.0, 103.0, 99.0, 76.0, 132.0, 111.0, 95.0, 118.0, 84.0,
];

fn close(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= 1e-9 * scale
}

fn assert_same(a: &MomentAccumulator, b: &MomentAccumulator) {
    assert_eq!(a.count(), b.count());
    let (a1, a2, a3, a4) = a.raw_moments();
    let (b1, b2, b3, b4) = b.raw_moments();
    assert!(close(a1, b1), "M1 {} vs {}", a1, b1);
    assert!(close(a2, b2), "M2 {} vs {}", a2, b2);
    assert!(close(a3, b3), "M3 {} vs {}", a3, b3);
    assert!(close(a4, b4), "M4 {} vs {}", a4, b4);
}

#[test]
fn test_known_values() {
    let acc: MomentAccumulator = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();

    assert_eq!(acc.count(), 5);
    assert!(close(acc.mean(), 3.0));
    assert!(close(acc.variance(), 2.5));
    assert!(acc.skewness().unwrap().abs() < 1e-12);
    assert!(close(acc.kurtosis().unwrap(), -1.2));
}

#[test]
fn test_incorporation_order_invariance() {
    let forward: MomentAccumulator = SAMPLE.into_iter().collect();
    let backward: MomentAccumulator = SAMPLE.into_iter().rev().collect();

    let mut shuffled = SAMPLE;
    shuffled.swap(0, 7);
    shuffled.swap(3, 10);
    shuffled.swap(5, 1);
    let shuffled: MomentAccumulator = shuffled.into_iter().collect();

    assert_same(&forward, &backward);
    assert_same(&forward, &shuffled);
}

#[test]
fn test_merge_matches_sequential() {
    let all: MomentAccumulator = SAMPLE.into_iter().collect();
    for split in 1..SAMPLE.len() {
        let left: MomentAccumulator = SAMPLE[..split].iter().copied().collect();
        let right: MomentAccumulator = SAMPLE[split..].iter().copied().collect();
        assert_same(&left.merge(&right), &all);
    }
}

#[test]
fn test_merge_commutative_and_associative() {
    let a: MomentAccumulator = SAMPLE[..3].iter().copied().collect();
    let b: MomentAccumulator = SAMPLE[3..8].iter().copied().collect();
    let c: MomentAccumulator = SAMPLE[8..].iter().copied().collect();

    assert_same(&a.merge(&b), &b.merge(&a));
    assert_same(&a.merge(&b).merge(&c), &a.merge(&b.merge(&c)));
}

#[test]
fn test_empty_merge_is_identity() {
    let a: MomentAccumulator = SAMPLE.into_iter().collect();
    let empty = MomentAccumulator::new();

    assert_eq!(a.merge(&empty), a);
    assert_eq!(empty.merge(&a), a);
    assert!(empty.merge(&empty).is_empty());
}

#[test]
fn test_degenerate_cohort() {
    let acc: MomentAccumulator = [7.0, 7.0, 7.0].into_iter().collect();

    assert_eq!(acc.variance(), 0.0);
    assert_eq!(acc.skewness(), Err(StatsError::DegenerateDistribution));
    assert_eq!(acc.kurtosis(), Err(StatsError::DegenerateDistribution));
    assert_eq!(acc.z_score(7.0), Err(StatsError::DegenerateDistribution));
}

#[test]
fn test_single_value_is_degenerate() {
    let acc: MomentAccumulator = [4.2].into_iter().collect();
    assert_eq!(acc.variance(), 0.0);
    assert!(acc.skewness().is_err());
}

#[test]
fn test_non_finite_rejected_without_state_change() {
    let mut acc: MomentAccumulator = [1.0, 2.0].into_iter().collect();
    let before = acc.clone();

    assert!(matches!(acc.incorporate(f64::NAN), Err(StatsError::NonFinite(_))));
    assert!(acc.incorporate(f64::INFINITY).is_err());
    assert_eq!(acc, before);
}
