//! Tests for the operator selection strategies and acceptance rules.

use rand::Rng;
use vrptw_hyper::acceptor::{Acceptor, COOLING_RATE};
use vrptw_hyper::alns::OperatorWeights;
use vrptw_hyper::config::{Config, Variant};
use vrptw_hyper::strategy::{
    ExpoWeights, KheiriCounts, Outcome, SelectionStrategy, Strategy, ThompsonSampling,
};
use vrptw_hyper::utils::{seeded, Random};

const IMPROVED: Outcome = Outcome {
    improved_current: true,
    new_best: false,
};
const NEW_BEST: Outcome = Outcome {
    improved_current: true,
    new_best: true,
};

fn random_sequence(arms: usize, rng: &mut Random) -> Vec<usize> {
    let len = rng.gen_range(1..6);
    (0..len).map(|_| rng.gen_range(0..arms)).collect()
}

fn assert_rows_stochastic(matrix: &[Vec<f64>], arms: usize) {
    assert_eq!(matrix.len(), arms);
    for row in matrix {
        assert_eq!(row.len(), arms);
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "row sums to {}", total);
        assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}

#[test]
fn test_expo_zero_learning_rate_is_uniform() {
    let arms = 27;
    let mut expo = ExpoWeights::new(arms, 0.0, 0.01, 0.1, false);
    let mut rng = seeded(0);

    for _ in 0..200 {
        let sequence = random_sequence(arms, &mut rng);
        expo.on_outcome(&sequence, IMPROVED);
    }

    for row in expo.transitions(&mut rng) {
        for p in row {
            assert!((p - 1.0 / arms as f64).abs() < 1e-12);
        }
    }
    for p in expo.apply_probabilities(&mut rng) {
        assert!((p - 0.5).abs() < 1e-12);
    }
}

#[test]
fn test_expo_probabilities_stay_bounded() {
    let arms = 10;
    let (alpha, beta) = (0.01, 0.1);
    let mut expo = ExpoWeights::new(arms, 0.5, alpha, beta, false);
    let mut rng = seeded(1);

    for step in 0..500 {
        let sequence = random_sequence(arms, &mut rng);
        let outcome = if step % 3 == 0 { IMPROVED } else { Outcome::default() };
        expo.on_outcome(&sequence, outcome);

        let transitions = expo.transitions(&mut rng);
        assert_rows_stochastic(&transitions, arms);
        for row in &transitions {
            for &p in row {
                assert!(p >= alpha - 1e-12 && p <= 1.0 - alpha + 1e-12);
            }
        }
        for p in expo.apply_probabilities(&mut rng) {
            assert!(p >= beta - 1e-12 && p <= 1.0 - beta + 1e-12);
        }
    }
}

#[test]
fn test_expo_learns_rewarded_transition() {
    let arms = 5;
    let mut expo = ExpoWeights::new(arms, 0.5, 0.01, 0.1, false);

    for _ in 0..20 {
        expo.on_outcome(&[1, 3], IMPROVED);
    }

    let row = expo.probability(1);
    let max = row.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(row[3], max);
    // Other rows are untouched
    assert!((expo.probability(2)[0] - 0.2).abs() < 1e-12);
}

#[test]
fn test_expo_ignores_failures() {
    let arms = 5;
    let mut expo = ExpoWeights::new(arms, 0.5, 0.01, 0.1, false);
    let before = expo.probability(1);

    expo.on_outcome(&[1, 3, 4], Outcome::default());
    assert_eq!(expo.probability(1), before);
}

#[test]
fn test_kheiri_reinforces_successes() {
    let arms = 27;
    let mut kheiri = KheiriCounts::new(arms, false);
    let mut rng = seeded(2);

    for _ in 0..100 {
        kheiri.on_outcome(&[2, 5], NEW_BEST);
    }

    let transitions = kheiri.transitions(&mut rng);
    assert_rows_stochastic(&transitions, arms);
    let row = &transitions[2];
    let max = row.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(row[5], max);
    assert_eq!(kheiri.count(2, 5), 101.0);
}

#[test]
fn test_kheiri_reward_modes() {
    let mut best_only = KheiriCounts::new(6, false);
    let mut all = KheiriCounts::new(6, true);

    best_only.on_outcome(&[0, 1], IMPROVED);
    all.on_outcome(&[0, 1], IMPROVED);

    assert_eq!(best_only.count(0, 1), 1.0);
    assert_eq!(all.count(0, 1), 2.0);
}

#[test]
fn test_thompson_rows_sum_to_one() {
    let arms = 8;
    let mut thompson = ThompsonSampling::new(arms, false);
    let mut rng = seeded(3);

    for step in 0..100 {
        let sequence = random_sequence(arms, &mut rng);
        let outcome = if step % 4 == 0 { IMPROVED } else { Outcome::default() };
        thompson.on_outcome(&sequence, outcome);
    }

    assert_rows_stochastic(&thompson.transitions(&mut rng), arms);
    let apply = thompson.apply_probabilities(&mut rng);
    assert_eq!(apply.len(), arms);
    assert!(apply.iter().all(|&p| (0.0..=1.0).contains(&p)));
}

#[test]
fn test_thompson_prefers_successful_arm() {
    let arms = 4;
    let mut thompson = ThompsonSampling::new(arms, false);
    let mut rng = seeded(4);

    for _ in 0..200 {
        thompson.on_outcome(&[0, 2], IMPROVED);
        thompson.on_outcome(&[0, 1], Outcome::default());
        thompson.on_outcome(&[0, 3], Outcome::default());
    }

    let row = &thompson.transitions(&mut rng)[0];
    assert!(row[2] > 0.9);
}

#[test]
fn test_selection_stays_in_range() {
    let arms = 31;
    let mut rng = seeded(5);
    for variant in Variant::ALL.iter().filter(|v| !v.is_alns()) {
        let config = Config::new().with_variant(*variant);
        let strategy = Strategy::for_variant(&config, arms).unwrap();
        let mut last = 0;
        for _ in 0..100 {
            last = strategy.select_next(last, &mut rng);
            assert!(last < arms);
        }
    }

    let alns = Config::new().with_variant(Variant::Alns);
    assert!(Strategy::for_variant(&alns, arms).is_none());
}

#[test]
fn test_strategy_names() {
    let config = Config::new().with_eta(0.5).with_delta(0.01);
    let expo = Strategy::for_variant(&config, 27).unwrap();
    assert_eq!(expo.name(config.delta), "ExpoHyper[0.5,0.01]");

    let kheiri = Strategy::for_variant(&config.clone().with_variant(Variant::KheiriHyperAll), 27)
        .unwrap();
    assert_eq!(kheiri.name(0.01), "KheiriHyperAll[0.01]");
}

#[test]
fn test_record_to_record_acceptance() {
    let mut rng = seeded(6);
    let acceptor = Acceptor::RecordToRecord { delta: 0.01 };

    // Infeasible best: fixed 0.1% tolerance
    assert!(acceptor.accept(100.05, 100.0, false, 0.0, &mut rng));
    assert!(!acceptor.accept(100.2, 100.0, false, 0.0, &mut rng));

    // Feasible best: tolerance shrinks with progress
    assert!(acceptor.accept(100.5, 100.0, true, 0.0, &mut rng));
    assert!(!acceptor.accept(100.5, 100.0, true, 1.0, &mut rng));
    assert!(acceptor.accept(100.0005, 100.0, true, 1.0, &mut rng));
}

#[test]
fn test_record_acceptance() {
    let mut rng = seeded(7);
    let acceptor = Acceptor::Record { delta: 0.01 };

    assert!(acceptor.accept(100.9, 100.0, true, 1.0, &mut rng));
    assert!(!acceptor.accept(101.1, 100.0, false, 0.0, &mut rng));
}

#[test]
fn test_annealing_schedule() {
    let mut rng = seeded(8);
    let mut acceptor = Acceptor::annealing(1000.0);

    let start = acceptor.temperature().unwrap();
    assert!((start - (-1000.0 * 0.0005 / 0.5f64.ln())).abs() < 1e-12);

    // Better than best is always accepted
    assert!(acceptor.accept(999.0, 1000.0, true, 0.0, &mut rng));
    // Far worse is practically never accepted
    assert!(!acceptor.accept(2000.0, 1000.0, true, 0.0, &mut rng));

    acceptor.cool();
    assert!((acceptor.temperature().unwrap() - start * COOLING_RATE).abs() < 1e-12);
    assert_eq!(Acceptor::Record { delta: 0.1 }.temperature(), None);
}

#[test]
fn test_operator_weights_refresh() {
    let mut weights = OperatorWeights::uniform(3);
    weights.record(0, Some(33.0));
    weights.record(0, Some(33.0));
    weights.record(1, None);

    weights.refresh();

    let w = weights.weights();
    let total: f64 = w.iter().sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert!(w[0] > w[2]);
    // Used without reward loses ground against the unused operator
    assert!(w[1] < w[2]);

    // A segment without any use keeps the weights
    let before = weights.weights().to_vec();
    weights.refresh();
    for (a, b) in before.iter().zip(weights.weights()) {
        assert!((a - b).abs() < 1e-12);
    }
}
