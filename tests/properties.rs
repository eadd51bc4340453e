//! Invariants of the calculators over generated inputs.

use diagstat::evaluation::interval::{wilson, z_for_confidence};
use diagstat::evaluation::{cohens_kappa, evaluate, ConfusionCount, KappaInput, MetricName};
use proptest::prelude::*;

fn counts() -> impl Strategy<Value = ConfusionCount> {
    (0u64..500, 0u64..500, 0u64..500, 0u64..500)
        .prop_filter("non-empty panel", |(a, b, c, d)| a + b + c + d > 0)
        .prop_map(|(tp, tn, fp, fn_)| ConfusionCount::new(tp, tn, fp, fn_))
}

fn levels() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.90), Just(0.95), Just(0.99), 0.01f64..0.999]
}

fn rater_pair() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    (1usize..60).prop_flat_map(|n| {
        let label = prop::sample::select(vec!["neg", "weak", "pos", "strong"])
            .prop_map(str::to_string);
        (
            prop::collection::vec(label.clone(), n),
            prop::collection::vec(label, n),
        )
    })
}

proptest! {
    #[test]
    fn intervals_bracket_values_inside_unit_range(count in counts(), level in levels()) {
        let out = evaluate(&count, level).unwrap();
        for name in MetricName::ALL {
            let m = out.metrics.get(name);
            prop_assert!(0.0 <= m.ci_lower && m.ci_lower <= m.value, "{name}: {m:?}");
            prop_assert!(m.value <= m.ci_upper && m.ci_upper <= 1.0, "{name}: {m:?}");
        }
        prop_assert!((0.0..=1.0).contains(&out.prevalence));
    }

    #[test]
    fn complementary_rates_sum_to_one(count in counts()) {
        let m = evaluate(&count, 0.95).unwrap().metrics;
        if count.condition_positive() > 0 {
            let fnr = count.false_negatives as f64 / count.condition_positive() as f64;
            prop_assert!((m.sensitivity.value + fnr - 1.0).abs() < 1e-12);
        } else {
            prop_assert!(m.sensitivity.undefined);
        }
        if count.condition_negative() > 0 {
            let fpr = count.false_positives as f64 / count.condition_negative() as f64;
            prop_assert!((m.specificity.value + fpr - 1.0).abs() < 1e-12);
        } else {
            prop_assert!(m.specificity.undefined);
        }
    }

    #[test]
    fn wilson_width_shrinks_with_sample_size(
        successes in 0u64..50,
        extra in 0u64..50,
        scale in 2u64..20,
        level in levels(),
    ) {
        let trials = successes + extra + 1;
        let z = z_for_confidence(level).unwrap();
        let small = wilson(successes, trials, z);
        let large = wilson(successes * scale, trials * scale, z);
        prop_assert!(
            large.ci_upper - large.ci_lower < small.ci_upper - small.ci_lower,
            "{small:?} vs {large:?}"
        );
    }

    #[test]
    fn kappa_is_symmetric((r1, r2) in rater_pair(), level in levels()) {
        let forward = cohens_kappa(&KappaInput {
            rater1: r1.clone(),
            rater2: r2.clone(),
            confidence_level: level,
            description: None,
        });
        let backward = cohens_kappa(&KappaInput {
            rater1: r2,
            rater2: r1,
            confidence_level: level,
            description: None,
        });
        match (forward, backward) {
            (Ok(f), Ok(b)) => {
                prop_assert!((f.kappa - b.kappa).abs() < 1e-12);
                prop_assert!((f.ci_lower - b.ci_lower).abs() < 1e-12);
                prop_assert!((f.ci_upper - b.ci_upper).abs() < 1e-12);
                prop_assert_eq!(f.interpretation, b.interpretation);
                prop_assert!(-1.0 <= f.ci_lower && f.ci_lower <= f.kappa && f.kappa <= f.ci_upper && f.ci_upper <= 1.0);
            }
            (Err(f), Err(b)) => prop_assert_eq!(f.code(), b.code()),
            (f, b) => prop_assert!(false, "asymmetric outcome: {f:?} / {b:?}"),
        }
    }

    #[test]
    fn identical_raters_score_one((r1, _) in rater_pair()) {
        let result = cohens_kappa(&KappaInput {
            rater1: r1.clone(),
            rater2: r1.clone(),
            confidence_level: 0.95,
            description: None,
        });
        let distinct = r1.iter().collect::<std::collections::BTreeSet<_>>().len();
        if distinct > 1 {
            let r = result.unwrap();
            prop_assert!((r.kappa - 1.0).abs() < 1e-12);
            prop_assert_eq!(r.observed_agreement, 1.0);
        } else {
            prop_assert!(result.is_err());
        }
    }
}
