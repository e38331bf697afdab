use prompt_refinery::confidence::{
    additive_confidence, clamp, competition_penalty, ratio_confidence, weighted_confidence,
    PenaltyOptions, RatioOptions,
};

#[test]
fn clamp_rounds_and_bounds() {
    assert_eq!(clamp(-5.0), 0);
    assert_eq!(clamp(150.0), 100);
    assert_eq!(clamp(42.4), 42);
    assert_eq!(clamp(42.6), 43);
    assert_eq!(clamp(f64::NAN), 0);
}

#[test]
fn ratio_of_zero_total_is_fallback() {
    assert_eq!(ratio_confidence(0.0, 0.0, RatioOptions::default()), 50);
    let opts = RatioOptions {
        fallback: 70,
        ..RatioOptions::default()
    };
    assert_eq!(ratio_confidence(0.0, 0.0, opts), 70);
}

#[test]
fn ratio_is_share_of_total() {
    assert_eq!(ratio_confidence(30.0, 60.0, RatioOptions::default()), 50);
    assert_eq!(ratio_confidence(35.0, 35.0, RatioOptions::default()), 100);
}

#[test]
fn ratio_respects_floor() {
    let opts = RatioOptions {
        min_confidence: 40,
        ..RatioOptions::default()
    };
    assert_eq!(ratio_confidence(10.0, 100.0, opts), 40);
}

#[test]
fn close_runner_up_lowers_confidence() {
    let opts = PenaltyOptions::default();
    assert_eq!(competition_penalty(80, 30.0, 28.0, opts), 65);
    // 70 - 15 = 55 is below the floor of 60.
    assert_eq!(competition_penalty(70, 30.0, 29.0, opts), 60);
}

#[test]
fn penalty_floor_never_raises_confidence() {
    let result = competition_penalty(50, 30.0, 29.0, PenaltyOptions::default());
    assert!(result <= 50, "floor must not lift 50, got {result}");
}

#[test]
fn distant_runner_up_leaves_confidence_alone() {
    assert_eq!(competition_penalty(80, 30.0, 10.0, PenaltyOptions::default()), 80);
    assert_eq!(competition_penalty(80, 0.0, 0.0, PenaltyOptions::default()), 80);
}

#[test]
fn additive_counts_only_true_conditions() {
    assert_eq!(
        additive_confidence(50.0, &[(true, 10.0), (false, 30.0), (true, 5.0)]),
        65
    );
    assert_eq!(additive_confidence(95.0, &[(true, 20.0)]), 100);
    assert_eq!(additive_confidence(10.0, &[(true, -30.0)]), 0);
}

#[test]
fn weighted_mean() {
    assert_eq!(weighted_confidence(&[(80.0, 1.0), (40.0, 1.0)]), 60);
    assert_eq!(weighted_confidence(&[(100.0, 3.0), (0.0, 1.0)]), 75);
}

#[test]
fn weighted_without_weight_is_fifty() {
    assert_eq!(weighted_confidence(&[]), 50);
    assert_eq!(weighted_confidence(&[(100.0, 0.0)]), 50);
}
