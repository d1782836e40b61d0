use dialin_core::gp::{self, Gp, expected_improvement, lengthscale_from};
use rstest::rstest;

fn training_set() -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = vec![
        vec![0.1, 0.2, 0.3, 0.4],
        vec![0.5, 0.5, 0.5, 0.5],
        vec![0.9, 0.8, 0.7, 0.6],
        vec![0.3, 0.9, 0.1, 0.8],
    ];
    let y = vec![0.0, 0.6, 1.0, 0.3];
    (x, y)
}

#[test]
fn posterior_collapses_at_training_points() {
    let (x, y) = training_set();
    let l = lengthscale_from(&x);
    let gp = Gp::fit(x.clone(), &y, l);
    for (xi, yi) in x.iter().zip(&y) {
        let post = gp.posterior(xi);
        // Mean interpolates the observation and the variance drops to the
        // observation-noise scale.
        assert!((post.mean - yi).abs() < 1e-3, "{} vs {}", post.mean, yi);
        assert!(post.sd * post.sd <= 5.0 * gp::NOISE);
    }
}

#[test]
fn posterior_variance_grows_away_from_data() {
    let (x, y) = training_set();
    let l = lengthscale_from(&x);
    let gp = Gp::fit(x.clone(), &y, l);
    let near = gp.posterior(&x[0]);
    let far = gp.posterior(&[10.0, 10.0, 10.0, 10.0]);
    assert!(far.sd > near.sd);
    // Far from everything the prior variance (plus noise) is recovered.
    assert!((far.sd * far.sd - (gp::OUTPUT_VARIANCE + gp::NOISE)).abs() < 1e-6);
}

#[test]
fn lengthscale_floors_and_fallback() {
    // Identical points: zero mean distance floors at 0.12.
    let x = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
    assert_eq!(lengthscale_from(&x), 0.12);
    // A single point has no pair: fallback 0.25.
    let x = vec![vec![0.5, 0.5]];
    assert_eq!(lengthscale_from(&x), 0.25);
}

#[rstest]
#[case(0.0, 1.0)]
#[case(0.5, 0.2)]
#[case(-2.0, 3.0)]
#[case(4.0, 1e-6)]
fn expected_improvement_is_nonnegative(#[case] mu: f64, #[case] sigma: f64) {
    let ei = expected_improvement(mu, sigma, 1.0, 0.01);
    assert!(ei >= 0.0, "EI({mu}, {sigma}) = {ei}");
}

#[test]
fn expected_improvement_zero_without_uncertainty() {
    assert_eq!(expected_improvement(10.0, 0.0, 0.0, 0.01), 0.0);
    assert_eq!(expected_improvement(10.0, 1e-13, 0.0, 0.01), 0.0);
}

#[test]
fn expected_improvement_rises_with_mean() {
    let lo = expected_improvement(0.2, 0.1, 0.5, 0.01);
    let hi = expected_improvement(0.8, 0.1, 0.5, 0.01);
    assert!(hi > lo);
}
