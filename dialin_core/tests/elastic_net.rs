use dialin_core::elastic_net::{ElasticNetCfg, fit};

/// With alpha -> 0 the coordinate descent approaches the ordinary
/// least-squares fit; on noiseless linear data it reproduces the target.
#[test]
fn vanishing_alpha_recovers_linear_target() {
    let x: Vec<Vec<f64>> = vec![
        vec![3.0, 16.0, 24.0, 4.0],
        vec![5.0, 17.0, 26.0, 5.0],
        vec![7.0, 18.0, 28.0, 6.0],
        vec![4.0, 19.0, 30.0, 7.0],
        vec![6.0, 20.0, 32.0, 3.0],
        vec![8.0, 16.5, 27.0, 5.5],
    ];
    let w_true = [-0.3, 0.12, 0.05, -0.08];
    let y: Vec<f64> = x
        .iter()
        .map(|row| 1.5 + row.iter().zip(&w_true).map(|(a, b)| a * b).sum::<f64>())
        .collect();
    let cfg = ElasticNetCfg {
        alpha: 1e-9,
        ..ElasticNetCfg::default()
    };
    let en = fit(&x, &y, &cfg);
    for (row, target) in x.iter().zip(&y) {
        let pred = en.predict(row);
        assert!((pred - target).abs() < 1e-3, "{pred} vs {target}");
    }
}

/// Strong L1 shrinks everything to zero, leaving only the intercept.
#[test]
fn strong_l1_zeroes_weights() {
    let x: Vec<Vec<f64>> = vec![
        vec![1.0, 2.0],
        vec![2.0, 1.0],
        vec![3.0, 4.0],
        vec![4.0, 3.0],
    ];
    let y = vec![1.0, 2.0, 3.0, 4.0];
    let cfg = ElasticNetCfg {
        alpha: 1e6,
        l1_ratio: 1.0,
        ..ElasticNetCfg::default()
    };
    let en = fit(&x, &y, &cfg);
    assert!(en.weights.iter().all(|w| w.abs() < 1e-12));
    let y_mean = 2.5;
    assert!((en.intercept - y_mean).abs() < 1e-12);
}

/// Constant columns must not divide by a zero standard deviation.
#[test]
fn constant_column_is_harmless() {
    let x: Vec<Vec<f64>> = vec![
        vec![5.0, 1.0],
        vec![5.0, 2.0],
        vec![5.0, 3.0],
        vec![5.0, 4.0],
    ];
    let y = vec![2.0, 4.0, 6.0, 8.0];
    let en = fit(&x, &y, &ElasticNetCfg::default());
    assert!(en.weights.iter().all(|w| w.is_finite()));
    assert!(en.intercept.is_finite());
}
