use rand::{Rng, SeedableRng, rngs::StdRng};

use zdxc::core::fft::magnitude_spectrum;
use zdxc::core::surrogate::{SurrogateGenerator, SurrogateParams, generate, initialize};

fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prev = 0.0;
    (0..n)
        .map(|_| {
            prev = phi * prev + rng.random_range(-1.0..1.0);
            prev
        })
        .collect()
}

fn sorted(v: &[f64]) -> Vec<f64> {
    let mut s = v.to_vec();
    s.sort_by(f64::total_cmp);
    s
}

#[test]
fn value_multiset_is_preserved_for_any_seed_and_tolerance() {
    let x = ar1(300, 0.85, 1);
    let inv = initialize(&x);
    let expected = sorted(&x);
    for seed in [0u64, 1, 17, u64::MAX] {
        for tolerance in [1e-9, 1e-3, 0.1, 10.0] {
            let s = generate(&x, &inv, tolerance, seed);
            assert_eq!(s.len(), x.len());
            assert_eq!(sorted(&s), expected);
        }
    }
}

#[test]
fn values_with_ties_survive() {
    let x: Vec<f64> = (0..128).map(|i| ((i * 37) % 9) as f64).collect();
    let inv = initialize(&x);
    let s = generate(&x, &inv, 0.01, 3);
    assert_eq!(sorted(&s), sorted(&x));
}

#[test]
fn converged_surrogates_match_spectrum() {
    let x = ar1(512, 0.9, 2);
    let inv = initialize(&x);
    let params = SurrogateParams {
        tolerance: 0.15,
        max_iterations: 300,
    };
    let mut generator = SurrogateGenerator::new(&inv, params);
    for seed in 0..4u64 {
        let out = generator.generate(seed);
        assert!(out.converged);
        let deviation = inv.spectral_residual(&magnitude_spectrum(&out.values));
        assert!(deviation <= params.tolerance, "deviation {deviation}");
    }
}

#[test]
fn surrogate_destroys_cross_correlation() {
    // A copy of x is perfectly correlated with x; its surrogate should not be.
    let x = ar1(1024, 0.5, 4);
    let inv = initialize(&x);
    let s = generate(&x, &inv, 0.01, 5);
    let r = zdxc::core::correlation::pearson(&x, &s);
    assert!(r.abs() < 0.5, "r = {r}");
}
